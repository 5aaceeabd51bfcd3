// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt;

use crate::{Symbol, TypeDescriptor};

/// An ordered set of unique elements with value semantics.
///
/// Used as [`SymbolSet`] for tags and [`TypeSet`] for exposed types.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Set<T>(BTreeSet<T>);

/// A set of tags.
pub type SymbolSet = Set<Symbol>;

/// A set of types a component is exposed as.
pub type TypeSet = Set<TypeDescriptor>;

impl<T: Ord> Set<T> {
    /// Creates a set from the given elements, dropping duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use wireup::{Symbol, SymbolSet};
    ///
    /// let primary = Symbol::new("primary");
    /// let tags = SymbolSet::new([primary.clone(), primary.clone()]);
    ///
    /// assert_eq!(tags.len(), 1);
    /// assert!(tags.contains(&primary));
    /// ```
    #[must_use]
    pub fn new(elements: impl IntoIterator<Item = T>) -> Self {
        Self(elements.into_iter().collect())
    }

    /// Whether `element` is part of the set.
    #[must_use]
    pub fn contains(&self, element: &T) -> bool {
        self.0.contains(element)
    }

    /// Whether every element of `self` is also in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }
}

impl<T> Set<T> {
    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the elements in order.
    pub fn iter(&self) -> btree_set::Iter<'_, T> {
        self.0.iter()
    }
}

impl<T> Default for Set<T> {
    fn default() -> Self {
        Self(BTreeSet::new())
    }
}

impl<T: Ord> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a, T> IntoIterator for &'a Set<T> {
    type Item = &'a T;
    type IntoIter = btree_set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Display> fmt::Display for Set<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, element) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{element}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_sets() {
        let red = Symbol::new("red");
        let blue = Symbol::new("blue");

        let tags: SymbolSet = [blue.clone(), red.clone(), blue.clone()].into_iter().collect();

        assert_eq!(tags.len(), 2);
        assert_eq!(tags.to_string(), "{red, blue}");
        assert_eq!(tags, SymbolSet::new([red.clone(), blue]));
        assert!(SymbolSet::new([red]).is_subset(&tags));
        assert!(SymbolSet::default().is_empty());
    }

    #[test]
    fn type_sets() {
        let types = TypeSet::new([TypeDescriptor::of::<u8>(), TypeDescriptor::of::<u8>()]);

        assert_eq!(types.len(), 1);
        assert!(types.contains(&TypeDescriptor::of::<u8>()));
        assert!(!types.contains(&TypeDescriptor::of::<u16>()));
        assert_eq!(types.to_string(), "{u8}");
    }
}
