// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::ops::ControlFlow;
use std::slice;
use std::sync::Arc;

use crate::{Component, Dependency};

/// An immutable, cheaply cloneable sequence.
///
/// Clones share the same elements, so repeated reads observe the same element instances.
pub struct Sequence<T>(Arc<[T]>);

/// The dependencies of a provider, in parameter order.
pub type Dependencies = Sequence<Dependency>;

/// The components of a provider, in result order.
pub type Components = Sequence<Component>;

impl<T> Sequence<T> {
    pub(crate) fn new(elements: Vec<T>) -> Self {
        Self(Arc::from(elements))
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the sequence has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.0.get(index)
    }

    /// Iterates the elements in order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.0.iter()
    }

    /// The elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Visits the elements in order until `visit` breaks.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::ops::ControlFlow;
    /// use wireup::{ProviderBuilder, func};
    ///
    /// let provider = func(|a: i32, b: u8, c: bool| a).provider();
    ///
    /// let mut seen = 0;
    /// let flow = provider.dependencies().iterate(|dependency| {
    ///     seen += 1;
    ///     if dependency.ty().name() == "u8" { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
    /// });
    ///
    /// assert!(flow.is_break());
    /// assert_eq!(seen, 2);
    /// ```
    pub fn iterate<F>(&self, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(&T) -> ControlFlow<()>,
    {
        for element in self.iter() {
            visit(element)?;
        }
        ControlFlow::Continue(())
    }

    /// Copies the elements into a new vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.0.to_vec()
    }
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: PartialEq> PartialEq for Sequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
