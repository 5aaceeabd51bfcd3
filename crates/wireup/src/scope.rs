// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

/// Identifies the lifetime domain a provider belongs to.
///
/// Providers that are not placed anywhere else live in [`Scope::GLOBAL`].
///
/// # Examples
///
/// ```
/// use wireup::Scope;
///
/// let request = Scope::new("request");
/// assert_ne!(request, Scope::GLOBAL);
/// assert_eq!(Scope::default(), Scope::GLOBAL);
/// ```
#[derive(Clone, Debug)]
pub struct Scope {
    id: u64,
    name: Cow<'static, str>,
}

impl Scope {
    /// The scope of providers that were not placed anywhere else.
    pub const GLOBAL: Self = Self {
        id: 0,
        name: Cow::Borrowed("global"),
    };

    /// Creates a new, unique scope.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: NEXT_SCOPE.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
        }
    }

    /// The diagnostic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is [`Scope::GLOBAL`].
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.id == Self::GLOBAL.id
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::GLOBAL
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Scope {}

impl Hash for Scope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_scope() {
        assert!(Scope::GLOBAL.is_global());
        assert!(Scope::default().is_global());
        assert_eq!(Scope::GLOBAL.to_string(), "global");
    }

    #[test]
    fn scopes_are_unique() {
        let first = Scope::new("session");
        let second = Scope::new("session");

        assert_ne!(first, second);
        assert_eq!(first, first.clone());
        assert!(!first.is_global());
        assert_eq!(first.name(), "session");
    }
}
