// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(1);

/// A unique tag used to qualify dependencies and components.
///
/// Every call to [`Symbol::new`] yields a distinct symbol, even for identical names. The name
/// only serves diagnostics.
///
/// # Examples
///
/// ```
/// use wireup::Symbol;
///
/// let primary = Symbol::new("primary");
/// assert_eq!(primary, primary.clone());
/// assert_ne!(primary, Symbol::new("primary"));
/// assert_eq!(primary.to_string(), "primary");
/// ```
#[derive(Clone, Debug)]
pub struct Symbol {
    id: u64,
    name: Cow<'static, str>,
}

impl Symbol {
    /// Creates a new, unique symbol.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: NEXT_SYMBOL.fetch_add(1, AtomicOrdering::Relaxed),
            name: name.into(),
        }
    }

    /// The diagnostic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
