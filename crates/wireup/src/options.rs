// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;

use crate::error::{Issue, Slot};
use crate::{Symbol, SymbolSet, TypeDescriptor, TypeSet};

/// Configuration of a function parameter or struct field.
///
/// Configuring the same parameter more than once merges the configurations, settings made
/// later take precedence.
///
/// # Examples
///
/// ```
/// use wireup::ParamConfig;
///
/// let config = ParamConfig::new().by_name("primary").optional(true);
///
/// assert_eq!(config.get_name(), Some("primary"));
/// assert!(config.get_optional());
/// assert!(!config.get_collector());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamConfig {
    name: Option<Cow<'static, str>>,
    tags: Option<SymbolSet>,
    optional: Option<bool>,
    collector: Option<bool>,
}

impl ParamConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the component with the given name. An empty name leaves the dependency unnamed.
    #[must_use]
    pub fn by_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = non_empty(name.into());
        self
    }

    /// Requires components carrying the given tags.
    #[must_use]
    pub fn by_tags(mut self, tags: impl IntoIterator<Item = Symbol>) -> Self {
        self.tags = Some(SymbolSet::new(tags));
        self
    }

    /// Whether the dependency may stay unsatisfied.
    #[must_use]
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = Some(optional);
        self
    }

    /// Whether the dependency collects every matching component into a sequence.
    ///
    /// The dependency type becomes the sequence's element type.
    #[must_use]
    pub fn as_collector(mut self, collector: bool) -> Self {
        self.collector = Some(collector);
        self
    }

    /// The required component name.
    #[must_use]
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The required tags.
    #[must_use]
    pub fn get_tags(&self) -> Option<&SymbolSet> {
        self.tags.as_ref()
    }

    /// Whether the dependency is optional.
    #[must_use]
    pub fn get_optional(&self) -> bool {
        self.optional.unwrap_or(false)
    }

    /// Whether the dependency is a collector.
    #[must_use]
    pub fn get_collector(&self) -> bool {
        self.collector.unwrap_or(false)
    }

    pub(crate) fn cow_name(&self) -> Option<&Cow<'static, str>> {
        self.name.as_ref()
    }

    pub(crate) fn merge(&mut self, later: Self) {
        self.name = later.name.or_else(|| self.name.take());
        self.tags = later.tags.or_else(|| self.tags.take());
        self.optional = later.optional.or(self.optional);
        self.collector = later.collector.or(self.collector);
    }

    pub(crate) fn check(&self, slot: &Slot, ty: &TypeDescriptor, issues: &mut Vec<Issue>) {
        if self.get_collector() && ty.element().is_none() {
            issues.push(Issue::ParamConfigInvalid {
                slot: slot.clone(),
                ty: ty.clone(),
                reason: "only sequence types can collect components".into(),
            });
        }
    }
}

fn non_empty(name: Cow<'static, str>) -> Option<Cow<'static, str>> {
    (!name.is_empty()).then_some(name)
}

/// Configuration of a function result or struct provider output.
///
/// Configuring the same result more than once merges the configurations, settings made later
/// take precedence.
///
/// # Examples
///
/// ```
/// use wireup::ReturnConfig;
///
/// let config = ReturnConfig::new().name("cache").hide();
///
/// assert_eq!(config.get_name(), Some("cache"));
/// assert!(config.get_hidden());
/// assert!(!config.get_ignored());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReturnConfig {
    name: Option<Cow<'static, str>>,
    tags: Option<SymbolSet>,
    hidden: Option<bool>,
    ignored: Option<bool>,
    exposed_as: Option<TypeSet>,
}

impl ReturnConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the component. An empty name leaves the component unnamed.
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = non_empty(name.into());
        self
    }

    /// Tags the component.
    #[must_use]
    pub fn tags(mut self, tags: impl IntoIterator<Item = Symbol>) -> Self {
        self.tags = Some(SymbolSet::new(tags));
        self
    }

    /// Hides the component from lookups outside of its own scope.
    #[must_use]
    pub fn hide(mut self) -> Self {
        self.hidden = Some(true);
        self
    }

    /// Excludes the component from resolution.
    #[must_use]
    pub fn ignore(mut self) -> Self {
        self.ignored = Some(true);
        self
    }

    /// Exposes the component as the given types instead of its own type.
    #[must_use]
    pub fn expose_as(mut self, types: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        self.exposed_as = Some(TypeSet::new(types));
        self
    }

    /// The component name.
    #[must_use]
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The component tags.
    #[must_use]
    pub fn get_tags(&self) -> Option<&SymbolSet> {
        self.tags.as_ref()
    }

    /// Whether the component is hidden.
    #[must_use]
    pub fn get_hidden(&self) -> bool {
        self.hidden.unwrap_or(false)
    }

    /// Whether the component is ignored.
    #[must_use]
    pub fn get_ignored(&self) -> bool {
        self.ignored.unwrap_or(false)
    }

    /// The types the component is exposed as.
    #[must_use]
    pub fn get_exposed_as(&self) -> Option<&TypeSet> {
        self.exposed_as.as_ref()
    }

    pub(crate) fn cow_name(&self) -> Option<&Cow<'static, str>> {
        self.name.as_ref()
    }

    pub(crate) fn merge(&mut self, later: Self) {
        self.name = later.name.or_else(|| self.name.take());
        self.tags = later.tags.or_else(|| self.tags.take());
        self.hidden = later.hidden.or(self.hidden);
        self.ignored = later.ignored.or(self.ignored);
        self.exposed_as = later.exposed_as.or_else(|| self.exposed_as.take());
    }

    pub(crate) fn check(&self, slot: &Slot, produced: &TypeDescriptor, issues: &mut Vec<Issue>) {
        let Some(exposed_as) = &self.exposed_as else {
            return;
        };

        issues.extend(
            exposed_as
                .iter()
                .filter(|exposed| !exposed.is_assignable_from(produced))
                .map(|exposed| Issue::ExposedTypeMismatch {
                    slot: slot.clone(),
                    produced: produced.clone(),
                    exposed: exposed.clone(),
                }),
        );
    }
}
