// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::{Issue, ValidationError};
use crate::{Component, Components, Dependencies, Dependency, Location, ModuleBuilder, Scope, Sequence, TypeDescriptor, Valuer, telemetry};

/// The declaration style a provider was derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ProviderKind {
    /// Derived from a function, see [`func`](crate::func).
    Function,
    /// Derived from a struct layout, see [`structure`](crate::structure).
    Struct,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function => f.write_str("Function"),
            Self::Struct => f.write_str("Struct"),
        }
    }
}

/// A frozen provider declaration that can be checked for problems.
pub(crate) trait Blueprint: fmt::Debug + Send + Sync + 'static {
    fn issues(&self) -> Vec<Issue>;
}

/// The declaration-independent parts of a provider.
#[derive(Debug)]
pub(crate) struct Parts {
    pub kind: ProviderKind,
    pub target: Option<TypeDescriptor>,
    pub valuer: Valuer,
    pub placement: Placement,
    pub blueprint: Box<dyn Blueprint>,
}

pub(crate) struct ProviderInner {
    kind: ProviderKind,
    target: Option<TypeDescriptor>,
    valuer: Valuer,
    placement: Placement,
    dependencies: Dependencies,
    components: Components,
    blueprint: Box<dyn Blueprint>,
}

/// A derived provider: how to produce a set of components out of a set of dependencies.
///
/// Providers are immutable snapshots of the builder they were derived from. Cloning a
/// provider is cheap and every clone observes the same dependency and component instances.
///
/// # Examples
///
/// ```
/// use wireup::{ParamConfig, ProviderBuilder, func};
///
/// let mut builder = func(|port: u16| format!("localhost:{port}"));
/// builder.param(0, ParamConfig::new().by_name("port"));
///
/// let provider = builder.provider();
/// assert_eq!(provider.dependencies().len(), 1);
/// assert_eq!(provider.dependencies().get(0).unwrap().name(), Some("port"));
/// assert_eq!(provider.components().len(), 1);
/// assert!(provider.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct Provider(Arc<ProviderInner>);

impl Provider {
    /// Builds a provider whose dependencies and components point back to it.
    pub(crate) fn assemble<F>(parts: Parts, derive: F) -> Self
    where
        F: FnOnce(&Weak<ProviderInner>) -> (Vec<Dependency>, Vec<Component>),
    {
        let provider = Self(Arc::new_cyclic(|inner| {
            let (dependencies, components) = derive(inner);
            ProviderInner {
                kind: parts.kind,
                target: parts.target,
                valuer: parts.valuer,
                placement: parts.placement,
                dependencies: Sequence::new(dependencies),
                components: Sequence::new(components),
                blueprint: parts.blueprint,
            }
        }));

        telemetry::provider_derived(&provider);
        provider
    }

    pub(crate) fn from_inner(inner: Arc<ProviderInner>) -> Self {
        Self(inner)
    }

    /// The declaration style.
    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        self.0.kind
    }

    /// The type of the declared target, if any.
    #[must_use]
    pub fn target(&self) -> Option<&TypeDescriptor> {
        self.0.target.as_ref()
    }

    /// How the provider produces its values.
    ///
    /// Invalid declarations produce a [`Valuer::Error`].
    #[must_use]
    pub fn valuer(&self) -> &Valuer {
        &self.0.valuer
    }

    /// The scope the provider belongs to.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.0.placement.scope
    }

    /// Where the provider was declared.
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        self.0.placement.location.as_ref()
    }

    /// What the provider needs.
    #[must_use]
    pub fn dependencies(&self) -> &Dependencies {
        &self.0.dependencies
    }

    /// What the provider offers.
    #[must_use]
    pub fn components(&self) -> &Components {
        &self.0.components
    }

    /// Checks the declaration and reports every problem found.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing all issues when the declaration is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let issues = self.0.blueprint.issues();
        if issues.is_empty() {
            return Ok(());
        }

        let error = ValidationError::new(self.to_string(), issues);
        telemetry::provider_invalid(self, &error);
        Err(error)
    }

    /// Whether both handles refer to the same derived provider.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Whether both providers declare the same dependencies and components in the same scope.
    #[must_use]
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.scope() == other.scope() && self.dependencies() == other.dependencies() && self.components() == other.components()
    }
}

impl fmt::Display for Provider {
    /// Formats as `Kind[target] in scope`. The alternate form appends the declaration site.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.kind())?;
        match self.target() {
            Some(target) => write!(f, "{target}")?,
            None => f.write_str("<none>")?,
        }
        write!(f, "] in {}", self.scope())?;

        if f.alternate() {
            match self.location() {
                Some(location) => write!(f, " at {location}")?,
                None => f.write_str(" at <unknown>")?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Provider {
    #[cfg_attr(test, mutants::skip)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("kind", &self.0.kind)
            .field("target", &self.0.target)
            .field("scope", &self.0.placement.scope)
            .field("location", &self.0.placement.location)
            .field("dependencies", &self.0.dependencies)
            .field("components", &self.0.components)
            .finish_non_exhaustive()
    }
}

/// Something that derives a [`Provider`] and can contribute it to a module.
pub trait ProviderBuilder {
    /// Derives a provider from the current declaration.
    ///
    /// Later changes to the builder do not affect providers derived earlier.
    fn provider(&self) -> Provider;

    /// Registers the derived provider with `module`.
    fn apply_module(&self, module: &mut ModuleBuilder) {
        module.add_provider(self.provider());
    }
}

/// Scope and declaration site shared by all provider builders.
#[derive(Clone, Debug, Default)]
pub(crate) struct Placement {
    pub scope: Scope,
    pub location: Option<Location>,
}

impl Placement {
    pub fn set_scope(&mut self, scope: Option<Scope>) {
        self.scope = scope.unwrap_or_default();
    }

    /// Records the declaration site unless one is already known.
    #[track_caller]
    pub fn update_location(&mut self, location: Option<Location>) {
        if self.location.is_some() {
            return;
        }

        self.location = Some(match location {
            Some(location) => location,
            None => Location::caller(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(Provider: Send, Sync, Clone, fmt::Display);
        static_assertions::assert_obj_safe!(ProviderBuilder);
    }

    #[test]
    fn placement_defaults_to_global() {
        let mut placement = Placement::default();
        assert!(placement.scope.is_global());

        placement.set_scope(Some(Scope::new("request")));
        assert!(!placement.scope.is_global());

        placement.set_scope(None);
        assert!(placement.scope.is_global());
    }

    #[test]
    fn placement_keeps_first_location() {
        let mut placement = Placement::default();

        placement.update_location(Some(Location::new("first.rs", 1)));
        placement.update_location(Some(Location::new("second.rs", 2)));

        assert_eq!(placement.location, Some(Location::new("first.rs", 1)));
    }

    #[test]
    fn placement_captures_caller() {
        let mut placement = Placement::default();

        placement.update_location(None);
        let line = line!() - 1;

        let location = placement.location.unwrap();
        assert!(location.file().ends_with("provider.rs"));
        assert_eq!(location.line(), line);
    }
}
