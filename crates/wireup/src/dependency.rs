// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::fmt;
use std::sync::Weak;

use crate::provider::ProviderInner;
use crate::{ParamConfig, Provider, SymbolSet, TypeDescriptor, Valuer};

/// A value a provider needs in order to produce its components.
///
/// Dependencies are derived from a provider declaration, one per function parameter or
/// struct field, and are never constructed directly.
#[derive(Clone)]
pub struct Dependency {
    ty: TypeDescriptor,
    name: Option<Cow<'static, str>>,
    tags: Option<SymbolSet>,
    valuer: Valuer,
    optional: bool,
    collector: bool,
    consumer: Weak<ProviderInner>,
}

impl Dependency {
    /// A collector depends on the element type of its declared sequence type.
    pub(crate) fn configured(
        declared: &TypeDescriptor,
        config: &ParamConfig,
        valuer: Valuer,
        consumer: Weak<ProviderInner>,
    ) -> Self {
        let collector = config.get_collector();
        let ty = match declared.element() {
            Some(element) if collector => element.clone(),
            _ => declared.clone(),
        };

        Self {
            ty,
            name: config.cow_name().cloned(),
            tags: config.get_tags().cloned(),
            valuer,
            optional: config.get_optional(),
            collector,
            consumer,
        }
    }

    /// The required type. For collectors this is the element type.
    #[must_use]
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// The required component name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The required tags.
    #[must_use]
    pub fn tags(&self) -> Option<&SymbolSet> {
        self.tags.as_ref()
    }

    /// How the argument is picked out of the resolved inputs.
    #[must_use]
    pub fn valuer(&self) -> &Valuer {
        &self.valuer
    }

    /// Whether the dependency may stay unsatisfied.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the dependency collects every matching component.
    #[must_use]
    pub fn is_collector(&self) -> bool {
        self.collector
    }

    /// The provider that declared this dependency, while it is alive.
    #[must_use]
    pub fn consumer(&self) -> Option<Provider> {
        self.consumer.upgrade().map(Provider::from_inner)
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
            && self.name == other.name
            && self.tags == other.tags
            && self.optional == other.optional
            && self.collector == other.collector
    }
}

impl fmt::Debug for Dependency {
    #[cfg_attr(test, mutants::skip)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("ty", &self.ty)
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("valuer", &self.valuer)
            .field("optional", &self.optional)
            .field("collector", &self.collector)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.collector {
            write!(f, "[{}]", self.ty)?;
        } else {
            write!(f, "{}", self.ty)?;
        }
        if let Some(name) = &self.name {
            write!(f, " named {name:?}")?;
        }
        if let Some(tags) = &self.tags {
            write!(f, " tagged {tags}")?;
        }
        if self.optional {
            f.write_str(" (optional)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(Dependency: Send, Sync, Clone, fmt::Display);
    }

    #[test]
    fn collector_uses_element_type() {
        let declared = TypeDescriptor::of::<Vec<u32>>();

        let collector = Dependency::configured(
            &declared,
            &ParamConfig::new().as_collector(true),
            Valuer::Param(0),
            Weak::new(),
        );
        assert_eq!(collector.ty(), &TypeDescriptor::of::<u32>());
        assert!(collector.is_collector());

        let plain = Dependency::configured(&declared, &ParamConfig::new(), Valuer::Param(0), Weak::new());
        assert_eq!(plain.ty(), &declared);
        assert!(!plain.is_collector());
    }

    #[test]
    fn equality_ignores_valuer_and_consumer() {
        let declared = TypeDescriptor::of::<u32>();
        let config = ParamConfig::new().by_name("port");

        let first = Dependency::configured(&declared, &config, Valuer::Param(0), Weak::new());
        let second = Dependency::configured(&declared, &config, Valuer::Param(1), Weak::new());
        let renamed = Dependency::configured(&declared, &config.clone().by_name("host"), Valuer::Param(0), Weak::new());

        assert_eq!(first, second);
        assert_ne!(first, renamed);
        assert!(first.consumer().is_none());
    }

    #[test]
    fn display() {
        let tag = Symbol::new("fast");
        let config = ParamConfig::new()
            .by_name("port")
            .by_tags([tag])
            .optional(true)
            .as_collector(true);

        let dependency = Dependency::configured(&TypeDescriptor::of::<Vec<u16>>(), &config, Valuer::Param(0), Weak::new());

        assert_eq!(dependency.to_string(), "[u16] named \"port\" tagged {fast} (optional)");
    }
}
