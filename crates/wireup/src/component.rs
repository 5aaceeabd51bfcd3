// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::fmt;
use std::sync::Weak;

use crate::provider::ProviderInner;
use crate::{Provider, ReturnConfig, SymbolSet, TypeDescriptor, TypeSet, Valuer};

/// A value a provider makes available to others.
///
/// Components are derived from a provider declaration, one per usable function result or one
/// for a struct provider, and are never constructed directly.
#[derive(Clone)]
pub struct Component {
    ty: TypeDescriptor,
    name: Option<Cow<'static, str>>,
    tags: Option<SymbolSet>,
    exposed_as: Option<TypeSet>,
    ignored: bool,
    hidden: bool,
    valuer: Valuer,
    provider: Weak<ProviderInner>,
}

impl Component {
    pub(crate) fn configured(
        ty: &TypeDescriptor,
        config: &ReturnConfig,
        valuer: Valuer,
        provider: Weak<ProviderInner>,
    ) -> Self {
        Self {
            ty: ty.clone(),
            name: config.cow_name().cloned(),
            tags: config.get_tags().cloned(),
            exposed_as: config.get_exposed_as().cloned(),
            ignored: config.get_ignored(),
            hidden: config.get_hidden(),
            valuer,
            provider,
        }
    }

    /// The produced type.
    #[must_use]
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// The component name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The component tags.
    #[must_use]
    pub fn tags(&self) -> Option<&SymbolSet> {
        self.tags.as_ref()
    }

    /// The types the component is exposed as, replacing its own type for lookups.
    #[must_use]
    pub fn exposed_as(&self) -> Option<&TypeSet> {
        self.exposed_as.as_ref()
    }

    /// Whether the component is excluded from resolution.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Whether the component is hidden from lookups outside of its scope.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// How the value is picked out of the provider's outputs.
    #[must_use]
    pub fn valuer(&self) -> &Valuer {
        &self.valuer
    }

    /// The provider that produces this component, while it is alive.
    #[must_use]
    pub fn provider(&self) -> Option<Provider> {
        self.provider.upgrade().map(Provider::from_inner)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
            && self.name == other.name
            && self.tags == other.tags
            && self.exposed_as == other.exposed_as
            && self.ignored == other.ignored
            && self.hidden == other.hidden
    }
}

impl fmt::Debug for Component {
    #[cfg_attr(test, mutants::skip)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("ty", &self.ty)
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("exposed_as", &self.exposed_as)
            .field("ignored", &self.ignored)
            .field("hidden", &self.hidden)
            .field("valuer", &self.valuer)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)?;
        if let Some(name) = &self.name {
            write!(f, " named {name:?}")?;
        }
        if let Some(tags) = &self.tags {
            write!(f, " tagged {tags}")?;
        }
        if let Some(exposed_as) = &self.exposed_as {
            write!(f, " as {exposed_as}")?;
        }
        match (self.ignored, self.hidden) {
            (true, _) => f.write_str(" (ignored)"),
            (false, true) => f.write_str(" (hidden)"),
            (false, false) => Ok(()),
        }
    }
}
