// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{Component, Components, Provider, ProviderBuilder, Sequence};

/// Collects providers contributed by [`ProviderBuilder::apply_module`].
///
/// # Examples
///
/// ```
/// use wireup::{ModuleBuilder, ProviderBuilder, func};
///
/// let mut module = ModuleBuilder::new();
/// func(|| 1_u8).apply_module(&mut module);
/// func(|value: u8| (value, value.to_string())).apply_module(&mut module);
///
/// let module = module.module();
/// assert_eq!(module.providers().len(), 2);
/// assert_eq!(module.all_components().len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct ModuleBuilder {
    providers: Vec<Provider>,
}

impl ModuleBuilder {
    /// Creates an empty module builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a derived provider.
    pub fn add_provider(&mut self, provider: Provider) -> &mut Self {
        self.providers.push(provider);
        self
    }

    /// Adds the provider derived by `builder`.
    pub fn add(&mut self, builder: &impl ProviderBuilder) -> &mut Self {
        builder.apply_module(self);
        self
    }

    /// Freezes the providers added so far.
    #[must_use]
    pub fn module(&self) -> Module {
        Module {
            providers: Sequence::new(self.providers.clone()),
        }
    }
}

/// An immutable collection of providers.
#[derive(Clone, Debug)]
pub struct Module {
    providers: Sequence<Provider>,
}

impl Module {
    /// The providers, in the order they were added.
    #[must_use]
    pub fn providers(&self) -> &Sequence<Provider> {
        &self.providers
    }

    /// The components of every provider, in provider order.
    #[must_use]
    pub fn all_components(&self) -> Components {
        let components: Vec<Component> = self
            .providers
            .iter()
            .flat_map(|provider| provider.components().iter().cloned())
            .collect();
        Sequence::new(components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ReturnConfig, func};

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(Module: Send, Sync, Clone);
        static_assertions::assert_impl_all!(ModuleBuilder: Send, Sync);
    }

    #[test]
    fn apply_module_adds_derived_provider() {
        let mut builder = func(|| String::from("value"));
        builder.returns(0, ReturnConfig::new().name("value"));

        let mut module = ModuleBuilder::new();
        builder.apply_module(&mut module);
        let module = module.module();

        let provider = module.providers().get(0).unwrap();
        assert!(provider.is_equivalent(&builder.provider()));
        assert_eq!(module.all_components().get(0).unwrap().name(), Some("value"));
    }

    #[test]
    fn module_is_a_snapshot() {
        let mut builder = ModuleBuilder::new();
        builder.add(&func(|| 1_u8));
        let module = builder.module();

        builder.add(&func(|| 2_u16));

        assert_eq!(module.providers().len(), 1);
        assert_eq!(builder.module().providers().len(), 2);
    }

    #[test]
    fn components_keep_their_provider() {
        let mut builder = ModuleBuilder::new();
        builder.add(&func(|| 1_u8));
        let module = builder.module();

        let component = module.all_components().get(0).cloned().unwrap();
        let provider = component.provider().unwrap();
        assert!(provider.ptr_eq(module.providers().get(0).unwrap()));
    }
}
