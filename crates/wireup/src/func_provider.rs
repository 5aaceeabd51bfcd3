// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use crate::error::{Issue, Slot};
use crate::provider::{Blueprint, Parts, Placement, ProviderInner};
use crate::{
    Callable, Component, Dependency, IntoCallable, Location, ParamConfig, Provider, ProviderBuilder, ProviderKind, Reflected,
    ReturnConfig, Scope, Valuer,
};

/// Starts declaring a provider backed by `function`.
///
/// Every parameter of the function becomes a dependency and every result, except the error of
/// a fallible function, becomes a component.
///
/// # Examples
///
/// ```
/// use std::io;
/// use wireup::{ParamConfig, ProviderBuilder, ReturnConfig, func};
///
/// fn connect(host: String, retries: Vec<u32>) -> Result<(u64, bool), io::Error> {
///     Ok((retries.len() as u64, !host.is_empty()))
/// }
///
/// let mut builder = func(connect);
/// builder
///     .param(0, ParamConfig::new().by_name("host"))
///     .param(1, ParamConfig::new().as_collector(true))
///     .returns(1, ReturnConfig::new().hide());
///
/// let provider = builder.provider();
/// assert!(provider.validate().is_ok());
/// assert_eq!(provider.dependencies().get(1).unwrap().ty().name(), "u32");
/// assert_eq!(provider.components().len(), 2);
/// assert!(provider.components().get(1).unwrap().is_hidden());
/// ```
pub fn func<M>(function: impl IntoCallable<M>) -> FuncProviderBuilder {
    FuncProviderBuilder::new(Some(Reflected::func(function)))
}

/// Declares a provider backed by a function.
///
/// The builder accumulates parameter and result configuration. Deriving a [`Provider`] takes a
/// snapshot, so later changes do not affect providers derived earlier. Problems in the
/// declaration do not fail the builder methods, they are reported by [`Provider::validate`].
#[derive(Clone, Debug)]
pub struct FuncProviderBuilder {
    target: Option<Reflected>,
    params: BTreeMap<usize, ParamConfig>,
    returns: BTreeMap<usize, ReturnConfig>,
    placement: Placement,
}

impl FuncProviderBuilder {
    /// Creates a builder for an arbitrary target.
    ///
    /// Targets that are absent or not functions yield providers that fail validation.
    #[must_use]
    pub fn new(target: Option<Reflected>) -> Self {
        Self {
            target,
            params: BTreeMap::new(),
            returns: BTreeMap::new(),
            placement: Placement::default(),
        }
    }

    /// Configures the parameter at `index`, merging with earlier configuration.
    pub fn param(&mut self, index: usize, config: ParamConfig) -> &mut Self {
        self.params.entry(index).or_default().merge(config);
        self
    }

    /// Configures the result at `index`, merging with earlier configuration.
    pub fn returns(&mut self, index: usize, config: ReturnConfig) -> &mut Self {
        self.returns.entry(index).or_default().merge(config);
        self
    }

    /// Places the provider in `scope`.
    pub fn in_scope(&mut self, scope: Scope) -> &mut Self {
        self.set_scope(Some(scope))
    }

    /// Places the provider in `scope`, or in [`Scope::GLOBAL`] when absent.
    pub fn set_scope(&mut self, scope: Option<Scope>) -> &mut Self {
        self.placement.set_scope(scope);
        self
    }

    /// Records where the provider was declared, replacing any earlier location.
    pub fn set_location(&mut self, location: Location) -> &mut Self {
        self.placement.location = Some(location);
        self
    }

    /// Records where the provider was declared unless a location is already known.
    ///
    /// Without an explicit location, the location of the calling code is used.
    #[track_caller]
    pub fn update_call_location(&mut self, location: Option<Location>) -> &mut Self {
        self.placement.update_location(location);
        self
    }

    /// The configured target.
    #[must_use]
    pub fn target(&self) -> Option<&Reflected> {
        self.target.as_ref()
    }

    /// The scope the provider is placed in.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.placement.scope
    }

    /// Where the provider was declared.
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        self.placement.location.as_ref()
    }

    /// How the provider produces its values.
    ///
    /// Every call returns a fresh valuer, targets that are not functions yield a
    /// [`Valuer::Error`].
    #[must_use]
    pub fn valuer(&self) -> Valuer {
        match self.callable() {
            Some(callable) => Valuer::Func(callable.clone()),
            None => Valuer::Error(Arc::new(self.not_callable())),
        }
    }

    fn callable(&self) -> Option<&Callable> {
        self.target.as_ref().and_then(Reflected::as_callable)
    }

    fn not_callable(&self) -> Issue {
        Issue::NotCallable {
            found: self.target.as_ref().map(|target| target.ty().clone()),
        }
    }

    fn derive(&self, provider: &Weak<ProviderInner>) -> (Vec<Dependency>, Vec<Component>) {
        let Some(callable) = self.callable() else {
            return (Vec::new(), Vec::new());
        };
        let signature = callable.signature();

        let unconfigured = ParamConfig::default();
        let dependencies = signature
            .params()
            .iter()
            .enumerate()
            .map(|(index, ty)| {
                let config = self.params.get(&index).unwrap_or(&unconfigured);
                Dependency::configured(ty, config, Valuer::Param(index), Weak::clone(provider))
            })
            .collect();

        let unconfigured = ReturnConfig::default();
        let components = signature
            .valid_results()
            .iter()
            .enumerate()
            .map(|(index, ty)| {
                let config = self.returns.get(&index).unwrap_or(&unconfigured);
                Component::configured(ty, config, Valuer::Index(index), Weak::clone(provider))
            })
            .collect();

        (dependencies, components)
    }
}

impl ProviderBuilder for FuncProviderBuilder {
    fn provider(&self) -> Provider {
        let parts = Parts {
            kind: ProviderKind::Function,
            target: self.target.as_ref().map(|target| target.ty().clone()),
            valuer: self.valuer(),
            placement: self.placement.clone(),
            blueprint: Box::new(self.clone()),
        };

        Provider::assemble(parts, |provider| self.derive(provider))
    }
}

impl Blueprint for FuncProviderBuilder {
    fn issues(&self) -> Vec<Issue> {
        let Some(callable) = self.callable() else {
            return vec![self.not_callable()];
        };
        let signature = callable.signature();
        let mut issues = Vec::new();

        for (&index, config) in &self.params {
            match signature.params().get(index) {
                Some(ty) => config.check(&Slot::Index(index), ty, &mut issues),
                None => issues.push(Issue::ParamIndexOutOfRange {
                    index,
                    arity: signature.arity(),
                }),
            }
        }

        let count = signature.results().len();
        for &index in self.returns.keys() {
            if index >= count {
                issues.push(Issue::ReturnIndexOutOfRange { index, count });
            } else if signature.error_slot() == Some(index) {
                issues.push(Issue::ReturnIndexReserved { index });
            }
        }

        let results = signature.valid_results();
        if results.is_empty() {
            issues.push(Issue::NoUsableOutput);
        }

        for (index, produced) in results.iter().enumerate() {
            if let Some(config) = self.returns.get(&index) {
                config.check(&Slot::Index(index), produced, &mut issues);
            }
        }

        issues
    }
}

/// Builders are equal when they derive equal dependencies and components in the same scope.
impl PartialEq for FuncProviderBuilder {
    fn eq(&self, other: &Self) -> bool {
        self.provider().is_equivalent(&other.provider())
    }
}
