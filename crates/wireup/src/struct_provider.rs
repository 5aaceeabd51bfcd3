// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use crate::error::{Issue, Slot};
use crate::provider::{Blueprint, Parts, Placement, ProviderInner};
use crate::{
    Callable, Component, Dependency, Location, ParamConfig, Provider, ProviderBuilder, ProviderKind, Reflect, ReturnConfig, Scope,
    StructInfo, TypeDescriptor, Valuer,
};

/// Starts declaring a provider that builds `T` from its fields.
///
/// Every field becomes a dependency and the struct itself becomes the single component. `T`
/// must be described with [`TypeDescriptor::structure`] and a constructor.
///
/// # Examples
///
/// ```
/// use wireup::{ParamConfig, ProviderBuilder, Reflect, TypeDescriptor, structure};
///
/// #[derive(Clone)]
/// struct Server {
///     port: u16,
///     name: String,
/// }
///
/// impl Reflect for Server {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::structure::<Self>()
///             .field::<u16>("port")
///             .field::<String>("name")
///             .construct(|fields| Ok(Server { port: fields.take()?, name: fields.take()? }))
///     }
/// }
///
/// let mut builder = structure::<Server>();
/// builder.field("port", ParamConfig::new().by_name("http_port"));
///
/// let provider = builder.provider();
/// assert!(provider.validate().is_ok());
/// assert_eq!(provider.dependencies().get(0).unwrap().name(), Some("http_port"));
/// assert_eq!(provider.components().get(0).unwrap().ty(), &TypeDescriptor::of::<Server>());
/// ```
#[must_use]
pub fn structure<T: Reflect + ?Sized>() -> StructProviderBuilder {
    StructProviderBuilder::new(Some(TypeDescriptor::of::<T>()))
}

/// Declares a provider that builds a struct from its fields.
///
/// Behaves like [`FuncProviderBuilder`](crate::FuncProviderBuilder), with fields addressed by
/// name instead of position.
#[derive(Clone, Debug)]
pub struct StructProviderBuilder {
    target: Option<TypeDescriptor>,
    fields: BTreeMap<Cow<'static, str>, ParamConfig>,
    component: ReturnConfig,
    placement: Placement,
}

impl StructProviderBuilder {
    /// Creates a builder for an arbitrary target type.
    ///
    /// Targets that are absent, not structs or without a constructor yield providers that fail
    /// validation.
    #[must_use]
    pub fn new(target: Option<TypeDescriptor>) -> Self {
        Self {
            target,
            fields: BTreeMap::new(),
            component: ReturnConfig::default(),
            placement: Placement::default(),
        }
    }

    /// Configures the field called `name`, merging with earlier configuration.
    pub fn field(&mut self, name: impl Into<Cow<'static, str>>, config: ParamConfig) -> &mut Self {
        self.fields.entry(name.into()).or_default().merge(config);
        self
    }

    /// Configures the produced component, merging with earlier configuration.
    pub fn component(&mut self, config: ReturnConfig) -> &mut Self {
        self.component.merge(config);
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
    #[track_caller]
    pub fn update_call_location(&mut self, location: Option<Location>) -> &mut Self {
        self.placement.update_location(location);
        self
    }

    /// The configured target type.
    #[must_use]
    pub fn target(&self) -> Option<&TypeDescriptor> {
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

    /// How the provider builds the struct, a fresh valuer on every call.
    #[must_use]
    pub fn valuer(&self) -> Valuer {
        match self.constructor() {
            Some(constructor) => Valuer::Func(constructor.clone()),
            None => Valuer::Error(Arc::new(self.not_constructible())),
        }
    }

    fn info(&self) -> Option<&StructInfo> {
        self.target.as_ref().and_then(TypeDescriptor::struct_info)
    }

    fn constructor(&self) -> Option<&Callable> {
        self.info().and_then(StructInfo::constructor)
    }

    fn not_constructible(&self) -> Issue {
        Issue::NotConstructible {
            found: self.target.clone(),
        }
    }

    fn derive(&self, provider: &Weak<ProviderInner>) -> (Vec<Dependency>, Vec<Component>) {
        let (Some(target), Some(info)) = (&self.target, self.info()) else {
            return (Vec::new(), Vec::new());
        };

        let unconfigured = ParamConfig::default();
        let dependencies = info
            .fields()
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let config = self.fields.get(field.name()).unwrap_or(&unconfigured);
                Dependency::configured(field.ty(), config, Valuer::Param(index), Weak::clone(provider))
            })
            .collect();

        let component = Component::configured(target, &self.component, Valuer::Index(0), Weak::clone(provider));

        (dependencies, vec![component])
    }
}

impl ProviderBuilder for StructProviderBuilder {
    fn provider(&self) -> Provider {
        let parts = Parts {
            kind: ProviderKind::Struct,
            target: self.target.clone(),
            valuer: self.valuer(),
            placement: self.placement.clone(),
            blueprint: Box::new(self.clone()),
        };

        Provider::assemble(parts, |provider| self.derive(provider))
    }
}

impl Blueprint for StructProviderBuilder {
    fn issues(&self) -> Vec<Issue> {
        let (Some(target), Some(info)) = (&self.target, self.info()) else {
            return vec![self.not_constructible()];
        };
        let mut issues = Vec::new();

        if info.constructor().is_none() {
            issues.push(self.not_constructible());
        }

        for (name, config) in &self.fields {
            match info.field(name) {
                Some((_, field)) => config.check(&Slot::Field(name.clone()), field.ty(), &mut issues),
                None => issues.push(Issue::FieldNotFound {
                    ty: target.clone(),
                    name: name.clone(),
                }),
            }
        }

        self.component.check(&Slot::Index(0), target, &mut issues);

        issues
    }
}

/// Builders are equal when they derive equal dependencies and components in the same scope.
impl PartialEq for StructProviderBuilder {
    fn eq(&self, other: &Self) -> bool {
        self.provider().is_equivalent(&other.provider())
    }
}
