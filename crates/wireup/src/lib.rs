// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Provider metadata for dependency injection containers.
//!
//! # Why
//!
//! A dependency injection container resolves values by matching what providers need against what
//! other providers offer. This crate derives that metadata from plain Rust functions and struct
//! layouts, so a container can be assembled from ordinary code instead of hand-written
//! registrations. Resolution itself is left to the container.
//!
//! # Overview
//!
//! - [`func`] and [`structure`] start a provider declaration. Parameters and results are
//!   configured through [`ParamConfig`] and [`ReturnConfig`].
//! - [`ProviderBuilder::provider`] derives a [`Provider`]: its [`Dependency`] list, its
//!   [`Component`] list and the [`Valuer`] that produces its values.
//! - [`Provider::validate`] reports every problem in a declaration at once, as a
//!   [`ValidationError`] holding a list of [`Issue`]s.
//! - [`ModuleBuilder`] collects providers into a [`Module`].
//!
//! Rust has no runtime reflection, so types taking part in a declaration implement [`Reflect`].
//! The common standard library types already do, application types use [`reflect_opaque!`] or
//! describe themselves with [`TypeDescriptor::interface`] and [`TypeDescriptor::structure`].
//!
//! # Example
//!
//! ```
//! use std::io;
//!
//! use wireup::{ParamConfig, ProviderBuilder, ReturnConfig, Scope, Symbol, func};
//!
//! struct Pool;
//! wireup::reflect_opaque!(Pool);
//!
//! fn open_pool(url: String, size: u32) -> Result<Box<Pool>, io::Error> {
//!     let _ = (url, size);
//!     Ok(Box::new(Pool))
//! }
//!
//! let primary = Symbol::new("primary");
//! let request = Scope::new("request");
//!
//! let mut builder = func(open_pool);
//! builder
//!     .param(0, ParamConfig::new().by_name("database_url"))
//!     .param(1, ParamConfig::new().optional(true))
//!     .returns(0, ReturnConfig::new().tags([primary.clone()]))
//!     .in_scope(request.clone());
//!
//! let provider = builder.provider();
//! assert!(provider.validate().is_ok());
//! assert_eq!(provider.scope(), &request);
//! assert_eq!(provider.dependencies().len(), 2);
//!
//! let component = provider.components().get(0).unwrap();
//! assert!(component.tags().unwrap().contains(&primary));
//!
//! // The error slot of a fallible function cannot be configured.
//! builder.returns(1, ReturnConfig::new());
//! assert!(builder.provider().validate().is_err());
//! ```
//!
//! # Features
//!
//! - `logs`: emits structured [`tracing`](https://docs.rs/tracing) events when providers are
//!   derived (`wireup.provider.derived`) and when validation fails (`wireup.provider.invalid`).

mod component;
mod dependency;
mod error;
mod func_provider;
mod location;
mod module;
mod options;
mod provider;
mod reflect;
mod scope;
mod sequence;
mod set;
mod struct_provider;
mod symbol;
mod telemetry;
mod valuer;

pub use component::Component;
pub use dependency::Dependency;
pub use error::{Issue, Slot, ValidationError};
pub use func_provider::{FuncProviderBuilder, func};
pub use location::Location;
pub use module::{Module, ModuleBuilder};
pub use options::{ParamConfig, ReturnConfig};
pub use provider::{Provider, ProviderBuilder, ProviderKind};
pub use reflect::{
    Arguments, CallError, Callable, FuncSignature, InterfaceBuilder, InterfaceInfo, IntoCallable, Reflect, Reflected, Returns,
    StructBuilder, StructField, StructInfo, TypeDescriptor, TypeKind, Value,
};
pub use scope::Scope;
pub use sequence::{Components, Dependencies, Sequence};
pub use set::{Set, SymbolSet, TypeSet};
pub use struct_provider::{StructProviderBuilder, structure};
pub use symbol::Symbol;
pub use valuer::{Output, SharedError, Valuer};
