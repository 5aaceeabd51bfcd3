// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::fmt;

use crate::TypeDescriptor;

/// A problem found while validating a provider declaration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Issue {
    /// The target of a function provider is absent or not a function.
    #[error("{} is not a function", describe(.found))]
    NotCallable {
        /// The type of the configured target, if any.
        found: Option<TypeDescriptor>,
    },

    /// A parameter configuration refers to a position the function does not have.
    #[error("parameter {index} does not exist, the function takes {arity} parameters")]
    ParamIndexOutOfRange {
        /// The configured position.
        index: usize,
        /// Number of parameters of the function.
        arity: usize,
    },

    /// A parameter configuration cannot apply to the parameter's type.
    #[error("parameter {slot} of type `{ty}` is misconfigured: {reason}")]
    ParamConfigInvalid {
        /// The configured parameter.
        slot: Slot,
        /// The declared parameter type.
        ty: TypeDescriptor,
        /// What is wrong.
        reason: Cow<'static, str>,
    },

    /// A return configuration refers to a position the function does not have.
    #[error("result {index} does not exist, the function returns {count} values")]
    ReturnIndexOutOfRange {
        /// The configured position.
        index: usize,
        /// Number of results of the function.
        count: usize,
    },

    /// A return configuration refers to the error slot of a fallible function.
    #[error("result {index} is the error result and cannot become a component")]
    ReturnIndexReserved {
        /// The configured position.
        index: usize,
    },

    /// The provider produces no value that could become a component.
    #[error("the provider produces no usable value")]
    NoUsableOutput,

    /// A component is exposed as a type it cannot be used as.
    #[error("component {slot} of type `{produced}` cannot be exposed as `{exposed}`")]
    ExposedTypeMismatch {
        /// The configured result.
        slot: Slot,
        /// The type the provider produces.
        produced: TypeDescriptor,
        /// The requested exposed type.
        exposed: TypeDescriptor,
    },

    /// The target of a struct provider is absent, not a struct or has no constructor.
    #[error("{} is not a constructible struct", describe(.found))]
    NotConstructible {
        /// The configured target type, if any.
        found: Option<TypeDescriptor>,
    },

    /// A field configuration refers to a field the struct does not have.
    #[error("struct `{ty}` has no field named `{name}`")]
    FieldNotFound {
        /// The struct type.
        ty: TypeDescriptor,
        /// The configured field name.
        name: Cow<'static, str>,
    },
}

fn describe(found: &Option<TypeDescriptor>) -> Cow<'static, str> {
    match found {
        Some(ty) => format!("`{ty}`").into(),
        None => "nothing".into(),
    }
}

/// Identifies a configured parameter or result.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// A position in a function signature.
    Index(usize),

    /// A struct field.
    Field(Cow<'static, str>),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Field(name) => write!(f, "`{name}`"),
        }
    }
}

/// Every problem found in a provider declaration.
///
/// # Examples
///
/// ```
/// use wireup::{FuncProviderBuilder, Issue, ProviderBuilder};
///
/// let error = FuncProviderBuilder::new(None).provider().validate().unwrap_err();
///
/// assert_eq!(error.issues(), &[Issue::NotCallable { found: None }]);
/// assert_eq!(error.to_string(), "Function[<none>] in global is invalid: nothing is not a function");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{provider} is invalid: {}", summarize(.issues))]
pub struct ValidationError {
    provider: String,
    issues: Vec<Issue>,
}

fn summarize(issues: &[Issue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl ValidationError {
    pub(crate) fn new(provider: String, issues: Vec<Issue>) -> Self {
        Self { provider, issues }
    }

    /// Description of the invalid provider.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// The problems found, in the order they were detected.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }
}
