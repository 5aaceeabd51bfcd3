// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::reflect::{CallError, Callable, IntoCallable, Value};

/// A shareable error, as carried by [`Valuer::Error`] and [`Output::Error`].
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// Describes how a value is produced at resolution time.
///
/// Providers produce their values through a [`Valuer::Func`], dependencies pick their
/// argument out of the resolved inputs with [`Valuer::Param`] and components pick their value
/// out of the provider's outputs with [`Valuer::Index`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use wireup::{Value, Valuer};
///
/// let inputs: Vec<Value> = vec![Arc::new(1_i32), Arc::new("two")];
///
/// let output = Valuer::Param(1).value(&inputs);
/// assert_eq!(output.value().and_then(|v| v.downcast_ref::<&str>()), Some(&"two"));
///
/// assert!(Valuer::Index(5).value(&inputs).is_error());
/// ```
#[derive(Clone, Debug)]
pub enum Valuer {
    /// Invokes a function with the inputs as positional arguments.
    Func(Callable),

    /// Selects the input at the given position.
    Param(usize),

    /// Selects the output at the given position.
    Index(usize),

    /// Always yields the given error.
    Error(SharedError),
}

#[derive(Debug, thiserror::Error)]
#[error("unspecified failure")]
struct Unspecified;

impl Valuer {
    /// Creates a function valuer.
    pub fn func<M>(function: impl IntoCallable<M>) -> Self {
        Self::Func(function.into_callable())
    }

    /// Creates an error valuer. An absent error is replaced by a generic one.
    #[must_use]
    pub fn error(error: Option<SharedError>) -> Self {
        Self::Error(error.unwrap_or_else(|| Arc::new(Unspecified)))
    }

    /// Produces the value for the given inputs.
    ///
    /// Positions outside of `inputs` and argument mismatches yield [`Output::Error`].
    pub fn value(&self, inputs: &[Value]) -> Output {
        match self {
            Self::Func(callable) => match callable.call(inputs) {
                Ok(values) => Output::Values(values),
                Err(CallError::Failed(error)) => Output::Error(error),
                Err(error) => Output::Error(Arc::new(error)),
            },
            Self::Param(index) | Self::Index(index) => match inputs.get(*index) {
                Some(value) => Output::Value(Arc::clone(value)),
                None => Output::Error(Arc::new(CallError::PositionOutOfRange {
                    index: *index,
                    len: inputs.len(),
                })),
            },
            Self::Error(error) => Output::Error(Arc::clone(error)),
        }
    }
}

/// Functions compare by the type of the function, errors by identity of their cause.
impl PartialEq for Valuer {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Func(left), Self::Func(right)) => left.ty() == right.ty(),
            (Self::Param(left), Self::Param(right)) | (Self::Index(left), Self::Index(right)) => left == right,
            (Self::Error(left), Self::Error(right)) => same_cause(left, right) || same_cause(right, left),
            _ => false,
        }
    }
}

/// Whether `target` is `error` itself or appears in its source chain.
fn same_cause(error: &SharedError, target: &SharedError) -> bool {
    let target = Arc::as_ptr(target);
    let mut current: Option<&(dyn Error + 'static)> = Some(error.as_ref());

    while let Some(cause) = current {
        if std::ptr::addr_eq(std::ptr::from_ref(cause), target) {
            return true;
        }
        current = cause.source();
    }

    false
}

impl fmt::Display for Valuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Func(callable) => write!(f, "Func: {}", callable.ty()),
            Self::Param(index) => write!(f, "Param: {index}"),
            Self::Index(index) => write!(f, "Index: {index}"),
            Self::Error(error) => write!(f, "Error: {error}"),
        }
    }
}

/// The result of [`Valuer::value`].
#[derive(Clone, Debug)]
#[must_use]
pub enum Output {
    /// A single selected value.
    Value(Value),

    /// All values returned by a function.
    Values(Vec<Value>),

    /// Producing the value failed.
    Error(SharedError),
}

impl Output {
    /// Whether producing the value failed.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&SharedError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    /// The single selected value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The values returned by a function, if any.
    #[must_use]
    pub fn values(&self) -> Option<&[Value]> {
        match self {
            Self::Values(values) => Some(values),
            _ => None,
        }
    }
}
