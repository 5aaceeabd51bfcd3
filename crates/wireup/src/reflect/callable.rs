// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::any::{Any, TypeId, type_name};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use super::{FuncSignature, Reflect, TypeDescriptor, TypeKind};
use crate::valuer::SharedError;

/// A type-erased runtime value.
pub type Value = Arc<dyn Any + Send + Sync>;

type Invoke = dyn Fn(&[Value]) -> Result<Vec<Value>, CallError> + Send + Sync;

/// Errors produced when invoking a [`Callable`] or reading values by position.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CallError {
    /// The number of supplied arguments does not match the signature.
    #[error("expected {expected} arguments but {actual} were supplied")]
    ArgumentCount {
        /// Arity of the callable.
        expected: usize,
        /// Number of supplied arguments.
        actual: usize,
    },

    /// An argument does not hold a value of the expected type.
    #[error("argument {index} is not a `{expected}`")]
    ArgumentType {
        /// Position of the argument.
        index: usize,
        /// Name of the expected type.
        expected: &'static str,
    },

    /// A position lies outside of the supplied values.
    #[error("position {index} is out of range for {len} values")]
    PositionOutOfRange {
        /// The requested position.
        index: usize,
        /// Number of available values.
        len: usize,
    },

    /// The callable ran and returned an error.
    #[error(transparent)]
    Failed(SharedError),
}

/// A type-erased function with a known signature.
///
/// Cloning a callable shares the underlying function, see [`Callable::ptr_eq`].
#[derive(Clone)]
pub struct Callable {
    ty: TypeDescriptor,
    signature: FuncSignature,
    invoke: Arc<Invoke>,
}

impl Callable {
    /// Erases a Rust function or closure.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use wireup::{Callable, Value};
    ///
    /// let add = Callable::new(|a: i32, b: i32| a + b);
    /// assert_eq!(add.signature().arity(), 2);
    ///
    /// let args: Vec<Value> = vec![Arc::new(2_i32), Arc::new(3_i32)];
    /// let results = add.call(&args).unwrap();
    /// assert_eq!(results[0].downcast_ref::<i32>(), Some(&5));
    /// ```
    pub fn new<M>(function: impl IntoCallable<M>) -> Self {
        function.into_callable()
    }

    pub(crate) fn from_raw<F>(ty: TypeDescriptor, invoke: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Vec<Value>, CallError> + Send + Sync + 'static,
    {
        let signature = match ty.kind() {
            TypeKind::Func(signature) => signature.clone(),
            _ => FuncSignature::new(Vec::new(), Vec::new()),
        };

        Self {
            ty,
            signature,
            invoke: Arc::new(invoke),
        }
    }

    /// The descriptor of the erased function.
    #[must_use]
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// Parameter and result types.
    #[must_use]
    pub fn signature(&self) -> &FuncSignature {
        &self.signature
    }

    /// Invokes the function with positional arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments do not match the signature, or
    /// [`CallError::Failed`] if the function itself failed.
    pub fn call(&self, args: &[Value]) -> Result<Vec<Value>, CallError> {
        (self.invoke)(args)
    }

    /// Whether both callables share the same underlying function.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.invoke, &other.invoke)
    }
}

impl fmt::Debug for Callable {
    #[cfg_attr(test, mutants::skip)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callable").field(&self.ty.name()).finish()
    }
}

/// Conversion of Rust functions and closures into [`Callable`].
///
/// Implemented for functions of up to eight parameters whose parameters implement
/// [`Reflect`] and [`Clone`], and whose return type implements [`Returns`].
pub trait IntoCallable<Marker> {
    /// Performs the conversion.
    fn into_callable(self) -> Callable;
}

impl IntoCallable<Callable> for Callable {
    fn into_callable(self) -> Callable {
        self
    }
}

fn argument<T: Clone + 'static>(args: &[Value], index: usize) -> Result<T, CallError> {
    let value = args
        .get(index)
        .ok_or(CallError::PositionOutOfRange { index, len: args.len() })?;
    let any: &(dyn Any + Send + Sync) = &**value;

    any.downcast_ref::<T>().cloned().ok_or(CallError::ArgumentType {
        index,
        expected: type_name::<T>(),
    })
}

pub(super) fn func_descriptor(id: TypeId, params: Vec<TypeDescriptor>, results: Vec<TypeDescriptor>) -> TypeDescriptor {
    let name = format!("fn({}){}", join(&params), match results.as_slice() {
        [] => String::new(),
        [single] => format!(" -> {single}"),
        many => format!(" -> ({})", join(many)),
    });

    TypeDescriptor::from_parts(id, name, TypeKind::Func(FuncSignature::new(params, results)))
}

fn join(types: &[TypeDescriptor]) -> String {
    types.iter().map(TypeDescriptor::name).collect::<Vec<_>>().join(", ")
}

macro_rules! impl_into_callable {
    ($($arg:ident $var:ident $index:tt),*) => {
        impl<Func, Ret, $($arg,)*> IntoCallable<fn($($arg,)*) -> Ret> for Func
        where
            Func: Fn($($arg),*) -> Ret + Send + Sync + 'static,
            Ret: Returns,
            $($arg: Reflect + Clone + Send + Sync,)*
        {
            fn into_callable(self) -> Callable {
                let params = vec![$(TypeDescriptor::of::<$arg>()),*];
                let expected = params.len();
                let ty = func_descriptor(TypeId::of::<Func>(), params, Ret::result_types());

                Callable::from_raw(ty, move |args| {
                    if args.len() != expected {
                        return Err(CallError::ArgumentCount { expected, actual: args.len() });
                    }

                    $(let $var = argument::<$arg>(args, $index)?;)*
                    (self)($($var),*).into_values().map_err(CallError::Failed)
                })
            }
        }
    };
}

impl_into_callable!();
impl_into_callable!(A0 a0 0);
impl_into_callable!(A0 a0 0, A1 a1 1);
impl_into_callable!(A0 a0 0, A1 a1 1, A2 a2 2);
impl_into_callable!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3);
impl_into_callable!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4);
impl_into_callable!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5);
impl_into_callable!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5, A6 a6 6);
impl_into_callable!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5, A6 a6 6, A7 a7 7);

/// Sequential access to the arguments of a struct constructor.
///
/// See [`StructBuilder::construct`](super::StructBuilder::construct).
#[derive(Debug)]
pub struct Arguments<'a> {
    args: &'a [Value],
    position: usize,
}

impl<'a> Arguments<'a> {
    pub(crate) fn new(args: &'a [Value], expected: usize) -> Result<Self, CallError> {
        if args.len() != expected {
            return Err(CallError::ArgumentCount {
                expected,
                actual: args.len(),
            });
        }

        Ok(Self { args, position: 0 })
    }

    /// Takes the next argument.
    ///
    /// # Errors
    ///
    /// Returns an error when the arguments are exhausted or the next one is not a `T`.
    pub fn take<T: Clone + 'static>(&mut self) -> Result<T, CallError> {
        let value = argument(self.args, self.position)?;
        self.position += 1;
        Ok(value)
    }
}

/// Return types of functions that can back a provider.
///
/// A single reflected type yields one result, a tuple yields one result per element and `()`
/// yields none. Wrapping any of them in `Result` appends an error slot.
pub trait Returns: Sized + 'static {
    /// Descriptors of the produced results, in order.
    fn result_types() -> Vec<TypeDescriptor>;

    /// Erases the produced results.
    ///
    /// # Errors
    ///
    /// Returns the function's own error when it failed.
    fn into_values(self) -> Result<Vec<Value>, SharedError>;
}

impl<T: Reflect + Send + Sync> Returns for T {
    fn result_types() -> Vec<TypeDescriptor> {
        vec![TypeDescriptor::of::<T>()]
    }

    fn into_values(self) -> Result<Vec<Value>, SharedError> {
        Ok(vec![Arc::new(self)])
    }
}

impl Returns for () {
    fn result_types() -> Vec<TypeDescriptor> {
        Vec::new()
    }

    fn into_values(self) -> Result<Vec<Value>, SharedError> {
        Ok(Vec::new())
    }
}

macro_rules! impl_returns_tuple {
    ($($ty:ident $var:ident),+) => {
        impl<$($ty: Reflect + Send + Sync),+> Returns for ($($ty,)+) {
            fn result_types() -> Vec<TypeDescriptor> {
                vec![$(TypeDescriptor::of::<$ty>()),+]
            }

            fn into_values(self) -> Result<Vec<Value>, SharedError> {
                let ($($var,)+) = self;
                Ok(vec![$(Arc::new($var) as Value),+])
            }
        }
    };
}

impl_returns_tuple!(R0 r0);
impl_returns_tuple!(R0 r0, R1 r1);
impl_returns_tuple!(R0 r0, R1 r1, R2 r2);
impl_returns_tuple!(R0 r0, R1 r1, R2 r2, R3 r3);
impl_returns_tuple!(R0 r0, R1 r1, R2 r2, R3 r3, R4 r4);
impl_returns_tuple!(R0 r0, R1 r1, R2 r2, R3 r3, R4 r4, R5 r5);

impl<T, E> Returns for Result<T, E>
where
    T: Returns,
    E: Into<Box<dyn Error + Send + Sync>> + 'static,
{
    fn result_types() -> Vec<TypeDescriptor> {
        let mut types = T::result_types();
        types.push(TypeDescriptor::error());
        types
    }

    fn into_values(self) -> Result<Vec<Value>, SharedError> {
        match self {
            Ok(value) => value.into_values(),
            Err(error) => {
                let error: Box<dyn Error + Send + Sync> = error.into();
                Err(Arc::from(error))
            }
        }
    }
}

/// A runtime value together with the descriptor of its type.
///
/// This is how provider builders receive their target: either a function, see
/// [`Reflected::func`], or any other value, which is then reported as not callable.
#[derive(Clone, Debug)]
pub struct Reflected {
    ty: TypeDescriptor,
    value: Value,
}

impl Reflected {
    /// Wraps a plain value.
    pub fn new<T: Reflect + Send + Sync>(value: T) -> Self {
        Self {
            ty: TypeDescriptor::of::<T>(),
            value: Arc::new(value),
        }
    }

    /// Wraps a function.
    pub fn func<M>(function: impl IntoCallable<M>) -> Self {
        Self::from(function.into_callable())
    }

    /// The descriptor of the wrapped value.
    #[must_use]
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// The wrapped value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The wrapped function, if the value is one.
    #[must_use]
    pub fn as_callable(&self) -> Option<&Callable> {
        let any: &(dyn Any + Send + Sync) = &*self.value;
        any.downcast_ref::<Callable>()
    }
}

impl From<Callable> for Reflected {
    fn from(callable: Callable) -> Self {
        Self {
            ty: callable.ty().clone(),
            value: Arc::new(callable),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(Callable: Send, Sync, Clone);
        static_assertions::assert_impl_all!(Reflected: Send, Sync, Clone);
        static_assertions::assert_impl_all!(CallError: Send, Sync, Error);
    }

    #[test]
    fn signature_of_plain_function() {
        fn describe(count: u32, label: String) -> String {
            format!("{label}:{count}")
        }

        let callable = Callable::new(describe);

        assert_eq!(
            callable.signature().params(),
            &[TypeDescriptor::of::<u32>(), TypeDescriptor::of::<String>()]
        );
        assert_eq!(callable.signature().results(), &[TypeDescriptor::of::<String>()]);
        let string = TypeDescriptor::of::<String>();
        assert_eq!(callable.ty().name(), format!("fn(u32, {string}) -> {string}"));
    }

    #[test]
    fn fallible_function_appends_error_slot() {
        let callable = Callable::new(|value: i32| -> Result<(i32, bool), io::Error> { Ok((value, true)) });
        let results = callable.signature().results();

        assert_eq!(results.len(), 3);
        assert!(results[2].is_error());
        assert_eq!(callable.signature().error_slot(), Some(2));
    }

    #[test]
    fn call_produces_values() {
        let callable = Callable::new(|value: i32| (value, value * 2));
        let results = callable.call(&[Arc::new(21_i32)]).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].downcast_ref::<i32>(), Some(&42));
    }

    #[test]
    fn call_reports_failure() {
        let callable = Callable::new(|| -> Result<i32, io::Error> { Err(io::Error::other("boom")) });

        match callable.call(&[]) {
            Err(CallError::Failed(error)) => assert_eq!(error.to_string(), "boom"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn call_checks_arguments() {
        let callable = Callable::new(|value: i32| value);

        assert!(matches!(
            callable.call(&[]),
            Err(CallError::ArgumentCount { expected: 1, actual: 0 })
        ));
        assert!(matches!(
            callable.call(&[Arc::new("text")]),
            Err(CallError::ArgumentType { index: 0, .. })
        ));
    }

    #[test]
    fn clones_share_function() {
        let callable = Callable::new(|| 1_u8);
        let other = Callable::new(|| 1_u8);

        assert!(callable.ptr_eq(&callable.clone()));
        assert!(!callable.ptr_eq(&other));
    }

    #[test]
    fn reflected_values() {
        let plain = Reflected::new(5_i32);
        assert_eq!(plain.ty(), &TypeDescriptor::of::<i32>());
        assert!(plain.as_callable().is_none());

        let function = Reflected::func(|| ());
        assert!(function.ty().is_func());
        assert!(function.as_callable().is_some());
    }
}
