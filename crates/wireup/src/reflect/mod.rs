// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Runtime type introspection for provider derivation.
//!
//! Rust has no built-in runtime reflection, so every type that takes part in a provider
//! declaration describes itself through the [`Reflect`] trait. The resulting
//! [`TypeDescriptor`] carries a stable identity (based on [`TypeId`]), a display name and a
//! [`TypeKind`] with enough structure for the derivation engine: function signatures,
//! struct fields, sequence element types and interface implementors.

mod callable;
mod std_impls;

use std::any::TypeId;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock};

pub use callable::{Arguments, CallError, Callable, IntoCallable, Reflected, Returns, Value};
use parking_lot::RwLock;

static DESCRIPTORS: LazyLock<RwLock<HashMap<TypeId, TypeDescriptor>>> = LazyLock::new(RwLock::default);

thread_local! {
    // Types whose descriptor is being built on this thread.
    static IN_PROGRESS: RefCell<HashSet<TypeId>> = RefCell::new(HashSet::new());
}

/// Clears the in-progress mark of a type, also when building its descriptor unwinds.
struct BuildGuard(TypeId);

impl BuildGuard {
    /// Marks `id` as in progress, or returns `None` when it already is.
    fn enter(id: TypeId) -> Option<Self> {
        IN_PROGRESS.with_borrow_mut(|building| building.insert(id)).then_some(Self(id))
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        IN_PROGRESS.with_borrow_mut(|building| building.remove(&self.0));
    }
}

/// A type that can describe itself at runtime.
///
/// Implementations are provided for the common standard library types. Application types
/// usually implement it through [`reflect_opaque!`](crate::reflect_opaque), or by hand when
/// they need to be exposed as an interface or built as a struct provider.
///
/// # Examples
///
/// ```
/// use wireup::{Reflect, TypeDescriptor, TypeKind};
///
/// struct Database;
/// wireup::reflect_opaque!(Database);
///
/// let descriptor = TypeDescriptor::of::<Vec<Database>>();
/// assert!(matches!(descriptor.kind(), TypeKind::Sequence(_)));
/// assert_eq!(descriptor.element(), Some(&TypeDescriptor::of::<Database>()));
/// ```
pub trait Reflect: 'static {
    /// Builds the descriptor of this type.
    ///
    /// Callers should prefer [`TypeDescriptor::of`], which caches the result.
    fn descriptor() -> TypeDescriptor;
}

/// Runtime description of a Rust type.
///
/// Descriptors are cheap to clone. Two descriptors are equal when they describe the same
/// [`TypeId`], regardless of how they were constructed.
#[derive(Clone)]
pub struct TypeDescriptor(Arc<DescriptorInner>);

struct DescriptorInner {
    id: TypeId,
    name: Cow<'static, str>,
    kind: TypeKind,
}

/// The shape of a described type.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum TypeKind {
    /// `bool`.
    Bool,
    /// Signed integers.
    Int,
    /// Unsigned integers.
    Uint,
    /// Floating point numbers.
    Float,
    /// `char`.
    Char,
    /// Owned or static strings.
    String,
    /// A growable sequence that can collect many values of its element type.
    Sequence(TypeDescriptor),
    /// A key/value map.
    Map {
        /// The key type.
        key: TypeDescriptor,
        /// The value type.
        value: TypeDescriptor,
    },
    /// An owning pointer such as `Box<T>` or `Arc<T>`.
    Pointer(TypeDescriptor),
    /// `Option<T>`.
    Optional(TypeDescriptor),
    /// A struct with known fields.
    Struct(StructInfo),
    /// A callable with a known signature.
    Func(FuncSignature),
    /// A trait object type and the concrete types known to implement it.
    Interface(InterfaceInfo),
    /// The error half of a fallible function's result.
    Error,
    /// A type without further structure.
    Opaque,
}

/// Parameter and result types of a callable.
#[derive(Clone, Debug)]
pub struct FuncSignature {
    params: Vec<TypeDescriptor>,
    results: Vec<TypeDescriptor>,
}

impl FuncSignature {
    pub(crate) fn new(params: Vec<TypeDescriptor>, results: Vec<TypeDescriptor>) -> Self {
        Self { params, results }
    }

    /// Parameter types in declaration order.
    #[must_use]
    pub fn params(&self) -> &[TypeDescriptor] {
        &self.params
    }

    /// Result types in order. A fallible function lists its error slot last.
    #[must_use]
    pub fn results(&self) -> &[TypeDescriptor] {
        &self.results
    }

    /// Number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Position of the trailing error slot, if the function is fallible.
    #[must_use]
    pub fn error_slot(&self) -> Option<usize> {
        self.results
            .last()
            .filter(|last| last.is_error())
            .map(|_| self.results.len() - 1)
    }

    /// Results that can become components: every result except the error slot.
    #[must_use]
    pub fn valid_results(&self) -> &[TypeDescriptor] {
        match self.error_slot() {
            Some(slot) => &self.results[..slot],
            None => &self.results,
        }
    }
}

/// A named struct field.
#[derive(Clone, Debug)]
pub struct StructField {
    name: Cow<'static, str>,
    ty: TypeDescriptor,
}

impl StructField {
    /// The field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field type.
    #[must_use]
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }
}

/// Fields of a struct and, optionally, a constructor that builds it from field values.
#[derive(Clone, Debug)]
pub struct StructInfo {
    fields: Vec<StructField>,
    constructor: Option<Callable>,
}

impl StructInfo {
    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[StructField] {
        &self.fields
    }

    /// Looks up a field and its position by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<(usize, &StructField)> {
        self.fields.iter().enumerate().find(|(_, field)| field.name == name)
    }

    /// The constructor taking one argument per field, in declaration order.
    #[must_use]
    pub fn constructor(&self) -> Option<&Callable> {
        self.constructor.as_ref()
    }
}

/// The set of concrete types that satisfy an interface.
#[derive(Clone, Debug)]
pub struct InterfaceInfo {
    universal: bool,
    implementors: BTreeSet<TypeId>,
}

impl InterfaceInfo {
    /// Whether every type satisfies this interface.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        self.universal
    }

    /// Whether values of `ty` can be exposed through this interface.
    ///
    /// Pointers are looked through, so `Box<T>` satisfies an interface implemented by `T`.
    #[must_use]
    pub fn is_implemented_by(&self, ty: &TypeDescriptor) -> bool {
        if self.universal || self.implementors.contains(&ty.id()) {
            return true;
        }

        matches!(ty.kind(), TypeKind::Pointer(target) if self.implementors.contains(&target.id()))
    }
}

impl TypeDescriptor {
    /// Returns the descriptor of `T`.
    ///
    /// Descriptors are built once per type and cached for the lifetime of the process. Types
    /// that refer to themselves, such as a struct with a `Vec<Self>` field, see an opaque
    /// descriptor of themselves while their own descriptor is being built.
    #[must_use]
    pub fn of<T: Reflect + ?Sized>() -> Self {
        let id = TypeId::of::<T>();
        if let Some(found) = DESCRIPTORS.read().get(&id) {
            return found.clone();
        }

        // A type that mentions itself sees an opaque stand-in, which has the same identity.
        let Some(guard) = BuildGuard::enter(id) else {
            return Self::from_parts(id, std::any::type_name::<T>(), TypeKind::Opaque);
        };

        // Built without holding the lock, descriptors of composite types recurse into `of`.
        let built = T::descriptor();
        drop(guard);
        DESCRIPTORS.write().entry(id).or_insert(built).clone()
    }

    /// Describes `T` as a type without further structure.
    #[must_use]
    pub fn opaque<T: ?Sized + 'static>() -> Self {
        Self::from_parts(TypeId::of::<T>(), std::any::type_name::<T>(), TypeKind::Opaque)
    }

    /// Starts describing `T` as an interface, typically a `dyn Trait` type.
    #[must_use]
    pub fn interface<T: ?Sized + 'static>() -> InterfaceBuilder {
        InterfaceBuilder {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            universal: false,
            implementors: BTreeSet::new(),
        }
    }

    /// Starts describing `T` as a struct with named fields.
    #[must_use]
    pub fn structure<T: Send + Sync + 'static>() -> StructBuilder<T> {
        StructBuilder {
            fields: Vec::new(),
            _type: PhantomData,
        }
    }

    pub(crate) fn from_parts(id: TypeId, name: impl Into<Cow<'static, str>>, kind: TypeKind) -> Self {
        Self(Arc::new(DescriptorInner {
            id,
            name: name.into(),
            kind,
        }))
    }

    pub(crate) fn error() -> Self {
        Self::of::<std_impls::ErrorSlot>()
    }

    /// The [`TypeId`] this descriptor stands for.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.0.id
    }

    /// Human-readable type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The shape of the type.
    #[must_use]
    pub fn kind(&self) -> &TypeKind {
        &self.0.kind
    }

    /// Whether this type is a callable.
    #[must_use]
    pub fn is_func(&self) -> bool {
        matches!(self.kind(), TypeKind::Func(_))
    }

    /// Whether this type is the error slot of a fallible function.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.kind(), TypeKind::Error)
    }

    /// The signature of a callable type.
    #[must_use]
    pub fn signature(&self) -> Option<&FuncSignature> {
        match self.kind() {
            TypeKind::Func(signature) => Some(signature),
            _ => None,
        }
    }

    /// The field layout of a struct type.
    #[must_use]
    pub fn struct_info(&self) -> Option<&StructInfo> {
        match self.kind() {
            TypeKind::Struct(info) => Some(info),
            _ => None,
        }
    }

    /// The element type of a sequence, which is what a collector dependency receives.
    #[must_use]
    pub fn element(&self) -> Option<&Self> {
        match self.kind() {
            TypeKind::Sequence(element) => Some(element),
            _ => None,
        }
    }

    /// Whether a value of type `other` can be used where `self` is expected.
    #[must_use]
    pub fn is_assignable_from(&self, other: &Self) -> bool {
        if self == other {
            return true;
        }

        match self.kind() {
            TypeKind::Interface(info) => info.is_implemented_by(other),
            _ => false,
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for TypeDescriptor {}

impl PartialOrd for TypeDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for TypeDescriptor {
    #[cfg_attr(test, mutants::skip)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeDescriptor").field(&self.name()).finish()
    }
}

/// Builder for interface descriptors, see [`TypeDescriptor::interface`].
#[derive(Debug)]
pub struct InterfaceBuilder {
    id: TypeId,
    name: &'static str,
    universal: bool,
    implementors: BTreeSet<TypeId>,
}

impl InterfaceBuilder {
    /// Registers `T` as an implementor of the interface.
    #[must_use]
    pub fn implemented_by<T: ?Sized + 'static>(mut self) -> Self {
        self.implementors.insert(TypeId::of::<T>());
        self
    }

    /// Makes every type satisfy the interface.
    #[must_use]
    pub fn universal(mut self) -> Self {
        self.universal = true;
        self
    }

    /// Finishes the descriptor.
    #[must_use]
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::from_parts(
            self.id,
            self.name,
            TypeKind::Interface(InterfaceInfo {
                universal: self.universal,
                implementors: self.implementors,
            }),
        )
    }
}

/// Builder for struct descriptors, see [`TypeDescriptor::structure`].
///
/// # Examples
///
/// ```
/// use wireup::{Reflect, TypeDescriptor};
///
/// #[derive(Clone)]
/// struct Settings {
///     port: u16,
///     hosts: Vec<String>,
/// }
///
/// impl Reflect for Settings {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::structure::<Self>()
///             .field::<u16>("port")
///             .field::<Vec<String>>("hosts")
///             .construct(|fields| {
///                 Ok(Settings {
///                     port: fields.take()?,
///                     hosts: fields.take()?,
///                 })
///             })
///     }
/// }
///
/// let info = TypeDescriptor::of::<Settings>().struct_info().cloned().unwrap();
/// assert_eq!(info.fields().len(), 2);
/// assert!(info.constructor().is_some());
/// ```
#[derive(Debug)]
pub struct StructBuilder<T> {
    fields: Vec<StructField>,
    _type: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> StructBuilder<T> {
    /// Appends a field of type `F`.
    #[must_use]
    pub fn field<F: Reflect + ?Sized>(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.fields.push(StructField {
            name: name.into(),
            ty: TypeDescriptor::of::<F>(),
        });
        self
    }

    /// Finishes a descriptor without a constructor.
    ///
    /// Struct providers of such types fail validation, but the layout is still available.
    #[must_use]
    pub fn build(self) -> TypeDescriptor {
        self.finish(None)
    }

    /// Finishes the descriptor with a constructor that consumes field values in declaration order.
    #[must_use]
    pub fn construct<C>(self, constructor: C) -> TypeDescriptor
    where
        C: Fn(&mut Arguments<'_>) -> Result<T, CallError> + Send + Sync + 'static,
    {
        let params: Vec<_> = self.fields.iter().map(|field| field.ty.clone()).collect();
        // The struct's own descriptor is still being built, an opaque stand-in has the same identity.
        let results = vec![TypeDescriptor::opaque::<T>()];
        let ty = callable::func_descriptor(TypeId::of::<C>(), params, results);
        let expected = self.fields.len();

        let callable = Callable::from_raw(ty, move |args| {
            let mut arguments = Arguments::new(args, expected)?;
            let built = constructor(&mut arguments)?;
            Ok(vec![Arc::new(built) as Value])
        });

        self.finish(Some(callable))
    }

    fn finish(self, constructor: Option<Callable>) -> TypeDescriptor {
        TypeDescriptor::from_parts(
            TypeId::of::<T>(),
            std::any::type_name::<T>(),
            TypeKind::Struct(StructInfo {
                fields: self.fields,
                constructor,
            }),
        )
    }
}

/// Implements [`Reflect`] for types without further structure.
///
/// ```
/// struct Cache;
/// struct Metrics;
///
/// wireup::reflect_opaque!(Cache, Metrics);
///
/// assert_ne!(wireup::TypeDescriptor::of::<Cache>(), wireup::TypeDescriptor::of::<Metrics>());
/// ```
#[macro_export]
macro_rules! reflect_opaque {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Reflect for $ty {
                fn descriptor() -> $crate::TypeDescriptor {
                    $crate::TypeDescriptor::opaque::<Self>()
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;

    enum Engine {}
    enum Wheel {}
    trait Part {}

    crate::reflect_opaque!(Engine, Wheel);

    impl Reflect for dyn Part {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::interface::<Self>().implemented_by::<Engine>().build()
        }
    }

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(TypeDescriptor: Send, Sync, Clone);
    }

    #[test]
    fn descriptors_compare_by_type() {
        assert_eq!(TypeDescriptor::of::<i32>(), TypeDescriptor::of::<i32>());
        assert_eq!(TypeDescriptor::of::<Engine>(), TypeDescriptor::opaque::<Engine>());
        assert_ne!(TypeDescriptor::of::<i32>(), TypeDescriptor::of::<i64>());
        assert_ne!(TypeDescriptor::of::<Engine>(), TypeDescriptor::of::<Wheel>());
    }

    #[test]
    fn kinds_of_std_types() {
        assert!(matches!(TypeDescriptor::of::<bool>().kind(), TypeKind::Bool));
        assert!(matches!(TypeDescriptor::of::<i8>().kind(), TypeKind::Int));
        assert!(matches!(TypeDescriptor::of::<usize>().kind(), TypeKind::Uint));
        assert!(matches!(TypeDescriptor::of::<f64>().kind(), TypeKind::Float));
        assert!(matches!(TypeDescriptor::of::<char>().kind(), TypeKind::Char));
        assert!(matches!(TypeDescriptor::of::<String>().kind(), TypeKind::String));
        assert!(matches!(TypeDescriptor::of::<Box<Engine>>().kind(), TypeKind::Pointer(_)));
        assert!(matches!(TypeDescriptor::of::<Arc<dyn Part>>().kind(), TypeKind::Pointer(_)));
        assert!(matches!(TypeDescriptor::of::<Option<u8>>().kind(), TypeKind::Optional(_)));
        assert!(matches!(TypeDescriptor::of::<HashMap<String, i32>>().kind(), TypeKind::Map { .. }));
    }

    #[test]
    fn sequence_element() {
        let descriptor = TypeDescriptor::of::<Vec<i32>>();
        assert_eq!(descriptor.element(), Some(&TypeDescriptor::of::<i32>()));
        assert_eq!(TypeDescriptor::of::<i32>().element(), None);
    }

    #[test]
    fn interface_assignability() {
        let part = TypeDescriptor::of::<dyn Part>();

        assert!(part.is_assignable_from(&TypeDescriptor::of::<Engine>()));
        assert!(part.is_assignable_from(&TypeDescriptor::of::<Box<Engine>>()));
        assert!(part.is_assignable_from(&part));
        assert!(!part.is_assignable_from(&TypeDescriptor::of::<Wheel>()));
        assert!(!TypeDescriptor::of::<Engine>().is_assignable_from(&part));
    }

    #[test]
    fn any_is_universal() {
        let any = TypeDescriptor::of::<dyn Any + Send + Sync>();

        assert!(any.is_assignable_from(&TypeDescriptor::of::<Wheel>()));
        assert!(any.is_assignable_from(&TypeDescriptor::of::<Vec<String>>()));
    }

    #[test]
    fn signature_error_slot() {
        let error = TypeDescriptor::error();
        let int = TypeDescriptor::of::<i32>();

        let fallible = FuncSignature::new(vec![], vec![int.clone(), error.clone()]);
        assert_eq!(fallible.error_slot(), Some(1));
        assert_eq!(fallible.valid_results(), &[int.clone()]);

        let infallible = FuncSignature::new(vec![int.clone()], vec![int.clone()]);
        assert_eq!(infallible.error_slot(), None);
        assert_eq!(infallible.valid_results().len(), 1);
        assert_eq!(infallible.arity(), 1);

        let only_error = FuncSignature::new(vec![], vec![error]);
        assert!(only_error.valid_results().is_empty());
    }

    #[test]
    fn self_referential_struct() {
        #[derive(Clone)]
        struct Menu {
            title: String,
            items: Vec<Menu>,
        }

        impl Reflect for Menu {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::structure::<Self>()
                    .field::<String>("title")
                    .field::<Vec<Menu>>("items")
                    .construct(|fields| {
                        Ok(Menu {
                            title: fields.take()?,
                            items: fields.take()?,
                        })
                    })
            }
        }

        let menu = TypeDescriptor::of::<Menu>();
        let info = menu.struct_info().unwrap();
        let items = info.field("items").map(|(_, field)| field.ty().clone()).unwrap();

        assert_eq!(items.element(), Some(&menu));
        assert!(TypeDescriptor::of::<Menu>().struct_info().is_some());
        assert_eq!(TypeDescriptor::of::<Vec<Menu>>(), items);

        let args: Vec<Value> = vec![Arc::new("root".to_string()), Arc::new(Vec::<Menu>::new())];
        let built = info.constructor().unwrap().call(&args).unwrap();
        let root = built[0].downcast_ref::<Menu>().unwrap();
        assert_eq!(root.title, "root");
        assert!(root.items.is_empty());
    }

    #[test]
    fn struct_layout() {
        #[derive(Clone)]
        struct Pair {
            left: i32,
            right: String,
        }

        impl Reflect for Pair {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::structure::<Self>()
                    .field::<i32>("left")
                    .field::<String>("right")
                    .construct(|fields| {
                        Ok(Pair {
                            left: fields.take()?,
                            right: fields.take()?,
                        })
                    })
            }
        }

        let descriptor = TypeDescriptor::of::<Pair>();
        let info = descriptor.struct_info().unwrap();
        assert_eq!(info.field("right").map(|(index, _)| index), Some(1));
        assert!(info.field("middle").is_none());

        let constructor = info.constructor().unwrap();
        let args: Vec<Value> = vec![Arc::new(7_i32), Arc::new("seven".to_string())];
        let built = constructor.call(&args).unwrap();
        let pair = built[0].downcast_ref::<Pair>().unwrap();
        assert_eq!(pair.left, 7);
        assert_eq!(pair.right, "seven");

        assert!(constructor.call(&args[..1]).is_err());
    }
}
