// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::any::{Any, TypeId, type_name};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

use super::{Reflect, TypeDescriptor, TypeKind};

/// Identity of the error slot that closes a fallible function's results.
pub(super) enum ErrorSlot {}

impl Reflect for ErrorSlot {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::from_parts(TypeId::of::<Self>(), "error", TypeKind::Error)
    }
}

macro_rules! reflect_scalar {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl Reflect for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::from_parts(TypeId::of::<Self>(), type_name::<Self>(), TypeKind::$kind)
                }
            }
        )+
    };
}

reflect_scalar!(
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    i128 => Int,
    isize => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    u128 => Uint,
    usize => Uint,
    f32 => Float,
    f64 => Float,
    char => Char,
    String => String,
    &'static str => String,
);

macro_rules! reflect_pointer {
    ($($ptr:ident),+) => {
        $(
            impl<T: Reflect + ?Sized> Reflect for $ptr<T> {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::from_parts(
                        TypeId::of::<Self>(),
                        type_name::<Self>(),
                        TypeKind::Pointer(TypeDescriptor::of::<T>()),
                    )
                }
            }
        )+
    };
}

reflect_pointer!(Box, Arc, Rc);

impl<T: Reflect> Reflect for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::from_parts(
            TypeId::of::<Self>(),
            type_name::<Self>(),
            TypeKind::Sequence(TypeDescriptor::of::<T>()),
        )
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::from_parts(
            TypeId::of::<Self>(),
            type_name::<Self>(),
            TypeKind::Optional(TypeDescriptor::of::<T>()),
        )
    }
}

macro_rules! reflect_map {
    ($($map:ident),+) => {
        $(
            impl<K: Reflect, V: Reflect> Reflect for $map<K, V> {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::from_parts(
                        TypeId::of::<Self>(),
                        type_name::<Self>(),
                        TypeKind::Map {
                            key: TypeDescriptor::of::<K>(),
                            value: TypeDescriptor::of::<V>(),
                        },
                    )
                }
            }
        )+
    };
}

reflect_map!(HashMap, BTreeMap);

impl Reflect for dyn Any + Send + Sync {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::interface::<Self>().universal().build()
    }
}
