//! Descriptors for standard library and ecosystem types.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use super::{
    ArrayDef, CollectionDef, MapDef, OptionalDef, Reflect, ScalarKind, Shape, TypeInfo, TypeRef,
};
use crate::error::MapError;
use crate::value::{DynValue, Untyped};

macro_rules! reflect_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::scalar(ScalarKind::$kind)
                }
            }
        )*
    };
}

reflect_scalar! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
}

impl Reflect for Value {
    fn type_info() -> TypeInfo {
        TypeInfo::new(Shape::Passthrough)
    }
}

impl Reflect for Untyped {
    fn type_info() -> TypeInfo {
        TypeInfo::new(Shape::Any)
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(Shape::Optional(OptionalDef {
            inner: TypeRef::of::<T>(),
            none: || DynValue::new(None::<T>),
            some: |value| Ok(DynValue::new(value.optional::<T>()?)),
        }))
    }
}

// ---------------------------------------------------------------------------
// Sequences, sets and arrays
// ---------------------------------------------------------------------------

fn take_all<T: Any>(items: Vec<DynValue>) -> Result<Vec<T>, MapError> {
    items.into_iter().map(DynValue::take::<T>).collect()
}

fn take_entries<K: Any, V: Any>(
    entries: Vec<(DynValue, DynValue)>,
) -> impl Iterator<Item = Result<(K, V), MapError>> {
    entries
        .into_iter()
        .map(|(key, value)| Ok((key.take::<K>()?, value.take::<V>()?)))
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(Shape::Sequence(CollectionDef {
            element: TypeRef::of::<T>(),
            collect: |items| Ok(DynValue::new(take_all::<T>(items)?)),
        }))
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(Shape::Sequence(CollectionDef {
            element: TypeRef::of::<T>(),
            collect: |items| Ok(DynValue::new(VecDeque::from(take_all::<T>(items)?))),
        }))
    }
}

impl<T: Reflect + Hash + Eq> Reflect for IndexSet<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(Shape::Set(CollectionDef {
            element: TypeRef::of::<T>(),
            collect: |items| {
                let set: IndexSet<T> = take_all::<T>(items)?.into_iter().collect();
                Ok(DynValue::new(set))
            },
        }))
    }
}

impl<T: Reflect + Hash + Eq> Reflect for HashSet<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(Shape::Set(CollectionDef {
            element: TypeRef::of::<T>(),
            collect: |items| {
                let set: HashSet<T> = take_all::<T>(items)?.into_iter().collect();
                Ok(DynValue::new(set))
            },
        }))
    }
}

impl<T: Reflect + Ord> Reflect for BTreeSet<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(Shape::Set(CollectionDef {
            element: TypeRef::of::<T>(),
            collect: |items| {
                let set: BTreeSet<T> = take_all::<T>(items)?.into_iter().collect();
                Ok(DynValue::new(set))
            },
        }))
    }
}

impl<T: Reflect> Reflect for Box<[T]> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(Shape::Array(ArrayDef {
            element: TypeRef::of::<T>(),
            len: None,
            collect: |items| Ok(DynValue::new(take_all::<T>(items)?.into_boxed_slice())),
        }))
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn type_info() -> TypeInfo {
        TypeInfo::new(Shape::Array(ArrayDef {
            element: TypeRef::of::<T>(),
            len: Some(N),
            collect: |items| {
                let array = <[T; N]>::try_from(take_all::<T>(items)?).map_err(|_| {
                    MapError::DescriptorMismatch {
                        expected: std::any::type_name::<[T; N]>(),
                        found: "sequence of another length",
                    }
                })?;
                Ok(DynValue::new(array))
            },
        }))
    }
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

impl<K: Reflect + Hash + Eq, V: Reflect> Reflect for IndexMap<K, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(Shape::Map(MapDef {
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
            sorted: false,
            collect: |entries| {
                let map = take_entries::<K, V>(entries).collect::<Result<IndexMap<K, V>, _>>()?;
                Ok(DynValue::new(map))
            },
        }))
    }
}

impl<K: Reflect + Hash + Eq, V: Reflect> Reflect for HashMap<K, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(Shape::Map(MapDef {
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
            sorted: false,
            collect: |entries| {
                let map = take_entries::<K, V>(entries).collect::<Result<HashMap<K, V>, _>>()?;
                Ok(DynValue::new(map))
            },
        }))
    }
}

impl<K: Reflect + Ord, V: Reflect> Reflect for BTreeMap<K, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::new(Shape::Map(MapDef {
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
            sorted: true,
            collect: |entries| {
                let map = take_entries::<K, V>(entries).collect::<Result<BTreeMap<K, V>, _>>()?;
                Ok(DynValue::new(map))
            },
        }))
    }
}
