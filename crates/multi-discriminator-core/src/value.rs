//! Dynamic values: the currency passed between the mapper and type
//! descriptors.

use std::any::{type_name, Any};
use std::collections::VecDeque;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::MapError;

/// A mapped value of some statically unknown type, or the representation of
/// absence.
///
/// Descriptors receive their arguments as `DynValue`s and hand back the value
/// they built the same way; the mapper never inspects the payload beyond its
/// concrete type.
pub struct DynValue {
    value: Option<Box<dyn Any>>,
    type_name: &'static str,
}

impl DynValue {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: Some(Box::new(value)),
            type_name: type_name::<T>(),
        }
    }

    /// The representation of absence for slots that are not `Option`.
    pub fn absent() -> Self {
        Self {
            value: None,
            type_name: "absent",
        }
    }

    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    /// Type name of the payload, or `"absent"`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.as_ref().is_some_and(|v| v.is::<T>())
    }

    /// Take the payload as a `T`. Absence and a payload of another type both
    /// fail.
    pub fn take<T: Any>(self) -> Result<T, MapError> {
        self.optional()?.ok_or(MapError::DescriptorMismatch {
            expected: type_name::<T>(),
            found: "absent",
        })
    }

    /// Take the payload as a `T`, mapping absence to `None`.
    pub fn optional<T: Any>(self) -> Result<Option<T>, MapError> {
        let found = self.type_name;
        match self.value {
            None => Ok(None),
            Some(boxed) => boxed
                .downcast::<T>()
                .map(|v| Some(*v))
                .map_err(|_| MapError::DescriptorMismatch {
                    expected: type_name::<T>(),
                    found,
                }),
        }
    }

    /// Take the payload as a `T`, mapping absence to `T::default()`.
    pub fn take_or_default<T: Any + Default>(self) -> Result<T, MapError> {
        Ok(self.optional()?.unwrap_or_default())
    }

    /// Borrow the payload mutably as a `T`.
    pub fn downcast_mut<T: Any>(&mut self) -> Result<&mut T, MapError> {
        let found = self.type_name;
        self.value
            .as_mut()
            .and_then(|v| v.downcast_mut::<T>())
            .ok_or(MapError::DescriptorMismatch {
                expected: type_name::<T>(),
                found,
            })
    }

    /// Move the payload out as a `T`, leaving absence behind.
    pub fn replace_with<T: Any>(
        &mut self,
        f: impl FnOnce(T) -> Result<T, MapError>,
    ) -> Result<(), MapError> {
        let taken = std::mem::replace(self, DynValue::absent());
        *self = DynValue::new(f(taken.take::<T>()?)?);
        Ok(())
    }
}

impl fmt::Debug for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynValue")
            .field("type_name", &self.type_name)
            .field("absent", &self.is_absent())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Creator arguments
// ---------------------------------------------------------------------------

/// Ordered arguments handed to a constructor, factory or method.
#[derive(Debug, Default)]
pub struct Args {
    values: VecDeque<DynValue>,
}

impl Args {
    pub fn new(values: Vec<DynValue>) -> Self {
        Self {
            values: values.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Next positional argument, as-is.
    pub fn next_value(&mut self) -> Result<DynValue, MapError> {
        self.values.pop_front().ok_or(MapError::DescriptorMismatch {
            expected: "argument",
            found: "no argument",
        })
    }

    pub fn take<T: Any>(&mut self) -> Result<T, MapError> {
        self.next_value()?.take()
    }

    pub fn optional<T: Any>(&mut self) -> Result<Option<T>, MapError> {
        self.next_value()?.optional()
    }

    pub fn take_or_default<T: Any + Default>(&mut self) -> Result<T, MapError> {
        self.next_value()?.take_or_default()
    }
}

impl From<Vec<DynValue>> for Args {
    fn from(values: Vec<DynValue>) -> Self {
        Self::new(values)
    }
}

// ---------------------------------------------------------------------------
// Generic values
// ---------------------------------------------------------------------------

/// Ordered generic value produced for targets that accept anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Untyped {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    List(Vec<Untyped>),
    Map(IndexMap<String, Untyped>),
}

impl Untyped {
    pub fn is_null(&self) -> bool {
        matches!(self, Untyped::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Untyped::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Untyped> {
        match self {
            Untyped::Map(map) => map.get(key),
            _ => None,
        }
    }
}
