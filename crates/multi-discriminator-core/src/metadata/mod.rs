//! Static type descriptors.
//!
//! Every target type describes itself through [`Reflect`]: its [`Shape`], an
//! optional self-declared discriminator name, discriminator configuration and
//! subtypes. Descriptors are plain data plus callbacks; they are rebuilt on
//! each lookup and never mutated.

mod aggregate;
mod impls;
mod polymorphic;

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

pub use aggregate::{
    AggregateDef, BuilderConfig, CallFn, Component, Constructor, CreatorMode, Field, FieldFn,
    InstanceFn, MemberHints, Method, MethodCall, Nullability, Param, RecordDef,
};
pub use polymorphic::{DiscriminatorConfig, Inclusion, Subtype, UpcastFn, DEFAULT_PROPERTY};

use crate::error::MapError;
use crate::value::DynValue;

/// A type that can describe itself to the mapper.
///
/// Implementations play the role of derive-generated descriptors: they are
/// pure functions of the type and must return the same description on every
/// call.
pub trait Reflect: Any {
    fn type_info() -> TypeInfo;
}

/// Copyable handle to a described type. Equality is by [`TypeId`].
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    describe: fn() -> TypeInfo,
}

impl TypeRef {
    pub fn of<T: Reflect>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            describe: T::type_info,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified Rust type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name with generic arguments removed.
    ///
    /// This is the derived default identifier used when a subtype declares no
    /// discriminator name anywhere.
    pub fn short_name(&self) -> &'static str {
        let base = match self.name.find('<') {
            Some(idx) => &self.name[..idx],
            None => self.name,
        };
        base.rsplit("::").next().unwrap_or(base)
    }

    pub fn describe(&self) -> TypeInfo {
        (self.describe)()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ---------------------------------------------------------------------------
// Type descriptions
// ---------------------------------------------------------------------------

/// Full description of one type.
#[derive(Clone)]
pub struct TypeInfo {
    pub shape: Shape,
    /// Discriminator name the type declares for itself.
    pub type_name: Option<String>,
    pub discriminator: Option<DiscriminatorConfig>,
    /// Candidate subtypes, in declaration order.
    pub subtypes: Vec<Subtype>,
}

impl TypeInfo {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            type_name: None,
            discriminator: None,
            subtypes: Vec::new(),
        }
    }

    pub fn scalar(kind: ScalarKind) -> Self {
        Self::new(Shape::Scalar(kind))
    }

    /// An abstract type whose values always come from one of its subtypes.
    pub fn polymorphic(discriminator: DiscriminatorConfig) -> Self {
        Self::new(Shape::Polymorphic).discriminator(discriminator)
    }

    pub fn aggregate(def: AggregateDef) -> Self {
        Self::new(Shape::Aggregate(def))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.type_name = Some(name.into());
        self
    }

    pub fn discriminator(mut self, config: DiscriminatorConfig) -> Self {
        self.discriminator = Some(config);
        self
    }

    pub fn subtype(mut self, subtype: Subtype) -> Self {
        self.subtypes.push(subtype);
        self
    }

    /// Whether a node must pass through discriminator resolution before it
    /// can be mapped onto this type.
    pub fn requires_resolution(&self) -> bool {
        matches!(self.shape, Shape::Polymorphic) || self.discriminator.is_some()
    }
}

/// Structural classification of a type. A pure function of the static type.
#[derive(Clone)]
pub enum Shape {
    Scalar(ScalarKind),
    Optional(OptionalDef),
    Sequence(CollectionDef),
    Set(CollectionDef),
    Array(ArrayDef),
    Map(MapDef),
    Aggregate(AggregateDef),
    Polymorphic,
    /// The raw tree node itself.
    Passthrough,
    /// Any value, mapped structurally onto [`Untyped`](crate::Untyped).
    Any,
}

impl Shape {
    pub fn label(&self) -> &'static str {
        match self {
            Shape::Scalar(kind) => kind.label(),
            Shape::Optional(_) => "optional",
            Shape::Sequence(_) => "sequence",
            Shape::Set(_) => "set",
            Shape::Array(_) => "array",
            Shape::Map(_) => "map",
            Shape::Aggregate(_) => "aggregate",
            Shape::Polymorphic => "polymorphic",
            Shape::Passthrough => "passthrough",
            Shape::Any => "any",
        }
    }

    /// Primitive-like slots can never hold absence.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Shape::Scalar(kind) if kind.is_primitive())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
}

impl ScalarKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Char => "char",
            ScalarKind::String => "string",
        }
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, ScalarKind::String)
    }
}

// ---------------------------------------------------------------------------
// Container definitions
// ---------------------------------------------------------------------------

pub type CollectFn = fn(Vec<DynValue>) -> Result<DynValue, MapError>;
pub type CollectEntriesFn = fn(Vec<(DynValue, DynValue)>) -> Result<DynValue, MapError>;

/// `Option<T>`: absence is `None`.
#[derive(Clone, Copy)]
pub struct OptionalDef {
    pub inner: TypeRef,
    pub none: fn() -> DynValue,
    pub some: fn(DynValue) -> Result<DynValue, MapError>,
}

#[derive(Clone, Copy)]
pub struct CollectionDef {
    pub element: TypeRef,
    pub collect: CollectFn,
}

#[derive(Clone, Copy)]
pub struct ArrayDef {
    pub element: TypeRef,
    /// Required element count, for fixed-size arrays.
    pub len: Option<usize>,
    pub collect: CollectFn,
}

#[derive(Clone, Copy)]
pub struct MapDef {
    pub key: TypeRef,
    pub value: TypeRef,
    pub sorted: bool,
    pub collect: CollectEntriesFn,
}
