//! Map dynamically shaped JSON trees onto statically declared Rust types.
//!
//! Target types describe themselves through [`Reflect`]. Polymorphic families
//! declare a discriminator per level, so one object can carry an outer
//! `species` and an inner `kind` that together select a concrete type.
//! Aggregates are built through one of five strategies (delegating creator,
//! builder, tagged creator, sole constructor, default construction plus
//! property binding) and their slots follow explicit nullability rules.
//!
//! ```
//! use multi_discriminator_core::Mapper;
//! use serde_json::json;
//!
//! let mapper = Mapper::new();
//! let values: Vec<Option<i32>> = mapper.map(&json!([1, null, 3])).unwrap();
//! assert_eq!(values, vec![Some(1), None, Some(3)]);
//! ```

pub mod config;
pub mod error;
pub mod mapper;
pub mod metadata;
pub mod node;
pub mod provider;
pub mod resolver;
pub mod value;

pub use config::{MapperOptions, UnspecifiedNullability};
pub use error::{BoxError, ErrorCode, MapError, SlotKind};
pub use mapper::{Mapper, StrategyKind};
pub use metadata::{
    AggregateDef, BuilderConfig, Component, Constructor, CreatorMode, DiscriminatorConfig, Field,
    Inclusion, MemberHints, Method, Nullability, Param, RecordDef, Reflect, ScalarKind, Shape,
    Subtype, TypeInfo, TypeRef, DEFAULT_PROPERTY,
};
pub use node::{build_path, escape_pointer_segment, node_kind, without_keys};
pub use provider::{Introspector, MetadataProvider};
pub use resolver::{ResolvedType, TypeResolver};
pub use value::{Args, DynValue, Untyped};
