//! The value mapper: recursive dispatch from (node, target type) to value.
//!
//! ## Dispatch order
//!
//! 1. Depth guard
//! 2. Null node → absence (or a primitive error)
//! 3. Passthrough, optional, map, array, sequence/set shapes
//! 4. Discriminator resolution for polymorphic types
//! 5. Aggregates (strategy selection + property binding)
//! 6. Generic values, then plain scalars

mod binder;
mod collections;
mod instantiate;
mod scalar;
mod strategy;

use serde_json::Value;

use crate::config::MapperOptions;
use crate::error::MapError;
use crate::metadata::{Reflect, Shape, TypeInfo, TypeRef};
use crate::node::{display_path, without_keys};
use crate::provider::{Introspector, MetadataProvider};
use crate::resolver::{ResolvedType, TypeResolver};
use crate::value::{DynValue, Untyped};

pub use strategy::StrategyKind;

/// Maps JSON trees onto described Rust types.
///
/// Holds only configuration and the metadata provider; every call builds its
/// own transient state, so one mapper can serve concurrent callers.
pub struct Mapper<P = Introspector> {
    provider: P,
    options: MapperOptions,
}

impl Mapper<Introspector> {
    pub fn new() -> Self {
        Self::with_options(MapperOptions::default())
    }

    pub fn with_options(options: MapperOptions) -> Self {
        Self::with_provider(Introspector::new(), options)
    }
}

impl Default for Mapper<Introspector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: MetadataProvider> Mapper<P> {
    pub fn with_provider(provider: P, options: MapperOptions) -> Self {
        Self { provider, options }
    }

    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Map `node` onto `T`.
    ///
    /// A top-level result that is absent (e.g. a `null` document mapped onto
    /// a non-`Option` type) is an error.
    pub fn map<T: Reflect>(&self, node: &Value) -> Result<T, MapError> {
        let ty = TypeRef::of::<T>();
        let value = self.map_dynamic(node, ty)?;
        if value.is_absent() {
            return Err(MapError::AbsentResult {
                path: display_path(""),
                type_name: ty.name().to_string(),
            });
        }
        value.take::<T>()
    }

    /// Parse `text` as JSON and map it onto `T`.
    pub fn map_str<T: Reflect>(&self, text: &str) -> Result<T, MapError> {
        let node: Value = serde_json::from_str(text)?;
        self.map(&node)
    }

    /// Map `node` onto the type behind `ty`, returning the untyped result.
    pub fn map_dynamic(&self, node: &Value, ty: TypeRef) -> Result<DynValue, MapError> {
        self.walker().map_node(node, ty, "", 0)
    }

    /// Resolve the concrete type `node` selects under `ty`, without mapping.
    pub fn resolve(&self, node: &Value, ty: TypeRef) -> Result<ResolvedType, MapError> {
        TypeResolver::new(&self.provider).resolve(node, ty, "")
    }

    /// The instantiation strategy an aggregate type would use.
    pub fn strategy_of(&self, ty: TypeRef) -> Result<Option<StrategyKind>, MapError> {
        match self.provider.aggregate_of(ty) {
            Some(def) => Ok(Some(strategy::select(&self.provider, ty, &def)?.kind())),
            None => Ok(None),
        }
    }

    fn walker(&self) -> Walker<'_> {
        Walker {
            provider: &self.provider,
            options: &self.options,
        }
    }
}

/// Per-call view of the mapper shared by the dispatch, binding and
/// instantiation code.
#[derive(Clone, Copy)]
pub(crate) struct Walker<'a> {
    provider: &'a dyn MetadataProvider,
    options: &'a MapperOptions,
}

impl<'a> Walker<'a> {
    pub(crate) fn map_node(
        &self,
        node: &Value,
        ty: TypeRef,
        path: &str,
        depth: usize,
    ) -> Result<DynValue, MapError> {
        self.check_depth(path, depth)?;
        let info = self.provider.describe(ty);

        tracing::trace!(
            path = %display_path(path),
            target = ty.name(),
            shape = info.shape.label(),
            "mapping node"
        );

        if node.is_null() {
            return self.absence(&info.shape, ty, path);
        }
        self.map_described(node, ty, info, true, path, depth)
    }

    fn map_described(
        &self,
        node: &Value,
        ty: TypeRef,
        info: TypeInfo,
        resolve: bool,
        path: &str,
        depth: usize,
    ) -> Result<DynValue, MapError> {
        let requires_resolution = info.requires_resolution();
        match info.shape {
            Shape::Passthrough => Ok(DynValue::new(node.clone())),
            Shape::Optional(def) => {
                let inner = self.map_node(node, def.inner, path, depth)?;
                (def.some)(inner)
            }
            Shape::Map(def) => self.map_map(node, ty, &def, path, depth),
            Shape::Array(def) => self.map_array(node, ty, &def, path, depth),
            Shape::Sequence(def) | Shape::Set(def) => {
                self.map_collection(node, ty, &def, path, depth)
            }
            _ if resolve && requires_resolution => self.map_polymorphic(node, ty, path, depth),
            Shape::Aggregate(def) => self.map_aggregate(node, ty, &def, path, depth),
            Shape::Polymorphic => Err(MapError::NoSuitableConstructor {
                type_name: ty.name().to_string(),
            }),
            Shape::Any => Ok(DynValue::new(self.map_untyped(node, path, depth)?)),
            Shape::Scalar(kind) => {
                scalar::convert_scalar(node, kind, self.options.coerce_scalars, path)
            }
        }
    }

    /// Resolve, strip, map the concrete type, then lift it back to `base`.
    fn map_polymorphic(
        &self,
        node: &Value,
        base: TypeRef,
        path: &str,
        depth: usize,
    ) -> Result<DynValue, MapError> {
        let resolved = TypeResolver::new(self.provider).resolve(node, base, path)?;
        let sanitized = without_keys(node, &resolved.strip);
        let concrete = resolved.concrete;
        let info = self.provider.describe(concrete);
        // The resolver already walked every level; mapping the concrete type
        // must not resolve it again.
        let value = self.map_described(&sanitized, concrete, info, false, path, depth + 1)?;
        resolved.upcast(value)
    }

    /// The representation of absence for a slot of shape `shape`.
    pub(crate) fn absence(
        &self,
        shape: &Shape,
        ty: TypeRef,
        path: &str,
    ) -> Result<DynValue, MapError> {
        match shape {
            _ if shape.is_primitive() => Err(MapError::MissingPrimitive {
                path: display_path(path),
                type_name: ty.name().to_string(),
            }),
            Shape::Optional(def) => Ok((def.none)()),
            Shape::Any => Ok(DynValue::new(Untyped::Null)),
            Shape::Passthrough => Ok(DynValue::new(Value::Null)),
            _ => Ok(DynValue::absent()),
        }
    }

    fn check_depth(&self, path: &str, depth: usize) -> Result<(), MapError> {
        if depth > self.options.max_depth {
            return Err(MapError::RecursionDepthExceeded {
                path: display_path(path),
                max_depth: self.options.max_depth,
            });
        }
        Ok(())
    }
}
