//! Discriminator resolution: walks a polymorphic type down to a concrete one.
//!
//! Each level reads its own discriminator property from the same node, so an
//! outer `species` can select a mid-level abstract type that is itself
//! resolved by an inner `kind`. The resolver only decides types; stripping
//! and mapping are left to the caller.

use indexmap::IndexSet;
use serde_json::Value;

use crate::error::MapError;
use crate::metadata::{Shape, Subtype, TypeRef};
use crate::node::{display_path, node_kind, scalar_text};
use crate::provider::MetadataProvider;
use crate::value::DynValue;

/// Outcome of resolving a node against a polymorphic base type.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    /// The concrete type to map the node onto.
    pub concrete: TypeRef,
    /// Discriminator properties to remove before mapping, in level order.
    pub strip: IndexSet<String>,
    /// Subtypes chosen at each level, outermost first.
    levels: Vec<Subtype>,
}

impl ResolvedType {
    fn unresolved(ty: TypeRef) -> Self {
        Self {
            concrete: ty,
            strip: IndexSet::new(),
            levels: Vec::new(),
        }
    }

    /// Number of discriminator levels walked.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Lift a value of the concrete type back into the base type, innermost
    /// level first.
    pub fn upcast(&self, value: DynValue) -> Result<DynValue, MapError> {
        self.levels
            .iter()
            .rev()
            .try_fold(value, |value, level| level.upcast(value))
    }
}

pub struct TypeResolver<'a> {
    provider: &'a dyn MetadataProvider,
}

impl<'a> TypeResolver<'a> {
    pub fn new(provider: &'a dyn MetadataProvider) -> Self {
        Self { provider }
    }

    pub fn requires_resolution(&self, ty: TypeRef) -> bool {
        self.provider.describe(ty).requires_resolution()
    }

    /// Resolve `node` against `base`, reporting errors at `path`.
    pub fn resolve(
        &self,
        node: &Value,
        base: TypeRef,
        path: &str,
    ) -> Result<ResolvedType, MapError> {
        let mut info = self.provider.describe(base);
        if !info.requires_resolution() {
            return Ok(ResolvedType::unresolved(base));
        }
        if !node.is_object() {
            return Err(MapError::StructuralMismatch {
                path: display_path(path),
                type_name: base.name().to_string(),
                expected: "object",
                found: node_kind(node),
            });
        }

        let mut resolved = ResolvedType::unresolved(base);
        let mut current = base;

        while info.requires_resolution() {
            let Some(config) = info.discriminator.take() else {
                if matches!(info.shape, Shape::Polymorphic) {
                    return Err(MapError::MissingTypeMetadata {
                        path: display_path(path),
                        type_name: current.name().to_string(),
                    });
                }
                break;
            };
            let property = config.property_name().to_string();
            let fallback = config.default_subtype.clone();

            let chosen = match node.get(&property) {
                None | Some(Value::Null) => fallback.ok_or_else(|| MapError::MissingDiscriminator {
                    path: display_path(path),
                    type_name: current.name().to_string(),
                    property: property.clone(),
                })?,
                Some(value) => {
                    let name = scalar_text(value);
                    if name.is_empty() {
                        fallback.ok_or_else(|| MapError::EmptyDiscriminator {
                            path: display_path(path),
                            type_name: current.name().to_string(),
                            property: property.clone(),
                        })?
                    } else {
                        match self.provider.subtype_table_of(current).swap_remove(&*name) {
                            Some(subtype) => subtype,
                            None => fallback.ok_or_else(|| MapError::UnknownSubtype {
                                path: display_path(path),
                                type_name: current.name().to_string(),
                                property: property.clone(),
                                value: name.to_string(),
                            })?,
                        }
                    }
                }
            };

            tracing::debug!(
                path = %display_path(path),
                base = current.name(),
                property = %property,
                subtype = chosen.ty.name(),
                "resolved discriminator level"
            );

            if config.strips() {
                resolved.strip.insert(property);
            }
            // A type naming itself would loop forever.
            if chosen.ty == current {
                break;
            }
            current = chosen.ty;
            resolved.levels.push(chosen);
            info = self.provider.describe(current);
        }

        resolved.concrete = current;
        Ok(resolved)
    }
}
