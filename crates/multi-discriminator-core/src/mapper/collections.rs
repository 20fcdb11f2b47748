//! Maps, arrays, sequences, sets and generic values.

use indexmap::IndexMap;
use serde_json::Value;

use super::scalar::{convert_key, untyped_scalar};
use super::Walker;
use crate::error::MapError;
use crate::metadata::{ArrayDef, CollectionDef, MapDef, Shape, TypeRef};
use crate::node::{build_path, display_path, node_kind};
use crate::value::{DynValue, Untyped};

impl Walker<'_> {
    pub(super) fn map_map(
        &self,
        node: &Value,
        ty: TypeRef,
        def: &MapDef,
        path: &str,
        depth: usize,
    ) -> Result<DynValue, MapError> {
        let obj = node
            .as_object()
            .ok_or_else(|| mismatch(ty, "object", node, path))?;

        let mut entries = Vec::with_capacity(obj.len());
        for (key, child) in obj {
            let child_path = build_path(path, key);
            let key_value = self.map_key(key, def.key, &child_path)?;
            let value = self.map_element(child, def.value, &child_path, depth)?;
            entries.push((key_value, value));
        }
        tracing::trace!(
            path = %display_path(path),
            entries = entries.len(),
            sorted = def.sorted,
            "mapped object entries"
        );
        (def.collect)(entries)
    }

    pub(super) fn map_array(
        &self,
        node: &Value,
        ty: TypeRef,
        def: &ArrayDef,
        path: &str,
        depth: usize,
    ) -> Result<DynValue, MapError> {
        let items = node
            .as_array()
            .ok_or_else(|| mismatch(ty, "array", node, path))?;
        if let Some(expected) = def.len {
            if items.len() != expected {
                return Err(MapError::ArrayLength {
                    path: display_path(path),
                    type_name: ty.name().to_string(),
                    expected,
                    found: items.len(),
                });
            }
        }
        let values = self.map_elements(items, def.element, path, depth)?;
        (def.collect)(values)
    }

    pub(super) fn map_collection(
        &self,
        node: &Value,
        ty: TypeRef,
        def: &CollectionDef,
        path: &str,
        depth: usize,
    ) -> Result<DynValue, MapError> {
        let items = node
            .as_array()
            .ok_or_else(|| mismatch(ty, "array", node, path))?;
        let values = self.map_elements(items, def.element, path, depth)?;
        (def.collect)(values)
    }

    pub(super) fn map_untyped(
        &self,
        node: &Value,
        path: &str,
        depth: usize,
    ) -> Result<Untyped, MapError> {
        self.check_depth(path, depth)?;
        match node {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.map_untyped(item, &build_path(path, &i.to_string()), depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Untyped::List),
            Value::Object(obj) => obj
                .iter()
                .map(|(key, child)| {
                    let child = self.map_untyped(child, &build_path(path, key), depth + 1)?;
                    Ok((key.clone(), child))
                })
                .collect::<Result<IndexMap<_, _>, MapError>>()
                .map(Untyped::Map),
            scalar => untyped_scalar(scalar).ok_or_else(|| MapError::InvalidScalar {
                path: display_path(path),
                expected: "any",
                found: node_kind(scalar).to_string(),
            }),
        }
    }

    fn map_elements(
        &self,
        items: &[Value],
        element: TypeRef,
        path: &str,
        depth: usize,
    ) -> Result<Vec<DynValue>, MapError> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.map_element(item, element, &build_path(path, &i.to_string()), depth))
            .collect()
    }

    /// Map one element or map value; containers cannot hold absence.
    fn map_element(
        &self,
        node: &Value,
        element: TypeRef,
        path: &str,
        depth: usize,
    ) -> Result<DynValue, MapError> {
        let value = self.map_node(node, element, path, depth + 1)?;
        if value.is_absent() {
            return Err(MapError::NullElement {
                path: display_path(path),
                type_name: element.name().to_string(),
            });
        }
        Ok(value)
    }

    fn map_key(&self, key: &str, key_ty: TypeRef, path: &str) -> Result<DynValue, MapError> {
        match self.provider.shape_of(key_ty) {
            Shape::Scalar(kind) => convert_key(key, kind, path),
            Shape::Any => Ok(DynValue::new(Untyped::String(key.to_string()))),
            _ => Err(MapError::InvalidKey {
                path: display_path(path),
                key: key.to_string(),
                type_name: key_ty.name().to_string(),
            }),
        }
    }
}

pub(super) fn mismatch(ty: TypeRef, expected: &'static str, node: &Value, path: &str) -> MapError {
    MapError::StructuralMismatch {
        path: display_path(path),
        type_name: ty.name().to_string(),
        expected,
        found: node_kind(node),
    }
}
