//! Error types for tree-to-object mapping.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed failure raised by a descriptor callback (constructor, factory,
/// setter, build method).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Stable, machine-readable error codes.
///
/// Variant names and their serialized `snake_case` strings are part of the
/// public contract and must not change across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCode {
    /// Raw text could not be parsed into a tree.
    JsonParseError,
    /// Node shape disagrees with the target shape.
    StructuralMismatch,
    /// Discriminator property absent or null, and no default subtype.
    MissingDiscriminator,
    /// Discriminator property present but empty, and no default subtype.
    EmptyDiscriminator,
    /// Discriminator value names no known subtype, and no default subtype.
    UnknownSubtype,
    /// Polymorphic type without discriminator metadata.
    MissingTypeMetadata,
    /// More than one creator competes for the same role.
    AmbiguousCreator,
    /// More than one builder candidate on the same discovery channel.
    AmbiguousBuilder,
    /// No constructor, factory, builder or record definition applies.
    NoSuitableConstructor,
    /// A creator is declared in a shape that cannot be used.
    InvalidCreator,
    /// A creator parameter has neither a rename nor a preserved name.
    MissingParameterName,
    /// An explicitly named builder has no usable build method.
    MissingBuildMethod,
    /// Missing or null value for a primitive-like slot.
    MissingPrimitive,
    /// Missing value for a non-null slot.
    MissingValue,
    /// Explicit null for a non-null slot.
    NullValue,
    /// Null element inside a collection whose element type cannot hold it.
    NullElement,
    /// Mapping produced no value where one is required.
    AbsentResult,
    /// Scalar node cannot be converted to the target scalar kind.
    InvalidScalar,
    /// Object key cannot be converted to the map key type.
    InvalidKey,
    /// Fixed-length array target received a different number of elements.
    ArrayLength,
    /// A construction step failed.
    InstantiationError,
    /// A setter, fluent method or field assignment failed.
    BindingError,
    /// A descriptor produced a value of an unexpected type.
    DescriptorMismatch,
    /// Maximum mapping depth exceeded.
    RecursionDepthExceeded,
}

/// The role a slot plays inside an aggregate, used in value errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Property,
    BuilderProperty,
    ConstructorParameter,
    FactoryParameter,
    DelegatingParameter,
    RecordComponent,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SlotKind::Property => "property",
            SlotKind::BuilderProperty => "builder property",
            SlotKind::ConstructorParameter => "constructor parameter",
            SlotKind::FactoryParameter => "factory parameter",
            SlotKind::DelegatingParameter => "delegating parameter",
            SlotKind::RecordComponent => "record component",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MapError {
    #[error("JSON (de)serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected {expected} for {type_name} at '{path}', found {found}")]
    StructuralMismatch {
        path: String,
        type_name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Missing discriminator property '{property}' for {type_name} at '{path}'")]
    MissingDiscriminator {
        path: String,
        type_name: String,
        property: String,
    },

    #[error("Empty discriminator property '{property}' for {type_name} at '{path}'")]
    EmptyDiscriminator {
        path: String,
        type_name: String,
        property: String,
    },

    #[error("Unknown subtype '{value}' in discriminator property '{property}' for {type_name} at '{path}'")]
    UnknownSubtype {
        path: String,
        type_name: String,
        property: String,
        value: String,
    },

    #[error("Missing discriminator metadata for polymorphic type {type_name} at '{path}'")]
    MissingTypeMetadata { path: String, type_name: String },

    #[error("Ambiguous creators for {type_name}: {detail}")]
    AmbiguousCreator {
        type_name: String,
        detail: &'static str,
    },

    #[error("Ambiguous builders for {type_name}: {detail}")]
    AmbiguousBuilder {
        type_name: String,
        detail: &'static str,
    },

    #[error("No suitable constructor for {type_name}")]
    NoSuitableConstructor { type_name: String },

    #[error("Invalid creator for {type_name}: {detail}")]
    InvalidCreator { type_name: String, detail: String },

    #[error("Missing name for parameter {index} of {type_name}")]
    MissingParameterName { type_name: String, index: usize },

    #[error("Missing build method '{method}' for builder {builder}")]
    MissingBuildMethod { builder: String, method: String },

    #[error("Missing value for primitive {type_name} at '{path}'")]
    MissingPrimitive { path: String, type_name: String },

    #[error("Missing value for non-null {slot} '{member}' of {owner} at '{path}'")]
    MissingValue {
        path: String,
        owner: String,
        member: String,
        slot: SlotKind,
    },

    #[error("Null value for non-null {slot} '{member}' of {owner} at '{path}'")]
    NullValue {
        path: String,
        owner: String,
        member: String,
        slot: SlotKind,
    },

    #[error("Null element for {type_name} at '{path}'")]
    NullElement { path: String, type_name: String },

    #[error("Mapping {type_name} at '{path}' produced no value")]
    AbsentResult { path: String, type_name: String },

    #[error("Cannot convert {found} to {expected} at '{path}'")]
    InvalidScalar {
        path: String,
        expected: &'static str,
        found: String,
    },

    #[error("Unable to map key '{key}' to {type_name} at '{path}'")]
    InvalidKey {
        path: String,
        key: String,
        type_name: String,
    },

    #[error("Expected {expected} elements for {type_name} at '{path}', found {found}")]
    ArrayLength {
        path: String,
        type_name: String,
        expected: usize,
        found: usize,
    },

    #[error("Failed to construct {type_name}: {source}")]
    Instantiation {
        type_name: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to bind {slot} '{member}' of {owner} at '{path}': {source}")]
    Binding {
        path: String,
        owner: String,
        member: String,
        slot: SlotKind,
        #[source]
        source: BoxError,
    },

    #[error("Descriptor produced {found} where {expected} was expected")]
    DescriptorMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Recursion depth exceeded at '{path}' (max: {max_depth})")]
    RecursionDepthExceeded { path: String, max_depth: usize },
}

impl MapError {
    /// Wrap a failing construction step with the identity of the type being
    /// built.
    pub(crate) fn instantiation(type_name: &str, source: BoxError) -> Self {
        MapError::Instantiation {
            type_name: type_name.to_string(),
            source,
        }
    }

    /// Returns the stable error code for this error variant.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            MapError::Json(_) => ErrorCode::JsonParseError,
            MapError::StructuralMismatch { .. } => ErrorCode::StructuralMismatch,
            MapError::MissingDiscriminator { .. } => ErrorCode::MissingDiscriminator,
            MapError::EmptyDiscriminator { .. } => ErrorCode::EmptyDiscriminator,
            MapError::UnknownSubtype { .. } => ErrorCode::UnknownSubtype,
            MapError::MissingTypeMetadata { .. } => ErrorCode::MissingTypeMetadata,
            MapError::AmbiguousCreator { .. } => ErrorCode::AmbiguousCreator,
            MapError::AmbiguousBuilder { .. } => ErrorCode::AmbiguousBuilder,
            MapError::NoSuitableConstructor { .. } => ErrorCode::NoSuitableConstructor,
            MapError::InvalidCreator { .. } => ErrorCode::InvalidCreator,
            MapError::MissingParameterName { .. } => ErrorCode::MissingParameterName,
            MapError::MissingBuildMethod { .. } => ErrorCode::MissingBuildMethod,
            MapError::MissingPrimitive { .. } => ErrorCode::MissingPrimitive,
            MapError::MissingValue { .. } => ErrorCode::MissingValue,
            MapError::NullValue { .. } => ErrorCode::NullValue,
            MapError::NullElement { .. } => ErrorCode::NullElement,
            MapError::AbsentResult { .. } => ErrorCode::AbsentResult,
            MapError::InvalidScalar { .. } => ErrorCode::InvalidScalar,
            MapError::InvalidKey { .. } => ErrorCode::InvalidKey,
            MapError::ArrayLength { .. } => ErrorCode::ArrayLength,
            MapError::Instantiation { .. } => ErrorCode::InstantiationError,
            MapError::Binding { .. } => ErrorCode::BindingError,
            MapError::DescriptorMismatch { .. } => ErrorCode::DescriptorMismatch,
            MapError::RecursionDepthExceeded { .. } => ErrorCode::RecursionDepthExceeded,
        }
    }

    /// Returns the JSON Pointer of the failing node, if available.
    ///
    /// Returns `None` for errors raised while inspecting type metadata, which
    /// do not depend on a particular node.
    pub fn path(&self) -> Option<&str> {
        match self {
            MapError::StructuralMismatch { path, .. }
            | MapError::MissingDiscriminator { path, .. }
            | MapError::EmptyDiscriminator { path, .. }
            | MapError::UnknownSubtype { path, .. }
            | MapError::MissingTypeMetadata { path, .. }
            | MapError::MissingPrimitive { path, .. }
            | MapError::MissingValue { path, .. }
            | MapError::NullValue { path, .. }
            | MapError::NullElement { path, .. }
            | MapError::AbsentResult { path, .. }
            | MapError::InvalidScalar { path, .. }
            | MapError::InvalidKey { path, .. }
            | MapError::ArrayLength { path, .. }
            | MapError::Binding { path, .. }
            | MapError::RecursionDepthExceeded { path, .. } => Some(path),
            MapError::Json(_)
            | MapError::AmbiguousCreator { .. }
            | MapError::AmbiguousBuilder { .. }
            | MapError::NoSuitableConstructor { .. }
            | MapError::InvalidCreator { .. }
            | MapError::MissingParameterName { .. }
            | MapError::MissingBuildMethod { .. }
            | MapError::Instantiation { .. }
            | MapError::DescriptorMismatch { .. } => None,
        }
    }

    /// Returns the discriminator property involved, for discriminator errors.
    pub fn discriminator(&self) -> Option<&str> {
        match self {
            MapError::MissingDiscriminator { property, .. }
            | MapError::EmptyDiscriminator { property, .. }
            | MapError::UnknownSubtype { property, .. } => Some(property),
            _ => None,
        }
    }

    /// Produces a structured JSON error.
    ///
    /// Format: `{"code": "...", "message": "...", "path": "..." | null}`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
            "path": self.path(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_code_serializes_snake_case() {
        let json = serde_json::to_value(ErrorCode::MissingDiscriminator).unwrap();
        assert_eq!(json, json!("missing_discriminator"));
        let json = serde_json::to_value(ErrorCode::InstantiationError).unwrap();
        assert_eq!(json, json!("instantiation_error"));
    }

    #[test]
    fn test_error_code_round_trips() {
        let json_str = serde_json::to_string(&ErrorCode::AmbiguousBuilder).unwrap();
        let deserialized: ErrorCode = serde_json::from_str(&json_str).unwrap();
        assert_eq!(deserialized, ErrorCode::AmbiguousBuilder);
    }

    #[test]
    fn test_missing_discriminator_to_json() {
        let err = MapError::MissingDiscriminator {
            path: "/moves/0".to_string(),
            type_name: "Move".to_string(),
            property: "move".to_string(),
        };
        let json = err.to_json();
        assert_eq!(json["code"], json!("missing_discriminator"));
        assert_eq!(json["path"], json!("/moves/0"));
        assert!(json["message"].as_str().unwrap().contains("'move'"));
        assert_eq!(err.discriminator(), Some("move"));
    }

    #[test]
    fn test_metadata_errors_have_no_path() {
        let err = MapError::AmbiguousBuilder {
            type_name: "Pet".to_string(),
            detail: "multiple builder factory methods",
        };
        assert_eq!(err.path(), None);
        assert_eq!(err.to_json()["path"], json!(null));
    }

    #[test]
    fn test_instantiation_keeps_source() {
        use std::error::Error as _;

        let cause: BoxError = "boom".into();
        let err = MapError::instantiation("Pet", cause);
        assert_eq!(err.error_code(), ErrorCode::InstantiationError);
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".to_string()));
    }

    #[test]
    fn test_slot_kind_display() {
        let err = MapError::NullValue {
            path: "/note".to_string(),
            owner: "Pet".to_string(),
            member: "note".to_string(),
            slot: SlotKind::RecordComponent,
        };
        assert_eq!(
            err.to_string(),
            "Null value for non-null record component 'note' of Pet at '/note'"
        );
    }
}
