//! Configuration for the mapper.

use serde::{Deserialize, Serialize};

/// How a slot whose nullability no source declares is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnspecifiedNullability {
    /// Missing or null values fail (default).
    NonNull,
    /// Missing or null values map to the representation of absence.
    Nullable,
}

/// Options chosen once at mapper construction.
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (e.g., `unspecified-nullability`,
/// `max-depth`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MapperOptions {
    /// Policy for slots with no nullability declaration. Default: non-null.
    pub unspecified_nullability: UnspecifiedNullability,
    /// Maximum nesting depth of the mapping walk (stack overflow guard).
    pub max_depth: usize,
    /// Lenient scalar coercion (numbers to strings, numeric strings to
    /// numbers, `"true"`/`"false"` to booleans). Default: enabled.
    pub coerce_scalars: bool,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            unspecified_nullability: UnspecifiedNullability::NonNull,
            max_depth: 128,
            coerce_scalars: true,
        }
    }
}

impl MapperOptions {
    /// Options that treat unannotated slots as nullable.
    pub fn nullable_by_default() -> Self {
        Self {
            unspecified_nullability: UnspecifiedNullability::Nullable,
            ..Self::default()
        }
    }

    pub fn treats_unspecified_as_nullable(&self) -> bool {
        self.unspecified_nullability == UnspecifiedNullability::Nullable
    }
}
