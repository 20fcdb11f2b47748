//! Scalar conversion from tree nodes and object keys.
//!
//! With coercion enabled the conversions are lenient in the same direction as
//! a typical JSON data binder:
//!
//! | Got | Expected | Action |
//! |-----|----------|--------|
//! | number/boolean | string | literal text |
//! | numeric string | integer | parse (validate roundtrip) |
//! | numeric string | float | parse |
//! | `"true"`/`"false"` | bool | parse |
//! | integral float | integer | truncate-free conversion |
//! | one-character string | char | take the character |
//!
//! Strict mode accepts only the matching JSON kind, plus integers for float
//! targets.

use serde_json::Value;

use crate::error::MapError;
use crate::metadata::ScalarKind;
use crate::node::{display_path, node_kind};
use crate::value::{DynValue, Untyped};

/// Convert a non-null scalar node to the native representation of `kind`.
pub(crate) fn convert_scalar(
    node: &Value,
    kind: ScalarKind,
    coerce: bool,
    path: &str,
) -> Result<DynValue, MapError> {
    let invalid = || MapError::InvalidScalar {
        path: display_path(path),
        expected: kind.label(),
        found: node_kind(node).to_string(),
    };

    match kind {
        ScalarKind::Bool => match node {
            Value::Bool(b) => Ok(DynValue::new(*b)),
            Value::String(s) if coerce && s == "true" => Ok(DynValue::new(true)),
            Value::String(s) if coerce && s == "false" => Ok(DynValue::new(false)),
            _ => Err(invalid()),
        },
        ScalarKind::String => match node {
            Value::String(s) => Ok(DynValue::new(s.clone())),
            Value::Number(n) if coerce => Ok(DynValue::new(n.to_string())),
            Value::Bool(b) if coerce => Ok(DynValue::new(b.to_string())),
            _ => Err(invalid()),
        },
        ScalarKind::Char => {
            let text = node.as_str().ok_or_else(invalid)?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(DynValue::new(c)),
                _ => Err(MapError::InvalidScalar {
                    path: display_path(path),
                    expected: kind.label(),
                    found: format!("string of {} characters", text.chars().count()),
                }),
            }
        }
        ScalarKind::F32 => {
            let f = float_of(node, coerce).ok_or_else(invalid)?;
            let narrowed = f as f32;
            if !narrowed.is_finite() {
                return Err(MapError::InvalidScalar {
                    path: display_path(path),
                    expected: kind.label(),
                    found: format!("{f} (out of range)"),
                });
            }
            Ok(DynValue::new(narrowed))
        }
        ScalarKind::F64 => Ok(DynValue::new(float_of(node, coerce).ok_or_else(invalid)?)),
        ScalarKind::I8
        | ScalarKind::I16
        | ScalarKind::I32
        | ScalarKind::I64
        | ScalarKind::U8
        | ScalarKind::U16
        | ScalarKind::U32
        | ScalarKind::U64 => {
            let n = integer_of(node, coerce).ok_or_else(invalid)?;
            narrow(n, kind).ok_or_else(|| MapError::InvalidScalar {
                path: display_path(path),
                expected: kind.label(),
                found: format!("{n} (out of range)"),
            })
        }
    }
}

/// Convert an object key to a map key of the given scalar kind.
pub(crate) fn convert_key(key: &str, kind: ScalarKind, path: &str) -> Result<DynValue, MapError> {
    match kind {
        ScalarKind::String => Ok(DynValue::new(key.to_string())),
        _ => convert_scalar(&Value::String(key.to_string()), kind, true, path).map_err(|_| {
            MapError::InvalidKey {
                path: display_path(path),
                key: key.to_string(),
                type_name: kind.label().to_string(),
            }
        }),
    }
}

fn integer_of(node: &Value, coerce: bool) -> Option<i128> {
    match node {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i128::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(i128::from(u))
            } else {
                let f = n.as_f64()?;
                (coerce && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e38).then_some(f as i128)
            }
        }
        Value::String(s) if coerce => {
            let parsed = s.parse::<i128>().ok()?;
            // Roundtrip check: rejects "+1", "007" and similar
            (parsed.to_string() == *s).then_some(parsed)
        }
        _ => None,
    }
}

fn float_of(node: &Value, coerce: bool) -> Option<f64> {
    match node {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if coerce => s.parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn narrow(n: i128, kind: ScalarKind) -> Option<DynValue> {
    Some(match kind {
        ScalarKind::I8 => DynValue::new(i8::try_from(n).ok()?),
        ScalarKind::I16 => DynValue::new(i16::try_from(n).ok()?),
        ScalarKind::I32 => DynValue::new(i32::try_from(n).ok()?),
        ScalarKind::I64 => DynValue::new(i64::try_from(n).ok()?),
        ScalarKind::U8 => DynValue::new(u8::try_from(n).ok()?),
        ScalarKind::U16 => DynValue::new(u16::try_from(n).ok()?),
        ScalarKind::U32 => DynValue::new(u32::try_from(n).ok()?),
        ScalarKind::U64 => DynValue::new(u64::try_from(n).ok()?),
        _ => return None,
    })
}

/// Structural copy of a node as a generic value.
pub(crate) fn untyped_scalar(node: &Value) -> Option<Untyped> {
    Some(match node {
        Value::Null => Untyped::Null,
        Value::Bool(b) => Untyped::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Untyped::Int(i)
            } else if let Some(u) = n.as_u64() {
                Untyped::UInt(u)
            } else {
                Untyped::Float(n.as_f64()?)
            }
        }
        Value::String(s) => Untyped::String(s.clone()),
        Value::Array(_) | Value::Object(_) => return None,
    })
}
