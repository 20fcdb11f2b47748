//! Tree node helpers: JSON Pointer paths and non-destructive key stripping.

use std::borrow::Cow;

use indexmap::IndexSet;
use serde_json::Value;

// ---------------------------------------------------------------------------
// JSON Pointer escaping (RFC 6901)
// ---------------------------------------------------------------------------

/// Escape a single path segment per RFC 6901.
///
/// - `~` → `~0`
/// - `/` → `~1`
///
/// Returns `Cow::Borrowed` when no escaping is needed (the common case).
pub fn escape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') || segment.contains('/') {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Append one escaped segment to a parent JSON Pointer.
///
/// # Example
/// ```
/// use multi_discriminator_core::build_path;
/// assert_eq!(build_path("/moves", "0"), "/moves/0");
/// assert_eq!(build_path("", "a/b"), "/a~1b");
/// ```
pub fn build_path(parent: &str, segment: &str) -> String {
    let escaped = escape_pointer_segment(segment);
    let mut path = String::with_capacity(parent.len() + escaped.len() + 1);
    path.push_str(parent);
    path.push('/');
    path.push_str(&escaped);
    path
}

/// The pointer reported for the root node.
pub(crate) fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

// ---------------------------------------------------------------------------
// Node inspection
// ---------------------------------------------------------------------------

/// Human-readable JSON kind of a node, used in mismatch errors.
pub fn node_kind(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Textual content of a node for discriminator lookup.
///
/// Strings yield their content, numbers and booleans their literal text, and
/// containers or null the empty string.
pub(crate) fn scalar_text(node: &Value) -> Cow<'_, str> {
    match node {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Value::Null | Value::Array(_) | Value::Object(_) => Cow::Borrowed(""),
    }
}

/// Copy of `node` without the given object keys.
///
/// Returns the node borrowed and untouched when it is not an object or none
/// of the keys is present. Key order of the remaining entries is preserved.
pub fn without_keys<'a>(node: &'a Value, keys: &IndexSet<String>) -> Cow<'a, Value> {
    let Some(obj) = node.as_object() else {
        return Cow::Borrowed(node);
    };
    if keys.is_empty() || !keys.iter().any(|k| obj.contains_key(k)) {
        return Cow::Borrowed(node);
    }
    let stripped = obj
        .iter()
        .filter(|(k, _)| !keys.contains(k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Cow::Owned(Value::Object(stripped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape_pointer_segment() {
        assert_eq!(escape_pointer_segment("plain"), "plain");
        assert_eq!(escape_pointer_segment("a/b"), "a~1b");
        assert_eq!(escape_pointer_segment("a~b"), "a~0b");
        assert!(matches!(escape_pointer_segment("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_build_path_nested() {
        let path = build_path(&build_path("", "moves"), "1");
        assert_eq!(path, "/moves/1");
        assert_eq!(display_path(""), "/");
    }

    #[test]
    fn test_without_keys_preserves_order_and_original() {
        let node = json!({"species": "alpaca", "kind": "suri", "color": "gray"});
        let keys: IndexSet<String> = ["species".to_string()].into_iter().collect();

        let stripped = without_keys(&node, &keys);

        let remaining: Vec<&String> = stripped.as_object().unwrap().keys().collect();
        assert_eq!(remaining, vec!["kind", "color"]);
        assert!(node.get("species").is_some());
    }

    #[test]
    fn test_without_keys_borrows_when_nothing_to_strip() {
        let node = json!({"color": "brown"});
        let keys: IndexSet<String> = ["species".to_string()].into_iter().collect();
        assert!(matches!(without_keys(&node, &keys), Cow::Borrowed(_)));

        let scalar = json!(3);
        assert!(matches!(without_keys(&scalar, &keys), Cow::Borrowed(_)));
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("suri")), "suri");
        assert_eq!(scalar_text(&json!(7)), "7");
        assert_eq!(scalar_text(&json!(true)), "true");
        assert_eq!(scalar_text(&json!({"a": 1})), "");
        assert_eq!(scalar_text(&json!(null)), "");
    }

    #[test]
    fn test_node_kind() {
        assert_eq!(node_kind(&json!(1)), "integer");
        assert_eq!(node_kind(&json!(1.5)), "number");
        assert_eq!(node_kind(&json!([])), "array");
    }
}
