//! Depth-guarded recursive walk over arbitrary JSON values.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::sanitize::html::{scrub_text, SanitizePolicy};

/// Maximum nesting depth accepted before the walk fails fast.
pub const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("value nesting exceeds {MAX_DEPTH} levels")]
    DepthExceeded,
}

/// Sanitize an arbitrary JSON value, producing a new tree of the same
/// shape with every text leaf scrubbed through the allow-list filter.
///
/// Non-text leaves (numbers, booleans, null) pass through unchanged;
/// sequences keep their order and length; objects keep their exact key
/// set. The transform is pure and idempotent.
pub fn sanitize_value(value: &Value, policy: &SanitizePolicy) -> Result<Value, SanitizeError> {
    walk(value, policy, 0)
}

/// Sanitize an optional value, preserving absence as absence.
pub fn sanitize_optional(
    value: Option<&Value>,
    policy: &SanitizePolicy,
) -> Result<Option<Value>, SanitizeError> {
    value.map(|v| sanitize_value(v, policy)).transpose()
}

fn walk(value: &Value, policy: &SanitizePolicy, depth: usize) -> Result<Value, SanitizeError> {
    if depth > MAX_DEPTH {
        return Err(SanitizeError::DepthExceeded);
    }

    match value {
        Value::String(text) => Ok(Value::String(scrub_text(text, policy))),
        Value::Array(items) => {
            let mut scrubbed = Vec::with_capacity(items.len());
            for item in items {
                scrubbed.push(walk(item, policy, depth + 1)?);
            }
            Ok(Value::Array(scrubbed))
        }
        Value::Object(fields) => {
            let mut scrubbed = Map::new();
            for (key, field) in fields {
                scrubbed.insert(key.clone(), walk(field, policy, depth + 1)?);
            }
            Ok(Value::Object(scrubbed))
        }
        // Numbers, booleans and null have no markup to carry.
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sanitize(value: &Value) -> Value {
        sanitize_value(value, &SanitizePolicy::default()).unwrap()
    }

    #[test]
    fn scrubs_nested_string_leaves() {
        let input = json!({
            "name": "<script>alert(\"xss\")</script>",
            "nested": { "comment": "<img src=x onerror=alert(1)>" },
        });

        let result = sanitize(&input);
        assert_eq!(result["name"], "");
        assert!(!result["nested"]["comment"]
            .as_str()
            .unwrap()
            .contains("onerror"));
    }

    #[test]
    fn clean_values_are_unchanged() {
        let input = json!({ "name": "Normal name", "age": 30, "active": true, "note": null });
        assert_eq!(sanitize(&input), input);
    }

    #[test]
    fn null_maps_to_null_and_absent_to_absent() {
        assert_eq!(sanitize(&Value::Null), Value::Null);

        let policy = SanitizePolicy::default();
        assert_eq!(sanitize_optional(None, &policy).unwrap(), None);
        assert_eq!(
            sanitize_optional(Some(&Value::Null), &policy).unwrap(),
            Some(Value::Null)
        );
    }

    #[test]
    fn sequences_keep_order_and_length() {
        let input = json!(["<b>one</b>", 2, "<i>three</i>", null]);
        let result = sanitize(&input);

        let items = result.as_array().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], "one");
        assert_eq!(items[1], 2);
        assert_eq!(items[2], "three");
        assert_eq!(items[3], Value::Null);
    }

    #[test]
    fn objects_keep_exact_key_set() {
        let input = json!({ "a": "<script>x</script>", "b": 1, "c": { "d": "<p>t</p>" } });
        let result = sanitize(&input);

        let input_keys: Vec<_> = input.as_object().unwrap().keys().collect();
        let result_keys: Vec<_> = result.as_object().unwrap().keys().collect();
        assert_eq!(input_keys, result_keys);
    }

    #[test]
    fn idempotent_on_structures() {
        let input = json!({
            "list": ["<script>a</script>", { "x": "<img onerror=1 src=x>" }],
            "n": 42,
        });
        let once = sanitize(&input);
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn depth_guard_fails_fast() {
        let mut value = json!("leaf");
        for _ in 0..(MAX_DEPTH + 1) {
            value = json!([value]);
        }

        let err = sanitize_value(&value, &SanitizePolicy::default()).unwrap_err();
        assert_eq!(err, SanitizeError::DepthExceeded);
    }

    #[test]
    fn nesting_at_the_limit_is_accepted() {
        let mut value = json!("leaf");
        for _ in 0..MAX_DEPTH {
            value = json!([value]);
        }
        assert!(sanitize_value(&value, &SanitizePolicy::default()).is_ok());
    }
}
