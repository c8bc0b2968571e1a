//! Type-aware helpers over field values.
//!
//! Field values are plain `serde_json::Value`s. `Null` is the only absent
//! value; a field missing from a record reads as `Null`.

use std::borrow::Cow;

use serde_json::{Number, Value};

/// Absent-value sentinel for fields a record does not carry.
pub static NULL: Value = Value::Null;

pub fn is_absent(value: &Value) -> bool {
    value.is_null()
}

/// Value equality: numbers compare numerically (`5 == 5.0`), everything
/// else structurally.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Parse a value as an integer.
///
/// Integers parse as themselves, floats only without a fractional part,
/// text when its trimmed form is a base-10 `i64`. Nothing else parses;
/// booleans are not integers.
pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .filter(|f| *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Text coercion used by the similarity fallback.
pub fn to_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Canonical identifier form, used for join keys and label ids.
///
/// `None` for absent or blank values. Integral floats render without a
/// fraction so that `76.0`, `76` and `"76"` all identify the same entity.
pub fn canonical_id(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(_) => Some(match parse_int(value) {
            Some(n) => n.to_string(),
            None => value.to_string(),
        }),
        other => Some(other.to_string()),
    }
}
