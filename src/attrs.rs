//! Lenient reads from a layer's untyped attribute bag.
//!
//! Nothing here fails: absent keys, wrong types and unparseable strings all resolve to the
//! caller's default.

use serde_json::Value;

use crate::model::Attributes;

/// Read `key` as a number.
///
/// Accepts JSON integers, JSON floats and strings that parse as a decimal float.
pub fn number(attrs: &Attributes, key: &str, default: f64) -> f64 {
    match attrs.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.parse::<f64>().unwrap_or(default),
        _ => default,
    }
}

/// Read `key` as a string. Only JSON strings qualify.
pub fn string<'a>(attrs: &'a Attributes, key: &str, default: &'a str) -> &'a str {
    match attrs.get(key) {
        Some(Value::String(s)) => s,
        _ => default,
    }
}

/// Read `key` only when it is a native JSON number; strings do not count.
pub fn native_number(attrs: &Attributes, key: &str) -> Option<f64> {
    attrs.get(key).and_then(Value::as_f64)
}

/// Read `primary`, falling through to `fallback` when `primary` resolves to zero.
pub fn number_or(attrs: &Attributes, primary: &str, fallback: &str, default: f64) -> f64 {
    let v = number(attrs, primary, default);
    if v == 0.0 {
        number(attrs, fallback, default)
    } else {
        v
    }
}
