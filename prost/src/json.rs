//! Canonical JSON codec primitives.
//!
//! `prost-derive` generates the per-field traversal (`to_dict`/`from_dict`
//! on each `#[derive(Message)]` type); this module holds the pure
//! value-conversion and casing helpers that traversal calls into.

use base64::Engine;
use serde_json::Value;

use crate::enumeration::Enumeration;
use crate::error::{DecodeError, DecodeErrorKind};

/// Field-name casing strategy for `to_dict`/`from_dict`. Defaults to
/// camelCase, matching canonical Protobuf JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Casing {
    #[default]
    Camel,
    Snake,
}

/// Options threaded through `to_dict`, as an explicit `Copy` value type
/// rather than a global.
#[derive(Clone, Copy, Debug)]
pub struct JsonConfig {
    pub casing: Casing,
    pub include_default_values: bool,
}

impl Default for JsonConfig {
    fn default() -> JsonConfig {
        JsonConfig {
            casing: Casing::Camel,
            include_default_values: false,
        }
    }
}

/// Converts a `snake_case` declared field name to the configured output
/// casing. Trailing underscores are stripped first, undoing the
/// de-conflicting of names that collide with Rust keywords (e.g. a field
/// literally named `type` is declared as `r#type` or `type_` and
/// serializes as `type`).
pub fn field_name(name: &'static str, casing: Casing) -> String {
    let name = name.strip_suffix('_').unwrap_or(name);
    match casing {
        Casing::Snake => name.to_string(),
        Casing::Camel => to_camel_case(name),
    }
}

fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upcase_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upcase_next = true;
        } else if upcase_next {
            out.extend(ch.to_uppercase());
            upcase_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Coerces an arbitrary JSON object key back to the canonical snake_case
/// field name so `from_dict` can look it up in the schema regardless of
/// which casing produced the document.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.char_indices() {
        if ch.is_uppercase() {
            if i != 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Renders a 64-bit integer scalar as a JSON string, avoiding precision
/// loss in JSON-number-as-f64 parsers.
pub fn int64_to_value(value: i64) -> Value {
    Value::String(value.to_string())
}

pub fn uint64_to_value(value: u64) -> Value {
    Value::String(value.to_string())
}

/// Parses a 64-bit integer scalar from either its canonical string form or
/// (leniently, as real Protobuf JSON parsers do) a bare JSON number.
pub fn value_to_int64(value: &Value) -> Result<i64, DecodeError> {
    match value {
        Value::String(s) => s
            .parse()
            .map_err(|_| DecodeError::new(format!("invalid int64 string: {s}"))),
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| DecodeError::new(format!("invalid int64 number: {n}"))),
        other => Err(DecodeError::new(format!("expected int64, found {other}"))),
    }
}

pub fn value_to_uint64(value: &Value) -> Result<u64, DecodeError> {
    match value {
        Value::String(s) => s
            .parse()
            .map_err(|_| DecodeError::new(format!("invalid uint64 string: {s}"))),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| DecodeError::new(format!("invalid uint64 number: {n}"))),
        other => Err(DecodeError::new(format!("expected uint64, found {other}"))),
    }
}

/// Renders `bytes` as standard-alphabet, padded base64.
pub fn bytes_to_value(value: &[u8]) -> Value {
    Value::String(base64::engine::general_purpose::STANDARD.encode(value))
}

pub fn value_to_bytes(value: &Value) -> Result<Vec<u8>, DecodeError> {
    match value {
        Value::String(s) => base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(|_| DecodeError::new(format!("invalid base64: {s}"))),
        other => Err(DecodeError::new(format!("expected base64 string, found {other}"))),
    }
}

/// Renders `float`/`double` as a JSON number, or one of the three sentinel
/// strings for non-finite values. Uses `is_nan()`/`is_infinite()` rather
/// than `value == f64::NAN`, which is always false under IEEE-754.
pub fn float_to_value(value: f64) -> Value {
    if value.is_nan() {
        Value::String("NaN".to_string())
    } else if value.is_infinite() {
        Value::String(if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string())
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

pub fn value_to_float(value: &Value) -> Result<f64, DecodeError> {
    match value {
        Value::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => other
                .parse()
                .map_err(|_| DecodeError::new(format!("invalid float string: {other}"))),
        },
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| DecodeError::new(format!("invalid float number: {n}"))),
        other => Err(DecodeError::new(format!("expected float, found {other}"))),
    }
}

/// Renders an enum value by member name rather than its bare integer.
pub fn enum_to_value<E: Enumeration>(value: i32) -> Value {
    match E::from_i32(value) {
        Some(e) => Value::String(e.name().to_string()),
        // An out-of-range enum value (possible on proto3, where unknown
        // enum values round-trip through the wire as a plain int32) falls
        // back to its numeric form rather than panicking.
        None => Value::Number(value.into()),
    }
}

pub fn value_to_enum<E: Enumeration>(value: &Value) -> Result<i32, DecodeError> {
    match value {
        Value::String(s) => E::from_name(s)
            .map(|e| e.value())
            .ok_or_else(|| DecodeError::from_kind(DecodeErrorKind::UnknownEnumName)),
        Value::Number(n) => n
            .as_i64()
            .map(|v| v as i32)
            .ok_or_else(|| DecodeError::new(format!("invalid enum value: {n}"))),
        other => Err(DecodeError::new(format!("expected enum name or number, found {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_strips_trailing_underscore() {
        assert_eq!(field_name("type_", Casing::Camel), "type");
        assert_eq!(field_name("field_one", Casing::Camel), "fieldOne");
        assert_eq!(field_name("field_one", Casing::Snake), "field_one");
    }

    #[test]
    fn snake_case_round_trips_camel() {
        assert_eq!(to_snake_case("fieldOne"), "field_one");
        assert_eq!(to_snake_case(&to_camel_case("field_one")), "field_one");
    }

    #[test]
    fn float_sentinels() {
        assert_eq!(float_to_value(f64::NAN), Value::String("NaN".into()));
        assert_eq!(float_to_value(f64::INFINITY), Value::String("Infinity".into()));
        assert_eq!(float_to_value(f64::NEG_INFINITY), Value::String("-Infinity".into()));
        assert!(value_to_float(&Value::String("NaN".into())).unwrap().is_nan());
    }

    #[test]
    fn int64_round_trips_as_string() {
        let v = int64_to_value(-12345);
        assert_eq!(v, Value::String("-12345".to_string()));
        assert_eq!(value_to_int64(&v).unwrap(), -12345);
    }
}
