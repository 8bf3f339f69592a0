//! Canonical JSON codec: casing, default omission, and round-trip.

use prost::json::{Casing, JsonConfig};
use prost::ReflectMessage;
use runtime_tests::{Color, Compound, Inner};
use serde_json::json;

fn sample() -> Compound {
    Compound {
        inner: Some(Inner {
            label: "hello".to_string(),
            unknown_fields: Vec::new(),
            on_wire: false,
        }),
        counts: [("a".to_string(), 1), ("b".to_string(), 2)].into_iter().collect(),
        color: Color::Blue as i32,
        wrapped: Some(prost_types::Int32Value::from(7)),
        created_at: Some(prost_types::Timestamp {
            seconds: 0,
            nanos: 0,
            ..Default::default()
        }),
        ids: vec![1, 2, 3],
        unknown_fields: Vec::new(),
        on_wire: false,
    }
}

#[test]
fn default_camel_case_keys() {
    let value = sample().to_dict(JsonConfig::default());
    let obj = value.as_object().unwrap();
    assert!(obj.contains_key("inner"));
    assert!(obj.contains_key("counts"));
    assert!(obj.contains_key("color"));
}

#[test]
fn enum_serializes_as_name() {
    let value = sample().to_dict(JsonConfig::default());
    assert_eq!(value["color"], json!("Blue"));
}

#[test]
fn wrapper_field_flattens_to_bare_scalar() {
    // A `wraps` field renders as the raw scalar in JSON, not the
    // `{"value": ...}` object its wire form uses.
    let value = sample().to_dict(JsonConfig::default());
    assert_eq!(value["wrapped"], json!(7));
}

#[test]
fn int64_serializes_as_string() {
    let msg = Compound {
        ids: vec![5, -5],
        ..Default::default()
    };
    let value = msg.to_dict(JsonConfig::default());
    assert_eq!(value["ids"], json!(["5", "-5"]));
}

#[test]
fn default_values_omitted_unless_requested() {
    let empty = Compound::default();
    let value = empty.to_dict(JsonConfig::default());
    let obj = value.as_object().unwrap();
    // `color` is Color::Red (0), the declared default: omitted.
    assert!(!obj.contains_key("color"));

    let config = JsonConfig {
        include_default_values: true,
        ..JsonConfig::default()
    };
    let value = empty.to_dict(config);
    assert!(value.as_object().unwrap().contains_key("color"));
}

#[test]
fn snake_case_casing_is_selectable() {
    let config = JsonConfig {
        casing: Casing::Snake,
        ..JsonConfig::default()
    };
    let value = sample().to_dict(config);
    assert!(value.as_object().unwrap().contains_key("created_at"));
}

#[test]
fn round_trips_through_dict() {
    let original = sample();
    let value = original.to_dict(JsonConfig::default());
    let restored = Compound::from_dict(&value).unwrap();
    assert_eq!(restored, original);
}

#[test]
fn unknown_keys_are_ignored_on_parse() {
    let mut value = sample().to_dict(JsonConfig::default());
    value
        .as_object_mut()
        .unwrap()
        .insert("notAField".to_string(), json!(true));
    let restored = Compound::from_dict(&value).unwrap();
    assert_eq!(restored, sample());
}
