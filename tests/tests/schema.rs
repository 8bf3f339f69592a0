//! Schema reflection: field descriptors, one-of group metadata, and the
//! `serialized_on_wire` bit.

use prost::{serialized_on_wire, Message, ReflectMessage};
use runtime_tests::{Scalar, WithOneof};

#[test]
fn plain_fields_appear_in_declared_tag_order() {
    let descriptor = Scalar::descriptor();
    let names: Vec<_> = descriptor.fields.iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["x"]);
}

#[test]
fn oneof_group_is_reported_by_descriptor() {
    let descriptor = WithOneof::descriptor();
    assert_eq!(descriptor.groups(), vec!["g"]);

    let mut group_fields: Vec<_> = descriptor.group_fields("g").map(|f| f.name).collect();
    group_fields.sort_unstable();
    assert_eq!(group_fields, vec!["a", "b"]);
}

#[test]
fn fresh_message_was_never_on_the_wire() {
    let msg = Scalar::default();
    assert!(!serialized_on_wire(&msg));
}

#[test]
fn empty_buffer_decode_still_counts_as_on_wire() {
    // A zero-length buffer parses to an all-defaults message, but decoding
    // it at all is what `serialized_on_wire` records.
    let msg = Scalar::decode(&[][..]).unwrap();
    assert!(msg.is_empty());
    assert!(serialized_on_wire(&msg));
}

#[test]
fn clear_resets_the_on_wire_flag() {
    let mut msg = Scalar::decode(&[0x08, 0x01][..]).unwrap();
    assert!(serialized_on_wire(&msg));
    msg.clear();
    assert!(!serialized_on_wire(&msg));
}
