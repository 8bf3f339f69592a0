//! One-of group selection, mutual exclusion, and wire round-tripping.

use prost::{which_one_of, Message};
use runtime_tests::{Group, WithOneof};

#[test]
fn oneof_selects_last_write() {
    let mut msg = WithOneof {
        g: Some(Group::A(0)),
        unknown_fields: Vec::new(),
        on_wire: false,
    };
    msg.g = Some(Group::B("x".to_string()));

    assert_eq!(msg.encode_to_vec(), vec![0x12, 0x01, 0x78]);

    let (name, value) = which_one_of(&msg.g);
    assert_eq!(name, "b");
    assert_eq!(value, Some(&Group::B("x".to_string())));
}

#[test]
fn zero_valued_selection_still_serializes() {
    // An explicitly selected one-of field emits even at its declared zero
    // value.
    let msg = WithOneof {
        g: Some(Group::A(0)),
        unknown_fields: Vec::new(),
        on_wire: false,
    };
    assert_eq!(msg.encode_to_vec(), vec![0x08, 0x00]);
}

#[test]
fn empty_string_selection_still_serializes() {
    let msg = WithOneof {
        g: Some(Group::B(String::new())),
        unknown_fields: Vec::new(),
        on_wire: false,
    };
    assert_eq!(msg.encode_to_vec(), vec![0x12, 0x00]);
}

#[test]
fn last_field_of_group_wins_on_parse() {
    // Two fields of the same group appearing on the wire: the last one
    // encountered wins.
    let bytes = vec![0x08, 0x2A, 0x12, 0x01, 0x79];
    let msg = WithOneof::decode(&bytes[..]).unwrap();
    assert_eq!(msg.g, Some(Group::B("y".to_string())));
}

#[test]
fn unset_group_reports_empty_selection() {
    let msg = WithOneof {
        g: None,
        unknown_fields: Vec::new(),
        on_wire: false,
    };
    let (name, value) = which_one_of(&msg.g);
    assert_eq!(name, "");
    assert_eq!(value, None);
}
