//! Unknown-field preservation: bytes whose tags are absent from the
//! schema survive a decode/encode round trip unchanged, appended as a
//! suffix.

use prost::Message;
use runtime_tests::Scalar;

#[test]
fn unrecognized_tag_round_trips_as_suffix() {
    // Scalar only declares tag 1. Tag 5 (varint 7) is unknown to it.
    let bytes = vec![0x08, 0x2A, 0x28, 0x07];
    let msg = Scalar::decode(&bytes[..]).unwrap();
    assert_eq!(msg.x, 42);
    assert_eq!(msg.unknown_fields, vec![0x28, 0x07]);

    let re_encoded = msg.encode_to_vec();
    assert!(re_encoded.ends_with(&[0x28, 0x07]));
    assert_eq!(re_encoded, vec![0x08, 0x2A, 0x28, 0x07]);
}

#[test]
fn duplicate_scalar_tags_last_wins() {
    let bytes = vec![0x08, 0x01, 0x08, 0x02];
    let msg = Scalar::decode(&bytes[..]).unwrap();
    assert_eq!(msg.x, 2);
}

#[test]
fn clear_discards_unknown_fields() {
    let mut msg = Scalar::decode(&[0x08, 0x01, 0x28, 0x07][..]).unwrap();
    assert!(!msg.unknown_fields.is_empty());
    msg.clear();
    assert_eq!(msg.x, 0);
    assert!(msg.unknown_fields.is_empty());
}
