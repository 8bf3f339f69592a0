//! Concrete wire-format scenarios: varint, string, zig-zag, packed
//! repeated, and map encoding.

use prost::Message;
use runtime_tests::{Inner, MapOfMessages, PackedNums, Scalar, Signed, StringMsg};

#[test]
fn scenario_1_varint_field() {
    let v = Scalar {
        x: 150,
        unknown_fields: Vec::new(),
        on_wire: true,
    };
    assert_eq!(v.encode_to_vec(), vec![0x08, 0x96, 0x01]);
    assert_eq!(Scalar::decode(&[0x08, 0x96, 0x01][..]).unwrap(), v);
}

#[test]
fn scenario_2_string_field() {
    let v = StringMsg {
        s: "testing".to_string(),
        unknown_fields: Vec::new(),
        on_wire: true,
    };
    let expected = vec![0x12, 0x07, 0x74, 0x65, 0x73, 0x74, 0x69, 0x6E, 0x67];
    assert_eq!(v.encode_to_vec(), expected);
    assert_eq!(StringMsg::decode(&expected[..]).unwrap(), v);
}

#[test]
fn scenario_3_zigzag() {
    let minus_one = Signed {
        v: -1,
        unknown_fields: Vec::new(),
        on_wire: false,
    };
    assert_eq!(minus_one.encode_to_vec(), vec![0x08, 0x01]);

    let one = Signed {
        v: 1,
        unknown_fields: Vec::new(),
        on_wire: false,
    };
    assert_eq!(one.encode_to_vec(), vec![0x08, 0x02]);
}

#[test]
fn scenario_4_packed_repeated() {
    let v = PackedNums {
        nums: vec![1, 2, 3],
        unknown_fields: Vec::new(),
        on_wire: true,
    };
    assert_eq!(v.encode_to_vec(), vec![0x0A, 0x03, 0x01, 0x02, 0x03]);
    assert_eq!(PackedNums::decode(&v.encode_to_vec()[..]).unwrap(), v);
}

#[test]
fn map_with_message_values_round_trips() {
    let mut entries = std::collections::BTreeMap::new();
    entries.insert(
        "a".to_string(),
        Inner {
            label: "first".to_string(),
            unknown_fields: Vec::new(),
            on_wire: true,
        },
    );
    entries.insert(
        "b".to_string(),
        Inner {
            label: "second".to_string(),
            unknown_fields: Vec::new(),
            on_wire: true,
        },
    );
    let msg = MapOfMessages {
        entries,
        unknown_fields: Vec::new(),
        on_wire: true,
    };
    let bytes = msg.encode_to_vec();
    assert_eq!(MapOfMessages::decode(&bytes[..]).unwrap(), msg);
}

#[test]
fn duplicate_map_key_last_wins() {
    // Two entries for the same outer tag sharing a key: the later entry's
    // value overwrites the earlier one on decode (last write wins).
    let mut first = std::collections::BTreeMap::new();
    first.insert(
        "k".to_string(),
        Inner {
            label: "old".to_string(),
            unknown_fields: Vec::new(),
            on_wire: false,
        },
    );
    let mut bytes = MapOfMessages {
        entries: first,
        unknown_fields: Vec::new(),
        on_wire: false,
    }
    .encode_to_vec();

    let mut second = std::collections::BTreeMap::new();
    second.insert(
        "k".to_string(),
        Inner {
            label: "new".to_string(),
            unknown_fields: Vec::new(),
            on_wire: false,
        },
    );
    bytes.extend(
        MapOfMessages {
            entries: second,
            unknown_fields: Vec::new(),
            on_wire: false,
        }
        .encode_to_vec(),
    );

    let decoded = MapOfMessages::decode(&bytes[..]).unwrap();
    assert_eq!(decoded.entries.get("k").unwrap().label, "new");
}
