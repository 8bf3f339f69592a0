//! The well-known-type bridge: Timestamp, Duration, and scalar wrappers.

use prost::Message;
use prost_types::{Duration, Int32Value, Timestamp};

#[test]
fn timestamp_rfc3339() {
    let ts = Timestamp::parse_rfc3339("1970-01-01T00:00:00.123Z").unwrap();
    assert_eq!(ts.seconds, 0);
    assert_eq!(ts.nanos, 123_000_000);
    assert_eq!(ts.to_rfc3339(), "1970-01-01T00:00:00.123Z");
}

#[test]
fn negative_duration() {
    let d = Duration::parse_json_string("-1.500s").unwrap();
    assert_eq!(d.seconds, -1);
    assert_eq!(d.nanos, -500_000_000);
    assert_eq!(d.to_json_string(), "-1.500s");
}

#[test]
fn wrapper_presence() {
    let none: Option<Int32Value> = None;
    assert!(none.is_none());

    let zero = Int32Value::from(0i32);
    // Nested at tag 1 of a parent message: `key || length || inner bytes`.
    let mut parent_buf = Vec::new();
    prost::encoding::message::encode(1, &zero, &mut parent_buf);
    assert_eq!(parent_buf, vec![0x0A, 0x02, 0x08, 0x00]);
}

#[test]
fn timestamp_wire_round_trip() {
    let ts = Timestamp {
        seconds: 1_700_000_000,
        nanos: 42,
        on_wire: true,
        ..Default::default()
    };
    let bytes = ts.encode_to_vec();
    assert_eq!(Timestamp::decode(&bytes[..]).unwrap(), ts);
}

#[test]
fn duration_wire_round_trip() {
    let d = Duration {
        seconds: -5,
        nanos: -250_000_000,
        on_wire: true,
        ..Default::default()
    };
    let bytes = d.encode_to_vec();
    assert_eq!(Duration::decode(&bytes[..]).unwrap(), d);
}
