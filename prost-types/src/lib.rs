//! Well-known Protocol Buffers message types: Timestamp, Duration, and the
//! scalar-wrapper bridge, built on `prost` exactly the way real generated
//! code from `google/protobuf/{timestamp,duration,wrappers}.proto` would
//! look.

mod datetime;
mod duration;
mod timestamp;
mod wrappers;

pub use duration::DurationError;
pub use timestamp::TimestampError;
pub use wrappers::{
    BoolValue, BytesValue, DoubleValue, EnumValue, FloatValue, Int32Value, Int64Value,
    StringValue, UInt32Value, UInt64Value,
};

/// `google.protobuf.Timestamp`: a point in time, independent of any time
/// zone, represented as seconds and nanoseconds relative to the Unix
/// epoch — an absolute instant in UTC.
///
/// `Message`/`ReflectMessage` are hand-implemented rather than derived
/// (`timestamp.rs`): the wire shape is an ordinary two-field message, but
/// the canonical JSON form is the RFC 3339 string, not the `{seconds,
/// nanos}` object `#[derive(Message)]` would produce.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
    pub unknown_fields: Vec<u8>,
    pub on_wire: bool,
}

/// `google.protobuf.Duration`: a signed, fixed-length span of time. See
/// [`Timestamp`]'s doc comment for why its `Message`/`ReflectMessage`
/// impls are hand-written.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Duration {
    pub seconds: i64,
    pub nanos: i32,
    pub unknown_fields: Vec<u8>,
    pub on_wire: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn timestamp_and_duration_are_messages() {
        let ts = Timestamp { seconds: 1, nanos: 2, ..Default::default() };
        let mut buf = Vec::new();
        ts.encode_raw(&mut buf);
        let decoded = Timestamp::decode(&buf[..]).unwrap();
        assert_eq!(decoded.seconds, ts.seconds);
        assert_eq!(decoded.nanos, ts.nanos);

        let d = Duration { seconds: -1, nanos: -500_000_000, ..Default::default() };
        let mut buf = Vec::new();
        d.encode_raw(&mut buf);
        let decoded = Duration::decode(&buf[..]).unwrap();
        assert_eq!(decoded.seconds, d.seconds);
        assert_eq!(decoded.nanos, d.nanos);
    }
}
