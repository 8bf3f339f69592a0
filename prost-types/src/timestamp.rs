use std::fmt;
use std::sync::OnceLock;
use std::time::SystemTime;

use bytes::{Buf, BufMut};

use prost::encoding::{DecodeContext, WireType};
use prost::schema::{FieldDescriptor, MessageDescriptor, ProtoType};
use prost::{DecodeError, Message};
#[cfg(feature = "serde-json")]
use prost::{json::JsonConfig, ReflectMessage};
#[cfg(feature = "serde-json")]
use serde_json::Value;

use crate::datetime::{parse_rfc3339, seconds_and_nanos_to_date_time};
use crate::Timestamp;

const NANOS_PER_SECOND: i32 = 1_000_000_000;

/// An error converting a [`Timestamp`] to or from another time
/// representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimestampError {
    /// The `Timestamp` could not be normalized into range.
    OutOfRange,
    /// The text was not a valid RFC 3339 timestamp.
    InvalidRfc3339,
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampError::OutOfRange => write!(f, "timestamp is out of range"),
            TimestampError::InvalidRfc3339 => write!(f, "invalid RFC 3339 timestamp"),
        }
    }
}

impl std::error::Error for TimestampError {}

impl Timestamp {
    /// Normalizes `nanos` into `[0, 999_999_999]`, carrying the remainder
    /// into `seconds`.
    pub fn normalize(&mut self) {
        if self.nanos <= -NANOS_PER_SECOND || self.nanos >= NANOS_PER_SECOND {
            self.seconds += (self.nanos / NANOS_PER_SECOND) as i64;
            self.nanos %= NANOS_PER_SECOND;
        }
        if self.nanos < 0 {
            self.seconds -= 1;
            self.nanos += NANOS_PER_SECOND;
        }
    }

    /// Builds a `Timestamp` from microseconds since the Unix epoch:
    /// `seconds = floor(epoch_micros / 1e6)`, `nanos = microsecond * 1000`.
    pub fn from_epoch_micros(micros: i64) -> Timestamp {
        let seconds = micros.div_euclid(1_000_000);
        let micros_remainder = micros.rem_euclid(1_000_000);
        Timestamp {
            seconds,
            nanos: (micros_remainder * 1_000) as i32,
            ..Default::default()
        }
    }

    /// The number of microseconds since the Unix epoch this timestamp
    /// represents (truncating sub-microsecond precision).
    pub fn to_epoch_micros(&self) -> i64 {
        self.seconds * 1_000_000 + i64::from(self.nanos) / 1_000
    }

    /// Renders the canonical RFC 3339 JSON form, with fractional digits
    /// emitted in multiples of 3 and omitted entirely when zero.
    pub fn to_rfc3339(&self) -> String {
        let mut normalized = self.clone();
        normalized.normalize();
        seconds_and_nanos_to_date_time(normalized.seconds, normalized.nanos as u32).to_string()
    }

    /// Parses the canonical RFC 3339 JSON form.
    pub fn parse_rfc3339(s: &str) -> Result<Timestamp, TimestampError> {
        let (seconds, nanos) = parse_rfc3339(s).ok_or(TimestampError::InvalidRfc3339)?;
        Ok(Timestamp { seconds, nanos, ..Default::default() })
    }
}

impl TryFrom<SystemTime> for Timestamp {
    type Error = TimestampError;

    fn try_from(system_time: SystemTime) -> Result<Timestamp, TimestampError> {
        match system_time.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(duration) => Ok(Timestamp {
                seconds: duration.as_secs() as i64,
                nanos: duration.subsec_nanos() as i32,
                ..Default::default()
            }),
            Err(err) => {
                let duration = err.duration();
                let seconds = duration.as_secs() as i64;
                let nanos = duration.subsec_nanos() as i32;
                if nanos == 0 {
                    Ok(Timestamp { seconds: -seconds, nanos: 0, ..Default::default() })
                } else {
                    Ok(Timestamp {
                        seconds: -seconds - 1,
                        nanos: NANOS_PER_SECOND - nanos,
                        ..Default::default()
                    })
                }
            }
        }
    }
}

impl TryFrom<Timestamp> for SystemTime {
    type Error = TimestampError;

    fn try_from(mut timestamp: Timestamp) -> Result<SystemTime, TimestampError> {
        timestamp.normalize();
        if timestamp.seconds >= 0 {
            SystemTime::UNIX_EPOCH
                .checked_add(std::time::Duration::new(timestamp.seconds as u64, timestamp.nanos as u32))
                .ok_or(TimestampError::OutOfRange)
        } else {
            SystemTime::UNIX_EPOCH
                .checked_sub(std::time::Duration::new((-timestamp.seconds) as u64, 0))
                .and_then(|t| t.checked_add(std::time::Duration::new(0, timestamp.nanos as u32)))
                .ok_or(TimestampError::OutOfRange)
        }
    }
}

fn timestamp_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor {
            name: "seconds",
            tag: 1,
            proto_type: ProtoType::Int64,
            map_types: None,
            group: None,
            wraps: None,
            repeated: false,
        },
        FieldDescriptor {
            name: "nanos",
            tag: 2,
            proto_type: ProtoType::Int32,
            map_types: None,
            group: None,
            wraps: None,
            repeated: false,
        },
    ]
}

// Hand-written rather than `#[derive(Message)]`: the wire shape below is
// exactly what the derive would generate, but `ReflectMessage::to_dict` and
// `from_dict` need the RFC 3339 string form instead of a `{seconds, nanos}`
// object, and a type can only implement `ReflectMessage` once.
impl Message for Timestamp {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        if self.seconds != 0 {
            prost::encoding::int64::encode(1, &self.seconds, buf);
        }
        if self.nanos != 0 {
            prost::encoding::int32::encode(2, &self.nanos, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        match tag {
            1 => prost::encoding::int64::merge(wire_type, &mut self.seconds, buf, ctx),
            2 => prost::encoding::int32::merge(wire_type, &mut self.nanos, buf, ctx),
            _ => prost::encoding::preserve_unknown_field(tag, wire_type, buf, &mut self.unknown_fields, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        (if self.seconds != 0 {
            prost::encoding::int64::encoded_len(1, &self.seconds)
        } else {
            0
        }) + (if self.nanos != 0 {
            prost::encoding::int32::encoded_len(2, &self.nanos)
        } else {
            0
        })
    }

    fn clear(&mut self) {
        self.seconds = 0;
        self.nanos = 0;
        self.unknown_fields.clear();
        self.on_wire = false;
    }

    fn mark_serialized_on_wire(&mut self) {
        self.on_wire = true;
    }
}

#[cfg(feature = "serde-json")]
impl ReflectMessage for Timestamp {
    fn descriptor() -> &'static MessageDescriptor {
        static DESCRIPTOR: OnceLock<MessageDescriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| MessageDescriptor::new("Timestamp", timestamp_fields()))
    }

    fn unknown_fields(&self) -> &[u8] {
        &self.unknown_fields
    }

    fn unknown_fields_mut(&mut self) -> &mut Vec<u8> {
        &mut self.unknown_fields
    }

    fn is_empty(&self) -> bool {
        self.seconds == 0 && self.nanos == 0 && self.unknown_fields.is_empty()
    }

    fn serialized_on_wire(&self) -> bool {
        self.on_wire
    }

    fn to_dict(&self, _config: JsonConfig) -> Value {
        Value::String(self.to_rfc3339())
    }

    fn from_dict(value: &Value) -> Result<Self, DecodeError> {
        let s = value
            .as_str()
            .ok_or_else(|| DecodeError::new("Timestamp JSON value must be a string"))?;
        Timestamp::parse_rfc3339(s).map_err(|err| DecodeError::new(err.to_string()))
    }

    fn merge_dict(&mut self, value: &Value) -> Result<(), DecodeError> {
        *self = Self::from_dict(value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concrete_scenario_rfc3339() {
        let ts = Timestamp { seconds: 0, nanos: 123_000_000, ..Default::default() };
        assert_eq!(ts.to_rfc3339(), "1970-01-01T00:00:00.123Z");
        assert_eq!(Timestamp::parse_rfc3339("1970-01-01T00:00:00.123Z").unwrap(), ts);
    }

    #[test]
    fn normalize_carries_negative_nanos() {
        let mut ts = Timestamp { seconds: 5, nanos: -1, ..Default::default() };
        ts.normalize();
        assert_eq!(ts, Timestamp { seconds: 4, nanos: 999_999_999, ..Default::default() });
    }

    #[test]
    fn system_time_round_trip() {
        let ts = Timestamp { seconds: 1_700_000_000, nanos: 500_000_000, ..Default::default() };
        let system_time: SystemTime = ts.clone().try_into().unwrap();
        let back: Timestamp = system_time.try_into().unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn zero_fractional_digits_omitted() {
        let ts = Timestamp { seconds: 0, nanos: 0, ..Default::default() };
        assert_eq!(ts.to_rfc3339(), "1970-01-01T00:00:00Z");
    }
}
