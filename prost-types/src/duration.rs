use std::fmt;
use std::sync::OnceLock;

use bytes::{Buf, BufMut};

use prost::encoding::{DecodeContext, WireType};
use prost::schema::{FieldDescriptor, MessageDescriptor, ProtoType};
use prost::{DecodeError, Message};
#[cfg(feature = "serde-json")]
use prost::{json::JsonConfig, ReflectMessage};
#[cfg(feature = "serde-json")]
use serde_json::Value;

use crate::Duration;

/// An error converting a [`Duration`] to or from another representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DurationError {
    /// The text was not a valid Protobuf JSON duration (`"<decimal>s"`).
    InvalidFormat,
}

impl fmt::Display for DurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationError::InvalidFormat => write!(f, "invalid duration format"),
        }
    }
}

impl std::error::Error for DurationError {}

impl Duration {
    /// Normalizes `nanos` into `(-999_999_999, 999_999_999)` with the same
    /// sign as `seconds` (or zero), carrying the remainder.
    pub fn normalize(&mut self) {
        if self.nanos <= -1_000_000_000 || self.nanos >= 1_000_000_000 {
            self.seconds += (self.nanos / 1_000_000_000) as i64;
            self.nanos %= 1_000_000_000;
        }
        // seconds and nanos must carry the same sign.
        if self.seconds > 0 && self.nanos < 0 {
            self.seconds -= 1;
            self.nanos += 1_000_000_000;
        } else if self.seconds < 0 && self.nanos > 0 {
            self.seconds += 1;
            self.nanos -= 1_000_000_000;
        }
    }

    /// Builds a `Duration` from a total span of microseconds, splitting
    /// into seconds and nanos.
    pub fn from_total_micros(total_micros: i64) -> Duration {
        let seconds = total_micros / 1_000_000;
        let micros_remainder = total_micros % 1_000_000;
        Duration {
            seconds,
            nanos: (micros_remainder * 1_000) as i32,
            ..Default::default()
        }
    }

    /// The total number of microseconds this duration represents
    /// (truncating sub-microsecond precision).
    pub fn to_total_micros(&self) -> i64 {
        self.seconds * 1_000_000 + i64::from(self.nanos) / 1_000
    }

    /// Renders the canonical JSON form: decimal seconds followed by `s`,
    /// with the fractional part padded to 3/6/9 digits.
    pub fn to_json_string(&self) -> String {
        let mut normalized = self.clone();
        normalized.normalize();
        let negative = normalized.seconds < 0 || normalized.nanos < 0;
        let seconds = normalized.seconds.unsigned_abs();
        let nanos = normalized.nanos.unsigned_abs();

        let sign = if negative { "-" } else { "" };
        if nanos == 0 {
            format!("{sign}{seconds}s")
        } else if nanos % 1_000_000 == 0 {
            format!("{sign}{seconds}.{:03}s", nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            format!("{sign}{seconds}.{:06}s", nanos / 1_000)
        } else {
            format!("{sign}{seconds}.{:09}s", nanos)
        }
    }

    /// Parses the canonical JSON form (`"<decimal>s"`).
    pub fn parse_json_string(s: &str) -> Result<Duration, DurationError> {
        let s = s.strip_suffix('s').ok_or(DurationError::InvalidFormat)?;
        let (sign, s) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s),
        };
        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        let whole: i64 = whole.parse().map_err(|_| DurationError::InvalidFormat)?;
        let nanos: i32 = if frac.is_empty() {
            0
        } else {
            if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(DurationError::InvalidFormat);
            }
            let padded_frac: u32 = frac.parse().map_err(|_| DurationError::InvalidFormat)?;
            (padded_frac * 10u32.pow(9 - frac.len() as u32)) as i32
        };

        Ok(Duration {
            seconds: sign * whole,
            nanos: sign as i32 * nanos,
            ..Default::default()
        })
    }
}

impl TryFrom<std::time::Duration> for Duration {
    type Error = std::num::TryFromIntError;

    fn try_from(duration: std::time::Duration) -> Result<Duration, Self::Error> {
        Ok(Duration {
            seconds: i64::try_from(duration.as_secs())?,
            nanos: duration.subsec_nanos() as i32,
            ..Default::default()
        })
    }
}

impl TryFrom<Duration> for std::time::Duration {
    type Error = std::num::TryFromIntError;

    fn try_from(mut duration: Duration) -> Result<std::time::Duration, Self::Error> {
        duration.normalize();
        Ok(std::time::Duration::new(
            u64::try_from(duration.seconds)?,
            duration.nanos.unsigned_abs(),
        ))
    }
}

fn duration_fields() -> Vec<FieldDescriptor> {
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

// See Timestamp's doc comment in `timestamp.rs` for why this is hand-written
// rather than derived: the JSON form is the `"<decimal>s"` string, not a
// `{seconds, nanos}` object.
impl Message for Duration {
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
impl ReflectMessage for Duration {
    fn descriptor() -> &'static MessageDescriptor {
        static DESCRIPTOR: OnceLock<MessageDescriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| MessageDescriptor::new("Duration", duration_fields()))
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
        Value::String(self.to_json_string())
    }

    fn from_dict(value: &Value) -> Result<Self, DecodeError> {
        let s = value
            .as_str()
            .ok_or_else(|| DecodeError::new("Duration JSON value must be a string"))?;
        Duration::parse_json_string(s).map_err(|err| DecodeError::new(err.to_string()))
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
    fn concrete_scenario_negative_duration() {
        let d = Duration::from_total_micros(-1_500_000);
        assert_eq!(d, Duration { seconds: -1, nanos: -500_000_000, ..Default::default() });
        assert_eq!(d.to_json_string(), "-1.500s");
        assert_eq!(Duration::parse_json_string("-1.500s").unwrap(), d);
    }

    #[test]
    fn zero_fraction_has_no_decimal_point() {
        let d = Duration { seconds: 5, nanos: 0, ..Default::default() };
        assert_eq!(d.to_json_string(), "5s");
    }

    #[test]
    fn normalize_carries_mismatched_signs() {
        let mut d = Duration { seconds: 1, nanos: -500_000_000, ..Default::default() };
        d.normalize();
        assert_eq!(d, Duration { seconds: 0, nanos: 500_000_000, ..Default::default() });
    }
}
