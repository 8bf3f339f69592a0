//! The Google scalar wrapper messages: single-field messages used to
//! express a nullable scalar. Each one is
//! exactly the synthetic `{ value: T @ tag 1 }` message the proto3 JSON
//! mapping expects, so `Option<WrapperMessage>` round-trips presence the
//! way `Option<T>` would in a language with native nullable scalars.

use bytes::{Buf, BufMut};

use prost::encoding::{DecodeContext, WireType};
use prost::{DecodeError, Enumeration, Message};

macro_rules! wrapper {
    ($name:ident, $ty:ty, $proto:ident) => {
        #[doc = concat!("`google.protobuf.", stringify!($name), "`.")]
        #[derive(Clone, Debug, PartialEq, Message)]
        pub struct $name {
            #[prost($proto, tag = "1", force)]
            pub value: $ty,
            #[prost(unknown_fields)]
            pub unknown_fields: Vec<u8>,
            #[prost(on_wire)]
            pub on_wire: bool,
        }

        impl From<$ty> for $name {
            fn from(value: $ty) -> $name {
                $name {
                    value,
                    unknown_fields: Vec::new(),
                    on_wire: false,
                }
            }
        }

        impl From<$name> for $ty {
            fn from(wrapper: $name) -> $ty {
                wrapper.value
            }
        }
    };
}

wrapper!(BoolValue, bool, bool);
wrapper!(Int32Value, i32, int32);
wrapper!(Int64Value, i64, int64);
wrapper!(UInt32Value, u32, uint32);
wrapper!(UInt64Value, u64, uint64);
wrapper!(FloatValue, f32, float);
wrapper!(DoubleValue, f64, double);

/// `google.protobuf.StringValue`.
#[derive(Clone, Debug, PartialEq, Message)]
pub struct StringValue {
    #[prost(string, tag = "1", force)]
    pub value: String,
    #[prost(unknown_fields)]
    pub unknown_fields: Vec<u8>,
    #[prost(on_wire)]
    pub on_wire: bool,
}

impl From<String> for StringValue {
    fn from(value: String) -> StringValue {
        StringValue {
            value,
            unknown_fields: Vec::new(),
            on_wire: false,
        }
    }
}

/// `google.protobuf.BytesValue`.
#[derive(Clone, Debug, PartialEq, Message)]
pub struct BytesValue {
    #[prost(bytes, tag = "1", force)]
    pub value: Vec<u8>,
    #[prost(unknown_fields)]
    pub unknown_fields: Vec<u8>,
    #[prost(on_wire)]
    pub on_wire: bool,
}

impl From<Vec<u8>> for BytesValue {
    fn from(value: Vec<u8>) -> BytesValue {
        BytesValue {
            value,
            unknown_fields: Vec::new(),
            on_wire: false,
        }
    }
}

/// A wrapper around an [`Enumeration`], matching the shape of the scalar
/// wrappers above: a non-standard addition so a nullable enum field can
/// be expressed the same way a nullable scalar is. Not part of real
/// `google.protobuf`; generic over `E` so it can't be produced by
/// `#[derive(Message)]` the way the scalar wrappers are, and is
/// hand-implemented instead.
#[derive(Clone, Copy, Debug)]
pub struct EnumValue<E> {
    pub value: E,
}

impl<E: Enumeration> PartialEq for EnumValue<E> {
    fn eq(&self, other: &Self) -> bool {
        self.value.value() == other.value.value()
    }
}

impl<E: Enumeration> Default for EnumValue<E> {
    fn default() -> Self {
        EnumValue {
            value: E::default_value(),
        }
    }
}

impl<E: Enumeration> From<E> for EnumValue<E> {
    fn from(value: E) -> EnumValue<E> {
        EnumValue { value }
    }
}

impl<E: Enumeration + Send + Sync> Message for EnumValue<E> {
    // Like the scalar wrapper messages, a populated `EnumValue` always
    // serializes its inner field even at the zero variant: presence lives
    // in the *outer* `Option<EnumValue<E>>`, not here.
    fn encode_raw(&self, buf: &mut impl BufMut) {
        prost::encoding::int32::encode(1, &self.value.value(), buf);
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        if tag == 1 {
            let mut raw = 0i32;
            prost::encoding::int32::merge(wire_type, &mut raw, buf, ctx)?;
            self.value = E::from_i32(raw).unwrap_or_else(E::default_value);
            Ok(())
        } else {
            let mut unknown = Vec::new();
            prost::encoding::preserve_unknown_field(tag, wire_type, buf, &mut unknown, ctx)
        }
    }

    fn encoded_len(&self) -> usize {
        prost::encoding::int32::encoded_len(1, &self.value.value())
    }

    fn clear(&mut self) {
        self.value = E::default_value();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn concrete_scenario_wrapper_none_vs_zero() {
        // `Int32Value(None)` emits nothing; `Int32Value(0)` emits an
        // explicit zero-valued inner message.
        let none: Option<Int32Value> = None;
        assert!(none.is_none());

        let zero = Int32Value::from(0i32);
        assert_eq!(zero.encode_to_vec(), vec![0x08, 0x00]);
    }

    #[test]
    fn bool_value_round_trip() {
        let wrapper = BoolValue::from(true);
        let bytes = wrapper.encode_to_vec();
        assert_eq!(BoolValue::decode(&bytes[..]).unwrap(), wrapper);
    }
}
