//! Low-level wire-format functions.
//!
//! The wire primitives: varint/zig-zag/fixed packers, the tag/wire-type
//! header codec, packed-repeated handling, and verbatim preservation of
//! fields whose tag is not in the schema.
//!
//! Meant to be used only from `Message`/derive-generated implementations.

use std::collections::BTreeMap;
use std::mem;
use std::str;

use bytes::{Buf, BufMut, Bytes};

use crate::error::DecodeErrorKind;
use crate::DecodeError;

pub mod length_delimiter;
pub use length_delimiter::{decode_length_delimiter, encode_length_delimiter, length_delimiter_len};

pub mod varint;
pub use varint::{decode_varint, encode_varint, encoded_len_varint};

pub mod wire_type;
pub use wire_type::{check_wire_type, WireType};

/// Additional information threaded through every decode/merge call.
///
/// The recursion counter is the only piece of state; it is cheap to `Clone`
/// and must be re-derived (via [`DecodeContext::enter_recursion`]) before
/// recursing into a nested message, mirroring the 100-level limit the C++
/// reference implementation applies.
#[derive(Clone, Copy, Debug)]
pub struct DecodeContext {
    recurse_count: u32,
}

impl Default for DecodeContext {
    #[inline]
    fn default() -> DecodeContext {
        DecodeContext {
            recurse_count: crate::RECURSION_LIMIT,
        }
    }
}

impl DecodeContext {
    #[inline]
    pub fn enter_recursion(&self) -> DecodeContext {
        DecodeContext {
            recurse_count: self.recurse_count - 1,
        }
    }

    #[inline]
    pub fn limit_reached(&self) -> Result<(), DecodeError> {
        if self.recurse_count == 0 {
            Err(DecodeError::from_kind(DecodeErrorKind::RecursionLimitReached))
        } else {
            Ok(())
        }
    }
}

pub const MIN_TAG: u32 = 1;
pub const MAX_TAG: u32 = (1 << 29) - 1;

/// Encodes a field header (tag and wire type).
#[inline]
pub fn encode_key(tag: u32, wire_type: WireType, buf: &mut impl BufMut) {
    debug_assert!((MIN_TAG..=MAX_TAG).contains(&tag));
    let key = (tag << 3) | wire_type as u32;
    encode_varint(u64::from(key), buf);
}

/// Decodes a field header (tag and wire type).
///
/// Wire types 3 and 4 (`StartGroup`/`EndGroup`) decode successfully as far as
/// [`WireType::try_from`] is concerned, but this runtime does not support
/// proto2 groups, so they are rejected here with
/// [`DecodeErrorKind::UnsupportedWireType`] rather than threading a group
/// parser through every call site.
#[inline(always)]
pub fn decode_key(buf: &mut impl Buf) -> Result<(u32, WireType), DecodeError> {
    let key = decode_varint(buf)?;
    if key > u64::from(u32::MAX) {
        return Err(DecodeError::new(format!("invalid key value: {key}")));
    }
    let wire_type = WireType::try_from(key & 0x07)?;
    if matches!(wire_type, WireType::StartGroup | WireType::EndGroup) {
        return Err(DecodeError::from_kind(DecodeErrorKind::UnsupportedWireType));
    }
    let tag = key as u32 >> 3;
    if tag < MIN_TAG {
        return Err(DecodeError::new("invalid tag value: 0"));
    }
    Ok((tag, wire_type))
}

/// Returns the width of an encoded field key with the given tag.
#[inline]
pub fn key_len(tag: u32) -> usize {
    encoded_len_varint(u64::from(tag << 3))
}

/// Reads a length delimiter, then invokes `merge` repeatedly on `value`
/// until exactly that many bytes have been consumed. Used for both packed
/// scalar fields and nested-message parsing.
pub fn merge_loop<T, M, B>(
    value: &mut T,
    buf: &mut B,
    ctx: DecodeContext,
    mut merge: M,
) -> Result<(), DecodeError>
where
    M: FnMut(&mut T, &mut B, DecodeContext) -> Result<(), DecodeError>,
    B: Buf,
{
    let len = decode_varint(buf)?;
    let remaining = buf.remaining();
    if len > remaining as u64 {
        return Err(DecodeError::from_kind(DecodeErrorKind::TruncatedField));
    }

    let limit = remaining - len as usize;
    while buf.remaining() > limit {
        merge(value, buf, ctx)?;
    }

    if buf.remaining() != limit {
        return Err(DecodeError::from_kind(DecodeErrorKind::TruncatedField));
    }
    Ok(())
}

/// Skips a field's payload without decoding it, and appends the field's
/// exact wire representation (tag and payload, canonically re-encoded) to
/// `unknown`. This is how unknown tags end up in a message's unknown-field
/// buffer.
pub fn preserve_unknown_field(
    tag: u32,
    wire_type: WireType,
    buf: &mut impl Buf,
    unknown: &mut Vec<u8>,
    ctx: DecodeContext,
) -> Result<(), DecodeError> {
    ctx.limit_reached()?;
    encode_key(tag, wire_type, unknown);
    match wire_type {
        WireType::Varint => {
            let value = decode_varint(buf)?;
            encode_varint(value, unknown);
        }
        WireType::ThirtyTwoBit => {
            if buf.remaining() < 4 {
                return Err(DecodeError::from_kind(DecodeErrorKind::BufferUnderflow));
            }
            let mut tmp = [0u8; 4];
            buf.copy_to_slice(&mut tmp);
            unknown.extend_from_slice(&tmp);
        }
        WireType::SixtyFourBit => {
            if buf.remaining() < 8 {
                return Err(DecodeError::from_kind(DecodeErrorKind::BufferUnderflow));
            }
            let mut tmp = [0u8; 8];
            buf.copy_to_slice(&mut tmp);
            unknown.extend_from_slice(&tmp);
        }
        WireType::LengthDelimited => {
            let len = decode_varint(buf)?;
            if len > buf.remaining() as u64 {
                return Err(DecodeError::from_kind(DecodeErrorKind::TruncatedField));
            }
            encode_varint(len, unknown);
            let mut remaining = buf.take(len as usize);
            while remaining.has_remaining() {
                let chunk = remaining.chunk();
                unknown.extend_from_slice(chunk);
                let n = chunk.len();
                remaining.advance(n);
            }
        }
        WireType::StartGroup | WireType::EndGroup => {
            return Err(DecodeError::from_kind(DecodeErrorKind::UnsupportedWireType));
        }
    }
    Ok(())
}

/// Helper macro which emits an `encode_repeated` function for the type.
macro_rules! encode_repeated {
    ($ty:ty) => {
        pub fn encode_repeated(tag: u32, values: &[$ty], buf: &mut impl BufMut) {
            for value in values {
                encode(tag, value, buf);
            }
        }
    };
}

/// Helper macro which emits a `merge_repeated` function for a numeric type,
/// transparently accepting either the packed or unpacked wire form on
/// decode (a decoder must accept both regardless of what the writer chose).
macro_rules! merge_repeated_numeric {
    ($ty:ty, $wire_type:expr, $merge:ident, $merge_repeated:ident) => {
        pub fn $merge_repeated(
            wire_type: WireType,
            values: &mut Vec<$ty>,
            buf: &mut impl Buf,
            ctx: DecodeContext,
        ) -> Result<(), DecodeError> {
            if wire_type == WireType::LengthDelimited {
                merge_loop(values, buf, ctx, |values, buf, ctx| {
                    let mut value = Default::default();
                    $merge($wire_type, &mut value, buf, ctx)?;
                    values.push(value);
                    Ok(())
                })
            } else {
                check_wire_type($wire_type, wire_type)?;
                let mut value = Default::default();
                $merge(wire_type, &mut value, buf, ctx)?;
                values.push(value);
                Ok(())
            }
        }
    };
}

/// Macro which emits a module containing the encode/merge/length functions
/// for a variable-width (varint) numeric type.
macro_rules! varint {
    ($ty:ty, $proto_ty:ident) => (
        varint!($ty, $proto_ty,
                to_uint64(value) { *value as u64 },
                from_uint64(value) { value as $ty });
    );

    ($ty:ty, $proto_ty:ident,
     to_uint64($to_uint64_value:ident) $to_uint64:expr,
     from_uint64($from_uint64_value:ident) $from_uint64:expr) => (

        pub mod $proto_ty {
            use crate::encoding::*;

            pub fn encode(tag: u32, $to_uint64_value: &$ty, buf: &mut impl BufMut) {
                encode_key(tag, WireType::Varint, buf);
                encode_varint($to_uint64, buf);
            }

            pub fn merge(wire_type: WireType, value: &mut $ty, buf: &mut impl Buf, _ctx: DecodeContext) -> Result<(), DecodeError> {
                check_wire_type(WireType::Varint, wire_type)?;
                let $from_uint64_value = decode_varint(buf)?;
                *value = $from_uint64;
                Ok(())
            }

            encode_repeated!($ty);

            pub fn encode_packed(tag: u32, values: &[$ty], buf: &mut impl BufMut) {
                if values.is_empty() { return; }
                encode_key(tag, WireType::LengthDelimited, buf);
                let len: usize = values.iter().map(|$to_uint64_value| encoded_len_varint($to_uint64)).sum();
                encode_varint(len as u64, buf);
                for $to_uint64_value in values {
                    encode_varint($to_uint64, buf);
                }
            }

            merge_repeated_numeric!($ty, WireType::Varint, merge, merge_repeated);

            #[inline]
            pub fn encoded_len(tag: u32, $to_uint64_value: &$ty) -> usize {
                key_len(tag) + encoded_len_varint($to_uint64)
            }

            #[inline]
            pub fn encoded_len_repeated(tag: u32, values: &[$ty]) -> usize {
                key_len(tag) * values.len() + values.iter().map(|$to_uint64_value| encoded_len_varint($to_uint64)).sum::<usize>()
            }

            #[inline]
            pub fn encoded_len_packed(tag: u32, values: &[$ty]) -> usize {
                if values.is_empty() {
                    0
                } else {
                    let len = values.iter().map(|$to_uint64_value| encoded_len_varint($to_uint64)).sum::<usize>();
                    key_len(tag) + encoded_len_varint(len as u64) + len
                }
            }
        }
    );
}

varint!(bool, bool,
        to_uint64(value) u64::from(*value),
        from_uint64(value) value != 0);
varint!(i32, int32);
varint!(i64, int64);
varint!(u32, uint32);
varint!(u64, uint64);
varint!(i32, sint32,
        to_uint64(value) { ((value << 1) ^ (value >> 31)) as u32 as u64 },
        from_uint64(value) {
            let value = value as u32;
            ((value >> 1) as i32) ^ (-((value & 1) as i32))
        });
varint!(i64, sint64,
        to_uint64(value) { ((value << 1) ^ (value >> 63)) as u64 },
        from_uint64(value) { ((value >> 1) as i64) ^ (-((value & 1) as i64)) });

/// Macro which emits a module containing a set of encoding functions for a
/// fixed-width numeric type.
macro_rules! fixed_width {
    ($ty:ty, $width:expr, $wire_type:expr, $proto_ty:ident, $put:ident, $get:ident) => {
        pub mod $proto_ty {
            use crate::encoding::*;

            pub fn encode(tag: u32, value: &$ty, buf: &mut impl BufMut) {
                encode_key(tag, $wire_type, buf);
                buf.$put(*value);
            }

            pub fn merge(wire_type: WireType, value: &mut $ty, buf: &mut impl Buf, _ctx: DecodeContext) -> Result<(), DecodeError> {
                check_wire_type($wire_type, wire_type)?;
                if buf.remaining() < $width {
                    return Err(DecodeError::from_kind(crate::error::DecodeErrorKind::BufferUnderflow));
                }
                *value = buf.$get();
                Ok(())
            }

            encode_repeated!($ty);

            pub fn encode_packed(tag: u32, values: &[$ty], buf: &mut impl BufMut) {
                if values.is_empty() { return; }
                encode_key(tag, WireType::LengthDelimited, buf);
                encode_varint(($width * values.len()) as u64, buf);
                for value in values {
                    buf.$put(*value);
                }
            }

            pub fn merge_repeated(
                wire_type: WireType,
                values: &mut Vec<$ty>,
                buf: &mut impl Buf,
                ctx: DecodeContext,
            ) -> Result<(), DecodeError> {
                if wire_type == WireType::LengthDelimited {
                    merge_loop(values, buf, ctx, |values, buf, ctx| {
                        let mut value = Default::default();
                        merge($wire_type, &mut value, buf, ctx)?;
                        values.push(value);
                        Ok(())
                    })
                } else {
                    check_wire_type($wire_type, wire_type)?;
                    let mut value = Default::default();
                    merge(wire_type, &mut value, buf, ctx)?;
                    values.push(value);
                    Ok(())
                }
            }

            #[inline]
            pub fn encoded_len(tag: u32, _value: &$ty) -> usize {
                key_len(tag) + $width
            }

            #[inline]
            pub fn encoded_len_repeated(tag: u32, values: &[$ty]) -> usize {
                (key_len(tag) + $width) * values.len()
            }

            #[inline]
            pub fn encoded_len_packed(tag: u32, values: &[$ty]) -> usize {
                if values.is_empty() {
                    0
                } else {
                    let len = $width * values.len();
                    key_len(tag) + encoded_len_varint(len as u64) + len
                }
            }
        }
    };
}

fixed_width!(f32, 4, WireType::ThirtyTwoBit, float, put_f32_le, get_f32_le);
fixed_width!(f64, 8, WireType::SixtyFourBit, double, put_f64_le, get_f64_le);
fixed_width!(u32, 4, WireType::ThirtyTwoBit, fixed32, put_u32_le, get_u32_le);
fixed_width!(u64, 8, WireType::SixtyFourBit, fixed64, put_u64_le, get_u64_le);
fixed_width!(i32, 4, WireType::ThirtyTwoBit, sfixed32, put_i32_le, get_i32_le);
fixed_width!(i64, 8, WireType::SixtyFourBit, sfixed64, put_i64_le, get_i64_le);

/// Encoding for `string` fields: identical wire shape to `bytes`, but the
/// payload is validated as UTF-8 on decode (`DecodeErrorKind::InvalidUtf8`
/// on failure).
pub mod string {
    use super::*;

    pub fn encode(tag: u32, value: &String, buf: &mut impl BufMut) {
        encode_key(tag, WireType::LengthDelimited, buf);
        encode_varint(value.len() as u64, buf);
        buf.put_slice(value.as_bytes());
    }

    pub fn merge(wire_type: WireType, value: &mut String, buf: &mut impl Buf, _ctx: DecodeContext) -> Result<(), DecodeError> {
        check_wire_type(WireType::LengthDelimited, wire_type)?;
        let len = decode_varint(buf)?;
        if len > buf.remaining() as u64 {
            return Err(DecodeError::from_kind(DecodeErrorKind::TruncatedField));
        }
        let len = len as usize;
        let mut bytes = vec![0u8; len];
        buf.copy_to_slice(&mut bytes);
        *value = String::from_utf8(bytes)
            .map_err(|_| DecodeError::from_kind(DecodeErrorKind::InvalidUtf8))?;
        Ok(())
    }

    encode_repeated!(String);

    pub fn merge_repeated(
        wire_type: WireType,
        values: &mut Vec<String>,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        check_wire_type(WireType::LengthDelimited, wire_type)?;
        let mut value = String::new();
        merge(wire_type, &mut value, buf, ctx)?;
        values.push(value);
        Ok(())
    }

    #[inline]
    pub fn encoded_len(tag: u32, value: &String) -> usize {
        key_len(tag) + encoded_len_varint(value.len() as u64) + value.len()
    }

    #[inline]
    pub fn encoded_len_repeated(tag: u32, values: &[String]) -> usize {
        key_len(tag) * values.len()
            + values
                .iter()
                .map(|v| encoded_len_varint(v.len() as u64) + v.len())
                .sum::<usize>()
    }
}

/// Encoding for `bytes` fields.
pub mod bytes {
    use super::*;

    pub fn encode(tag: u32, value: &Vec<u8>, buf: &mut impl BufMut) {
        encode_key(tag, WireType::LengthDelimited, buf);
        encode_varint(value.len() as u64, buf);
        buf.put_slice(value);
    }

    pub fn merge(wire_type: WireType, value: &mut Vec<u8>, buf: &mut impl Buf, _ctx: DecodeContext) -> Result<(), DecodeError> {
        check_wire_type(WireType::LengthDelimited, wire_type)?;
        let len = decode_varint(buf)?;
        if len > buf.remaining() as u64 {
            return Err(DecodeError::from_kind(DecodeErrorKind::TruncatedField));
        }
        let len = len as usize;
        value.clear();
        value.resize(len, 0);
        buf.copy_to_slice(value);
        Ok(())
    }

    encode_repeated!(Vec<u8>);

    pub fn merge_repeated(
        wire_type: WireType,
        values: &mut Vec<Vec<u8>>,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        check_wire_type(WireType::LengthDelimited, wire_type)?;
        let mut value = Vec::new();
        merge(wire_type, &mut value, buf, ctx)?;
        values.push(value);
        Ok(())
    }

    #[inline]
    pub fn encoded_len(tag: u32, value: &Vec<u8>) -> usize {
        key_len(tag) + encoded_len_varint(value.len() as u64) + value.len()
    }

    #[inline]
    pub fn encoded_len_repeated(tag: u32, values: &[Vec<u8>]) -> usize {
        key_len(tag) * values.len()
            + values
                .iter()
                .map(|v| encoded_len_varint(v.len() as u64) + v.len())
                .sum::<usize>()
    }
}

/// Encoding for nested `message` fields: length-delimited framing around a
/// recursive call into the nested type's own `encode_raw`/`merge`.
pub mod message {
    use super::*;
    use crate::Message;

    pub fn encode<M>(tag: u32, msg: &M, buf: &mut impl BufMut)
    where
        M: Message,
    {
        encode_key(tag, WireType::LengthDelimited, buf);
        encode_varint(msg.encoded_len() as u64, buf);
        msg.encode_raw(buf);
    }

    pub fn merge<M>(
        wire_type: WireType,
        msg: &mut M,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        M: Message,
    {
        check_wire_type(WireType::LengthDelimited, wire_type)?;
        ctx.limit_reached()?;
        merge_loop(msg, buf, ctx.enter_recursion(), |msg, buf, ctx| {
            let (tag, wire_type) = decode_key(buf)?;
            msg.merge_field(tag, wire_type, buf, ctx)
        })
    }

    pub fn encode_repeated<M>(tag: u32, values: &[M], buf: &mut impl BufMut)
    where
        M: Message,
    {
        for value in values {
            encode(tag, value, buf);
        }
    }

    pub fn merge_repeated<M>(
        wire_type: WireType,
        values: &mut Vec<M>,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        M: Message + Default,
    {
        check_wire_type(WireType::LengthDelimited, wire_type)?;
        let mut value = M::default();
        merge(wire_type, &mut value, buf, ctx)?;
        values.push(value);
        Ok(())
    }

    #[inline]
    pub fn encoded_len<M>(tag: u32, msg: &M) -> usize
    where
        M: Message,
    {
        let len = msg.encoded_len();
        key_len(tag) + encoded_len_varint(len as u64) + len
    }

    #[inline]
    pub fn encoded_len_repeated<M>(tag: u32, values: &[M]) -> usize
    where
        M: Message,
    {
        values.iter().map(|m| encoded_len(tag, m)).sum()
    }
}

/// Encoding for `map<K, V>` fields. Map entries are modeled on the wire as a
/// synthetic two-field message (`key` at tag 1, `value` at tag 2). Iteration
/// uses a `BTreeMap` for deterministic, stable re-encoding — see DESIGN.md.
pub mod map {
    use super::*;

    /// Encodes a single map entry as a length-delimited field of `tag`.
    pub fn encode_entry<K, V>(
        tag: u32,
        key: &K,
        value: &V,
        buf: &mut impl BufMut,
        encode_key_fn: impl Fn(u32, &K, &mut dyn BufMut),
        encode_value_fn: impl Fn(u32, &V, &mut dyn BufMut),
        key_len_fn: impl Fn(u32, &K) -> usize,
        value_len_fn: impl Fn(u32, &V) -> usize,
    ) {
        let len = key_len_fn(1, key) + value_len_fn(2, value);
        encode_key(tag, WireType::LengthDelimited, buf);
        encode_varint(len as u64, buf);
        encode_key_fn(1, key, buf);
        encode_value_fn(2, value, buf);
    }

    pub fn encoded_len_entry<K, V>(
        tag: u32,
        key: &K,
        value: &V,
        key_len_fn: impl Fn(u32, &K) -> usize,
        value_len_fn: impl Fn(u32, &V) -> usize,
    ) -> usize {
        let len = key_len_fn(1, key) + value_len_fn(2, value);
        key_len(tag) + encoded_len_varint(len as u64) + len
    }

    pub fn encoded_len<K, V>(
        tag: u32,
        values: &BTreeMap<K, V>,
        key_len_fn: impl Fn(u32, &K) -> usize,
        value_len_fn: impl Fn(u32, &V) -> usize,
    ) -> usize {
        values
            .iter()
            .map(|(k, v)| encoded_len_entry(tag, k, v, &key_len_fn, &value_len_fn))
            .sum()
    }
}

/// Parses the given `buf` entirely as a stream of `(tag, wire_type, payload)`
/// triples. Used by tests and tooling that want to inspect a message's raw
/// wire representation without decoding it through a schema.
pub fn parse_fields(mut buf: Bytes) -> Result<Vec<(u32, WireType, Bytes)>, DecodeError> {
    let mut out = Vec::new();
    while buf.has_remaining() {
        let (tag, wire_type) = decode_key(&mut buf)?;
        let payload = match wire_type {
            WireType::Varint => {
                let mut unknown = Vec::new();
                let value = decode_varint(&mut buf)?;
                encode_varint(value, &mut unknown);
                Bytes::from(unknown)
            }
            WireType::ThirtyTwoBit => {
                if buf.remaining() < 4 {
                    return Err(DecodeError::from_kind(DecodeErrorKind::BufferUnderflow));
                }
                buf.copy_to_bytes(4)
            }
            WireType::SixtyFourBit => {
                if buf.remaining() < 8 {
                    return Err(DecodeError::from_kind(DecodeErrorKind::BufferUnderflow));
                }
                buf.copy_to_bytes(8)
            }
            WireType::LengthDelimited => {
                let len = decode_varint(&mut buf)?;
                if len > buf.remaining() as u64 {
                    return Err(DecodeError::from_kind(DecodeErrorKind::TruncatedField));
                }
                buf.copy_to_bytes(len as usize)
            }
            WireType::StartGroup | WireType::EndGroup => {
                return Err(DecodeError::from_kind(DecodeErrorKind::UnsupportedWireType));
            }
        };
        out.push((tag, wire_type, payload));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_scenario() {
        let mut buf = Vec::new();
        string::encode(2, &"testing".to_string(), &mut buf);
        assert_eq!(
            buf,
            vec![0x12, 0x07, 0x74, 0x65, 0x73, 0x74, 0x69, 0x6E, 0x67]
        );
    }

    #[test]
    fn sint32_zigzag_scenario() {
        let mut buf = Vec::new();
        sint32::encode(1, &-1, &mut buf);
        assert_eq!(buf, vec![0x08, 0x01]);

        let mut buf = Vec::new();
        sint32::encode(1, &1, &mut buf);
        assert_eq!(buf, vec![0x08, 0x02]);
    }

    #[test]
    fn packed_repeated_scenario() {
        let mut buf = Vec::new();
        int32::encode_packed(1, &[1, 2, 3], &mut buf);
        assert_eq!(buf, vec![0x0A, 0x03, 0x01, 0x02, 0x03]);
    }
}
