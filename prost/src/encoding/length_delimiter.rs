use bytes::{Buf, BufMut};

use crate::encoding::varint::{decode_varint, encode_varint, encoded_len_varint};
use crate::error::DecodeErrorKind;
use crate::DecodeError;

/// Encodes a Protobuf length delimiter to the buffer.
///
/// See [Message.encode_length_delimited] for more info.
pub fn encode_length_delimiter(length: usize, buf: &mut impl BufMut) -> Result<(), crate::EncodeError> {
    let length = length as u64;
    let required = encoded_len_varint(length);
    let remaining = buf.remaining_mut();
    if required > remaining {
        return Err(crate::EncodeError::new(required, remaining));
    }
    encode_varint(length, buf);
    Ok(())
}

/// Decodes a Protobuf length delimiter from the buffer.
pub fn decode_length_delimiter(mut buf: impl Buf) -> Result<usize, DecodeError> {
    let length = decode_varint(&mut buf)?;
    if length > usize::MAX as u64 {
        return Err(DecodeError::from_kind(DecodeErrorKind::Other(
            "length delimiter exceeds maximum usize value".into(),
        )));
    }
    Ok(length as usize)
}

/// Returns the encoded length of the length delimiter for a length of the given size.
pub fn length_delimiter_len(length: usize) -> usize {
    encoded_len_varint(length as u64)
}
