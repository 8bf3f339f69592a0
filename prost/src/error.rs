//! Protobuf encoding and decoding errors.

use std::fmt;

/// The reason a [`DecodeError`] was raised.
///
/// Matches the error taxonomy of the wire-format and JSON codecs: unknown
/// tags and duplicate scalar tags are *not* represented here because they are
/// not errors (see the crate-level docs).
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// A varint was not terminated within 10 bytes.
    MalformedVarint,
    /// A length-delimited field declared a length longer than the remaining
    /// buffer.
    TruncatedField,
    /// A `string` field's bytes were not valid UTF-8.
    InvalidUtf8,
    /// A JSON enum name did not match any member of the target enum.
    UnknownEnumName,
    /// An internal contract was violated (e.g. a `MAP` field descriptor
    /// missing its `map_types`, or a oneof tag not present in any variant).
    /// This indicates a bug in generated code, not malformed input.
    SchemaViolation,
    /// Wire type 3, 4, 6, or 7 was encountered. Groups (3/4) are not
    /// supported by this runtime; 6/7 are not defined by protobuf at all.
    UnsupportedWireType,
    /// The input buffer ran out of bytes while a field still expected more.
    BufferUnderflow,
    /// Message nesting exceeded the recursion limit.
    RecursionLimitReached,
    /// Catch-all for malformed input with a human-readable description.
    Other(String),
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::MalformedVarint => write!(f, "malformed varint"),
            DecodeErrorKind::TruncatedField => write!(f, "truncated field"),
            DecodeErrorKind::InvalidUtf8 => write!(f, "invalid utf-8"),
            DecodeErrorKind::UnknownEnumName => write!(f, "unknown enum name"),
            DecodeErrorKind::SchemaViolation => write!(f, "schema violation"),
            DecodeErrorKind::UnsupportedWireType => write!(f, "unsupported wire type"),
            DecodeErrorKind::BufferUnderflow => write!(f, "buffer underflow"),
            DecodeErrorKind::RecursionLimitReached => write!(f, "recursion limit reached"),
            DecodeErrorKind::Other(msg) => write!(f, "{msg}"),
        }
    }
}

/// An error indicating that a buffer did not contain a valid Protobuf
/// message, or that a canonical-JSON document did not match the declared
/// schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeError {
    kind: DecodeErrorKind,
}

impl DecodeError {
    /// Creates a new `DecodeError` with a free-form description.
    pub fn new(description: impl Into<String>) -> DecodeError {
        DecodeError {
            kind: DecodeErrorKind::Other(description.into()),
        }
    }

    /// Creates a new `DecodeError` with a specific, matchable kind.
    pub fn from_kind(kind: DecodeErrorKind) -> DecodeError {
        DecodeError { kind }
    }

    /// Returns the kind of error that occurred.
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to decode Protobuf message: {}", self.kind)
    }
}

impl std::error::Error for DecodeError {}

/// An error indicating that a message could not be encoded because the
/// provided buffer had insufficient capacity. Meant to be used as a return
/// value for `encode`, which should always succeed against a
/// sufficiently-sized buffer, so unlike `DecodeError` there is no need for a
/// kind taxonomy here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeError {
    required: usize,
    remaining: usize,
}

impl EncodeError {
    /// Creates a new `EncodeError`.
    pub fn new(required: usize, remaining: usize) -> EncodeError {
        EncodeError {
            required,
            remaining,
        }
    }

    /// Returns the required buffer capacity to encode the message.
    pub fn required_capacity(&self) -> usize {
        self.required
    }

    /// Returns the remaining length in the provided buffer at the time of encoding.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to encode Protobuf message; insufficient buffer capacity (required: {}, remaining: {})",
            self.required, self.remaining
        )
    }
}

impl std::error::Error for EncodeError {}

/// An unknown value was encountered for a closed enum, e.g. while resolving
/// an `Enumeration::from_i32`/`from_name` call. Kept distinct from
/// `DecodeError` because enum-value resolution is also used outside of
/// wire/JSON decoding (e.g. by generated accessor methods).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownEnumValue(pub i32);

impl fmt::Display for UnknownEnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown enum value: {}", self.0)
    }
}

impl std::error::Error for UnknownEnumValue {}
