//! A reflective Protocol Buffers message runtime.
//!
//! This crate is the wire-format codec and schema-aware message core:
//! varint/zig-zag/fixed-width primitives, a per-message-class field table
//! built once and cached, and presence tracking that distinguishes "never
//! set" from "set to the zero value" for one-of groups and wrapper types.
//! `prost-types` layers the Timestamp/Duration/wrapper bridge and
//! canonical JSON handling on top of it, and `prost-derive` generates the
//! per-message glue so none of this needs runtime reflection.

pub use bytes;

mod enumeration;
mod error;
mod message;
mod reflect;
pub mod schema;

#[doc(hidden)]
pub mod encoding;

#[cfg(feature = "serde-json")]
pub mod json;

pub use crate::encoding::length_delimiter::{
    decode_length_delimiter, encode_length_delimiter, length_delimiter_len,
};
pub use crate::enumeration::Enumeration;
pub use crate::error::{DecodeError, DecodeErrorKind, EncodeError, UnknownEnumValue};
pub use crate::message::Message;
pub use crate::reflect::{serialized_on_wire, which_one_of, OneofVariantName, ReflectMessage};

// See `encoding::DecodeContext` for more info. 100 is the default
// recursion limit the C++ reference implementation uses.
const RECURSION_LIMIT: u32 = 100;

// Re-export `#[derive(Message, Oneof, Enumeration)]`, following the same
// pattern serde uses for its derive macros: enabled by default so callers
// don't need a direct `prost-derive` dependency.
#[cfg(feature = "derive")]
#[allow(unused_imports)]
#[macro_use]
extern crate prost_derive;
#[cfg(feature = "derive")]
#[doc(hidden)]
pub use prost_derive::*;

/// Re-exported for use by derive-generated code; not part of the public API.
#[doc(hidden)]
pub mod __private {
    #[cfg(feature = "serde-json")]
    pub use serde_json;
}
