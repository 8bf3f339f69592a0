//! Hand-authored stand-ins for generated code, used by the integration
//! tests in `tests/`. These are exactly what `#[derive(Message)]` and
//! friends expect a code generator to emit: plain structs/enums carrying
//! `#[prost(...)]` attributes, no macro magic of their own.

use prost::{Enumeration, Message, Oneof};

/// `{ x: int32 }` — the canonical int32-varint wire-format scenario.
#[derive(Clone, Debug, PartialEq, Message)]
pub struct Scalar {
    #[prost(int32, tag = "1")]
    pub x: i32,
    #[prost(unknown_fields)]
    pub unknown_fields: Vec<u8>,
    #[prost(on_wire)]
    pub on_wire: bool,
}

/// `{ s: string }` — scenario 2.
#[derive(Clone, Debug, PartialEq, Message)]
pub struct StringMsg {
    #[prost(string, tag = "2")]
    pub s: String,
    #[prost(unknown_fields)]
    pub unknown_fields: Vec<u8>,
    #[prost(on_wire)]
    pub on_wire: bool,
}

/// `{ v: sint32 }` — scenario 3 (zig-zag).
#[derive(Clone, Debug, PartialEq, Message)]
pub struct Signed {
    #[prost(sint32, tag = "1")]
    pub v: i32,
    #[prost(unknown_fields)]
    pub unknown_fields: Vec<u8>,
    #[prost(on_wire)]
    pub on_wire: bool,
}

/// `{ nums: repeated int32 }` — scenario 4 (packed repeated).
#[derive(Clone, Debug, PartialEq, Message)]
pub struct PackedNums {
    #[prost(int32, repeated, tag = "1")]
    pub nums: Vec<i32>,
    #[prost(unknown_fields)]
    pub unknown_fields: Vec<u8>,
    #[prost(on_wire)]
    pub on_wire: bool,
}

/// The one-of group of scenario 5: `a@1: int32, b@2: string` in group `g`.
#[derive(Clone, Debug, PartialEq, Oneof)]
pub enum Group {
    #[prost(int32, tag = "1")]
    A(i32),
    #[prost(string, tag = "2")]
    B(String),
}

#[derive(Clone, Debug, PartialEq, Message)]
pub struct WithOneof {
    #[prost(oneof = "Group", tags = "1,2")]
    pub g: Option<Group>,
    #[prost(unknown_fields)]
    pub unknown_fields: Vec<u8>,
    #[prost(on_wire)]
    pub on_wire: bool,
}

/// A proto3 enum used by `Compound.color` below.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Enumeration)]
#[repr(i32)]
pub enum Color {
    Red = 0,
    Green = 1,
    Blue = 2,
}

#[derive(Clone, Debug, PartialEq, Message)]
pub struct Inner {
    #[prost(string, tag = "1")]
    pub label: String,
    #[prost(unknown_fields)]
    pub unknown_fields: Vec<u8>,
    #[prost(on_wire)]
    pub on_wire: bool,
}

/// Exercises nested messages, maps, enums, repeated scalars, and the
/// `Int32Value`/`Timestamp` well-known-type bridge in one message, the way
/// a generated "kitchen sink" test message from a `.proto` file would.
#[derive(Clone, Debug, PartialEq, Message)]
pub struct Compound {
    #[prost(message, optional, tag = "1")]
    pub inner: Option<Inner>,
    #[prost(map = "string, int32", tag = "2")]
    pub counts: std::collections::BTreeMap<String, i32>,
    #[prost(enumeration = "Color", tag = "3")]
    pub color: i32,
    #[prost(message, optional, tag = "4", wraps = "int32")]
    pub wrapped: Option<prost_types::Int32Value>,
    #[prost(message, optional, tag = "5")]
    pub created_at: Option<prost_types::Timestamp>,
    #[prost(int64, repeated, tag = "6")]
    pub ids: Vec<i64>,
    #[prost(unknown_fields)]
    pub unknown_fields: Vec<u8>,
    #[prost(on_wire)]
    pub on_wire: bool,
}

/// Self-referential message (a singly linked list), exercising `boxed`
/// nested-message fields: without the `Box` indirection the generated
/// struct would have infinite size.
#[derive(Clone, Debug, PartialEq, Message)]
pub struct LinkedNode {
    #[prost(int32, tag = "1")]
    pub value: i32,
    #[prost(message, optional, tag = "2", boxed)]
    pub next: Option<Box<LinkedNode>>,
    #[prost(unknown_fields)]
    pub unknown_fields: Vec<u8>,
    #[prost(on_wire)]
    pub on_wire: bool,
}

/// A map whose value type is itself a message (`map<string, Inner>`),
/// exercising the map-entry encoding's message-value path separately from
/// `Compound.counts`' scalar-value path.
#[derive(Clone, Debug, PartialEq, Message)]
pub struct MapOfMessages {
    #[prost(map = "string, Inner", tag = "1")]
    pub entries: std::collections::BTreeMap<String, Inner>,
    #[prost(unknown_fields)]
    pub unknown_fields: Vec<u8>,
    #[prost(on_wire)]
    pub on_wire: bool,
}
