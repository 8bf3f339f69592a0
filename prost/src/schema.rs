//! Message schema metadata: per-message field tables, descriptors, and
//! the lookup indices built from them.
//!
//! Real generated Protobuf code in a typed language never discovers its
//! field table at runtime through reflection: the table is just data, so a
//! derive macro can emit it as a `'static` slice and pay for the lookup
//! structures once per type, cached behind a `OnceLock` rather than
//! re-scanned on every access.

use std::collections::BTreeMap;

use crate::encoding::wire_type::WireType;

/// The enumerated Protobuf scalar-type tags, plus `Message`, `Enum`, and
/// `Map` for the non-scalar field kinds the schema needs to describe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProtoType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    Enum,
    Message,
    Map,
}

impl ProtoType {
    /// The wire type used to encode a single, non-packed value of this
    /// scalar type. `Map` and `Message` are always `LEN`; `Enum` behaves
    /// like `Int32` on the wire (a plain varint).
    pub const fn wire_type(self) -> WireType {
        use ProtoType::*;
        match self {
            Int32 | Int64 | Uint32 | Uint64 | Sint32 | Sint64 | Bool | Enum => WireType::Varint,
            Fixed32 | Sfixed32 | Float => WireType::ThirtyTwoBit,
            Fixed64 | Sfixed64 | Double => WireType::SixtyFourBit,
            String | Bytes | Message | Map => WireType::LengthDelimited,
        }
    }

    /// Whether a `repeated` field of this type is eligible for packed
    /// encoding. Only numeric/bool/enum scalars qualify; strings, bytes,
    /// messages, and maps never pack.
    pub const fn is_packable(self) -> bool {
        !matches!(self, ProtoType::String | ProtoType::Bytes | ProtoType::Message | ProtoType::Map)
    }

    /// `true` for the scalar kinds whose zero value also serves as their
    /// JSON/dict default (used by `to_dict`'s default-omission rule).
    pub const fn is_64_bit_integer(self) -> bool {
        matches!(
            self,
            ProtoType::Int64 | ProtoType::Uint64 | ProtoType::Sint64 | ProtoType::Fixed64 | ProtoType::Sfixed64
        )
    }
}

/// A field descriptor: tag, declared type, optional map element types,
/// optional one-of group, and optional wrapper-scalar marker.
#[derive(Clone, Copy, Debug)]
pub struct FieldDescriptor {
    /// The field's name as declared on the generated struct.
    pub name: &'static str,
    pub tag: u32,
    pub proto_type: ProtoType,
    /// Set iff `proto_type` is `Map`: `(key_type, value_type)`.
    pub map_types: Option<(ProtoType, ProtoType)>,
    /// Set iff this field is a member of a one-of group.
    pub group: Option<&'static str>,
    /// Set iff this is a `MESSAGE`-typed field wrapping a Google scalar
    /// wrapper type (`Int32Value`, etc).
    pub wraps: Option<ProtoType>,
    /// `true` for `repeated` fields (including packed numeric fields).
    pub repeated: bool,
}

/// Per-message-class metadata, built once from the generated field table
/// and cached behind a `OnceLock` at the call site (see
/// `ReflectMessage::descriptor`). The canonical serialization order is
/// simply `fields` itself: derive macros emit it already tag-sorted, so
/// there is no separate "sorted field order" structure to maintain.
pub struct MessageDescriptor {
    pub name: &'static str,
    /// Declared fields in ascending-tag (canonical serialization) order.
    /// Includes, for oneof-bearing messages, one synthetic entry per
    /// oneof variant (each carrying `group: Some(field_name)`) appended
    /// after the plain fields.
    pub fields: Vec<FieldDescriptor>,
    by_tag: BTreeMap<u32, usize>,
    by_name: BTreeMap<&'static str, usize>,
}

impl MessageDescriptor {
    /// Builds a descriptor from a field table, eagerly indexing it by tag
    /// and name. Intended to be invoked once per message type, behind a
    /// `OnceLock<MessageDescriptor>` inside derive-generated code, e.g.:
    ///
    /// ```ignore
    /// fn descriptor() -> &'static prost::schema::MessageDescriptor {
    ///     static DESCRIPTOR: std::sync::OnceLock<prost::schema::MessageDescriptor> =
    ///         std::sync::OnceLock::new();
    ///     DESCRIPTOR.get_or_init(|| prost::schema::MessageDescriptor::new("Foo", fields))
    /// }
    /// ```
    pub fn new(name: &'static str, fields: Vec<FieldDescriptor>) -> MessageDescriptor {
        let mut by_tag = BTreeMap::new();
        let mut by_name = BTreeMap::new();
        for (i, field) in fields.iter().enumerate() {
            by_tag.insert(field.tag, i);
            by_name.insert(field.name, i);
        }
        MessageDescriptor {
            name,
            fields,
            by_tag,
            by_name,
        }
    }

    pub fn field_by_tag(&self, tag: u32) -> Option<&FieldDescriptor> {
        let idx = *self.by_tag.get(&tag)?;
        Some(&self.fields[idx])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        let idx = *self.by_name.get(name)?;
        Some(&self.fields[idx])
    }

    /// The distinct one-of group names declared on this message, in the
    /// order their first member field appears.
    pub fn groups(&self) -> Vec<&'static str> {
        let mut seen = Vec::new();
        for field in &self.fields {
            if let Some(group) = field.group {
                if !seen.contains(&group) {
                    seen.push(group);
                }
            }
        }
        seen
    }

    /// The fields belonging to the named one-of group, in tag order.
    pub fn group_fields(&self, group: &str) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(move |f| f.group == Some(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor {
                name: "a",
                tag: 1,
                proto_type: ProtoType::Int32,
                map_types: None,
                group: Some("g"),
                wraps: None,
                repeated: false,
            },
            FieldDescriptor {
                name: "b",
                tag: 2,
                proto_type: ProtoType::String,
                map_types: None,
                group: Some("g"),
                wraps: None,
                repeated: false,
            },
        ]
    }

    #[test]
    fn lookup_by_tag_and_name() {
        let descriptor = MessageDescriptor::new("Test", fields());
        assert_eq!(descriptor.field_by_tag(2).unwrap().name, "b");
        assert_eq!(descriptor.field_by_name("a").unwrap().tag, 1);
        assert!(descriptor.field_by_tag(99).is_none());
        assert_eq!(descriptor.groups(), vec!["g"]);
        assert_eq!(descriptor.group_fields("g").count(), 2);
    }
}
