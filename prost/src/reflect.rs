//! The reflective surface layered on top of [`Message`]: presence ("has
//! this message ever been populated"), one-of current-selection,
//! unknown-field preservation, and the JSON bridge.
//!
//! A dynamically-typed runtime implements all of this once on a shared
//! base class using attribute reflection. A typed target can't share a
//! single implementation across unrelated structs, so `#[derive(Message)]`
//! instead emits one copy of this trait's methods per message type, using
//! the static field table it already built for wire encoding.

#[cfg(feature = "serde-json")]
use serde_json::Value;

#[cfg(feature = "serde-json")]
use crate::json::JsonConfig;
use crate::schema::MessageDescriptor;
use crate::{DecodeError, Message};

/// The reflective extension of [`Message`]: schema access, unknown-field
/// preservation, emptiness, and the canonical JSON codec.
pub trait ReflectMessage: Message {
    /// The per-class metadata built once from this message's field table.
    fn descriptor() -> &'static MessageDescriptor
    where
        Self: Sized;

    /// The raw bytes of every field parsed from the wire whose tag was
    /// not present in the schema, concatenated in arrival order.
    fn unknown_fields(&self) -> &[u8];

    /// Mutable access to the unknown-field buffer, used by `merge_field`
    /// to append newly-seen unknown tags.
    fn unknown_fields_mut(&mut self) -> &mut Vec<u8>;

    /// `true` iff every field holds its declared zero value and there are
    /// no preserved unknown fields.
    fn is_empty(&self) -> bool;

    /// `true` iff this instance was ever produced by decoding wire bytes
    /// (via `decode`/`merge`/`decode_length_delimited`/
    /// `merge_length_delimited`), as opposed to being freshly constructed
    /// or built with `Default::default()`. Distinct from `is_empty`: a
    /// message decoded from a zero-length buffer is empty but was still
    /// on the wire.
    fn serialized_on_wire(&self) -> bool;

    /// Converts the message to a canonical-JSON-shaped [`Value`].
    #[cfg(feature = "serde-json")]
    fn to_dict(&self, config: JsonConfig) -> Value;

    /// Builds a message from a canonical-JSON-shaped [`Value`]. Unknown
    /// object keys are ignored for forward compatibility; `null` values
    /// leave the corresponding field at its default.
    #[cfg(feature = "serde-json")]
    fn from_dict(value: &Value) -> Result<Self, DecodeError>
    where
        Self: Sized;

    /// Fills `self` in place from a dict, for nested scalar message
    /// fields that `from_dict` mutates rather than replaces.
    #[cfg(feature = "serde-json")]
    fn merge_dict(&mut self, value: &Value) -> Result<(), DecodeError>;

    /// `to_dict` followed by compact or pretty JSON rendering.
    #[cfg(feature = "serde-json")]
    fn to_json(&self, config: JsonConfig, indent: Option<usize>) -> String {
        let value = self.to_dict(config);
        match indent {
            None => serde_json::to_string(&value).expect("Value serialization cannot fail"),
            Some(width) => {
                let buf = Vec::new();
                let indent_bytes = vec![b' '; width];
                let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
                let mut ser = serde_json::Serializer::with_formatter(buf, formatter);
                serde::Serialize::serialize(&value, &mut ser).expect("Value serialization cannot fail");
                String::from_utf8(ser.into_inner()).expect("JSON output is always valid UTF-8")
            }
        }
    }

    /// `from_dict` over parsed JSON text.
    #[cfg(feature = "serde-json")]
    fn from_json(text: &str) -> Result<Self, DecodeError>
    where
        Self: Sized,
    {
        let value: Value = serde_json::from_str(text)
            .map_err(|err| DecodeError::new(format!("invalid JSON: {err}")))?;
        Self::from_dict(&value)
    }
}

/// Implemented by `#[derive(Oneof)]` enums so the generic [`which_one_of`]
/// helper can report which variant, if any, is selected. Representing a
/// one-of group as `Option<GeneratedEnum>` makes separate presence
/// bookkeeping unnecessary: the enum discriminant *is* the presence
/// indicator.
pub trait OneofVariantName {
    /// The field name of the currently-selected variant, exactly as
    /// declared on the `Oneof` enum.
    fn variant_name(&self) -> &'static str;
}

/// Reports which field, if any, is currently selected in a one-of group.
/// Pass a message's one-of field (`&msg.group_field`, typed
/// `Option<SomeOneof>`) and get back the selected field's name and a
/// reference to its value, or `("", None)` if the group is unset.
pub fn which_one_of<T: OneofVariantName>(group: &Option<T>) -> (&'static str, Option<&T>) {
    match group {
        Some(value) => (value.variant_name(), Some(value)),
        None => ("", None),
    }
}

/// Reports whether `message` was ever decoded from wire bytes. Free-function
/// form of [`ReflectMessage::serialized_on_wire`], mirroring [`which_one_of`].
pub fn serialized_on_wire<T: ReflectMessage>(message: &T) -> bool {
    message.serialized_on_wire()
}
