//! Per-field code generation shared by the `Message` and `Oneof` derives.
//!
//! Each function below takes the already-parsed [`FieldAttrs`] plus a
//! `quote`-able accessor for the field's storage and emits one piece of a
//! larger generated `impl` (an `encode_raw` statement, a `merge_field` match
//! arm, ...). Consolidated into one module rather than split by field kind
//! (scalar/message/map/...), since the reflective layer's codegen needs all
//! of those pieces threaded through the same JSON/schema logic anyway.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::attrs::{FieldAttrs, Shape, TypeKeyword};

/// The `prost::encoding` module implementing a scalar type's wire codec.
fn module(tk: TypeKeyword) -> syn::Ident {
    format_ident!("{}", tk.encoding_module())
}

pub(crate) fn schema_variant(tk: TypeKeyword) -> TokenStream {
    let variant = format_ident!("{}", tk.schema_variant());
    quote!(::prost::schema::ProtoType::#variant)
}

/// The plain Rust storage type for a bare scalar keyword.
pub fn scalar_rust_type(tk: TypeKeyword) -> TokenStream {
    use TypeKeyword::*;
    match tk {
        Bool => quote!(bool),
        Int32 | Sint32 | Sfixed32 => quote!(i32),
        Int64 | Sint64 | Sfixed64 => quote!(i64),
        Uint32 | Fixed32 => quote!(u32),
        Uint64 | Fixed64 => quote!(u64),
        Float => quote!(f32),
        Double => quote!(f64),
        String => quote!(::std::string::String),
        Bytes => quote!(::std::vec::Vec<u8>),
        Message => quote!(()), // never used directly: message fields carry their own type.
    }
}

/// Generates the statement appended to `encode_raw` for one field.
pub fn encode_stmt(member: &TokenStream, attrs: &FieldAttrs) -> TokenStream {
    let tag = attrs.tag.unwrap_or(0);
    match &attrs.shape {
        Shape::Plain(tk) => {
            let m = module(*tk);
            if matches!(tk, TypeKeyword::Message) {
                quote! {
                    if let ::std::option::Option::Some(ref value) = #member {
                        ::prost::encoding::message::encode(#tag, value, buf);
                    }
                }
            } else if attrs.force {
                quote!(::prost::encoding::#m::encode(#tag, &#member, buf);)
            } else {
                quote! {
                    if #member != ::std::default::Default::default() {
                        ::prost::encoding::#m::encode(#tag, &#member, buf);
                    }
                }
            }
        }
        Shape::Optional(tk) => {
            let m = module(*tk);
            quote! {
                if let ::std::option::Option::Some(ref value) = #member {
                    ::prost::encoding::#m::encode(#tag, value, buf);
                }
            }
        }
        Shape::Repeated(tk) => {
            let m = module(*tk);
            if matches!(tk, TypeKeyword::Message) {
                quote!(::prost::encoding::message::encode_repeated(#tag, &#member, buf);)
            } else if tk.schema_variant() != "String" && tk.schema_variant() != "Bytes" && attrs.packed != Some(false) {
                quote!(::prost::encoding::#m::encode_packed(#tag, &#member, buf);)
            } else {
                quote!(::prost::encoding::#m::encode_repeated(#tag, &#member, buf);)
            }
        }
        Shape::Enumeration(_) => quote! {
            if #member != 0 {
                ::prost::encoding::int32::encode(#tag, &#member, buf);
            }
        },
        Shape::RepeatedEnumeration(_) => {
            quote!(::prost::encoding::int32::encode_packed(#tag, &#member, buf);)
        }
        Shape::Map(key, value, value_enum) => map_encode(*key, *value, value_enum.is_some(), tag, member),
        Shape::Oneof(path) => quote! {
            if let ::std::option::Option::Some(ref value) = #member {
                #path::encode(value, buf);
            }
        },
        Shape::UnknownFields => quote!(buf.put_slice(&#member);),
        Shape::OnWire => quote!(),
    }
}

fn map_encode(key: TypeKeyword, value: TypeKeyword, value_is_message: bool, tag: u32, member: &TokenStream) -> TokenStream {
    let key_mod = module(key);
    if value_is_message {
        quote! {
            for (key, value) in &#member {
                let entry_len = ::prost::encoding::#key_mod::encoded_len(1, key)
                    + ::prost::encoding::message::encoded_len(2, value);
                ::prost::encoding::encode_key(#tag, ::prost::encoding::WireType::LengthDelimited, buf);
                ::prost::encoding::encode_varint(entry_len as u64, buf);
                ::prost::encoding::#key_mod::encode(1, key, buf);
                ::prost::encoding::message::encode(2, value, buf);
            }
        }
    } else {
        let value_mod = module(value);
        quote! {
            for (key, value) in &#member {
                let entry_len = ::prost::encoding::#key_mod::encoded_len(1, key)
                    + ::prost::encoding::#value_mod::encoded_len(2, value);
                ::prost::encoding::encode_key(#tag, ::prost::encoding::WireType::LengthDelimited, buf);
                ::prost::encoding::encode_varint(entry_len as u64, buf);
                ::prost::encoding::#key_mod::encode(1, key, buf);
                ::prost::encoding::#value_mod::encode(2, value, buf);
            }
        }
    }
}

/// Generates the `encoded_len` summand for one field.
pub fn encoded_len_expr(member: &TokenStream, attrs: &FieldAttrs) -> TokenStream {
    let tag = attrs.tag.unwrap_or(0);
    match &attrs.shape {
        Shape::Plain(tk) => {
            let m = module(*tk);
            if matches!(tk, TypeKeyword::Message) {
                quote! {
                    #member.as_ref().map_or(0, |value| ::prost::encoding::message::encoded_len(#tag, value))
                }
            } else if attrs.force {
                quote!(::prost::encoding::#m::encoded_len(#tag, &#member))
            } else {
                quote! {
                    if #member != ::std::default::Default::default() {
                        ::prost::encoding::#m::encoded_len(#tag, &#member)
                    } else {
                        0
                    }
                }
            }
        }
        Shape::Optional(tk) => {
            let m = module(*tk);
            quote!(#member.as_ref().map_or(0, |value| ::prost::encoding::#m::encoded_len(#tag, value)))
        }
        Shape::Repeated(tk) => {
            let m = module(*tk);
            if matches!(tk, TypeKeyword::Message) {
                quote!(::prost::encoding::message::encoded_len_repeated(#tag, &#member))
            } else if tk.schema_variant() != "String" && tk.schema_variant() != "Bytes" && attrs.packed != Some(false) {
                quote!(::prost::encoding::#m::encoded_len_packed(#tag, &#member))
            } else {
                quote!(::prost::encoding::#m::encoded_len_repeated(#tag, &#member))
            }
        }
        Shape::Enumeration(_) => quote! {
            if #member != 0 { ::prost::encoding::int32::encoded_len(#tag, &#member) } else { 0 }
        },
        Shape::RepeatedEnumeration(_) => quote!(::prost::encoding::int32::encoded_len_packed(#tag, &#member)),
        Shape::Map(key, value, value_enum) => map_encoded_len(*key, *value, value_enum.is_some(), tag, member),
        Shape::Oneof(path) => quote!(#member.as_ref().map_or(0, |value| #path::encoded_len(value))),
        Shape::UnknownFields => quote!(#member.len()),
        Shape::OnWire => quote!(0),
    }
}

fn map_encoded_len(key: TypeKeyword, value: TypeKeyword, value_is_message: bool, tag: u32, member: &TokenStream) -> TokenStream {
    let key_mod = module(key);
    if value_is_message {
        quote! {
            #member.iter().map(|(key, value)| {
                let entry_len = ::prost::encoding::#key_mod::encoded_len(1, key)
                    + ::prost::encoding::message::encoded_len(2, value);
                ::prost::encoding::key_len(#tag) + ::prost::encoding::encoded_len_varint(entry_len as u64) + entry_len
            }).sum::<usize>()
        }
    } else {
        let value_mod = module(value);
        quote! {
            #member.iter().map(|(key, value)| {
                let entry_len = ::prost::encoding::#key_mod::encoded_len(1, key)
                    + ::prost::encoding::#value_mod::encoded_len(2, value);
                ::prost::encoding::key_len(#tag) + ::prost::encoding::encoded_len_varint(entry_len as u64) + entry_len
            }).sum::<usize>()
        }
    }
}

/// Generates the `merge_field` match arm body for one field (everything
/// after `tag => { ... }`; the arm's tag pattern is generated separately
/// since oneofs and maps need more than one tag or a different dispatch).
pub fn merge_stmt(member: &TokenStream, attrs: &FieldAttrs) -> TokenStream {
    match &attrs.shape {
        Shape::Plain(tk) if matches!(tk, TypeKeyword::Message) => quote! {
            {
                let mut value = #member.take().unwrap_or_default();
                ::prost::encoding::message::merge(wire_type, &mut value, buf, ctx)?;
                #member = ::std::option::Option::Some(value);
            }
        },
        Shape::Plain(tk) => {
            let m = module(*tk);
            quote!(::prost::encoding::#m::merge(wire_type, &mut #member, buf, ctx)?;)
        }
        Shape::Optional(tk) => {
            let m = module(*tk);
            quote! {
                let mut value = ::std::default::Default::default();
                ::prost::encoding::#m::merge(wire_type, &mut value, buf, ctx)?;
                #member = ::std::option::Option::Some(value);
            }
        }
        Shape::Repeated(tk) => {
            let m = module(*tk);
            if matches!(tk, TypeKeyword::Message) {
                quote!(::prost::encoding::message::merge_repeated(wire_type, &mut #member, buf, ctx)?;)
            } else {
                quote!(::prost::encoding::#m::merge_repeated(wire_type, &mut #member, buf, ctx)?;)
            }
        }
        Shape::Enumeration(path) => quote! {
            let mut value: i32 = 0;
            ::prost::encoding::int32::merge(wire_type, &mut value, buf, ctx)?;
            let _ = <#path as ::prost::Enumeration>::from_i32(value);
            #member = value;
        },
        Shape::RepeatedEnumeration(_) => {
            quote!(::prost::encoding::int32::merge_repeated(wire_type, &mut #member, buf, ctx)?;)
        }
        Shape::Map(key, value, value_enum) => map_merge(*key, *value, value_enum.is_some(), member),
        Shape::Oneof(path) => quote!(#path::merge(tag, wire_type, &mut #member, buf, ctx)?;),
        Shape::UnknownFields => unreachable!("unknown-fields is not a tagged field"),
        Shape::OnWire => unreachable!("on_wire is not a tagged field"),
    }
}

fn map_merge(key: TypeKeyword, value: TypeKeyword, value_is_message: bool, member: &TokenStream) -> TokenStream {
    let key_mod = module(key);
    let key_ty = scalar_rust_type(key);
    if value_is_message {
        quote! {
            ::prost::encoding::check_wire_type(::prost::encoding::WireType::LengthDelimited, wire_type)?;
            let mut key: #key_ty = ::std::default::Default::default();
            let mut value = ::std::default::Default::default();
            ::prost::encoding::merge_loop(&mut (), buf, ctx, |_, buf, ctx| {
                let (entry_tag, entry_wire_type) = ::prost::encoding::decode_key(buf)?;
                match entry_tag {
                    1 => ::prost::encoding::#key_mod::merge(entry_wire_type, &mut key, buf, ctx),
                    2 => ::prost::encoding::message::merge(entry_wire_type, &mut value, buf, ctx),
                    _ => ::prost::encoding::preserve_unknown_field(entry_tag, entry_wire_type, buf, &mut ::std::vec::Vec::new(), ctx),
                }
            })?;
            #member.insert(key, value);
        }
    } else {
        let value_ty = scalar_rust_type(value);
        let value_mod = module(value);
        quote! {
            ::prost::encoding::check_wire_type(::prost::encoding::WireType::LengthDelimited, wire_type)?;
            let mut key: #key_ty = ::std::default::Default::default();
            let mut value: #value_ty = ::std::default::Default::default();
            ::prost::encoding::merge_loop(&mut (), buf, ctx, |_, buf, ctx| {
                let (entry_tag, entry_wire_type) = ::prost::encoding::decode_key(buf)?;
                match entry_tag {
                    1 => ::prost::encoding::#key_mod::merge(entry_wire_type, &mut key, buf, ctx),
                    2 => ::prost::encoding::#value_mod::merge(entry_wire_type, &mut value, buf, ctx),
                    _ => ::prost::encoding::preserve_unknown_field(entry_tag, entry_wire_type, buf, &mut ::std::vec::Vec::new(), ctx),
                }
            })?;
            #member.insert(key, value);
        }
    }
}

/// Generates the field's `clear()` statement.
pub fn clear_stmt(member: &TokenStream) -> TokenStream {
    quote!(#member = ::std::default::Default::default();)
}

/// Generates a `fields.push(FieldDescriptor { ... });` statement for one
/// field, or `None` if the field is not represented in the schema as its
/// own entry (the unknown-fields buffer, the on-wire flag, and oneofs —
/// a oneof field's members are pushed separately via its generated
/// `descriptor_fields` associated function; see DESIGN.md).
pub fn descriptor_push_stmt(name: &str, attrs: &FieldAttrs) -> Option<TokenStream> {
    let tag = attrs.tag?;
    let group = match &attrs.group {
        Some(g) => quote!(::std::option::Option::Some(#g)),
        None => quote!(::std::option::Option::None),
    };
    let wraps = match attrs.wraps {
        Some(tk) => {
            let v = schema_variant(tk);
            quote!(::std::option::Option::Some(#v))
        }
        None => quote!(::std::option::Option::None),
    };

    let (proto_type, map_types, repeated) = match &attrs.shape {
        Shape::Plain(tk) => (schema_variant(*tk), quote!(::std::option::Option::None), false),
        Shape::Optional(tk) => (schema_variant(*tk), quote!(::std::option::Option::None), false),
        Shape::Repeated(tk) => (schema_variant(*tk), quote!(::std::option::Option::None), true),
        Shape::Enumeration(_) => (quote!(::prost::schema::ProtoType::Enum), quote!(::std::option::Option::None), false),
        Shape::RepeatedEnumeration(_) => (quote!(::prost::schema::ProtoType::Enum), quote!(::std::option::Option::None), true),
        Shape::Map(key, value, _) => {
            let k = schema_variant(*key);
            let v = schema_variant(*value);
            (
                quote!(::prost::schema::ProtoType::Map),
                quote!(::std::option::Option::Some((#k, #v))),
                false,
            )
        }
        Shape::Oneof(_) | Shape::UnknownFields | Shape::OnWire => return None,
    };

    Some(quote! {
        fields.push(::prost::schema::FieldDescriptor {
            name: #name,
            tag: #tag,
            proto_type: #proto_type,
            map_types: #map_types,
            group: #group,
            wraps: #wraps,
            repeated: #repeated,
        });
    })
}

/// Converts a scalar Rust value expression to a `serde_json::Value`
/// expression, applying the per-type canonical JSON rendering rules.
pub fn scalar_to_value(tk: TypeKeyword, expr: &TokenStream) -> TokenStream {
    use TypeKeyword::*;
    match tk {
        Bool => quote!(::prost::__private::serde_json::Value::Bool(#expr)),
        Int32 | Sint32 | Sfixed32 => quote!(::prost::__private::serde_json::Value::from(#expr)),
        Uint32 | Fixed32 => quote!(::prost::__private::serde_json::Value::from(#expr)),
        Int64 | Sint64 | Sfixed64 => quote!(::prost::json::int64_to_value(#expr as i64)),
        Uint64 | Fixed64 => quote!(::prost::json::uint64_to_value(#expr as u64)),
        Float => quote!(::prost::json::float_to_value(#expr as f64)),
        Double => quote!(::prost::json::float_to_value(#expr)),
        String => quote!(::prost::__private::serde_json::Value::String(#expr.clone())),
        Bytes => quote!(::prost::json::bytes_to_value(&#expr)),
        Message => unreachable!("message fields go through ReflectMessage::to_dict"),
    }
}

/// The inverse of [`scalar_to_value`]: parses a `&serde_json::Value`
/// expression into the scalar's native Rust type, as a `Result<T,
/// DecodeError>` expression (without the trailing `?`).
pub fn scalar_from_value(tk: TypeKeyword, expr: &TokenStream) -> TokenStream {
    use TypeKeyword::*;
    match tk {
        Bool => quote! {
            (#expr).as_bool().ok_or_else(|| ::prost::DecodeError::new("expected a JSON boolean"))
        },
        Int32 | Sint32 | Sfixed32 => quote! {
            (#expr).as_i64().and_then(|n| i32::try_from(n).ok())
                .ok_or_else(|| ::prost::DecodeError::new("expected a JSON int32"))
        },
        Uint32 | Fixed32 => quote! {
            (#expr).as_u64().and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| ::prost::DecodeError::new("expected a JSON uint32"))
        },
        Int64 | Sint64 | Sfixed64 => quote!(::prost::json::value_to_int64(#expr)),
        Uint64 | Fixed64 => quote!(::prost::json::value_to_uint64(#expr)),
        Float => quote!(::prost::json::value_to_float(#expr).map(|v| v as f32)),
        Double => quote!(::prost::json::value_to_float(#expr)),
        String => quote! {
            (#expr).as_str().map(|s| s.to_string())
                .ok_or_else(|| ::prost::DecodeError::new("expected a JSON string"))
        },
        Bytes => quote!(::prost::json::value_to_bytes(#expr)),
        Message => unreachable!("message fields go through ReflectMessage::from_dict"),
    }
}
