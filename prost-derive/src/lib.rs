//! Derive macros for the reflective message runtime: `#[derive(Message)]`,
//! `#[derive(Oneof)]`, `#[derive(Enumeration)]`.
//!
//! The attribute surface (`#[prost(int32, tag = "1")]`) drives both
//! wire-format codegen (`encode_raw`/`merge_field`/`encoded_len`/`clear`)
//! and the reflective half each derive also emits: a static field table
//! for `ReflectMessage::descriptor()`, the unknown-field plumbing, and
//! (behind `serde-json`) `to_dict`/`from_dict`.

mod attrs;
mod field;

use anyhow::{anyhow, bail, Error};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Lit};

use attrs::{parse_field_attrs, FieldAttrs, Shape, TypeKeyword};

#[proc_macro_derive(Message, attributes(prost))]
pub fn derive_message(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    try_message(input)
        .unwrap_or_else(|err| {
            let msg = err.to_string();
            quote!(compile_error!(#msg);)
        })
        .into()
}

#[proc_macro_derive(Oneof, attributes(prost))]
pub fn derive_oneof(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    try_oneof(input)
        .unwrap_or_else(|err| {
            let msg = err.to_string();
            quote!(compile_error!(#msg);)
        })
        .into()
}

#[proc_macro_derive(Enumeration)]
pub fn derive_enumeration(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    try_enumeration(input)
        .unwrap_or_else(|err| {
            let msg = err.to_string();
            quote!(compile_error!(#msg);)
        })
        .into()
}

/// A field with its parsed `#[prost(...)]` attributes and accessor.
struct ParsedField<'a> {
    member: TokenStream,
    name: String,
    ty: &'a syn::Type,
    attrs: FieldAttrs,
}

fn named_fields(data: &Data) -> Result<&syn::FieldsNamed, Error> {
    match data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(named) => Ok(named),
            _ => bail!("#[derive(Message)] requires a struct with named fields"),
        },
        _ => bail!("#[derive(Message)] can only be applied to structs"),
    }
}

fn parse_fields(fields: &syn::FieldsNamed) -> Result<Vec<ParsedField<'_>>, Error> {
    let mut out = Vec::new();
    for field in &fields.named {
        let ident = field.ident.as_ref().expect("named field");
        let Some(attrs) = parse_field_attrs(&field.attrs)? else {
            bail!("field `{ident}` has no #[prost(...)] attribute");
        };
        out.push(ParsedField {
            member: quote!(self.#ident),
            name: ident.to_string(),
            ty: &field.ty,
            attrs,
        });
    }
    Ok(out)
}

/// Extracts the inner message type from a field declared `Option<T>` or
/// `Option<Box<T>>`.
fn message_inner_type(ty: &syn::Type) -> Result<syn::Type, Error> {
    let option_arg = generic_arg(ty, "Option").ok_or_else(|| anyhow!("message field must be Option<T>"))?;
    if let Some(boxed) = generic_arg(option_arg, "Box") {
        Ok(boxed.clone())
    } else {
        Ok(option_arg.clone())
    }
}

fn repeated_message_inner_type(ty: &syn::Type) -> Result<syn::Type, Error> {
    generic_arg(ty, "Vec")
        .cloned()
        .ok_or_else(|| anyhow!("repeated message field must be Vec<T>"))
}

fn generic_arg<'a>(ty: &'a syn::Type, wrapper: &str) -> Option<&'a syn::Type> {
    let syn::Type::Path(type_path) = ty else { return None };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        syn::GenericArgument::Type(t) => Some(t),
        _ => None,
    })
}

fn try_message(input: DeriveInput) -> Result<TokenStream, Error> {
    let ident = &input.ident;
    let named = named_fields(&input.data)?;
    let fields = parse_fields(named)?;

    let unknown_field = fields.iter().find(|f| matches!(f.attrs.shape, Shape::UnknownFields));
    let Some(unknown_field) = unknown_field else {
        bail!(
            "struct `{ident}` must declare exactly one `#[prost(unknown_fields)] pub unknown_fields: Vec<u8>` field"
        );
    };
    let unknown_member = unknown_field.member.clone();

    let on_wire_field = fields.iter().find(|f| matches!(f.attrs.shape, Shape::OnWire));
    let Some(on_wire_field) = on_wire_field else {
        bail!("struct `{ident}` must declare exactly one `#[prost(on_wire)] pub on_wire: bool` field");
    };
    let on_wire_member = on_wire_field.member.clone();

    let mut encode_stmts = Vec::new();
    let mut encoded_len_terms = Vec::new();
    let mut merge_arms = Vec::new();
    let mut clear_stmts = Vec::new();
    let mut descriptors = Vec::new();
    let mut is_empty_terms = Vec::new();
    let mut to_dict_stmts = Vec::new();
    let mut from_dict_stmts = Vec::new();

    for f in &fields {
        if matches!(f.attrs.shape, Shape::UnknownFields | Shape::OnWire) {
            clear_stmts.push(field::clear_stmt(&f.member));
            continue;
        }

        encode_stmts.push(field::encode_stmt(&f.member, &f.attrs));
        encoded_len_terms.push(field::encoded_len_expr(&f.member, &f.attrs));
        clear_stmts.push(field::clear_stmt(&f.member));
        is_empty_terms.push(is_empty_term(&f.member, &f.attrs));

        if let Shape::Oneof(path) = &f.attrs.shape {
            let group_lit = &f.name;
            descriptors.push(quote!(fields.extend(#path::descriptor_fields(#group_lit));));
        } else if let Some(stmt) = field::descriptor_push_stmt(&f.name, &f.attrs) {
            descriptors.push(stmt);
        }

        if let Shape::Oneof(path) = &f.attrs.shape {
            let tags = &f.attrs.tags;
            if tags.is_empty() {
                bail!("oneof field `{}` must declare `tags = \"...\"`", f.name);
            }
            let merge = field::merge_stmt(&f.member, &f.attrs);
            merge_arms.push(quote!(#(#tags)|* => { #merge } ));
        } else {
            let tag = f
                .attrs
                .tag
                .ok_or_else(|| anyhow!("field `{}` is missing a tag", f.name))?;
            let merge = field::merge_stmt(&f.member, &f.attrs);
            merge_arms.push(quote!(#tag => { #merge }));
        }

        to_dict_stmts.push(to_dict_stmt(f)?);
        from_dict_stmts.push(from_dict_stmt(f)?);
    }

    let name_lit = ident.to_string();

    // `self` isn't available in a `Default::default()` body; build the
    // struct literal directly instead of reusing `self.<field>` accessors.
    let default_field_inits = fields.iter().map(|f| {
        let ident = format_ident!("{}", f.name);
        quote!(#ident: ::std::default::Default::default(),)
    });

    let expanded = quote! {
        #[automatically_derived]
        impl ::core::default::Default for #ident {
            fn default() -> #ident {
                #ident {
                    #(#default_field_inits)*
                }
            }
        }

        #[automatically_derived]
        impl ::prost::Message for #ident {
            fn encode_raw(&self, buf: &mut impl ::prost::bytes::BufMut) {
                #(#encode_stmts)*
                buf.put_slice(&#unknown_member);
            }

            fn merge_field(
                &mut self,
                tag: u32,
                wire_type: ::prost::encoding::WireType,
                buf: &mut impl ::prost::bytes::Buf,
                ctx: ::prost::encoding::DecodeContext,
            ) -> ::std::result::Result<(), ::prost::DecodeError> {
                match tag {
                    #(#merge_arms)*
                    _ => {
                        ::prost::encoding::preserve_unknown_field(tag, wire_type, buf, &mut #unknown_member, ctx)?;
                    }
                }
                Ok(())
            }

            fn encoded_len(&self) -> usize {
                0 #(+ (#encoded_len_terms))* + #unknown_member.len()
            }

            fn clear(&mut self) {
                #(#clear_stmts)*
            }

            fn mark_serialized_on_wire(&mut self) {
                #on_wire_member = true;
            }
        }

        #[automatically_derived]
        impl ::prost::ReflectMessage for #ident {
            fn descriptor() -> &'static ::prost::schema::MessageDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<::prost::schema::MessageDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    let mut fields = ::std::vec::Vec::new();
                    #(#descriptors)*
                    ::prost::schema::MessageDescriptor::new(#name_lit, fields)
                })
            }

            fn unknown_fields(&self) -> &[u8] {
                &#unknown_member
            }

            fn unknown_fields_mut(&mut self) -> &mut ::std::vec::Vec<u8> {
                &mut #unknown_member
            }

            fn serialized_on_wire(&self) -> bool {
                #on_wire_member
            }

            fn is_empty(&self) -> bool {
                #(#is_empty_terms &&)* #unknown_member.is_empty()
            }

            #[cfg(feature = "serde-json")]
            fn to_dict(&self, config: ::prost::json::JsonConfig) -> ::prost::__private::serde_json::Value {
                let mut map = ::prost::__private::serde_json::Map::new();
                #(#to_dict_stmts)*
                ::prost::__private::serde_json::Value::Object(map)
            }

            #[cfg(feature = "serde-json")]
            fn from_dict(value: &::prost::__private::serde_json::Value) -> ::std::result::Result<Self, ::prost::DecodeError> {
                let mut message = Self::default();
                message.merge_dict(value)?;
                Ok(message)
            }

            #[cfg(feature = "serde-json")]
            fn merge_dict(&mut self, value: &::prost::__private::serde_json::Value) -> ::std::result::Result<(), ::prost::DecodeError> {
                let config = ::prost::json::JsonConfig::default();
                let object = value
                    .as_object()
                    .ok_or_else(|| ::prost::DecodeError::new("expected a JSON object"))?;
                fn lookup<'a>(
                    object: &'a ::prost::__private::serde_json::Map<::std::string::String, ::prost::__private::serde_json::Value>,
                    name: &'static str,
                    casing: ::prost::json::Casing,
                ) -> ::std::option::Option<&'a ::prost::__private::serde_json::Value> {
                    let preferred = ::prost::json::field_name(name, casing);
                    object.get(&preferred).or_else(|| object.get(name))
                }
                #(#from_dict_stmts)*
                Ok(())
            }
        }
    };

    Ok(expanded)
}

fn is_empty_term(member: &TokenStream, attrs: &FieldAttrs) -> TokenStream {
    match &attrs.shape {
        Shape::Plain(tk) if matches!(tk, TypeKeyword::Message) => quote!(#member.is_none()),
        Shape::Plain(_) => quote!(#member == ::std::default::Default::default()),
        Shape::Optional(_) | Shape::Oneof(_) => quote!(#member.is_none()),
        Shape::Repeated(_) | Shape::RepeatedEnumeration(_) => quote!(#member.is_empty()),
        Shape::Enumeration(_) => quote!(#member == 0),
        Shape::Map(..) => quote!(#member.is_empty()),
        Shape::UnknownFields => quote!(true),
        Shape::OnWire => quote!(true),
    }
}

fn to_dict_stmt(f: &ParsedField<'_>) -> Result<TokenStream, Error> {
    let member = &f.member;
    let name = &f.name;

    let stmt = match &f.attrs.shape {
        Shape::Plain(tk) if matches!(tk, TypeKeyword::Message) => {
            let inner = message_inner_type(f.ty)?;
            if let Some(wraps) = f.attrs.wraps {
                // A Google wrapper field flattens to the bare scalar in JSON,
                // not the `{value: ...}` object its wire form uses.
                let scalar = field::scalar_to_value(wraps, &quote!(value.value.clone()));
                quote! {
                    if let ::std::option::Option::Some(ref value) = #member {
                        let value: &#inner = ::std::borrow::Borrow::borrow(value);
                        map.insert(::prost::json::field_name(#name, config.casing), #scalar);
                    }
                }
            } else {
                quote! {
                    if let ::std::option::Option::Some(ref value) = #member {
                        let value: &#inner = ::std::borrow::Borrow::borrow(value);
                        map.insert(::prost::json::field_name(#name, config.casing), ::prost::ReflectMessage::to_dict(value, config));
                    }
                }
            }
        }
        Shape::Plain(tk) => {
            let value = field::scalar_to_value(*tk, &quote!(#member));
            quote! {
                if config.include_default_values || #member != ::std::default::Default::default() {
                    map.insert(::prost::json::field_name(#name, config.casing), #value);
                }
            }
        }
        Shape::Optional(tk) => {
            let value = field::scalar_to_value(*tk, &quote!(value.clone()));
            quote! {
                if let ::std::option::Option::Some(ref value) = #member {
                    map.insert(::prost::json::field_name(#name, config.casing), #value);
                }
            }
        }
        Shape::Repeated(tk) if matches!(tk, TypeKeyword::Message) => quote! {
            if !#member.is_empty() || config.include_default_values {
                let items: ::std::vec::Vec<_> = #member.iter().map(|v| ::prost::ReflectMessage::to_dict(v, config)).collect();
                map.insert(::prost::json::field_name(#name, config.casing), ::prost::__private::serde_json::Value::Array(items));
            }
        },
        Shape::Repeated(tk) => {
            let value = field::scalar_to_value(*tk, &quote!(item.clone()));
            quote! {
                if !#member.is_empty() || config.include_default_values {
                    let items: ::std::vec::Vec<_> = #member.iter().map(|item| #value).collect();
                    map.insert(::prost::json::field_name(#name, config.casing), ::prost::__private::serde_json::Value::Array(items));
                }
            }
        }
        Shape::Enumeration(path) => quote! {
            if config.include_default_values || #member != 0 {
                map.insert(::prost::json::field_name(#name, config.casing), ::prost::json::enum_to_value::<#path>(#member));
            }
        },
        Shape::RepeatedEnumeration(path) => quote! {
            if !#member.is_empty() || config.include_default_values {
                let items: ::std::vec::Vec<_> = #member.iter().map(|v| ::prost::json::enum_to_value::<#path>(*v)).collect();
                map.insert(::prost::json::field_name(#name, config.casing), ::prost::__private::serde_json::Value::Array(items));
            }
        },
        Shape::Map(_key, value_tk, value_enum) => {
            let value_expr = if value_enum.is_some() {
                quote!(::prost::ReflectMessage::to_dict(value, config))
            } else {
                field::scalar_to_value(*value_tk, &quote!(value.clone()))
            };
            quote! {
                if !#member.is_empty() || config.include_default_values {
                    let mut entries = ::prost::__private::serde_json::Map::new();
                    for (key, value) in &#member {
                        entries.insert(key.to_string(), #value_expr);
                    }
                    map.insert(::prost::json::field_name(#name, config.casing), ::prost::__private::serde_json::Value::Object(entries));
                }
            }
        }
        Shape::Oneof(path) => quote! {
            if let ::std::option::Option::Some(ref value) = #member {
                let (key, entry) = #path::to_dict_entry(value, config);
                map.insert(key, entry);
            }
        },
        Shape::UnknownFields => quote!(),
        Shape::OnWire => quote!(),
    };

    Ok(stmt)
}

fn from_dict_stmt(f: &ParsedField<'_>) -> Result<TokenStream, Error> {
    let member = &f.member;
    let name = &f.name;

    let stmt = match &f.attrs.shape {
        Shape::Plain(tk) if matches!(tk, TypeKeyword::Message) => {
            let inner = message_inner_type(f.ty)?;
            let boxed = f.attrs.boxed;
            if let Some(wraps) = f.attrs.wraps {
                let scalar = field::scalar_from_value(wraps, &quote!(found));
                let construct = if boxed {
                    quote!(::std::boxed::Box::new(#inner { value: #scalar?, ..::std::default::Default::default() }))
                } else {
                    quote!(#inner { value: #scalar?, ..::std::default::Default::default() })
                };
                quote! {
                    if let ::std::option::Option::Some(found) = lookup(object, #name, config.casing) {
                        #member = if found.is_null() {
                            ::std::option::Option::None
                        } else {
                            ::std::option::Option::Some(#construct)
                        };
                    }
                }
            } else {
                let construct = if boxed {
                    quote!(::std::boxed::Box::new(<#inner as ::prost::ReflectMessage>::from_dict(found)?))
                } else {
                    quote!(<#inner as ::prost::ReflectMessage>::from_dict(found)?)
                };
                quote! {
                    if let ::std::option::Option::Some(found) = lookup(object, #name, config.casing) {
                        if !found.is_null() {
                            #member = ::std::option::Option::Some(#construct);
                        }
                    }
                }
            }
        }
        Shape::Plain(tk) => {
            let parse = field::scalar_from_value(*tk, &quote!(found));
            quote! {
                if let ::std::option::Option::Some(found) = lookup(object, #name, config.casing) {
                    if !found.is_null() {
                        #member = #parse?;
                    }
                }
            }
        }
        Shape::Optional(tk) => {
            let parse = field::scalar_from_value(*tk, &quote!(found));
            quote! {
                if let ::std::option::Option::Some(found) = lookup(object, #name, config.casing) {
                    #member = if found.is_null() {
                        ::std::option::Option::None
                    } else {
                        ::std::option::Option::Some(#parse?)
                    };
                }
            }
        }
        Shape::Repeated(tk) if matches!(tk, TypeKeyword::Message) => {
            let inner = repeated_message_inner_type(f.ty)?;
            quote! {
                if let ::std::option::Option::Some(found) = lookup(object, #name, config.casing) {
                    let items = found.as_array().ok_or_else(|| ::prost::DecodeError::new("expected a JSON array"))?;
                    #member = items.iter()
                        .map(|item| <#inner as ::prost::ReflectMessage>::from_dict(item))
                        .collect::<::std::result::Result<::std::vec::Vec<_>, _>>()?;
                }
            }
        }
        Shape::Repeated(tk) => {
            let parse = field::scalar_from_value(*tk, &quote!(item));
            quote! {
                if let ::std::option::Option::Some(found) = lookup(object, #name, config.casing) {
                    let items = found.as_array().ok_or_else(|| ::prost::DecodeError::new("expected a JSON array"))?;
                    #member = items.iter()
                        .map(|item| #parse)
                        .collect::<::std::result::Result<::std::vec::Vec<_>, _>>()?;
                }
            }
        }
        Shape::Enumeration(path) => quote! {
            if let ::std::option::Option::Some(found) = lookup(object, #name, config.casing) {
                #member = ::prost::json::value_to_enum::<#path>(found)?;
            }
        },
        Shape::RepeatedEnumeration(path) => quote! {
            if let ::std::option::Option::Some(found) = lookup(object, #name, config.casing) {
                let items = found.as_array().ok_or_else(|| ::prost::DecodeError::new("expected a JSON array"))?;
                #member = items.iter()
                    .map(|item| ::prost::json::value_to_enum::<#path>(item))
                    .collect::<::std::result::Result<::std::vec::Vec<_>, _>>()?;
            }
        },
        Shape::Map(key_tk, value_tk, value_enum) => {
            let key_ty = field::scalar_rust_type(*key_tk);
            let key_parse = map_key_from_str(*key_tk);
            let value_parse = if let Some(path) = value_enum {
                quote!(<#path as ::prost::ReflectMessage>::from_dict(value)?)
            } else {
                field::scalar_from_value(*value_tk, &quote!(value))
            };
            let value_parse = if value_enum.is_some() {
                value_parse
            } else {
                quote!(#value_parse?)
            };
            quote! {
                if let ::std::option::Option::Some(found) = lookup(object, #name, config.casing) {
                    let entries = found.as_object().ok_or_else(|| ::prost::DecodeError::new("expected a JSON object"))?;
                    let mut parsed: ::std::collections::BTreeMap<#key_ty, _> = ::std::collections::BTreeMap::new();
                    for (key, value) in entries {
                        let key = #key_parse;
                        parsed.insert(key, #value_parse);
                    }
                    #member = parsed;
                }
            }
        }
        Shape::Oneof(path) => quote! {
            if let ::std::option::Option::Some(parsed) = #path::from_dict_entry(object, &config)? {
                #member = ::std::option::Option::Some(parsed);
            }
        },
        Shape::UnknownFields => quote!(),
        Shape::OnWire => quote!(),
    };

    Ok(stmt)
}

fn map_key_from_str(tk: TypeKeyword) -> TokenStream {
    use TypeKeyword::*;
    match tk {
        String => quote!(key.clone()),
        Bool => quote!(key.parse::<bool>().map_err(|_| ::prost::DecodeError::new("invalid map key"))?),
        _ => quote!(key.parse().map_err(|_| ::prost::DecodeError::new("invalid map key"))?),
    }
}

fn try_oneof(input: DeriveInput) -> Result<TokenStream, Error> {
    let ident = &input.ident;
    let Data::Enum(data) = &input.data else {
        bail!("#[derive(Oneof)] can only be applied to enums");
    };

    struct Variant<'a> {
        ident: &'a syn::Ident,
        ty: &'a syn::Type,
        attrs: FieldAttrs,
        json_name: String,
    }

    let mut variants = Vec::new();
    for variant in &data.variants {
        let Fields::Unnamed(unnamed) = &variant.fields else {
            bail!("oneof variant `{}` must wrap exactly one value", variant.ident);
        };
        if unnamed.unnamed.len() != 1 {
            bail!("oneof variant `{}` must wrap exactly one value", variant.ident);
        }
        let Some(attrs) = parse_field_attrs(&variant.attrs)? else {
            bail!("oneof variant `{}` has no #[prost(...)] attribute", variant.ident);
        };
        let ty = &unnamed.unnamed.first().unwrap().ty;
        let json_name = to_snake(&variant.ident.to_string());
        variants.push(Variant {
            ident: &variant.ident,
            ty,
            attrs,
            json_name,
        });
    }

    let mut encode_arms = Vec::new();
    let mut encoded_len_arms = Vec::new();
    let mut merge_arms = Vec::new();
    let mut variant_name_arms = Vec::new();
    let mut to_dict_arms = Vec::new();
    let mut from_dict_arms = Vec::new();
    let mut descriptor_entries = Vec::new();

    for v in &variants {
        let vident = v.ident;
        let tag = v.attrs.tag.ok_or_else(|| anyhow!("oneof variant `{vident}` is missing a tag"))?;
        let json_name = &v.json_name;
        variant_name_arms.push(quote!(#ident::#vident(_) => #json_name,));

        match &v.attrs.shape {
            Shape::Plain(tk) if matches!(tk, TypeKeyword::Message) => {
                let proto_type = field::schema_variant(TypeKeyword::Message);
                descriptor_entries.push(quote! {
                    ::prost::schema::FieldDescriptor {
                        name: #json_name,
                        tag: #tag,
                        proto_type: #proto_type,
                        map_types: ::std::option::Option::None,
                        group: ::std::option::Option::Some(group),
                        wraps: ::std::option::Option::None,
                        repeated: false,
                    }
                });
                encode_arms.push(quote! {
                    #ident::#vident(value) => ::prost::encoding::message::encode(#tag, value, buf),
                });
                encoded_len_arms.push(quote! {
                    #ident::#vident(value) => ::prost::encoding::message::encoded_len(#tag, value),
                });
                merge_arms.push(quote! {
                    #tag => {
                        let mut value = ::std::default::Default::default();
                        ::prost::encoding::message::merge(wire_type, &mut value, buf, ctx)?;
                        *field = ::std::option::Option::Some(#ident::#vident(value));
                    }
                });
                let inner = if v.attrs.boxed {
                    generic_arg(v.ty, "Box").cloned().unwrap_or_else(|| v.ty.clone())
                } else {
                    v.ty.clone()
                };
                to_dict_arms.push(quote! {
                    #ident::#vident(value) => {
                        let value: &#inner = ::std::borrow::Borrow::borrow(value);
                        (
                            ::prost::json::field_name(#json_name, config.casing),
                            ::prost::ReflectMessage::to_dict(value, *config),
                        )
                    }
                });
                from_dict_arms.push(quote! {
                    #json_name => ::std::option::Option::Some(::std::result::Result::Ok(
                        #ident::#vident(<#inner as ::prost::ReflectMessage>::from_dict(value)?)
                    )),
                });
            }
            Shape::Plain(tk) => {
                let m = format_ident!("{}", tk.encoding_module());
                let proto_type = field::schema_variant(*tk);
                descriptor_entries.push(quote! {
                    ::prost::schema::FieldDescriptor {
                        name: #json_name,
                        tag: #tag,
                        proto_type: #proto_type,
                        map_types: ::std::option::Option::None,
                        group: ::std::option::Option::Some(group),
                        wraps: ::std::option::Option::None,
                        repeated: false,
                    }
                });
                encode_arms.push(quote! {
                    #ident::#vident(value) => ::prost::encoding::#m::encode(#tag, value, buf),
                });
                encoded_len_arms.push(quote! {
                    #ident::#vident(value) => ::prost::encoding::#m::encoded_len(#tag, value),
                });
                merge_arms.push(quote! {
                    #tag => {
                        let mut value = ::std::default::Default::default();
                        ::prost::encoding::#m::merge(wire_type, &mut value, buf, ctx)?;
                        *field = ::std::option::Option::Some(#ident::#vident(value));
                    }
                });
                let to_value = field::scalar_to_value(*tk, &quote!(value.clone()));
                let from_value = field::scalar_from_value(*tk, &quote!(value));
                to_dict_arms.push(quote! {
                    #ident::#vident(value) => (::prost::json::field_name(#json_name, config.casing), #to_value),
                });
                from_dict_arms.push(quote! {
                    #json_name => ::std::option::Option::Some((|| ::std::result::Result::Ok(#ident::#vident(#from_value?)))()),
                });
            }
            Shape::Enumeration(path) => {
                descriptor_entries.push(quote! {
                    ::prost::schema::FieldDescriptor {
                        name: #json_name,
                        tag: #tag,
                        proto_type: ::prost::schema::ProtoType::Enum,
                        map_types: ::std::option::Option::None,
                        group: ::std::option::Option::Some(group),
                        wraps: ::std::option::Option::None,
                        repeated: false,
                    }
                });
                encode_arms.push(quote! {
                    #ident::#vident(value) => ::prost::encoding::int32::encode(#tag, &::prost::Enumeration::value(value), buf),
                });
                encoded_len_arms.push(quote! {
                    #ident::#vident(value) => ::prost::encoding::int32::encoded_len(#tag, &::prost::Enumeration::value(value)),
                });
                merge_arms.push(quote! {
                    #tag => {
                        let mut raw: i32 = 0;
                        ::prost::encoding::int32::merge(wire_type, &mut raw, buf, ctx)?;
                        let value = <#path as ::prost::Enumeration>::from_i32(raw)
                            .unwrap_or_else(<#path as ::prost::Enumeration>::default_value);
                        *field = ::std::option::Option::Some(#ident::#vident(value));
                    }
                });
                to_dict_arms.push(quote! {
                    #ident::#vident(value) => (
                        ::prost::json::field_name(#json_name, config.casing),
                        ::prost::json::enum_to_value::<#path>(::prost::Enumeration::value(value)),
                    ),
                });
                from_dict_arms.push(quote! {
                    #json_name => ::std::option::Option::Some(::prost::json::value_to_enum::<#path>(value).map(#ident::#vident)),
                });
            }
            other => bail!("unsupported oneof variant shape for `{vident}`: {other:?}"),
        }
    }

    let expanded = quote! {
        #[automatically_derived]
        impl #ident {
            pub fn encode(value: &#ident, buf: &mut impl ::prost::bytes::BufMut) {
                match value {
                    #(#encode_arms)*
                }
            }

            pub fn encoded_len(value: &#ident) -> usize {
                match value {
                    #(#encoded_len_arms)*
                }
            }

            pub fn merge(
                tag: u32,
                wire_type: ::prost::encoding::WireType,
                field: &mut ::std::option::Option<#ident>,
                buf: &mut impl ::prost::bytes::Buf,
                ctx: ::prost::encoding::DecodeContext,
            ) -> ::std::result::Result<(), ::prost::DecodeError> {
                match tag {
                    #(#merge_arms)*
                    _ => unreachable!("merge dispatched with an unregistered tag"),
                }
                Ok(())
            }

            /// The schema entries for this one-of's variants, tagged with
            /// the containing message field's name as their shared group.
            /// Called from the containing message's generated
            /// `ReflectMessage::descriptor`.
            pub fn descriptor_fields(group: &'static str) -> ::std::vec::Vec<::prost::schema::FieldDescriptor> {
                ::std::vec![
                    #(#descriptor_entries),*
                ]
            }

            #[cfg(feature = "serde-json")]
            pub fn to_dict_entry(value: &#ident, config: &::prost::json::JsonConfig) -> (::std::string::String, ::prost::__private::serde_json::Value) {
                match value {
                    #(#to_dict_arms)*
                }
            }

            #[cfg(feature = "serde-json")]
            pub fn from_dict_entry(
                object: &::prost::__private::serde_json::Map<::std::string::String, ::prost::__private::serde_json::Value>,
                config: &::prost::json::JsonConfig,
            ) -> ::std::result::Result<::std::option::Option<#ident>, ::prost::DecodeError> {
                for (key, value) in object {
                    let snake = ::prost::json::to_snake_case(key);
                    let result = match snake.as_str() {
                        #(#from_dict_arms)*
                        _ => ::std::option::Option::None,
                    };
                    if let ::std::option::Option::Some(result) = result {
                        return result.map(::std::option::Option::Some);
                    }
                }
                Ok(::std::option::Option::None)
            }
        }

        #[automatically_derived]
        impl ::prost::OneofVariantName for #ident {
            fn variant_name(&self) -> &'static str {
                match self {
                    #(#variant_name_arms)*
                }
            }
        }
    };

    Ok(expanded)
}

fn to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.char_indices() {
        if ch.is_uppercase() {
            if i != 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn try_enumeration(input: DeriveInput) -> Result<TokenStream, Error> {
    let ident = &input.ident;
    let Data::Enum(data) = &input.data else {
        bail!("#[derive(Enumeration)] can only be applied to fieldless enums");
    };

    let mut from_i32_arms = Vec::new();
    let mut value_arms = Vec::new();
    let mut name_arms = Vec::new();
    let mut from_name_arms = Vec::new();
    let mut next_value: i64 = 0;

    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            bail!("#[derive(Enumeration)] variant `{}` must not carry data", variant.ident);
        }
        let value = if let Some((_, expr)) = &variant.discriminant {
            let syn::Expr::Lit(syn::ExprLit { lit: Lit::Int(lit), .. }) = expr else {
                bail!("enum discriminant on `{}` must be an integer literal", variant.ident);
            };
            lit.base10_parse::<i64>()?
        } else {
            next_value
        };
        next_value = value + 1;

        let vident = &variant.ident;
        let value = value as i32;
        let name = vident.to_string();
        from_i32_arms.push(quote!(#value => ::std::option::Option::Some(#ident::#vident),));
        value_arms.push(quote!(#ident::#vident => #value,));
        name_arms.push(quote!(#ident::#vident => #name,));
        from_name_arms.push(quote!(#name => ::std::option::Option::Some(#ident::#vident),));
    }

    Ok(quote! {
        #[automatically_derived]
        impl ::prost::Enumeration for #ident {
            fn from_i32(value: i32) -> ::std::option::Option<#ident> {
                match value {
                    #(#from_i32_arms)*
                    _ => ::std::option::Option::None,
                }
            }

            fn value(&self) -> i32 {
                match self {
                    #(#value_arms)*
                }
            }

            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }

            fn from_name(name: &str) -> ::std::option::Option<#ident> {
                match name {
                    #(#from_name_arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    })
}
