//! Parsing of `#[prost(...)]` field attributes into a small intermediate
//! form the rest of the crate builds code from. Mirrors the attribute
//! vocabulary of the real `prost-derive` (`#[prost(int32, tag = "1")]`)
//! closely enough that a reader familiar with it would recognize this
//! immediately, extended with the handful of markers the reflective layer
//! needs (`wraps`, `unknown_fields`) that stock `prost` has no use for.

use anyhow::{anyhow, bail, Error};
use syn::{Attribute, Expr, ExprLit, Lit, Meta, MetaNameValue};

/// The declared Protobuf type of a field, parsed from the bare keyword in
/// a `#[prost(...)]` list (`int32`, `string`, `message`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKeyword {
    Bool,
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
    Float,
    Double,
    String,
    Bytes,
    Message,
}

impl TypeKeyword {
    fn from_ident(name: &str) -> Option<TypeKeyword> {
        use TypeKeyword::*;
        Some(match name {
            "bool" => Bool,
            "int32" => Int32,
            "int64" => Int64,
            "uint32" => Uint32,
            "uint64" => Uint64,
            "sint32" => Sint32,
            "sint64" => Sint64,
            "fixed32" => Fixed32,
            "fixed64" => Fixed64,
            "sfixed32" => Sfixed32,
            "sfixed64" => Sfixed64,
            "float" => Float,
            "double" => Double,
            "string" => String,
            "bytes" => Bytes,
            "message" => Message,
            _ => return None,
        })
    }

    /// The name of the `prost::encoding` module implementing this
    /// scalar's wire codec (identical to the module names in
    /// `encoding.rs`: `int32`, `sint64`, `fixed32`, ...).
    pub fn encoding_module(self) -> &'static str {
        use TypeKeyword::*;
        match self {
            Bool => "bool",
            Int32 => "int32",
            Int64 => "int64",
            Uint32 => "uint32",
            Uint64 => "uint64",
            Sint32 => "sint32",
            Sint64 => "sint64",
            Fixed32 => "fixed32",
            Fixed64 => "fixed64",
            Sfixed32 => "sfixed32",
            Sfixed64 => "sfixed64",
            Float => "float",
            Double => "double",
            String => "string",
            Bytes => "bytes",
            Message => "message",
        }
    }

    /// The `prost::schema::ProtoType` variant naming this scalar.
    pub fn schema_variant(self) -> &'static str {
        use TypeKeyword::*;
        match self {
            Bool => "Bool",
            Int32 => "Int32",
            Int64 => "Int64",
            Uint32 => "Uint32",
            Uint64 => "Uint64",
            Sint32 => "Sint32",
            Sint64 => "Sint64",
            Fixed32 => "Fixed32",
            Fixed64 => "Fixed64",
            Sfixed32 => "Sfixed32",
            Sfixed64 => "Sfixed64",
            Float => "Float",
            Double => "Double",
            String => "String",
            Bytes => "Bytes",
            Message => "Message",
        }
    }
}

/// What shape of field a `#[prost(...)]`-annotated struct field declares,
/// independent of its scalar/message type.
#[derive(Clone, Debug)]
pub enum Shape {
    /// A bare type keyword (`int32`, `message`, ...): plain Rust value,
    /// compared against the declared zero default to decide emission.
    Plain(TypeKeyword),
    /// `optional` label: `Option<T>`. Presence is the `Option` itself.
    Optional(TypeKeyword),
    /// `repeated` label: `Vec<T>`.
    Repeated(TypeKeyword),
    /// `enumeration = "Path"`: stored as `i32`.
    Enumeration(syn::Path),
    /// `enumeration = "Path", repeated`: stored as `Vec<i32>`.
    RepeatedEnumeration(syn::Path),
    /// `map = "key, value"`. The `Option<syn::Path>` is set iff `value`
    /// names a message type rather than a scalar keyword (map value types
    /// are always treated as nested messages here; an enum-valued map
    /// would need to route through `Enumeration` instead of `Message`,
    /// which this derive does not yet generate).
    Map(TypeKeyword, TypeKeyword, Option<syn::Path> /* message value path */),
    /// `oneof = "Path", tags = "1,2,3"`.
    Oneof(syn::Path),
    /// The designated unknown-field buffer; not part of the schema.
    UnknownFields,
    /// The designated `serialized_on_wire` flag; not part of the schema.
    OnWire,
}

/// The fully parsed attributes of one `#[prost(...)]`-tagged field.
#[derive(Clone, Debug)]
pub struct FieldAttrs {
    pub shape: Shape,
    pub tag: Option<u32>,
    pub tags: Vec<u32>,
    pub group: Option<String>,
    pub wraps: Option<TypeKeyword>,
    pub boxed: bool,
    pub packed: Option<bool>,
    /// `force` label: always emit this field on the wire even when it
    /// holds its declared zero value. Used only by the wrapper-message
    /// `value` field — a populated wrapper's scalar is serialized even
    /// when it's the scalar's zero value, since presence lives in the
    /// outer `Option<Wrapper>`, not the inner scalar. An ordinary scalar
    /// field's zero value is never serialized.
    pub force: bool,
}

/// Returns `None` if the field has no `#[prost(...)]` attribute at all
/// (not a Protobuf field, e.g. a plain Rust helper field).
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<Option<FieldAttrs>, Error> {
    let metas = prost_metas(attrs)?;
    if metas.is_empty() {
        return Ok(None);
    }

    let mut type_keyword = None;
    let mut enumeration = None;
    let mut map = None;
    let mut oneof = None;
    let mut unknown_fields = false;
    let mut on_wire_flag = false;
    let mut repeated = false;
    let mut optional = false;
    let mut tag = None;
    let mut tags = Vec::new();
    let mut group = None;
    let mut wraps = None;
    let mut boxed = false;
    let mut packed = None;
    let mut force = false;

    for meta in &metas {
        match meta {
            Meta::Path(path) => {
                let ident = path
                    .get_ident()
                    .ok_or_else(|| anyhow!("unsupported prost attribute path"))?
                    .to_string();
                match ident.as_str() {
                    "repeated" => repeated = true,
                    "optional" => optional = true,
                    "boxed" => boxed = true,
                    "unknown_fields" => unknown_fields = true,
                    "on_wire" => on_wire_flag = true,
                    "force" => force = true,
                    _ => {
                        if let Some(keyword) = TypeKeyword::from_ident(&ident) {
                            type_keyword = Some(keyword);
                        } else {
                            bail!("unknown prost attribute: {ident}");
                        }
                    }
                }
            }
            Meta::NameValue(MetaNameValue { path, value, .. }) => {
                let ident = path
                    .get_ident()
                    .ok_or_else(|| anyhow!("unsupported prost attribute path"))?
                    .to_string();
                let lit_str = expect_str(value)?;
                match ident.as_str() {
                    "tag" => tag = Some(lit_str.parse::<u32>()?),
                    "tags" => {
                        for part in lit_str.split(',') {
                            tags.push(part.trim().parse::<u32>()?);
                        }
                    }
                    "group" => group = Some(lit_str),
                    "wraps" => {
                        wraps = Some(
                            TypeKeyword::from_ident(&lit_str)
                                .ok_or_else(|| anyhow!("invalid wraps type: {lit_str}"))?,
                        )
                    }
                    "packed" => packed = Some(lit_str.parse::<bool>()?),
                    "enumeration" => enumeration = Some(syn::parse_str::<syn::Path>(&lit_str)?),
                    "oneof" => oneof = Some(syn::parse_str::<syn::Path>(&lit_str)?),
                    "map" => {
                        let (key, value) = lit_str
                            .split_once(',')
                            .ok_or_else(|| anyhow!("map attribute must be \"key, value\""))?;
                        let key = TypeKeyword::from_ident(key.trim())
                            .ok_or_else(|| anyhow!("invalid map key type: {key}"))?;
                        let value = value.trim();
                        if let Some(kw) = TypeKeyword::from_ident(value) {
                            map = Some((key, kw, None));
                        } else {
                            map = Some((key, TypeKeyword::Message, Some(syn::parse_str::<syn::Path>(value)?)));
                        }
                    }
                    _ => bail!("unknown prost attribute: {ident}"),
                }
            }
            Meta::List(_) => bail!("unsupported prost attribute syntax"),
        }
    }

    let shape = if unknown_fields {
        Shape::UnknownFields
    } else if on_wire_flag {
        Shape::OnWire
    } else if let Some(path) = oneof {
        Shape::Oneof(path)
    } else if let Some((key, value, enum_path)) = map {
        Shape::Map(key, value, enum_path)
    } else if let Some(path) = enumeration {
        if repeated {
            Shape::RepeatedEnumeration(path)
        } else {
            Shape::Enumeration(path)
        }
    } else if let Some(keyword) = type_keyword {
        if repeated {
            Shape::Repeated(keyword)
        } else if optional && !matches!(keyword, TypeKeyword::Message) {
            Shape::Optional(keyword)
        } else {
            // A message field is `Option<T>` whether or not `optional` is
            // written out: message fields always get a dedicated
            // optional-by-default path rather than routing through the
            // generic optional-scalar shape; `Shape::Plain(Message)` is
            // what every message-aware branch elsewhere matches on.
            Shape::Plain(keyword)
        }
    } else {
        bail!("no prost type attribute");
    };

    Ok(Some(FieldAttrs {
        shape,
        tag,
        tags,
        group,
        wraps,
        boxed,
        packed,
        force,
    }))
}

fn prost_metas(attrs: &[Attribute]) -> Result<Vec<Meta>, Error> {
    let mut metas = Vec::new();
    for attr in attrs {
        if let Meta::List(list) = &attr.meta {
            if list.path.is_ident("prost") {
                let parsed: syn::punctuated::Punctuated<Meta, syn::Token![,]> =
                    list.parse_args_with(syn::punctuated::Punctuated::parse_terminated)?;
                metas.extend(parsed);
            }
        }
    }
    Ok(metas)
}

fn expect_str(expr: &Expr) -> Result<String, Error> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Str(lit), .. }) => Ok(lit.value()),
        _ => bail!("expected a string literal"),
    }
}
