//! The `Enumeration` trait: name/value resolution for closed Protobuf
//! enums, serialized as the member name rather than the bare integer.
//!
//! A dynamically-typed runtime resolves this via reflection over the
//! enum's members. The typed equivalent is a plain Rust `enum` backed by
//! `i32` discriminants, with the name/value maps generated once at compile
//! time by `#[derive(Enumeration)]` instead of discovered at runtime.

/// Implemented by `#[derive(Enumeration)]` for C-like enums used as
/// Protobuf `enum` fields.
pub trait Enumeration: Sized + Copy + 'static {
    /// Resolves an enum from its wire-format integer value. Unlike JSON
    /// name resolution, this never fails: an unrecognized wire value for
    /// a proto3 enum is read as the raw integer by generated code that
    /// stores enum fields as `i32`, so this is only used by the small
    /// amount of code that wants a typed enum back.
    fn from_i32(value: i32) -> Option<Self>;

    /// The integer value of this variant.
    fn value(&self) -> i32;

    /// The member name, as it appears in canonical JSON.
    fn name(&self) -> &'static str;

    /// Resolves a member by its JSON name. Returns `None` on no match;
    /// callers surface this as `DecodeErrorKind::UnknownEnumName`.
    fn from_name(name: &str) -> Option<Self>;

    /// The enum's zero variant, used as the declared default for a field
    /// of this type.
    fn default_value() -> Self {
        Self::from_i32(0).expect("proto3 enums must declare a zero variant")
    }
}
