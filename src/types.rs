//! Resolved Elm types for protobuf fields
//!
//! Well-known types (timestamp and the primitive wrappers) are not derived
//! structurally: they map to fixed Elm types and codecs from a read-only
//! registry.

use once_cell::sync::Lazy;
use prost_types::field_descriptor_proto::Type;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Elm primitive a protobuf scalar maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// All integer kinds
    Int,
    /// `float` and `double`
    Float,
    /// `bool`
    Bool,
    /// `string`
    String,
    /// `bytes`
    Bytes,
}

impl ScalarKind {
    /// Map a protobuf scalar type; `None` for message, enum and group
    pub fn from_proto(ty: Type) -> Option<Self> {
        match ty {
            Type::Int32
            | Type::Int64
            | Type::Uint32
            | Type::Uint64
            | Type::Sint32
            | Type::Sint64
            | Type::Fixed32
            | Type::Fixed64
            | Type::Sfixed32
            | Type::Sfixed64 => Some(ScalarKind::Int),
            Type::Float | Type::Double => Some(ScalarKind::Float),
            Type::Bool => Some(ScalarKind::Bool),
            Type::String => Some(ScalarKind::String),
            Type::Bytes => Some(ScalarKind::Bytes),
            Type::Message | Type::Enum | Type::Group => None,
        }
    }

    /// Elm type name
    pub fn elm_type(&self) -> &'static str {
        match self {
            ScalarKind::Int => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::Bool => "Bool",
            ScalarKind::String => "String",
            ScalarKind::Bytes => "Bytes",
        }
    }

    /// Value used when the JSON key is absent
    pub fn default_value(&self) -> &'static str {
        match self {
            ScalarKind::Int => "0",
            ScalarKind::Float => "0.0",
            ScalarKind::Bool => "False",
            ScalarKind::String => "\"\"",
            ScalarKind::Bytes => "[]",
        }
    }
}

/// Decoder for a protobuf scalar
pub fn scalar_decoder(ty: Type) -> Option<&'static str> {
    let decoder = match ScalarKind::from_proto(ty)? {
        ScalarKind::Int => "intDecoder",
        ScalarKind::Float => "JD.float",
        ScalarKind::Bool => "JD.bool",
        ScalarKind::String => "JD.string",
        ScalarKind::Bytes => "bytesFieldDecoder",
    };
    Some(decoder)
}

/// Encoder for a protobuf scalar
///
/// 64-bit integers travel as JSON strings, everything else natively.
pub fn scalar_encoder(ty: Type) -> Option<&'static str> {
    let encoder = match ty {
        Type::Int32 | Type::Uint32 | Type::Sint32 | Type::Fixed32 | Type::Sfixed32 => "JE.int",
        Type::Int64 | Type::Uint64 | Type::Sint64 | Type::Fixed64 | Type::Sfixed64 => {
            "numericStringEncoder"
        }
        Type::Float | Type::Double => "JE.float",
        Type::Bool => "JE.bool",
        Type::String => "JE.string",
        Type::Bytes => "bytesFieldEncoder",
        Type::Message | Type::Enum | Type::Group => return None,
    };
    Some(encoder)
}

/// Fully resolved Elm type of a field or variant payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// A primitive
    Scalar(ScalarKind),
    /// An opaque identifier wrapper from the `Ids` module
    Identifier(String),
    /// A message, enum, oneof or well-known type, by Elm name
    Named(String),
    /// Explicit presence
    Maybe(Box<FieldType>),
    /// Repeated values
    List(Box<FieldType>),
    /// Map from key type to value type
    Dict(Box<FieldType>, Box<FieldType>),
}

impl FieldType {
    /// Wrap in `Maybe`
    pub fn maybe(inner: FieldType) -> Self {
        FieldType::Maybe(Box::new(inner))
    }

    /// Wrap in `List`
    pub fn list(inner: FieldType) -> Self {
        FieldType::List(Box::new(inner))
    }

    /// Build a `Dict`
    pub fn dict(key: FieldType, value: FieldType) -> Self {
        FieldType::Dict(Box::new(key), Box::new(value))
    }

    /// The identifier type name if this is a bare identifier
    pub fn identifier(&self) -> Option<&str> {
        match self {
            FieldType::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Collect every identifier type appearing anywhere in this type
    pub fn collect_identifiers(&self, out: &mut BTreeSet<String>) {
        match self {
            FieldType::Identifier(name) => {
                out.insert(name.clone());
            }
            FieldType::Scalar(_) | FieldType::Named(_) => {}
            FieldType::Maybe(inner) | FieldType::List(inner) => inner.collect_identifiers(out),
            FieldType::Dict(key, value) => {
                key.collect_identifiers(out);
                value.collect_identifiers(out);
            }
        }
    }

    fn is_compound(&self) -> bool {
        matches!(
            self,
            FieldType::Maybe(_) | FieldType::List(_) | FieldType::Dict(_, _)
        )
    }
}

/// Renders as an Elm type expression, parenthesising nested applications
impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn arg(f: &mut fmt::Formatter<'_>, ty: &FieldType) -> fmt::Result {
            if ty.is_compound() {
                write!(f, "({})", ty)
            } else {
                write!(f, "{}", ty)
            }
        }

        match self {
            FieldType::Scalar(kind) => f.write_str(kind.elm_type()),
            FieldType::Identifier(name) => write!(f, "Ids.{}", name),
            FieldType::Named(name) => f.write_str(name),
            FieldType::Maybe(inner) => {
                f.write_str("Maybe ")?;
                arg(f, inner)
            }
            FieldType::List(inner) => {
                f.write_str("List ")?;
                arg(f, inner)
            }
            FieldType::Dict(key, value) => {
                f.write_str("Dict.Dict ")?;
                arg(f, key)?;
                f.write_str(" ")?;
                arg(f, value)
            }
        }
    }
}

/// Fixed type and codecs for an externally defined message
#[derive(Debug, Clone)]
pub struct WellKnownType {
    /// Elm type
    pub ty: FieldType,
    /// Encoder function
    pub encoder: &'static str,
    /// Decoder function
    pub decoder: &'static str,
}

fn well_known(ty: FieldType, decoder: &'static str, encoder: &'static str) -> WellKnownType {
    WellKnownType {
        ty,
        encoder,
        decoder,
    }
}

/// Registry of well-known types, keyed by fully qualified protobuf name
static WELL_KNOWN_TYPES: Lazy<HashMap<&'static str, WellKnownType>> = Lazy::new(|| {
    HashMap::from([
        (
            ".google.protobuf.Timestamp",
            well_known(
                FieldType::Named("Timestamp".to_string()),
                "timestampDecoder",
                "timestampEncoder",
            ),
        ),
        (
            ".google.protobuf.Int32Value",
            well_known(FieldType::Scalar(ScalarKind::Int), "intValueDecoder", "intValueEncoder"),
        ),
        (
            ".google.protobuf.Int64Value",
            well_known(FieldType::Scalar(ScalarKind::Int), "intValueDecoder", "numericStringEncoder"),
        ),
        (
            ".google.protobuf.UInt32Value",
            well_known(FieldType::Scalar(ScalarKind::Int), "intValueDecoder", "intValueEncoder"),
        ),
        (
            ".google.protobuf.UInt64Value",
            well_known(FieldType::Scalar(ScalarKind::Int), "intValueDecoder", "numericStringEncoder"),
        ),
        (
            ".google.protobuf.DoubleValue",
            well_known(FieldType::Scalar(ScalarKind::Float), "floatValueDecoder", "floatValueEncoder"),
        ),
        (
            ".google.protobuf.FloatValue",
            well_known(FieldType::Scalar(ScalarKind::Float), "floatValueDecoder", "floatValueEncoder"),
        ),
        (
            ".google.protobuf.StringValue",
            well_known(FieldType::Scalar(ScalarKind::String), "stringValueDecoder", "stringValueEncoder"),
        ),
        (
            ".google.protobuf.BytesValue",
            well_known(FieldType::Scalar(ScalarKind::Bytes), "bytesValueDecoder", "bytesValueEncoder"),
        ),
        (
            ".google.protobuf.BoolValue",
            well_known(FieldType::Scalar(ScalarKind::Bool), "boolValueDecoder", "boolValueEncoder"),
        ),
    ])
});

/// Look up a well-known type by its fully qualified name (leading dot included)
pub fn lookup_well_known(type_name: &str) -> Option<&'static WellKnownType> {
    WELL_KNOWN_TYPES.get(type_name)
}
