//! Intermediate model handed to the renderers
//!
//! The model mirrors the protobuf nesting tree: a [`SchemaFile`] owns its top
//! level enums and messages, and each [`Message`] owns its nested enums,
//! oneofs and messages. Field references to other message types are by name
//! only, so the tree never has back edges.

use crate::names;
use crate::types::FieldType;
use std::collections::BTreeSet;

/// One input `.proto` file
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaFile {
    /// Path of the `.proto` file as given by protoc
    pub path: String,
    /// Elm package path (`Shop/V1/Order`, or the override)
    pub package: String,
    /// Elm module name (`Shop.V1.Order`)
    pub module_name: String,
    /// Top level enums
    pub enums: Vec<Enum>,
    /// Top level messages
    pub messages: Vec<Message>,
    /// Services declared in the file
    pub services: Vec<Service>,
    /// Paths of imported `.proto` files
    pub dependencies: Vec<String>,
}

impl SchemaFile {
    /// Output file name for the primary module
    pub fn output_file_name(&self) -> String {
        names::output_file_name(&self.package)
    }

    /// Every message in the file, nested ones included, in declaration order
    pub fn all_messages(&self) -> Vec<&Message> {
        let mut out = Vec::new();
        for message in &self.messages {
            message.flatten_into(&mut out);
        }
        out
    }

    /// Whether any field uses a `Dict`
    pub fn uses_maps(&self) -> bool {
        self.all_messages()
            .iter()
            .flat_map(|m| m.fields.iter())
            .any(|f| f.shape == FieldShape::Map)
    }

    /// Whether any enum is declared at any depth
    pub fn has_enums(&self) -> bool {
        !self.enums.is_empty() || self.all_messages().iter().any(|m| !m.enums.is_empty())
    }

    /// Every identifier type referenced by the file
    pub fn identifier_types(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for message in self.all_messages() {
            message.collect_identifiers(&mut out);
        }
        out
    }
}

/// A protobuf message rendered as an Elm record
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Flattened Elm type name (`Outer_Inner`)
    pub name: String,
    /// Fully qualified protobuf name without the leading dot
    pub full_name: String,
    /// Marked with `(forwardextensions.singleton)`
    pub singleton: bool,
    /// Record fields in declaration order, oneofs last
    pub fields: Vec<Field>,
    /// Nested enums
    pub enums: Vec<Enum>,
    /// Oneofs declared in this message
    pub oneofs: Vec<OneOf>,
    /// Nested messages, map entries excluded
    pub messages: Vec<Message>,
}

impl Message {
    /// Decoder function name
    pub fn decoder(&self) -> String {
        names::decoder_name(&self.name)
    }

    /// Encoder function name
    pub fn encoder(&self) -> String {
        names::encoder_name(&self.name)
    }

    /// Name with the first letter lowered, used for lookup entrypoints
    pub fn lower_name(&self) -> String {
        names::first_lower(&self.name)
    }

    /// Find a field by its Elm name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The `id` field, if this message has one
    pub fn id_field(&self) -> Option<&Field> {
        self.field("id")
    }

    fn flatten_into<'a>(&'a self, out: &mut Vec<&'a Message>) {
        out.push(self);
        for nested in &self.messages {
            nested.flatten_into(out);
        }
    }

    /// Identifier types in this message's fields and oneof variants
    pub fn collect_identifiers(&self, out: &mut BTreeSet<String>) {
        for field in &self.fields {
            field.ty.collect_identifiers(out);
        }
        for oneof in &self.oneofs {
            for variant in &oneof.variants {
                variant.ty.collect_identifiers(out);
            }
        }
    }
}

/// What kind of value a field's leaf type is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A protobuf scalar
    Scalar,
    /// A reference to a message type
    MessageRef,
    /// A reference to an enum type
    EnumRef,
    /// A well-known type with a fixed codec
    WellKnown,
    /// A map field
    Map,
    /// An opaque identifier
    Identifier,
    /// The tagged union of a oneof
    OneOf,
}

/// How many values a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one value, defaulted when absent
    Required,
    /// Zero or one value
    Optional,
    /// Any number of values
    Repeated,
}

/// Which encoder/decoder pair a field uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// `Dict` built entry by entry
    Map,
    /// `Maybe` with explicit presence
    Optional,
    /// `List` built element by element
    Repeated,
    /// Direct value with a default for absent keys
    Required,
    /// Direct message value with no default
    RequiredWithoutDefault,
    /// Dispatches into a oneof's codec
    OneOf,
}

/// One record field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Name in the `.proto` file
    pub source_name: String,
    /// Elm record field name
    pub name: String,
    /// JSON key
    pub json_name: String,
    /// Protobuf field number, absent for oneof fields
    pub number: Option<i32>,
    /// Leaf classification
    pub kind: FieldKind,
    /// Value count
    pub cardinality: Cardinality,
    /// Codec shape
    pub shape: FieldShape,
    /// Resolved Elm type
    pub ty: FieldType,
    /// Record-level encoder expression
    pub encoder: String,
    /// Record-level decoder expression
    pub decoder: String,
    /// Default value expression for required fields
    pub default: Option<String>,
}

/// A oneof rendered as an Elm custom type
#[derive(Debug, Clone, PartialEq)]
pub struct OneOf {
    /// Flattened Elm type name
    pub name: String,
    /// Name in the `.proto` file
    pub source_name: String,
    /// Members in declaration order
    pub variants: Vec<OneOfVariant>,
}

impl OneOf {
    /// Decoder function name
    pub fn decoder(&self) -> String {
        names::decoder_name(&self.name)
    }

    /// Encoder function name
    pub fn encoder(&self) -> String {
        names::encoder_name(&self.name)
    }
}

/// One member of a oneof
#[derive(Debug, Clone, PartialEq)]
pub struct OneOfVariant {
    /// Elm variant name
    pub name: String,
    /// JSON key
    pub json_name: String,
    /// Payload type
    pub ty: FieldType,
    /// Payload encoder
    pub encoder: String,
    /// Payload decoder
    pub decoder: String,
}

/// A protobuf enum rendered as an Elm custom type
#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    /// Flattened Elm type name
    pub name: String,
    /// Values in declaration order; never empty
    pub variants: Vec<EnumVariant>,
}

impl Enum {
    /// The default variant, always the first declared value
    pub fn default_variant(&self) -> &EnumVariant {
        &self.variants[0]
    }

    /// Decoder function name
    pub fn decoder(&self) -> String {
        names::decoder_name(&self.name)
    }

    /// Encoder function name
    pub fn encoder(&self) -> String {
        names::encoder_name(&self.name)
    }

    /// Name of the default variant constant
    pub fn default_variable(&self) -> String {
        names::enum_default_name(&self.name)
    }

    /// Name of the variant-to-string function
    pub fn to_string_fn(&self) -> String {
        names::to_string_name(&self.name)
    }

    /// Name of the string-to-variant function
    pub fn from_string_fn(&self) -> String {
        names::from_string_name(&self.name)
    }

    /// Name of the list of all variants
    pub fn all(&self) -> String {
        names::all_name(&self.name)
    }

    /// Name of the string lookup table
    pub fn dict(&self) -> String {
        names::dict_name(&self.name)
    }
}

/// One enum value
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    /// Elm variant name
    pub name: String,
    /// Protobuf number
    pub number: i32,
    /// JSON string
    pub json_name: String,
}

/// A protobuf service
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    /// Service name
    pub name: String,
    /// RPC methods
    pub methods: Vec<Method>,
}

/// One RPC method
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// Method name
    pub name: String,
    /// Fully qualified request type
    pub input_type: String,
    /// Fully qualified response type
    pub output_type: String,
}
