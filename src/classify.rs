//! Field classification
//!
//! Every non-oneof field takes exactly one shape, checked in this order:
//! map, optional message, repeated, plain. Identifier detection runs on the
//! leaf first, so an identifier stays an identifier inside a `Dict`, `List`
//! or `Maybe`.

use crate::identifier;
use crate::model::{Cardinality, Field, FieldKind, FieldShape, OneOfVariant};
use crate::names;
use crate::options::ExtensionIndex;
use crate::types::{self, FieldType, ScalarKind};
use crate::GeneratorError;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto};

/// A single value's resolved type and codecs
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    /// Leaf classification
    pub kind: FieldKind,
    /// Elm type of one value
    pub ty: FieldType,
    /// Value encoder
    pub encoder: String,
    /// Value decoder
    pub decoder: String,
    /// Default expression, `None` for message types
    pub default: Option<String>,
}

impl Leaf {
    fn identifier(id_type: String) -> Self {
        Self {
            kind: FieldKind::Identifier,
            encoder: format!("(\\(Ids.{} id) -> JE.string id)", id_type),
            decoder: format!("(JD.string |> JD.map Ids.{})", id_type),
            default: Some(format!("(Ids.{} \"\")", id_type)),
            ty: FieldType::Identifier(id_type),
        }
    }
}

/// Where a field is declared, for extension lookups and error messages
#[derive(Debug, Clone, Copy)]
pub struct FieldScope<'a> {
    /// Fully qualified name of the declaring message, no leading dot
    pub message_full_name: &'a str,
    /// Name used for a field literally called `id`, if allowed here
    pub id_context: Option<&'a str>,
}

/// Resolves fields to their shapes and codecs
pub struct FieldClassifier<'a> {
    extensions: &'a ExtensionIndex,
}

impl<'a> FieldClassifier<'a> {
    /// Create a classifier reading overrides from `extensions`
    pub fn new(extensions: &'a ExtensionIndex) -> Self {
        Self { extensions }
    }

    /// Resolve the type and codecs of a single value of `field`
    pub fn leaf(
        &self,
        scope: FieldScope<'_>,
        field: &FieldDescriptorProto,
    ) -> Result<Leaf, GeneratorError> {
        let qualified = qualified_name(scope.message_full_name, field);
        let id_override = self.extensions.id_type_override(scope.message_full_name, field);

        if let Some(id_type) =
            identifier::classify(field.name(), id_override.as_deref(), scope.id_context, &qualified)?
        {
            return Ok(Leaf::identifier(id_type));
        }

        let ty = proto_type(field, &qualified)?;
        if let Some(scalar) = ScalarKind::from_proto(ty) {
            let unsupported = || GeneratorError::UnsupportedField {
                field: qualified.clone(),
                reason: format!("no codec for {:?}", ty),
            };
            return Ok(Leaf {
                kind: FieldKind::Scalar,
                ty: FieldType::Scalar(scalar),
                encoder: types::scalar_encoder(ty).ok_or_else(unsupported)?.to_string(),
                decoder: types::scalar_decoder(ty).ok_or_else(unsupported)?.to_string(),
                default: Some(scalar.default_value().to_string()),
            });
        }

        if let Some(wkt) = types::lookup_well_known(field.type_name()) {
            return Ok(Leaf {
                kind: FieldKind::WellKnown,
                ty: wkt.ty.clone(),
                encoder: wkt.encoder.to_string(),
                decoder: wkt.decoder.to_string(),
                default: None,
            });
        }

        let name = names::external_type(field.type_name());
        match ty {
            Type::Enum => Ok(Leaf {
                kind: FieldKind::EnumRef,
                encoder: names::encoder_name(&name),
                decoder: names::decoder_name(&name),
                default: Some(names::enum_default_name(&name)),
                ty: FieldType::Named(name),
            }),
            Type::Message => Ok(Leaf {
                kind: FieldKind::MessageRef,
                encoder: names::encoder_name(&name),
                decoder: names::decoder_name(&name),
                default: None,
                ty: FieldType::Named(name),
            }),
            _ => Err(GeneratorError::UnsupportedField {
                field: qualified,
                reason: format!("unsupported type {:?}", ty),
            }),
        }
    }

    /// Classify a plain (non-oneof) field of `message`
    pub fn field(
        &self,
        scope: FieldScope<'_>,
        message: &DescriptorProto,
        field: &FieldDescriptorProto,
    ) -> Result<Field, GeneratorError> {
        if let Some(entry) = map_entry(message, field) {
            return self.map_field(scope, entry, field);
        }

        let qualified = qualified_name(scope.message_full_name, field);
        let ty = proto_type(field, &qualified)?;
        let label = field.label();

        if label == Label::Optional && ty == Type::Message {
            let leaf = self.leaf(scope, field)?;
            return Ok(optional(field, leaf));
        }

        let leaf = self.leaf(scope, field)?;
        let key = json_key(field);
        let target = names::field_name(field.name());

        if label == Label::Repeated {
            return Ok(Field {
                decoder: format!("repeated \"{}\" {}", key, leaf.decoder),
                encoder: format!("repeatedFieldEncoder \"{}\" {} v.{}", key, leaf.encoder, target),
                ty: FieldType::list(leaf.ty),
                ..base_field(field, leaf.kind, Cardinality::Repeated, FieldShape::Repeated)
            });
        }

        if ty == Type::Message && leaf.kind != FieldKind::WellKnown {
            return Ok(Field {
                decoder: format!("requiredWithoutDefault \"{}\" {}", key, leaf.decoder),
                encoder: format!(
                    "requiredFieldEncoderWithoutDefault \"{}\" {} v.{}",
                    key, leaf.encoder, target
                ),
                ty: leaf.ty,
                ..base_field(
                    field,
                    leaf.kind,
                    Cardinality::Required,
                    FieldShape::RequiredWithoutDefault,
                )
            });
        }

        let default = leaf.default.ok_or_else(|| GeneratorError::UnsupportedField {
            field: qualified,
            reason: "no default value for a required well-known type".to_string(),
        })?;
        Ok(Field {
            decoder: format!("required \"{}\" {} {}", key, leaf.decoder, default),
            encoder: format!(
                "requiredFieldEncoder \"{}\" {} {} v.{}",
                key, leaf.encoder, default, target
            ),
            ty: leaf.ty,
            default: Some(default),
            ..base_field(field, leaf.kind, Cardinality::Required, FieldShape::Required)
        })
    }

    /// Classify the single member of a proto3 `optional` synthetic oneof
    pub fn synthetic_optional(
        &self,
        message_full_name: &str,
        field: &FieldDescriptorProto,
    ) -> Result<Field, GeneratorError> {
        let scope = FieldScope {
            message_full_name,
            id_context: None,
        };
        let leaf = self.leaf(scope, field)?;
        Ok(Field {
            number: None,
            ..optional(field, leaf)
        })
    }

    /// Build one variant of a real oneof
    pub fn oneof_variant<S: AsRef<str>>(
        &self,
        message_full_name: &str,
        field: &FieldDescriptorProto,
        variant_preface: &[S],
    ) -> Result<OneOfVariant, GeneratorError> {
        let scope = FieldScope {
            message_full_name,
            id_context: None,
        };
        let leaf = self.leaf(scope, field)?;
        Ok(OneOfVariant {
            name: names::nested_variant_name(field.name(), variant_preface),
            json_name: json_key(field),
            ty: leaf.ty,
            encoder: leaf.encoder,
            decoder: leaf.decoder,
        })
    }

    fn map_field(
        &self,
        scope: FieldScope<'_>,
        entry: &DescriptorProto,
        field: &FieldDescriptorProto,
    ) -> Result<Field, GeneratorError> {
        let (key_field, value_field) = match entry.field.as_slice() {
            [key, value] => (key, value),
            _ => {
                return Err(GeneratorError::UnsupportedField {
                    field: qualified_name(scope.message_full_name, field),
                    reason: format!(
                        "map entry {} must have exactly two fields",
                        entry.name()
                    ),
                })
            }
        };

        let entry_full_name = format!("{}.{}", scope.message_full_name, entry.name());
        let entry_scope = FieldScope {
            message_full_name: &entry_full_name,
            id_context: None,
        };
        let key = self.leaf(entry_scope, key_field)?;
        let value = self.leaf(entry_scope, value_field)?;

        let json = json_key(field);
        Ok(Field {
            decoder: format!("mapEntries \"{}\" {}", json, value.decoder),
            encoder: format!(
                "mapEntriesFieldEncoder \"{}\" {} v.{}",
                json,
                value.encoder,
                names::field_name(field.name())
            ),
            ty: FieldType::dict(key.ty, value.ty),
            ..base_field(field, FieldKind::Map, Cardinality::Repeated, FieldShape::Map)
        })
    }
}

/// The map entry type a field refers to, if it is a map field
///
/// Map entries are always declared as nested types of the message holding
/// the map field, flagged with `map_entry`.
pub fn map_entry<'m>(
    message: &'m DescriptorProto,
    field: &FieldDescriptorProto,
) -> Option<&'m DescriptorProto> {
    if field.label() != Label::Repeated || field.r#type != Some(Type::Message as i32) {
        return None;
    }

    let local = names::local_name(field.type_name());
    message.nested_type.iter().find(|nested| {
        nested.name() == local && nested.options.as_ref().is_some_and(|o| o.map_entry())
    })
}

/// Whether a nested type is a map entry and must not be emitted
pub fn is_map_entry(message: &DescriptorProto) -> bool {
    message.options.as_ref().is_some_and(|o| o.map_entry())
}

fn optional(field: &FieldDescriptorProto, leaf: Leaf) -> Field {
    let key = json_key(field);
    Field {
        decoder: format!("optional \"{}\" {}", key, leaf.decoder),
        encoder: format!(
            "optionalEncoder \"{}\" {} v.{}",
            key,
            leaf.encoder,
            names::field_name(field.name())
        ),
        ty: FieldType::maybe(leaf.ty),
        ..base_field(field, leaf.kind, Cardinality::Optional, FieldShape::Optional)
    }
}

fn base_field(
    field: &FieldDescriptorProto,
    kind: FieldKind,
    cardinality: Cardinality,
    shape: FieldShape,
) -> Field {
    Field {
        source_name: field.name().to_string(),
        name: names::field_name(field.name()),
        json_name: json_key(field),
        number: field.number,
        kind,
        cardinality,
        shape,
        ty: FieldType::Scalar(ScalarKind::String),
        encoder: String::new(),
        decoder: String::new(),
        default: None,
    }
}

/// JSON key: the descriptor's `json_name`, or lower camel case of the name
pub fn json_key(field: &FieldDescriptorProto) -> String {
    match field.json_name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => names::json_name(field.name()),
    }
}

fn qualified_name(message_full_name: &str, field: &FieldDescriptorProto) -> String {
    format!("{}.{}", message_full_name, field.name())
}

fn proto_type(field: &FieldDescriptorProto, qualified: &str) -> Result<Type, GeneratorError> {
    let ty = field
        .r#type
        .and_then(|t| Type::try_from(t).ok())
        .ok_or_else(|| GeneratorError::UnsupportedField {
            field: qualified.to_string(),
            reason: "missing or unknown field type".to_string(),
        })?;

    if ty == Type::Group {
        return Err(GeneratorError::UnsupportedField {
            field: qualified.to_string(),
            reason: "groups are not supported".to_string(),
        });
    }

    Ok(ty)
}
