//! Type model builder
//!
//! Walks a `FileDescriptorProto` top-down, carrying the preface (enclosing
//! message names, innermost first) so nested definitions get flattened,
//! unique names. Deprecated elements are dropped according to the
//! generation parameters before anything is classified.

use crate::classify::{self, FieldClassifier, FieldScope};
use crate::model::{
    Cardinality, Enum, EnumVariant, Field, FieldKind, FieldShape, Message, Method, OneOf,
    SchemaFile, Service,
};
use crate::names;
use crate::options::ExtensionIndex;
use crate::params::GenerationParameters;
use crate::types::FieldType;
use crate::GeneratorError;
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    ServiceDescriptorProto,
};

/// Builds [`SchemaFile`] models from file descriptors
pub struct ModelBuilder<'a> {
    params: &'a GenerationParameters,
    extensions: &'a ExtensionIndex,
    classifier: FieldClassifier<'a>,
}

impl<'a> ModelBuilder<'a> {
    /// Create a builder for one request
    pub fn new(params: &'a GenerationParameters, extensions: &'a ExtensionIndex) -> Self {
        Self {
            params,
            extensions,
            classifier: FieldClassifier::new(extensions),
        }
    }

    /// Package path of a file: the `elm_package` override or its path
    pub fn package_name(&self, file: &FileDescriptorProto) -> String {
        self.extensions
            .package_override(file)
            .unwrap_or_else(|| names::package_path(file.name()))
    }

    /// Build the model for one file
    ///
    /// Errors carry the file name.
    pub fn build_file(&self, file: &FileDescriptorProto) -> Result<SchemaFile, GeneratorError> {
        tracing::debug!(file = file.name(), "building model");
        self.build_file_inner(file).map_err(|e| e.in_file(file.name()))
    }

    fn build_file_inner(&self, file: &FileDescriptorProto) -> Result<SchemaFile, GeneratorError> {
        let package = self.package_name(file);
        let proto_package = file.package();
        let preface: Vec<String> = Vec::new();

        Ok(SchemaFile {
            path: file.name().to_string(),
            module_name: names::module_name(&package),
            package,
            enums: self.enums(&preface, &file.enum_type)?,
            messages: self.messages(proto_package, &preface, &file.message_type)?,
            services: self.services(&file.service),
            dependencies: file.dependency.clone(),
        })
    }

    fn enums(
        &self,
        preface: &[String],
        enums: &[EnumDescriptorProto],
    ) -> Result<Vec<Enum>, GeneratorError> {
        let filter = self.params.deprecation_filter();
        let mut result = Vec::new();

        for descriptor in enums.iter().filter(|e| filter.retains(*e)) {
            let name = names::nested_type(descriptor.name(), preface);
            let variants: Vec<EnumVariant> = descriptor
                .value
                .iter()
                .filter(|v| filter.retains(*v))
                .map(|v| EnumVariant {
                    name: names::nested_variant_name(v.name(), preface),
                    number: v.number(),
                    json_name: v.name().to_string(),
                })
                .collect();

            if variants.is_empty() {
                return Err(GeneratorError::EmptyEnum { name });
            }

            result.push(Enum { name, variants });
        }

        Ok(result)
    }

    fn messages(
        &self,
        parent_full_name: &str,
        preface: &[String],
        messages: &[DescriptorProto],
    ) -> Result<Vec<Message>, GeneratorError> {
        let filter = self.params.deprecation_filter();

        messages
            .iter()
            .filter(|m| filter.retains(*m))
            .filter(|m| !classify::is_map_entry(m))
            .map(|m| self.message(parent_full_name, preface, m))
            .collect()
    }

    fn message(
        &self,
        parent_full_name: &str,
        preface: &[String],
        descriptor: &DescriptorProto,
    ) -> Result<Message, GeneratorError> {
        let filter = self.params.deprecation_filter();
        let full_name = join_name(parent_full_name, descriptor.name());
        let name = names::nested_type(descriptor.name(), preface);

        let scope = FieldScope {
            message_full_name: &full_name,
            id_context: Some(descriptor.name()),
        };

        let mut fields = Vec::new();
        for field in descriptor.field.iter().filter(|f| filter.retains(*f)) {
            if field.oneof_index.is_some() {
                continue;
            }
            fields.push(self.classifier.field(scope, descriptor, field)?);
        }

        let mut inner_preface = Vec::with_capacity(preface.len() + 1);
        inner_preface.push(descriptor.name().to_string());
        inner_preface.extend_from_slice(preface);

        let mut oneofs = Vec::new();
        for (index, decl) in descriptor.oneof_decl.iter().enumerate() {
            let members: Vec<&FieldDescriptorProto> = descriptor
                .field
                .iter()
                .filter(|f| f.oneof_index == Some(index as i32))
                .collect();

            if let Some(synthetic) = members.iter().find(|f| f.proto3_optional()) {
                if filter.retains(*synthetic) {
                    fields.push(self.classifier.synthetic_optional(&full_name, synthetic)?);
                }
                continue;
            }

            let mut variant_preface = Vec::with_capacity(inner_preface.len() + 1);
            variant_preface.push(decl.name().to_string());
            variant_preface.extend_from_slice(&inner_preface);

            let variants = members
                .into_iter()
                .filter(|f| filter.retains(*f))
                .map(|f| self.classifier.oneof_variant(&full_name, f, &variant_preface))
                .collect::<Result<Vec<_>, _>>()?;

            if variants.is_empty() {
                tracing::debug!(message = %full_name, oneof = decl.name(), "dropping empty oneof");
                continue;
            }

            let oneof = OneOf {
                name: names::nested_type(decl.name(), &inner_preface),
                source_name: decl.name().to_string(),
                variants,
            };
            fields.push(oneof_field(&oneof));
            oneofs.push(oneof);
        }

        Ok(Message {
            singleton: self.extensions.is_singleton(&full_name, descriptor),
            enums: self.enums(&inner_preface, &descriptor.enum_type)?,
            messages: self.messages(&full_name, &inner_preface, &descriptor.nested_type)?,
            name,
            full_name,
            fields,
            oneofs,
        })
    }

    fn services(&self, services: &[ServiceDescriptorProto]) -> Vec<Service> {
        let filter = self.params.deprecation_filter();

        services
            .iter()
            .filter(|s| filter.retains(*s))
            .map(|s| Service {
                name: s.name().to_string(),
                methods: s
                    .method
                    .iter()
                    .filter(|m| filter.retains(*m))
                    .map(|m| Method {
                        name: m.name().to_string(),
                        input_type: m.input_type().to_string(),
                        output_type: m.output_type().to_string(),
                    })
                    .collect(),
            })
            .collect()
    }
}

fn oneof_field(oneof: &OneOf) -> Field {
    let name = names::field_name(&oneof.source_name);
    Field {
        source_name: oneof.source_name.clone(),
        json_name: names::json_name(&oneof.source_name),
        number: None,
        kind: FieldKind::OneOf,
        cardinality: Cardinality::Required,
        shape: FieldShape::OneOf,
        ty: FieldType::Named(oneof.name.clone()),
        encoder: format!("{} v.{}", oneof.encoder(), name),
        decoder: format!("field {}", oneof.decoder()),
        default: None,
        name,
    }
}

fn join_name(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::field_descriptor_proto::{Label, Type};
    use prost_types::{EnumOptions, EnumValueDescriptorProto, EnumValueOptions, FieldOptions, OneofDescriptorProto};

    fn field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            r#type: Some(ty as i32),
            label: Some(Label::Optional as i32),
            ..Default::default()
        }
    }

    fn value(name: &str, number: i32, deprecated: bool) -> EnumValueDescriptorProto {
        EnumValueDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            options: deprecated.then(|| EnumValueOptions {
                deprecated: Some(true),
                ..Default::default()
            }),
        }
    }

    fn file(messages: Vec<DescriptorProto>) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some("shop/account.proto".to_string()),
            package: Some("shop".to_string()),
            message_type: messages,
            ..Default::default()
        }
    }

    fn build(file: &FileDescriptorProto, params: GenerationParameters) -> Result<SchemaFile, GeneratorError> {
        let index = ExtensionIndex::default();
        ModelBuilder::new(&params, &index).build_file(file)
    }

    #[test]
    fn test_nested_names_are_flattened() {
        let inner = DescriptorProto {
            name: Some("Inner".to_string()),
            ..Default::default()
        };
        let middle = DescriptorProto {
            name: Some("Middle".to_string()),
            nested_type: vec![inner.clone()],
            ..Default::default()
        };
        let outer = DescriptorProto {
            name: Some("Outer".to_string()),
            nested_type: vec![inner, middle],
            ..Default::default()
        };

        let model = build(&file(vec![outer]), GenerationParameters::default()).unwrap();
        let names: Vec<_> = model.all_messages().iter().map(|m| m.name.clone()).collect();
        assert_eq!(names, vec!["Outer", "Outer_Inner", "Outer_Middle", "Outer_Middle_Inner"]);
        assert_eq!(model.all_messages()[3].full_name, "shop.Outer.Middle.Inner");
        assert_eq!(model.module_name, "Shop.Account");
    }

    #[test]
    fn test_enum_default_and_variants() {
        let status = EnumDescriptorProto {
            name: Some("Status".to_string()),
            value: vec![value("STATUS_UNKNOWN", 0, false), value("STATUS_ACTIVE", 1, false)],
            ..Default::default()
        };
        let account = DescriptorProto {
            name: Some("Account".to_string()),
            enum_type: vec![status],
            ..Default::default()
        };

        let model = build(&file(vec![account]), GenerationParameters::default()).unwrap();
        let status = &model.messages[0].enums[0];
        assert_eq!(status.name, "Account_Status");
        assert_eq!(status.default_variant().name, "Account_StatusUnknown");
        assert_eq!(status.variants[1].json_name, "STATUS_ACTIVE");
    }

    #[test]
    fn test_enum_emptied_by_filter_is_fatal() {
        let legacy = EnumDescriptorProto {
            name: Some("Legacy".to_string()),
            value: vec![value("LEGACY_A", 0, true)],
            ..Default::default()
        };
        let proto = FileDescriptorProto {
            enum_type: vec![legacy],
            ..file(vec![])
        };

        assert!(build(&proto, GenerationParameters::default()).is_ok());

        let params = GenerationParameters {
            remove_deprecated: true,
            ..Default::default()
        };
        let err = build(&proto, params).unwrap_err();
        assert_eq!(err.to_string(), "shop/account.proto: enum \"Legacy\" has no values left to use as a default");
    }

    #[test]
    fn test_deprecated_enum_is_dropped() {
        let legacy = EnumDescriptorProto {
            name: Some("Legacy".to_string()),
            value: vec![value("LEGACY_A", 0, false)],
            options: Some(EnumOptions {
                deprecated: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let proto = FileDescriptorProto {
            enum_type: vec![legacy],
            ..file(vec![])
        };
        let params = GenerationParameters {
            remove_deprecated: true,
            ..Default::default()
        };
        assert!(build(&proto, params).unwrap().enums.is_empty());
    }

    #[test]
    fn test_proto3_optional_is_not_a_oneof() {
        let account = DescriptorProto {
            name: Some("Account".to_string()),
            field: vec![FieldDescriptorProto {
                oneof_index: Some(0),
                proto3_optional: Some(true),
                ..field("nickname", 1, Type::String)
            }],
            oneof_decl: vec![OneofDescriptorProto {
                name: Some("_nickname".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let model = build(&file(vec![account]), GenerationParameters::default()).unwrap();
        let account = &model.messages[0];
        assert!(account.oneofs.is_empty());
        assert_eq!(account.fields.len(), 1);
        assert_eq!(account.fields[0].shape, FieldShape::Optional);
        assert_eq!(account.fields[0].ty.to_string(), "Maybe String");
    }

    #[test]
    fn test_real_oneof() {
        let payment = DescriptorProto {
            name: Some("Payment".to_string()),
            field: vec![
                field("amount", 1, Type::Int64),
                FieldDescriptorProto {
                    oneof_index: Some(0),
                    ..field("card", 2, Type::String)
                },
                FieldDescriptorProto {
                    oneof_index: Some(0),
                    ..field("invoice", 3, Type::String)
                },
            ],
            oneof_decl: vec![OneofDescriptorProto {
                name: Some("method".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let model = build(&file(vec![payment]), GenerationParameters::default()).unwrap();
        let payment = &model.messages[0];
        assert_eq!(payment.oneofs.len(), 1);

        let oneof = &payment.oneofs[0];
        assert_eq!(oneof.name, "Payment_Method");
        let variants: Vec<_> = oneof.variants.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(variants, vec!["Payment_Method_Card", "Payment_Method_Invoice"]);

        let method = payment.field("method").unwrap();
        assert_eq!(method.ty.to_string(), "Payment_Method");
        assert_eq!(method.decoder, "field payment_MethodDecoder");
        assert_eq!(method.encoder, "payment_MethodEncoder v.method");
        assert_eq!(payment.fields.len(), 2);
    }

    #[test]
    fn test_oneof_emptied_by_filter_is_dropped() {
        let deprecated = Some(FieldOptions {
            deprecated: Some(true),
            ..Default::default()
        });
        let payment = DescriptorProto {
            name: Some("Payment".to_string()),
            field: vec![FieldDescriptorProto {
                oneof_index: Some(0),
                options: deprecated,
                ..field("card", 1, Type::String)
            }],
            oneof_decl: vec![OneofDescriptorProto {
                name: Some("method".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let params = GenerationParameters {
            remove_deprecated: true,
            ..Default::default()
        };

        let model = build(&file(vec![payment]), params).unwrap();
        assert!(model.messages[0].oneofs.is_empty());
        assert!(model.messages[0].fields.is_empty());
    }

    #[test]
    fn test_id_in_oneof_is_fatal() {
        let holder = DescriptorProto {
            name: Some("Holder".to_string()),
            field: vec![FieldDescriptorProto {
                oneof_index: Some(0),
                ..field("id", 1, Type::String)
            }],
            oneof_decl: vec![OneofDescriptorProto {
                name: Some("choice".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let err = build(&file(vec![holder]), GenerationParameters::default()).unwrap_err();
        assert!(err.to_string().contains("shop.Holder.id"));
    }

    #[test]
    fn test_deprecation_filter_removes_subset() {
        let account = DescriptorProto {
            name: Some("Account".to_string()),
            field: vec![
                field("name", 1, Type::String),
                FieldDescriptorProto {
                    options: Some(FieldOptions {
                        deprecated: Some(true),
                        ..Default::default()
                    }),
                    ..field("legacy_name", 2, Type::String)
                },
            ],
            ..Default::default()
        };
        let proto = file(vec![account]);
        let strict = GenerationParameters {
            remove_deprecated: true,
            ..Default::default()
        };

        let full = build(&proto, GenerationParameters::default()).unwrap();
        let filtered = build(&proto, strict).unwrap();
        assert_eq!(filtered, build(&proto, strict).unwrap());

        let kept = &filtered.messages[0].fields;
        assert_eq!(kept.len(), 1);
        assert!(full.messages[0].fields.contains(&kept[0]));
        assert_eq!(full.messages[0].fields.len(), 2);
    }
}
