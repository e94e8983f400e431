//! Options parsing for the forward protobuf extensions
//!
//! This module handles `(forwardextensions.elm_package)` on files,
//! `(forwardextensions.singleton)` on messages and
//! `(forwardextensions.id_type_override)` on fields.
//!
//! Custom protobuf extensions are stored as extension fields in the options
//! messages, which prost drops while decoding. We rebuild a descriptor pool
//! from the raw request bytes with prost-reflect, read the extension values
//! once, and keep them in an immutable [`ExtensionIndex`]. Options that protoc
//! left uninterpreted are parsed as a fallback.

use crate::GeneratorError;
use prost::Message;
use prost_reflect::{DescriptorPool, DynamicMessage, ExtensionDescriptor, Value};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto, UninterpretedOption};
use std::collections::{HashMap, HashSet};

/// Extension name for the Elm package override
pub const PACKAGE_EXTENSION_NAME: &str = "forwardextensions.elm_package";

/// Extension name for the singleton marker
pub const SINGLETON_EXTENSION_NAME: &str = "forwardextensions.singleton";

/// Extension name for the identifier type override
pub const ID_TYPE_OVERRIDE_EXTENSION_NAME: &str = "forwardextensions.id_type_override";

/// Only the file list of a CodeGeneratorRequest, kept as raw bytes
#[derive(Clone, PartialEq, ::prost::Message)]
struct RawCodeGeneratorRequest {
    #[prost(bytes, repeated, tag = "15")]
    pub proto_file: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
struct RawFileDescriptorSet {
    #[prost(bytes, repeated, tag = "1")]
    pub file: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

/// Extension values read from a request, keyed by descriptor
///
/// Message keys are fully qualified names without a leading dot
/// (`shop.v1.Order.Line`); field keys pair that with the field number.
#[derive(Debug, Clone, Default)]
pub struct ExtensionIndex {
    packages: HashMap<String, String>,
    singletons: HashSet<String>,
    id_type_overrides: HashMap<(String, i32), String>,
}

impl ExtensionIndex {
    /// Read every extension value from raw CodeGeneratorRequest bytes
    pub fn from_request_bytes(bytes: &[u8]) -> Result<Self, GeneratorError> {
        let request = RawCodeGeneratorRequest::decode(bytes)
            .map_err(|e| GeneratorError::DecodeError(e.to_string()))?;

        let set = RawFileDescriptorSet {
            file: request.proto_file,
        };
        let pool = DescriptorPool::decode(set.encode_to_vec().as_slice())
            .map_err(|e| GeneratorError::OptionsParseError(e.to_string()))?;

        Ok(Self::from_pool(&pool))
    }

    /// Read every extension value from an already built descriptor pool
    pub fn from_pool(pool: &DescriptorPool) -> Self {
        let mut index = Self::default();

        let package_ext = pool.get_extension_by_name(PACKAGE_EXTENSION_NAME);
        let singleton_ext = pool.get_extension_by_name(SINGLETON_EXTENSION_NAME);
        let id_ext = pool.get_extension_by_name(ID_TYPE_OVERRIDE_EXTENSION_NAME);

        if let Some(ext) = package_ext.as_ref() {
            for file in pool.files() {
                if let Some(package) = string_extension(&file.options(), ext) {
                    index.packages.insert(file.name().to_string(), package);
                }
            }
        }

        for message in pool.all_messages() {
            if let Some(ext) = singleton_ext.as_ref() {
                if message.options().has_extension(ext) {
                    index.singletons.insert(message.full_name().to_string());
                }
            }

            if let Some(ext) = id_ext.as_ref() {
                for field in message.fields() {
                    if let Some(id_type) = string_extension(&field.options(), ext) {
                        index.id_type_overrides.insert(
                            (message.full_name().to_string(), field.number() as i32),
                            id_type,
                        );
                    }
                }
            }
        }

        tracing::debug!(
            packages = index.packages.len(),
            singletons = index.singletons.len(),
            id_type_overrides = index.id_type_overrides.len(),
            "indexed extension values"
        );

        index
    }

    /// Elm package override declared on a file, if any
    pub fn package_override(&self, file: &FileDescriptorProto) -> Option<String> {
        if let Some(package) = self.packages.get(file.name()) {
            return Some(package.clone());
        }

        let opts = file.options.as_ref()?;
        parse_string_from_uninterpreted(&opts.uninterpreted_option, PACKAGE_EXTENSION_NAME)
    }

    /// Whether a message carries the singleton marker
    ///
    /// `full_name` is the message's fully qualified name without a leading dot.
    pub fn is_singleton(&self, full_name: &str, message: &DescriptorProto) -> bool {
        if self.singletons.contains(full_name) {
            return true;
        }

        message.options.as_ref().is_some_and(|opts| {
            opts.uninterpreted_option
                .iter()
                .any(|opt| is_extension_option(opt, SINGLETON_EXTENSION_NAME))
        })
    }

    /// Identifier type override declared on a field, if any
    ///
    /// `Some("")` means the override is present but empty, which disables
    /// identifier detection for the field.
    pub fn id_type_override(
        &self,
        message_full_name: &str,
        field: &FieldDescriptorProto,
    ) -> Option<String> {
        let key = (message_full_name.to_string(), field.number());
        if let Some(id_type) = self.id_type_overrides.get(&key) {
            return Some(id_type.clone());
        }

        let opts = field.options.as_ref()?;
        parse_string_from_uninterpreted(&opts.uninterpreted_option, ID_TYPE_OVERRIDE_EXTENSION_NAME)
    }
}

/// Read a string extension value, `None` when the extension is absent
fn string_extension(opts: &DynamicMessage, ext: &ExtensionDescriptor) -> Option<String> {
    if !opts.has_extension(ext) {
        return None;
    }

    match opts.get_extension(ext).as_ref() {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

// =============================================================================
// Fallback: Uninterpreted option parsing
// =============================================================================

/// Check if an uninterpreted option matches our extension name
fn is_extension_option(opt: &UninterpretedOption, extension_name: &str) -> bool {
    // The name parts form a path like: (forwardextensions.singleton)
    let Some(first) = opt.name.first() else {
        return false;
    };

    // First name part should be the extension name in parentheses (is_extension=true)
    first.is_extension && first.name_part.trim_start_matches('.') == extension_name
}

/// Find a string-valued option for the given extension
fn parse_string_from_uninterpreted(
    uninterpreted: &[UninterpretedOption],
    extension_name: &str,
) -> Option<String> {
    uninterpreted
        .iter()
        .find(|opt| is_extension_option(opt, extension_name))
        .and_then(parse_string_option)
}

/// Parse a string value from an uninterpreted option
///
/// An option with neither a string nor an identifier value counts as absent.
fn parse_string_option(opt: &UninterpretedOption) -> Option<String> {
    if let Some(ref s) = opt.string_value {
        return Some(String::from_utf8_lossy(s).to_string());
    }
    if let Some(ref s) = opt.identifier_value {
        return Some(s.clone());
    }

    let name = opt.name.first().map(|p| p.name_part.as_str()).unwrap_or_default();
    tracing::warn!(option = name, "ignoring option without a string value");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::uninterpreted_option::NamePart;
    use prost_types::{FieldOptions, FileOptions, MessageOptions};

    fn option(name: &str) -> UninterpretedOption {
        UninterpretedOption {
            name: vec![NamePart {
                name_part: name.to_string(),
                is_extension: true,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_absent_extensions() {
        let index = ExtensionIndex::default();
        let file = FileDescriptorProto {
            name: Some("shop.proto".to_string()),
            ..Default::default()
        };
        let message = DescriptorProto::default();
        let field = FieldDescriptorProto::default();

        assert_eq!(index.package_override(&file), None);
        assert!(!index.is_singleton("shop.Order", &message));
        assert_eq!(index.id_type_override("shop.Order", &field), None);
    }

    #[test]
    fn test_uninterpreted_package_override() {
        let file = FileDescriptorProto {
            name: Some("shop.proto".to_string()),
            options: Some(FileOptions {
                uninterpreted_option: vec![UninterpretedOption {
                    string_value: Some(b"Pb".to_vec()),
                    ..option(PACKAGE_EXTENSION_NAME)
                }],
                ..Default::default()
            }),
            ..Default::default()
        };

        let index = ExtensionIndex::default();
        assert_eq!(index.package_override(&file), Some("Pb".to_string()));
    }

    #[test]
    fn test_uninterpreted_singleton() {
        let message = DescriptorProto {
            name: Some("Settings".to_string()),
            options: Some(MessageOptions {
                uninterpreted_option: vec![UninterpretedOption {
                    identifier_value: Some("true".to_string()),
                    ..option(SINGLETON_EXTENSION_NAME)
                }],
                ..Default::default()
            }),
            ..Default::default()
        };

        let index = ExtensionIndex::default();
        assert!(index.is_singleton("shop.Settings", &message));
    }

    #[test]
    fn test_uninterpreted_id_override_keeps_empty_value() {
        let field = FieldDescriptorProto {
            name: Some("external_id".to_string()),
            number: Some(2),
            options: Some(FieldOptions {
                uninterpreted_option: vec![UninterpretedOption {
                    string_value: Some(Vec::new()),
                    ..option(ID_TYPE_OVERRIDE_EXTENSION_NAME)
                }],
                ..Default::default()
            }),
            ..Default::default()
        };

        let index = ExtensionIndex::default();
        assert_eq!(index.id_type_override("shop.Order", &field), Some(String::new()));
    }

    #[test]
    fn test_uninterpreted_id_override_without_value_is_absent() {
        let field = FieldDescriptorProto {
            name: Some("external_id".to_string()),
            number: Some(2),
            options: Some(FieldOptions {
                uninterpreted_option: vec![UninterpretedOption {
                    positive_int_value: Some(7),
                    ..option(ID_TYPE_OVERRIDE_EXTENSION_NAME)
                }],
                ..Default::default()
            }),
            ..Default::default()
        };

        let index = ExtensionIndex::default();
        assert_eq!(index.id_type_override("shop.Order", &field), None);
    }

    #[test]
    fn test_other_extensions_are_ignored() {
        let field = FieldDescriptorProto {
            options: Some(FieldOptions {
                uninterpreted_option: vec![UninterpretedOption {
                    string_value: Some(b"user".to_vec()),
                    ..option("other.id_type_override")
                }],
                ..Default::default()
            }),
            ..Default::default()
        };

        let index = ExtensionIndex::default();
        assert_eq!(index.id_type_override("shop.Order", &field), None);
    }

    #[test]
    fn test_index_lookup_wins() {
        let mut index = ExtensionIndex::default();
        index
            .id_type_overrides
            .insert(("shop.Order".to_string(), 3), "Customer".to_string());
        index.singletons.insert("shop.Settings".to_string());

        let field = FieldDescriptorProto {
            number: Some(3),
            ..Default::default()
        };
        assert_eq!(
            index.id_type_override("shop.Order", &field),
            Some("Customer".to_string())
        );
        assert!(index.is_singleton("shop.Settings", &DescriptorProto::default()));
    }
}
