//! protoc-gen-elm library
//!
//! This crate turns Protocol Buffer descriptors into an intermediate model of
//! Elm records, custom types and JSON codecs, and renders that model into Elm
//! source files.

#![deny(warnings)]
#![deny(missing_docs)]

pub mod builder;
pub mod classify;
pub mod codegen;
pub mod deprecation;
pub mod generator;
pub mod identifier;
pub mod index;
pub mod model;
pub mod names;
pub mod options;
pub mod params;
pub mod types;

use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use thiserror::Error;

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The plugin parameter string contained an unrecognised token
    #[error("unknown parameter: \"{0}\"")]
    UnknownParameter(String),

    /// A field named `id` appeared where no enclosing message name is available
    #[error("field \"{field}\": id fields are only supported as top level message fields")]
    IdFieldWithoutContext {
        /// Fully qualified name of the offending field
        field: String,
    },

    /// A field whose type or label has no classification rule
    #[error("unsupported field \"{field}\": {reason}")]
    UnsupportedField {
        /// Fully qualified name of the offending field
        field: String,
        /// What made the field unsupported
        reason: String,
    },

    /// An enum with no variants left to act as its default
    #[error("enum \"{name}\" has no values left to use as a default")]
    EmptyEnum {
        /// Elm name of the enum
        name: String,
    },

    /// Failed to read custom extension values
    #[error("failed to parse options: {0}")]
    OptionsParseError(String),

    /// Failed to decode the plugin request
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Failed to render or encode output
    #[error("encode error: {0}")]
    EncodeError(String),

    /// A model-building error, tagged with the input file it came from
    #[error("{file}: {source}")]
    InFile {
        /// Path of the input `.proto` file
        file: String,
        /// The underlying error
        #[source]
        source: Box<GeneratorError>,
    },
}

impl GeneratorError {
    /// Attach the input file name to this error
    pub fn in_file(self, file: &str) -> Self {
        match self {
            GeneratorError::InFile { .. } => self,
            other => GeneratorError::InFile {
                file: file.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Generate Elm modules from a decoded protobuf CodeGeneratorRequest
///
/// Custom extensions are only visible here when protoc left them as
/// uninterpreted options. Use [`generate_from_bytes`] for real plugin input.
pub fn generate(request: CodeGeneratorRequest) -> Result<CodeGeneratorResponse, GeneratorError> {
    generator::generate(request)
}

/// Generate Elm modules from raw CodeGeneratorRequest bytes
///
/// This entry point preserves extension data by using prost-reflect for decoding.
pub fn generate_from_bytes(bytes: &[u8]) -> Result<CodeGeneratorResponse, GeneratorError> {
    generator::generate_from_bytes(bytes)
}
