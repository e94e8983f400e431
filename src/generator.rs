//! Request handling: parameters, model building and output assembly

use crate::builder::ModelBuilder;
use crate::codegen;
use crate::index::ModelIndex;
use crate::model::SchemaFile;
use crate::names;
use crate::options::ExtensionIndex;
use crate::params::GenerationParameters;
use crate::GeneratorError;
use prost::Message;
use prost_types::compiler::code_generator_response::Feature;
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use prost_types::FileDescriptorProto;
use std::collections::HashMap;

/// Files that only define extensions or well-known types
pub const EXCLUDED_FILES: &[&str] = &[
    "forwardextensions.proto",
    "google/protobuf/timestamp.proto",
    "google/protobuf/wrappers.proto",
    "google/protobuf/descriptor.proto",
];

/// Whether a file is never rendered
pub fn is_excluded(path: &str) -> bool {
    EXCLUDED_FILES.contains(&path)
}

/// Generate from a decoded request
///
/// Extension values are only available as uninterpreted options here.
pub fn generate(request: CodeGeneratorRequest) -> Result<CodeGeneratorResponse, GeneratorError> {
    generate_with_extensions(request, &ExtensionIndex::default())
}

/// Generate from raw request bytes, reading extension values with prost-reflect
pub fn generate_from_bytes(bytes: &[u8]) -> Result<CodeGeneratorResponse, GeneratorError> {
    let request =
        CodeGeneratorRequest::decode(bytes).map_err(|e| GeneratorError::DecodeError(e.to_string()))?;
    let extensions = ExtensionIndex::from_request_bytes(bytes)?;

    generate_with_extensions(request, &extensions)
}

fn generate_with_extensions(
    request: CodeGeneratorRequest,
    extensions: &ExtensionIndex,
) -> Result<CodeGeneratorResponse, GeneratorError> {
    let params = GenerationParameters::parse(request.parameter.as_deref())?;

    if params.debug {
        tracing::info!(
            files = ?request.proto_file.iter().map(|f| f.name()).collect::<Vec<_>>(),
            to_generate = ?request.file_to_generate,
            parameters = ?params,
            "received request"
        );
    }

    let builder = ModelBuilder::new(&params, extensions);

    let module_names: HashMap<&str, String> = request
        .proto_file
        .iter()
        .map(|f| (f.name(), names::module_name(&builder.package_name(f))))
        .collect();

    let mut models: Vec<SchemaFile> = Vec::new();
    for file in &request.proto_file {
        if is_excluded(file.name()) {
            tracing::debug!(file = file.name(), "skipping well-known file");
            continue;
        }

        tracing::debug!(file = file.name(), "processing file");
        let model = builder.build_file(file)?;
        if params.debug {
            tracing::info!("model for {}:\n{:#?}", file.name(), model);
        }
        models.push(model);
    }

    let mut files = Vec::with_capacity(models.len() + 4);
    for (model, descriptor) in models.iter().zip(rendered(&request.proto_file)) {
        let imports = imports(descriptor, &module_names);
        files.push(codegen::module::render(model, &imports)?);
    }

    let sources: Vec<&str> = models.iter().map(|m| m.path.as_str()).collect();
    let index = ModelIndex::new(&models);

    if params.generate_forward_ids {
        files.push(codegen::ids::render(&index.identifier_types(), &sources)?);
    }
    if params.generate_forward_graph || params.generate_forward_cache {
        let nodes = index.graph_nodes();
        if params.generate_forward_graph {
            files.push(codegen::graph::render(&nodes, &sources)?);
        }
        if params.generate_forward_cache {
            files.push(codegen::cache::render(&nodes, &sources)?);
        }
    }
    if params.generate_api {
        files.push(codegen::api::render(&models, &sources)?);
    }

    Ok(CodeGeneratorResponse {
        file: files,
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    })
}

fn rendered(files: &[FileDescriptorProto]) -> impl Iterator<Item = &FileDescriptorProto> {
    files.iter().filter(|f| !is_excluded(f.name()))
}

/// Module names of a file's rendered dependencies, in declaration order
fn imports(file: &FileDescriptorProto, module_names: &HashMap<&str, String>) -> Vec<String> {
    file.dependency
        .iter()
        .filter(|d| !is_excluded(d))
        .map(|d| {
            module_names
                .get(d.as_str())
                .cloned()
                .unwrap_or_else(|| names::module_name(&names::package_path(d)))
        })
        .collect()
}
