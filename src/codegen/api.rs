//! `Api.elm`: one request function per RPC method

use super::{header, output};
use crate::model::SchemaFile;
use crate::names;
use crate::GeneratorError;
use prost_types::compiler::code_generator_response::File;
use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Write};

/// Output path of the API client module
pub const FILE_NAME: &str = "Api.elm";

const PRELUDE: &str = "\
import Forward
import Helpers.Api
import Helpers.Api.Result exposing (ApiResult)
import HubTran.Effect as Effect
import HubTran.Flash as Flash
import Json.Decode
import Json.Encode
";

const REQUEST_HELPERS: &str = "\
defaultServerErrorHandler : error -> Effect.Effect msg
defaultServerErrorHandler error =
    let
        _ =
            Debug.log \"Unexpected Result\" error
    in
    Effect.flash Flash.defaultServerErrorAlert


request : String -> value -> (value -> Json.Encode.Value) -> Json.Decode.Decoder a -> Effect.Effect (ApiResult String a)
request path value encoder decoder =
    Helpers.Api.post path
        (encoder value)
        decoder
        |> Forward.sendWithError identity
";

/// A single RPC endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    /// Elm function name
    pub name: String,
    /// HTTP path
    pub path: String,
    /// Qualified request type
    pub request_type: String,
    /// Qualified response type
    pub response_type: String,
    /// Qualified request encoder
    pub encoder: String,
    /// Qualified response decoder
    pub decoder: String,
}

/// Collect the endpoints of every service in `files`
///
/// Request and response types are qualified by the module that defines
/// them; types outside the rendered files fall back to the service's module.
pub fn endpoints(files: &[SchemaFile]) -> Vec<Endpoint> {
    let defining_modules: HashMap<&str, &str> = files
        .iter()
        .flat_map(|file| {
            file.all_messages()
                .into_iter()
                .map(move |m| (m.full_name.as_str(), file.module_name.as_str()))
        })
        .collect();

    let qualify = |type_name: &str, fallback: &str| -> (String, String) {
        let module = defining_modules
            .get(type_name.trim_start_matches('.'))
            .copied()
            .unwrap_or(fallback);
        (module.to_string(), names::external_type(type_name))
    };

    let mut result = Vec::new();
    for file in files {
        for service in &file.services {
            for method in &service.methods {
                let (req_module, req_type) = qualify(&method.input_type, &file.module_name);
                let (resp_module, resp_type) = qualify(&method.output_type, &file.module_name);

                result.push(Endpoint {
                    name: names::rpc_function_name(&service.name, &method.name),
                    path: names::rpc_path(&service.name, &method.name),
                    encoder: format!("{}.{}", req_module, names::encoder_name(&req_type)),
                    decoder: format!("{}.{}", resp_module, names::decoder_name(&resp_type)),
                    request_type: format!("{}.{}", req_module, req_type),
                    response_type: format!("{}.{}", resp_module, resp_type),
                });
            }
        }
    }

    result
}

/// Render the API client module
pub fn render(files: &[SchemaFile], sources: &[&str]) -> Result<File, GeneratorError> {
    output(FILE_NAME.to_string(), render_text(files, sources))
}

fn render_text(files: &[SchemaFile], sources: &[&str]) -> Result<String, fmt::Error> {
    let endpoints = endpoints(files);
    let mut out = String::new();
    header(&mut out, "Api", sources)?;

    writeln!(out)?;
    write!(out, "{}", PRELUDE)?;
    let modules: BTreeSet<&str> = endpoints
        .iter()
        .flat_map(|e| [e.request_type.as_str(), e.response_type.as_str()])
        .filter_map(|t| t.rsplit_once('.').map(|(module, _)| module))
        .collect();
    for module in modules {
        writeln!(out, "import {}", module)?;
    }

    write!(out, "\n\n{}", REQUEST_HELPERS)?;

    for endpoint in &endpoints {
        writeln!(out)?;
        writeln!(out)?;
        writeln!(
            out,
            "{} : {} -> Effect.Effect (ApiResult String {})",
            endpoint.name, endpoint.request_type, endpoint.response_type
        )?;
        writeln!(out, "{} p =", endpoint.name)?;
        writeln!(out, "    request \"{}\"", endpoint.path)?;
        writeln!(out, "        p")?;
        writeln!(out, "        {}", endpoint.encoder)?;
        writeln!(out, "        {}", endpoint.decoder)?;
    }

    Ok(out)
}
