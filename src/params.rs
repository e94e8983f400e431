//! Plugin parameter parsing
//!
//! Parameters arrive through protoc's `--elm_opt` as a comma separated list
//! of flags, e.g. `remove-deprecated,generate-forward-ids`.

use crate::deprecation::DeprecationFilter;
use crate::GeneratorError;

/// Process-wide generation settings, resolved once per request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationParameters {
    /// Dump the request summary and built models
    pub debug: bool,
    /// Drop deprecated messages, fields, enums and enum values
    pub remove_deprecated: bool,
    /// Emit the cache key module
    pub generate_forward_cache: bool,
    /// Emit the identifier types module
    pub generate_forward_ids: bool,
    /// Emit the lookup graph module
    pub generate_forward_graph: bool,
    /// Emit the RPC client module
    pub generate_api: bool,
}

impl GenerationParameters {
    /// Parse the raw parameter string from the CodeGeneratorRequest
    ///
    /// Empty tokens are ignored. Any other unrecognised token is an error.
    pub fn parse(input: Option<&str>) -> Result<Self, GeneratorError> {
        let mut result = Self::default();
        let Some(input) = input else {
            return Ok(result);
        };

        for token in input.split(',').map(str::trim) {
            match token {
                "" => {}
                "remove-deprecated" => result.remove_deprecated = true,
                "debug" => result.debug = true,
                "generate-forward-cache" => result.generate_forward_cache = true,
                "generate-forward-ids" => result.generate_forward_ids = true,
                "generate-forward-graph" => result.generate_forward_graph = true,
                "generate-api" => result.generate_api = true,
                other => return Err(GeneratorError::UnknownParameter(other.to_string())),
            }
        }

        Ok(result)
    }

    /// The deprecation policy implied by these parameters
    pub fn deprecation_filter(&self) -> DeprecationFilter {
        DeprecationFilter::new(self.remove_deprecated)
    }
}
