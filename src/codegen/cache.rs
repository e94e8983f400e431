//! `ForwardNew/Interface/Cache.elm`: one cache key per lookup graph node

use super::{header, list, output};
use crate::index::GraphNode;
use crate::names;
use crate::GeneratorError;
use prost_types::compiler::code_generator_response::File;
use std::fmt::{self, Write};

/// Output path of the cache key module
pub const FILE_NAME: &str = "ForwardNew/Interface/Cache.elm";

const MODULE_NAME: &str = "ForwardNew.Interface.Cache";

// Elm has no empty custom types
const NO_KEYS: &str = "NoCacheKey";

/// Render the cache key module
pub fn render(nodes: &[GraphNode], sources: &[&str]) -> Result<File, GeneratorError> {
    output(FILE_NAME.to_string(), render_text(nodes, sources))
}

fn key_variant(node: &GraphNode) -> String {
    format!("{}Key", names::first_upper(&node.lower_name))
}

fn render_text(nodes: &[GraphNode], sources: &[&str]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    header(&mut out, MODULE_NAME, sources)?;

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "type CacheKey")?;
    if nodes.is_empty() {
        writeln!(out, "    = {}", NO_KEYS)?;
    }
    for (i, node) in nodes.iter().enumerate() {
        let sep = if i == 0 { "=" } else { "|" };
        writeln!(out, "    {} {}", sep, key_variant(node))?;
    }

    for node in nodes {
        writeln!(out)?;
        writeln!(out)?;
        writeln!(out, "{} : CacheKey", node.lower_name)?;
        writeln!(out, "{} =", node.lower_name)?;
        writeln!(out, "    {}", key_variant(node))?;
    }

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "toString : CacheKey -> String")?;
    writeln!(out, "toString key =")?;
    writeln!(out, "    case key of")?;
    if nodes.is_empty() {
        writeln!(out, "        {} ->", NO_KEYS)?;
        writeln!(out, "            \"\"")?;
    }
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "        {} ->", key_variant(node))?;
        writeln!(out, "            \"{}\"", node.entrypoint)?;
    }

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "allKeys : List CacheKey")?;
    writeln!(out, "allKeys =")?;
    list(&mut out, "    ", nodes.iter().map(key_variant))?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(lower_name: &str, entrypoint: &str) -> GraphNode {
        GraphNode {
            module_name: "Shop".to_string(),
            type_name: names::first_upper(lower_name),
            lower_name: lower_name.to_string(),
            entrypoint: entrypoint.to_string(),
            key_type: "()".to_string(),
            parameters: "Lookup.noParameters".to_string(),
        }
    }

    #[test]
    fn test_render_cache() {
        let nodes = vec![node("settings", "settingsSingleton"), node("order", "order")];
        let content = render(&nodes, &["shop.proto"]).unwrap().content.unwrap();

        assert!(content.contains("type CacheKey\n    = SettingsKey\n    | OrderKey\n"));
        assert!(content.contains("order : CacheKey\norder =\n    OrderKey\n"));
        assert!(content.contains("        SettingsKey ->\n            \"settingsSingleton\"\n"));
        assert!(content.contains("allKeys =\n    [ SettingsKey\n    , OrderKey\n    ]\n"));
    }

    #[test]
    fn test_render_without_nodes() {
        let content = render(&[], &[]).unwrap().content.unwrap();
        assert!(content.contains("type CacheKey\n    = NoCacheKey\n"));
        assert!(content.contains("allKeys =\n    []\n"));
    }
}
