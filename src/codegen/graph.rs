//! `DomainNew/Graph.elm`: lookup graph over singletons and keyed messages

use super::{header, list, output};
use crate::index::GraphNode;
use crate::names;
use crate::GeneratorError;
use prost_types::compiler::code_generator_response::File;
use std::collections::BTreeSet;
use std::fmt::{self, Write};

/// Output path of the lookup graph module
pub const FILE_NAME: &str = "DomainNew/Graph.elm";

const MODULE_NAME: &str = "DomainNew.Graph";

/// Render the lookup graph module
pub fn render(nodes: &[GraphNode], sources: &[&str]) -> Result<File, GeneratorError> {
    output(FILE_NAME.to_string(), render_text(nodes, sources))
}

fn render_text(nodes: &[GraphNode], sources: &[&str]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    header(&mut out, MODULE_NAME, sources)?;

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "import ForwardNew.Interface.Cache as Cache")?;
    writeln!(out, "import ForwardNew.Lookup as Lookup exposing (Lookup)")?;
    writeln!(out, "import Ids")?;
    writeln!(out, "import Json.Decode as Decode")?;
    writeln!(out, "import LocalExtra.Lookup as LookupExtra")?;
    let modules: BTreeSet<&str> = nodes.iter().map(|n| n.module_name.as_str()).collect();
    for module in modules {
        writeln!(out, "import {}", module)?;
    }

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "allDecoders : List Lookup.DecoderConfig")?;
    writeln!(out, "allDecoders =")?;
    list(
        &mut out,
        "    ",
        nodes
            .iter()
            .map(|n| format!("Lookup.toDecoderConfig {}", n.entrypoint)),
    )?;

    for node in nodes {
        writeln!(out)?;
        writeln!(out)?;
        writeln!(
            out,
            "{} : Lookup {} {}.{}",
            node.entrypoint,
            super::paren(&node.key_type),
            node.module_name,
            node.type_name
        )?;
        writeln!(out, "{} =", node.entrypoint)?;
        writeln!(out, "    Lookup.defineNode")?;
        writeln!(out, "        {{ entrypoint = \"{}\"", node.entrypoint)?;
        writeln!(out, "        , parameters = {}", node.parameters)?;
        writeln!(
            out,
            "        , decoder = {}.{}",
            node.module_name,
            names::decoder_name(&node.type_name)
        )?;
        writeln!(out, "        , cacheKey = Cache.{}", node.lower_name)?;
        writeln!(out, "        }}")?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_graph() {
        let nodes = vec![
            GraphNode {
                module_name: "Shop.Settings".to_string(),
                type_name: "Settings".to_string(),
                lower_name: "settings".to_string(),
                entrypoint: "settingsSingleton".to_string(),
                key_type: "()".to_string(),
                parameters: "Lookup.noParameters".to_string(),
            },
            GraphNode {
                module_name: "Shop.Order".to_string(),
                type_name: "Order".to_string(),
                lower_name: "order".to_string(),
                entrypoint: "order".to_string(),
                key_type: "Ids.Order".to_string(),
                parameters: "LookupExtra.idParam (\\(Ids.Order id) -> id)".to_string(),
            },
        ];

        let file = render(&nodes, &["shop/order.proto", "shop/settings.proto"]).unwrap();
        assert_eq!(file.name.as_deref(), Some("DomainNew/Graph.elm"));

        let content = file.content.unwrap();
        assert!(content.starts_with("module DomainNew.Graph exposing (..)\n"));
        assert!(content.contains("import Shop.Order\nimport Shop.Settings\n"));
        assert!(content.contains(
            "allDecoders =\n    [ Lookup.toDecoderConfig settingsSingleton\n    , Lookup.toDecoderConfig order\n    ]\n"
        ));
        assert!(content.contains("settingsSingleton : Lookup () Shop.Settings.Settings\n"));
        assert!(content.contains("order : Lookup Ids.Order Shop.Order.Order\n"));
        assert!(content.contains("        , decoder = Shop.Order.orderDecoder\n"));
        assert!(content.contains("        , cacheKey = Cache.order\n"));
    }
}
