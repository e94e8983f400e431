//! `Ids.elm`: one opaque wrapper per identifier type

use super::{header, output};
use crate::names;
use crate::GeneratorError;
use prost_types::compiler::code_generator_response::File;
use std::fmt::{self, Write};

/// Output path of the identifier module
pub const FILE_NAME: &str = "Ids.elm";

/// Render the identifier module for sorted, distinct `id_types`
pub fn render(id_types: &[String], sources: &[&str]) -> Result<File, GeneratorError> {
    output(FILE_NAME.to_string(), render_text(id_types, sources))
}

fn render_text(id_types: &[String], sources: &[&str]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    header(&mut out, "Ids", sources)?;

    for id_type in id_types {
        let to_string = format!("{}ToString", names::first_lower(id_type));
        writeln!(out)?;
        writeln!(out)?;
        writeln!(out, "type {}", id_type)?;
        writeln!(out, "    = {} String", id_type)?;
        writeln!(out)?;
        writeln!(out)?;
        writeln!(out, "{} : {} -> String", to_string, id_type)?;
        writeln!(out, "{} ({} v) =", to_string, id_type)?;
        writeln!(out, "    v")?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_ids() {
        let file = render(
            &["Account".to_string(), "OrderLine".to_string()],
            &["shop.proto"],
        )
        .unwrap();

        assert_eq!(file.name.as_deref(), Some("Ids.elm"));
        let content = file.content.unwrap();
        assert!(content.starts_with("module Ids exposing (..)\n"));
        assert!(content.contains("type Account\n    = Account String\n"));
        assert!(content.contains("orderLineToString : OrderLine -> String\norderLineToString (OrderLine v) =\n    v\n"));
        assert!(content.find("type Account").unwrap() < content.find("type OrderLine").unwrap());
    }
}
