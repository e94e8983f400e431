//! Elm code generation
//!
//! Each submodule renders one kind of output file from the model. Output is
//! built as plain text with `fmt::Write`; all renderers are deterministic
//! functions of their input.

pub mod api;
pub mod cache;
pub mod graph;
pub mod ids;
pub mod module;

use crate::GeneratorError;
use prost_types::compiler::code_generator_response::File;
use std::fmt::{self, Write};

/// Write the standard generated-file banner
fn header(out: &mut String, module_name: &str, sources: &[&str]) -> fmt::Result {
    writeln!(out, "module {} exposing (..)", module_name)?;
    writeln!(out)?;
    writeln!(out, "-- DO NOT EDIT")?;
    writeln!(out, "-- AUTOGENERATED BY protoc-gen-elm")?;
    for source in sources {
        writeln!(out, "-- source file: {}", source)?;
    }
    Ok(())
}

/// Wrap rendered text into a response file
fn output(name: String, rendered: Result<String, fmt::Error>) -> Result<File, GeneratorError> {
    let content = rendered.map_err(|e| {
        GeneratorError::EncodeError(format!("failed to render {}: {}", name, e))
    })?;

    tracing::debug!(file = %name, bytes = content.len(), "rendered");
    Ok(File {
        name: Some(name),
        content: Some(content),
        ..Default::default()
    })
}

/// Parenthesise a type or expression that contains spaces
fn paren(s: &str) -> String {
    if s.contains(' ') && !(s.starts_with('(') && s.ends_with(')')) {
        format!("({})", s)
    } else {
        s.to_string()
    }
}

/// Render a multi-line Elm list, one element per line
fn list<I, S>(out: &mut String, indent: &str, items: I) -> fmt::Result
where
    I: IntoIterator<Item = S>,
    S: fmt::Display,
{
    let mut empty = true;
    for (i, item) in items.into_iter().enumerate() {
        let sep = if i == 0 { "[" } else { "," };
        writeln!(out, "{}{} {}", indent, sep, item)?;
        empty = false;
    }
    if empty {
        writeln!(out, "{}[]", indent)
    } else {
        writeln!(out, "{}]", indent)
    }
}
