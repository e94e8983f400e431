//! protoc-gen-elm - A protoc plugin for generating Elm types and JSON codecs
//!
//! This binary reads a CodeGeneratorRequest from stdin and writes a
//! CodeGeneratorResponse to stdout, following the protoc plugin protocol.

use prost::Message;
use std::io::{self, Read, Write};
use tracing::Level;

const USAGE: &str = "protoc-gen-elm is a protoc plugin.

Usage:
    protoc --elm_out=OUT_DIR [--elm_opt=FLAG,FLAG...] FILE.proto

Flags:
    remove-deprecated       drop deprecated messages, fields, enums and values
    debug                   dump the request summary and built models to stderr
    generate-forward-ids    emit Ids.elm with one wrapper type per identifier
    generate-forward-graph  emit DomainNew/Graph.elm lookup nodes
    generate-forward-cache  emit ForwardNew/Interface/Cache.elm cache keys
    generate-api            emit Api.elm with one request function per RPC
";

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() == 2 {
        match args[1].as_str() {
            "--version" => {
                println!("protoc-gen-elm {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "--help" => {
                print!("{}", USAGE);
                return;
            }
            _ => {}
        }
    }

    init_tracing();

    if let Err(e) = run() {
        eprintln!("protoc-gen-elm: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; stdout carries the response
fn init_tracing() {
    let level = if std::env::var("PROTOC_GEN_ELM_DEBUG").is_ok() {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Read raw bytes from stdin
    let mut buf = Vec::new();
    io::stdin().read_to_end(&mut buf)?;

    // Any failure aborts before a response is written
    let response = protoc_gen_elm::generate_from_bytes(&buf)?;

    tracing::debug!(files = response.file.len(), "generated response");
    for f in &response.file {
        tracing::debug!(name = f.name.as_deref().unwrap_or("<unnamed>"), "generated file");
    }

    // Write CodeGeneratorResponse to stdout
    let mut out = Vec::new();
    response.encode(&mut out)?;
    let mut stdout = io::stdout();
    stdout.write_all(&out)?;
    stdout.flush()?;

    Ok(())
}
