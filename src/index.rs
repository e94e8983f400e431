//! Cross-message views over built models
//!
//! The auxiliary modules (ids, lookup graph, cache keys, API client) need
//! views that span every rendered file. They are derived purely from the
//! models; no descriptor is consulted again.

use crate::model::{Message, SchemaFile};
use crate::types::FieldType;
use std::collections::{BTreeSet, HashSet};

/// A message together with the Elm module that defines it
#[derive(Debug, Clone, Copy)]
pub struct IndexedMessage<'a> {
    /// Module defining the message
    pub module_name: &'a str,
    /// The message itself
    pub message: &'a Message,
}

/// One node of the lookup graph
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    /// Module defining the message
    pub module_name: String,
    /// Elm type of the message
    pub type_name: String,
    /// Message name with a lowercase first letter
    pub lower_name: String,
    /// Lookup entrypoint name
    pub entrypoint: String,
    /// Type of the lookup key, `()` for singletons
    pub key_type: String,
    /// Elm expression that extracts lookup parameters
    pub parameters: String,
}

/// Flattened messages of every rendered file
#[derive(Debug, Default)]
pub struct ModelIndex<'a> {
    messages: Vec<IndexedMessage<'a>>,
}

impl<'a> ModelIndex<'a> {
    /// Index every message, nested ones included, in file order
    pub fn new(files: &'a [SchemaFile]) -> Self {
        let messages = files
            .iter()
            .flat_map(|file| {
                file.all_messages().into_iter().map(move |message| IndexedMessage {
                    module_name: &file.module_name,
                    message,
                })
            })
            .collect();

        Self { messages }
    }

    /// Every indexed message
    pub fn messages(&self) -> &[IndexedMessage<'a>] {
        &self.messages
    }

    /// Messages marked as singletons
    pub fn singletons(&self) -> Vec<IndexedMessage<'a>> {
        self.messages
            .iter()
            .filter(|m| m.message.singleton)
            .copied()
            .collect()
    }

    /// Messages with a field named `id`
    pub fn keyed(&self) -> Vec<IndexedMessage<'a>> {
        self.messages
            .iter()
            .filter(|m| m.message.id_field().is_some())
            .copied()
            .collect()
    }

    /// Sorted, distinct identifier types used anywhere
    pub fn identifier_types(&self) -> Vec<String> {
        let mut out = BTreeSet::new();
        for m in &self.messages {
            m.message.collect_identifiers(&mut out);
        }
        out.into_iter().collect()
    }

    /// Lookup graph nodes: singletons first, then keyed messages
    ///
    /// A singleton that also has an `id` field only gets its singleton node.
    pub fn graph_nodes(&self) -> Vec<GraphNode> {
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();

        for m in self.singletons() {
            if seen.insert((m.module_name, m.message.name.as_str())) {
                nodes.push(singleton_node(m));
            }
        }

        for m in self.keyed() {
            if seen.insert((m.module_name, m.message.name.as_str())) {
                nodes.push(keyed_node(m));
            }
        }

        nodes
    }
}

fn singleton_node(m: IndexedMessage<'_>) -> GraphNode {
    let lower_name = m.message.lower_name();
    GraphNode {
        module_name: m.module_name.to_string(),
        type_name: m.message.name.clone(),
        entrypoint: format!("{}Singleton", lower_name),
        key_type: "()".to_string(),
        parameters: "Lookup.noParameters".to_string(),
        lower_name,
    }
}

fn keyed_node(m: IndexedMessage<'_>) -> GraphNode {
    let lower_name = m.message.lower_name();
    let id_type = m
        .message
        .id_field()
        .map(|f| f.ty.clone())
        .unwrap_or(FieldType::Identifier(m.message.name.clone()));

    let parameters = match &id_type {
        FieldType::Identifier(name) => {
            format!("LookupExtra.idParam (\\(Ids.{} id) -> id)", name)
        }
        _ => "LookupExtra.idParam identity".to_string(),
    };

    GraphNode {
        module_name: m.module_name.to_string(),
        type_name: m.message.name.clone(),
        entrypoint: lower_name.clone(),
        key_type: id_type.to_string(),
        parameters,
        lower_name,
    }
}
