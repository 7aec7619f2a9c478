//! Project documents: the persisted form of a workspace.
//!
//! ```json
//! {
//!   "variables": [{ "id": "var0", "name": "compteur" }],
//!   "blocks": [{
//!     "type": "controls_si",
//!     "position": { "x": 20, "y": 40 },
//!     "mutation": { "elseif": 1, "else": 1 },
//!     "inputs": { "IF0": { "type": "logic_boolean", "fields": { "BOOL": "TRUE" } } },
//!     "next": { "type": "afficher_text" }
//!   }]
//! }
//! ```
//!
//! Only top-level blocks carry a position. Children nest under `inputs`
//! (a statement slot holds the head of its chain) and `next`.
//!
//! Loading is forgiving. Unknown types, fields the block kind does not
//! carry, dangling slot names and rejected connections become
//! [`LoadWarning`]s and the rest of the project still loads. Rejected children stay in the graph as top-level blocks.

use crate::error::{LoadWarning, ProjectResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use zia_mutator::{restore_shape, serialize_shape, ShapeDescriptor};
use zia_types::{BlockGraph, BlockId, BlockKind, Position, Variable};

/// A whole saved project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    #[serde(default)]
    pub variables: Vec<Variable>,
    /// Top-level stacks, in layout order.
    #[serde(default)]
    pub blocks: Vec<BlockDocument>,
}

/// One block and everything attached below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDocument {
    /// Editor type tag, e.g. `afficher_text`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation: Option<ShapeDescriptor>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, BlockDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<BlockDocument>>,
}

impl BlockDocument {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind: kind.tag().to_string(),
            position: None,
            fields: BTreeMap::new(),
            mutation: None,
            inputs: BTreeMap::new(),
            next: None,
        }
    }
}

/// A graph rebuilt from a document, plus what had to be repaired.
#[derive(Debug)]
pub struct LoadedProject {
    pub graph: BlockGraph,
    pub warnings: Vec<LoadWarning>,
}

// ══════════════════════════════════════════════════════════════════════════════
// Save
// ══════════════════════════════════════════════════════════════════════════════

/// Capture `graph` as a document.
pub fn save(graph: &BlockGraph) -> ProjectDocument {
    ProjectDocument {
        variables: graph.variables().to_vec(),
        blocks: graph
            .top_blocks()
            .into_iter()
            .filter_map(|id| block_document(graph, id))
            .collect(),
    }
}

fn block_document(graph: &BlockGraph, id: BlockId) -> Option<BlockDocument> {
    let node = graph.get(id)?;
    let inputs = node
        .inputs()
        .iter()
        .filter_map(|input| {
            let child = block_document(graph, input.target?)?;
            Some((input.name.clone(), child))
        })
        .collect();
    Some(BlockDocument {
        kind: node.kind.tag().to_string(),
        position: node.is_top_level().then_some(node.position),
        fields: node.fields.clone(),
        mutation: serialize_shape(graph, id).ok().flatten(),
        inputs,
        next: node
            .next()
            .and_then(|next| block_document(graph, next))
            .map(Box::new),
    })
}

// ══════════════════════════════════════════════════════════════════════════════
// Load
// ══════════════════════════════════════════════════════════════════════════════

/// Rebuild a graph from `doc`.
pub fn load(doc: &ProjectDocument) -> ProjectResult<LoadedProject> {
    let mut graph = BlockGraph::new();
    let mut warnings = Vec::new();

    for variable in &doc.variables {
        graph.add_variable(variable.id.clone(), variable.name.clone());
    }
    for block in &doc.blocks {
        let position = block.position.unwrap_or_default();
        build(&mut graph, block, position, &mut warnings)?;
    }

    for warning in &warnings {
        tracing::warn!(%warning, "project load");
    }
    Ok(LoadedProject { graph, warnings })
}

/// Parse and rebuild in one go.
pub fn load_str(json: &str) -> ProjectResult<LoadedProject> {
    let doc: ProjectDocument = serde_json::from_str(json)?;
    load(&doc)
}

fn build(
    graph: &mut BlockGraph,
    doc: &BlockDocument,
    position: Position,
    warnings: &mut Vec<LoadWarning>,
) -> ProjectResult<Option<BlockId>> {
    let Some(kind) = BlockKind::from_tag(&doc.kind) else {
        warnings.push(LoadWarning::UnknownType(doc.kind.clone()));
        return Ok(None);
    };
    let def = kind.definition();
    let id = graph.create_at(kind, position);
    for (name, value) in &doc.fields {
        if !def.has_field(name) {
            warnings.push(LoadWarning::UnknownField {
                block: id,
                field: name.clone(),
            });
            continue;
        }
        graph.set_field(id, name.as_str(), value.as_str())?;
    }

    if let Some(family) = def.family() {
        let descriptor = doc.mutation.clone().unwrap_or_default();
        for clause in descriptor.known_kinds() {
            if !family.accepts(clause) {
                warnings.push(LoadWarning::ForeignShape {
                    block: id,
                    attr: clause.attr().to_string(),
                });
            }
        }
        restore_shape(graph, id, &descriptor)?;
    }

    for (name, child_doc) in &doc.inputs {
        let Some(child) = build(graph, child_doc, position, warnings)? else {
            continue;
        };
        let statement = match graph.node(id)?.input(name) {
            Some(input) => input.kind.is_statement(),
            None => {
                warnings.push(LoadWarning::DanglingSlot {
                    block: id,
                    input: name.clone(),
                    child,
                });
                continue;
            }
        };
        let attached = if statement {
            graph.connect_statement(id, name, child)
        } else {
            graph.connect_value(id, name, child)
        };
        if let Err(reason) = attached {
            warnings.push(LoadWarning::Rejected {
                block: id,
                child,
                reason,
            });
        }
    }

    if let Some(next_doc) = &doc.next {
        if let Some(next) = build(graph, next_doc, position, warnings)? {
            if let Err(reason) = graph.set_next(id, next) {
                warnings.push(LoadWarning::Rejected {
                    block: id,
                    child: next,
                    reason,
                });
            }
        }
    }

    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_document_omits_empty_parts() {
        let json = serde_json::to_string(&BlockDocument::new(BlockKind::ControlsQuitter)).unwrap();
        assert_eq!(json, r#"{"type":"controls_quitter"}"#);
    }

    #[test]
    fn test_empty_project() {
        let loaded = load_str("{}").unwrap();
        assert!(loaded.graph.is_empty());
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_fields_outside_the_catalogue_are_dropped() {
        let loaded = load_str(
            r#"{ "blocks": [{ "type": "text", "fields": { "TEXT": "a", "COLOUR": "red" } }] }"#,
        )
        .unwrap();
        let id = loaded.graph.top_blocks()[0];
        let node = loaded.graph.get(id).unwrap();
        assert_eq!(node.field("TEXT"), Some("a"));
        assert_eq!(node.field("COLOUR"), None);
        assert_eq!(
            loaded.warnings,
            vec![LoadWarning::UnknownField {
                block: id,
                field: "COLOUR".into(),
            }]
        );
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(load_str("[1, 2").is_err());
    }
}
