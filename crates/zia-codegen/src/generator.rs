//! Generation pass: whole graph to [`SourceProgram`].

use crate::names::NameTable;
use crate::precedence::Precedence;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use zia_types::{BlockGraph, BlockId};

/// Generator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Spaces per nesting level.
    pub indent_width: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self { indent_width: 4 }
    }
}

/// Rendered program text, one entry per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceProgram {
    lines: Vec<String>,
}

impl SourceProgram {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The full text, newline terminated.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SourceProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Output of one generation pass.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    pub program: SourceProgram,
    /// Hex SHA-256 of the program text.
    pub hash: String,
    /// Top-level value blocks left out of the program.
    pub skipped: Vec<BlockId>,
    /// Identifiers given to variables during the pass.
    pub names: NameTable,
}

/// Render `graph` with default options.
pub fn generate(graph: &BlockGraph) -> GenerateResult {
    generate_with(graph, &GeneratorOptions::default())
}

/// Render every top-level statement stack of `graph`, in workspace order,
/// separated by blank lines.
pub fn generate_with(graph: &BlockGraph, options: &GeneratorOptions) -> GenerateResult {
    let mut renderer = Renderer::new(graph, NameTable::build(graph), options);
    let mut skipped = Vec::new();

    for head in graph.top_blocks() {
        let Some(node) = graph.get(head) else {
            continue;
        };
        if node.kind.definition().is_value() {
            skipped.push(head);
            continue;
        }
        if !renderer.lines.is_empty() {
            renderer.lines.push(String::new());
        }
        renderer.chain(Some(head), 0);
    }

    let Renderer { lines, names, .. } = renderer;
    let program = SourceProgram { lines };
    let hash = source_hash(&program.text());
    tracing::debug!(
        blocks = graph.len(),
        lines = program.len(),
        skipped = skipped.len(),
        %hash,
        "generated source"
    );

    GenerateResult {
        program,
        hash,
        skipped,
        names,
    }
}

/// Render a single value block. `None` for statement blocks.
pub fn render_value(graph: &BlockGraph, id: BlockId) -> Option<(String, Precedence)> {
    let node = graph.get(id)?;
    if !node.kind.definition().is_value() {
        return None;
    }
    let options = GeneratorOptions::default();
    let renderer = Renderer::new(graph, NameTable::build(graph), &options);
    Some(renderer.expr(id))
}

/// Render a statement and the statements following it, at depth zero.
pub fn render_statement(graph: &BlockGraph, id: BlockId) -> Vec<String> {
    let options = GeneratorOptions::default();
    let mut renderer = Renderer::new(graph, NameTable::build(graph), &options);
    renderer.chain(Some(id), 0);
    renderer.lines
}

/// Hex SHA-256 digest of generated text.
pub fn source_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Rendering state for one pass.
pub(crate) struct Renderer<'a> {
    pub(crate) graph: &'a BlockGraph,
    pub(crate) names: NameTable,
    pub(crate) indent: String,
    pub(crate) lines: Vec<String>,
}

impl<'a> Renderer<'a> {
    fn new(graph: &'a BlockGraph, names: NameTable, options: &GeneratorOptions) -> Self {
        Self {
            graph,
            names,
            indent: " ".repeat(options.indent_width),
            lines: Vec::new(),
        }
    }

    pub(crate) fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        let line = format!("{}{}", self.indent.repeat(depth), text.as_ref());
        self.lines.push(line);
    }
}
