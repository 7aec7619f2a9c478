//! Whole-program name table.
//!
//! Every variable id used in a generation pass gets one identifier. Display
//! names are sanitized, reserved words are avoided, and two variables whose
//! names collide get numeric suffixes (`x`, `x2`, `x3`, ...). The table is
//! built once, before rendering, so a variable's identifier never changes
//! within a pass.
//!
//! A variable field left empty still names something: the block gets a
//! placeholder (`i` for a counting loop, `réponse` for a question, ...)
//! registered like any other name, so it can never alias a user variable.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use zia_types::{BlockGraph, BlockId, BlockKind, BlockNode, VariableId};

/// Keywords of the Zia language.
pub const RESERVED_WORDS: &[&str] = &[
    "afficher", "var", "fonction", "retourner", "si", "sinon", "pour", "tantque", "selon", "cas",
    "defaut", "quitter", "continuer", "et", "ou", "vrai", "faux", "nul", "classe", "ceci", "super",
];

/// Names the generator emits as calls or statement keywords.
pub const BUILTIN_NAMES: &[&str] = &[
    "demander",
    "attendre",
    "concatener",
    "longueur",
    "sous_chaine",
    "aleatoire",
    "arrondir",
    "essayer",
    "attraper",
    "lancer",
];

/// Variable id to identifier mapping for one pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NameTable {
    names: BTreeMap<VariableId, String>,
    #[serde(skip)]
    placeholders: BTreeMap<(BlockId, String), String>,
    #[serde(skip)]
    taken: BTreeSet<String>,
}

impl NameTable {
    /// Name every declared variable, in declaration order, then, in block
    /// order, every variable id referenced but never declared and every
    /// empty variable field.
    pub fn build(graph: &BlockGraph) -> Self {
        let mut table = Self::default();
        for variable in graph.variables() {
            let name = table.unique(&variable.name);
            table.names.insert(variable.id.clone(), name);
        }
        for block in graph.iter() {
            for &field in block.kind.definition().variable_fields {
                match filled(block, field) {
                    Some(raw) => {
                        let id = VariableId(raw.to_string());
                        if !table.names.contains_key(&id) {
                            let name = table.unique(raw);
                            table.names.insert(id, name);
                        }
                    }
                    None => {
                        let name = table.unique(placeholder(block.kind));
                        table.placeholders.insert((block.id, field.to_string()), name);
                    }
                }
            }
        }
        table
    }

    /// Identifier for `id`, if the table knows it.
    pub fn get(&self, id: &VariableId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Identifier for the variable named by `field` of `block`.
    ///
    /// Blocks the table was not built from fall back to a sanitized
    /// placeholder.
    pub fn resolve(&self, block: &BlockNode, field: &str) -> String {
        let known = match filled(block, field) {
            Some(raw) => self.get(&VariableId(raw.to_string())),
            None => self
                .placeholders
                .get(&(block.id, field.to_string()))
                .map(String::as_str),
        };
        known
            .map(str::to_string)
            .unwrap_or_else(|| sanitize(placeholder(block.kind)))
    }

    /// Number of variable ids named. Placeholders are not counted.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn unique(&mut self, display: &str) -> String {
        let base = sanitize(display);
        let mut candidate = base.clone();
        let mut suffix = 2;
        while is_reserved(&candidate) || self.taken.contains(&candidate) {
            candidate = format!("{base}{suffix}");
            suffix += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

fn filled<'b>(block: &'b BlockNode, field: &str) -> Option<&'b str> {
    block.field(field).filter(|raw| !raw.trim().is_empty())
}

/// Display name given to an empty variable field.
fn placeholder(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::VarDeclaration => "ma_variable",
        BlockKind::DemanderText => "réponse",
        BlockKind::ControlsPour => "i",
        BlockKind::EssayerAttraper => "erreur",
        _ => "variable",
    }
}

fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name) || BUILTIN_NAMES.contains(&name)
}

/// Reduce a display name to identifier characters.
///
/// Letters (accented ones included), digits and `_` are kept; anything else
/// becomes `_`. A leading digit gets a `v_` prefix.
pub fn sanitize(display: &str) -> String {
    let mut name: String = display
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        return "variable".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "v_");
    }
    name
}
