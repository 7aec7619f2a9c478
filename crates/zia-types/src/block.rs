//! Block nodes and their slots.
//!
//! A node owns an ordered list of [`Input`]s. Each input is either a value
//! slot (zero or one child) or a statement slot (the head of a `next` chain).
//! Inputs tagged with a [`ClauseKind`] belong to the node's variable-arity
//! shape and are managed by the shape mutator; all others are fixed by the
//! block catalogue.

use crate::clause::{ClauseKind, Mutation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identity of a block inside one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Workspace coordinates of a top-level block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Type tags used by value-slot checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Array,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "String"),
            Self::Number => write!(f, "Number"),
            Self::Boolean => write!(f, "Boolean"),
            Self::Array => write!(f, "Array"),
        }
    }
}

/// The closed set of block types understood by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    // ── Statements ──
    AfficherText,
    VarDeclaration,
    VariablesSet,
    DemanderText,
    Attendre,
    ControlsSi,
    ControlsPour,
    ControlsTantque,
    ControlsSelon,
    ControlsQuitter,
    ControlsContinuer,
    FonctionDefinition,
    FonctionCall,
    Retourner,
    ListeSet,
    Commentaire,
    EssayerAttraper,
    LancerErreur,

    // ── Values ──
    Text,
    MathNumber,
    TextJoin,
    MathArithmetic,
    MathNegate,
    LogicBoolean,
    LogicCompare,
    LogicOperation,
    VariablesGet,
    ListeCreate,
    ListeGet,
    TexteLongueur,
    TexteSousChaine,
    MathRandom,
    MathRound,
}

impl BlockKind {
    /// Every block kind, in catalogue order.
    pub const ALL: [BlockKind; 33] = [
        Self::AfficherText,
        Self::VarDeclaration,
        Self::VariablesSet,
        Self::DemanderText,
        Self::Attendre,
        Self::ControlsSi,
        Self::ControlsPour,
        Self::ControlsTantque,
        Self::ControlsSelon,
        Self::ControlsQuitter,
        Self::ControlsContinuer,
        Self::FonctionDefinition,
        Self::FonctionCall,
        Self::Retourner,
        Self::ListeSet,
        Self::Commentaire,
        Self::EssayerAttraper,
        Self::LancerErreur,
        Self::Text,
        Self::MathNumber,
        Self::TextJoin,
        Self::MathArithmetic,
        Self::MathNegate,
        Self::LogicBoolean,
        Self::LogicCompare,
        Self::LogicOperation,
        Self::VariablesGet,
        Self::ListeCreate,
        Self::ListeGet,
        Self::TexteLongueur,
        Self::TexteSousChaine,
        Self::MathRandom,
        Self::MathRound,
    ];

    /// The editor's type tag for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            Self::AfficherText => "afficher_text",
            Self::VarDeclaration => "var_declaration",
            Self::VariablesSet => "variables_set",
            Self::DemanderText => "demander_text",
            Self::Attendre => "attendre",
            Self::ControlsSi => "controls_si",
            Self::ControlsPour => "controls_pour",
            Self::ControlsTantque => "controls_tantque",
            Self::ControlsSelon => "controls_selon",
            Self::ControlsQuitter => "controls_quitter",
            Self::ControlsContinuer => "controls_continuer",
            Self::FonctionDefinition => "fonction_definition",
            Self::FonctionCall => "fonction_call",
            Self::Retourner => "retourner",
            Self::ListeSet => "liste_set",
            Self::Commentaire => "commentaire",
            Self::EssayerAttraper => "essayer_attraper",
            Self::LancerErreur => "lancer_erreur",
            Self::Text => "text",
            Self::MathNumber => "math_number",
            Self::TextJoin => "text_join",
            Self::MathArithmetic => "math_arithmetic",
            Self::MathNegate => "math_negate",
            Self::LogicBoolean => "logic_boolean",
            Self::LogicCompare => "logic_compare",
            Self::LogicOperation => "logic_operation",
            Self::VariablesGet => "variables_get",
            Self::ListeCreate => "liste_create",
            Self::ListeGet => "liste_get",
            Self::TexteLongueur => "texte_longueur",
            Self::TexteSousChaine => "texte_sous_chaine",
            Self::MathRandom => "math_random",
            Self::MathRound => "math_round",
        }
    }

    /// Look up a kind by its type tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// What an input slot holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// Zero or one value block. `None` accepts any producer.
    Value { check: Option<Vec<ValueType>> },
    /// The head of a statement chain.
    Statement,
}

impl InputKind {
    pub fn value(check: &[ValueType]) -> Self {
        Self::Value {
            check: Some(check.to_vec()),
        }
    }

    pub fn any_value() -> Self {
        Self::Value { check: None }
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, Self::Statement)
    }
}

/// A named slot on a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub name: String,
    pub kind: InputKind,
    /// The connected child, if any.
    pub target: Option<BlockId>,
    /// Set for slots owned by the variable-arity shape.
    pub clause: Option<ClauseKind>,
}

impl Input {
    pub fn new(name: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            kind,
            target: None,
            clause: None,
        }
    }

    pub fn for_clause(mut self, clause: ClauseKind) -> Self {
        self.clause = Some(clause);
        self
    }
}

/// Where a block is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parent {
    /// Plugged into a named input of `block`.
    Input { block: BlockId, input: String },
    /// Follows `0` in a statement chain.
    Next(BlockId),
}

impl Parent {
    pub fn block(&self) -> BlockId {
        match self {
            Self::Input { block, .. } => *block,
            Self::Next(block) => *block,
        }
    }
}

/// A single block in the graph.
///
/// Connections (`inputs[..].target`, `next`, `parent`) are only changed
/// through [`crate::BlockGraph`] so both ends stay consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Literal field values (`VAR` fields hold a variable id).
    pub fields: BTreeMap<String, String>,
    pub position: Position,
    pub(crate) inputs: Vec<Input>,
    pub(crate) next: Option<BlockId>,
    pub(crate) parent: Option<Parent>,
    pub(crate) mutation: Option<Mutation>,
}

impl BlockNode {
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.iter().find(|i| i.name == name)
    }

    /// The child connected to the named input.
    pub fn target(&self, name: &str) -> Option<BlockId> {
        self.input(name).and_then(|i| i.target)
    }

    pub fn next(&self) -> Option<BlockId> {
        self.next
    }

    pub fn parent(&self) -> Option<&Parent> {
        self.parent.as_ref()
    }

    /// Current clause counts; `None` for fixed-shape blocks.
    pub fn mutation(&self) -> Option<&Mutation> {
        self.mutation.as_ref()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }
}
