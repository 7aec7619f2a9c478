//! Variable-arity clause shapes.
//!
//! Three block families grow and shrink at runtime:
//!
//! | Family        | Repeatable clause         | Terminal clause |
//! |---------------|---------------------------|-----------------|
//! | `controls_si`   | `IF1..N` + `DO1..N`       | `ELSE`          |
//! | `controls_selon`| `CASE1..N` + `DO1..N`     | `DEFAULT`       |
//! | `text_join`     | `ADD0..N-1`               | none            |
//!
//! Clause indices are 0-based everywhere in the API; slot names keep the
//! editor's numbering (`IF1` is else-if clause 0).

use crate::block::{BlockKind, Input, InputKind, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One kind of optional clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClauseKind {
    ElseIf,
    Else,
    Case,
    Default,
    Item,
}

impl ClauseKind {
    /// Attribute name used in persisted shape descriptors.
    pub fn attr(self) -> &'static str {
        match self {
            Self::ElseIf => "elseif",
            Self::Else => "else",
            Self::Case => "case",
            Self::Default => "default",
            Self::Item => "items",
        }
    }

    pub fn from_attr(attr: &str) -> Option<Self> {
        match attr {
            "elseif" => Some(Self::ElseIf),
            "else" => Some(Self::Else),
            "case" => Some(Self::Case),
            "default" => Some(Self::Default),
            "items" => Some(Self::Item),
            _ => None,
        }
    }

    /// Terminal clauses appear at most once and close the shape.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Else | Self::Default)
    }

    /// Slot names for the clause at `index`.
    pub fn inputs(self, index: u32) -> ClauseInputs {
        match self {
            Self::ElseIf => ClauseInputs {
                condition: Some(format!("IF{}", index + 1)),
                body: Some(format!("DO{}", index + 1)),
            },
            Self::Case => ClauseInputs {
                condition: Some(format!("CASE{}", index + 1)),
                body: Some(format!("DO{}", index + 1)),
            },
            Self::Item => ClauseInputs {
                condition: Some(format!("ADD{index}")),
                body: None,
            },
            Self::Else => ClauseInputs {
                condition: None,
                body: Some("ELSE".to_string()),
            },
            Self::Default => ClauseInputs {
                condition: None,
                body: Some("DEFAULT".to_string()),
            },
        }
    }

    /// Build the slots for the clause at `index`.
    pub fn build_inputs(self, index: u32) -> Vec<Input> {
        let names = self.inputs(index);
        let mut inputs = Vec::with_capacity(2);
        if let Some(name) = names.condition {
            let kind = match self {
                Self::ElseIf => InputKind::value(&[ValueType::Boolean]),
                _ => InputKind::any_value(),
            };
            inputs.push(Input::new(name, kind).for_clause(self));
        }
        if let Some(name) = names.body {
            inputs.push(Input::new(name, InputKind::Statement).for_clause(self));
        }
        inputs
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElseIf => write!(f, "sinon si"),
            Self::Else => write!(f, "sinon"),
            Self::Case => write!(f, "cas"),
            Self::Default => write!(f, "defaut"),
            Self::Item => write!(f, "élément"),
        }
    }
}

/// Slot names of a single clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseInputs {
    /// The value slot (condition, case value or join item).
    pub condition: Option<String>,
    /// The statement slot.
    pub body: Option<String>,
}

/// A family of blocks sharing one clause layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseFamily {
    Conditional,
    Switch,
    Join,
}

impl ClauseFamily {
    pub fn of(kind: BlockKind) -> Option<Self> {
        match kind {
            BlockKind::ControlsSi => Some(Self::Conditional),
            BlockKind::ControlsSelon => Some(Self::Switch),
            BlockKind::TextJoin => Some(Self::Join),
            _ => None,
        }
    }

    pub fn repeatable(self) -> ClauseKind {
        match self {
            Self::Conditional => ClauseKind::ElseIf,
            Self::Switch => ClauseKind::Case,
            Self::Join => ClauseKind::Item,
        }
    }

    pub fn terminal(self) -> Option<ClauseKind> {
        match self {
            Self::Conditional => Some(ClauseKind::Else),
            Self::Switch => Some(ClauseKind::Default),
            Self::Join => None,
        }
    }

    pub fn accepts(self, clause: ClauseKind) -> bool {
        clause == self.repeatable() || Some(clause) == self.terminal()
    }

    /// Shape a freshly created block starts with.
    pub fn initial_mutation(self) -> Mutation {
        let mut mutation = Mutation::default();
        if self == Self::Join {
            mutation.set(ClauseKind::Item, 2);
        }
        mutation
    }

    /// The optional slots for `mutation`, in canonical order: every
    /// repeatable clause by ascending index, then the terminal clause.
    pub fn layout(self, mutation: &Mutation) -> Vec<Input> {
        let repeatable = self.repeatable();
        let mut inputs: Vec<Input> = (0..mutation.count(repeatable))
            .flat_map(|i| repeatable.build_inputs(i))
            .collect();
        if let Some(terminal) = self.terminal() {
            if mutation.count(terminal) > 0 {
                inputs.extend(terminal.build_inputs(0));
            }
        }
        inputs
    }

    /// Ordered list of `(kind, index)` clauses present in `mutation`.
    pub fn clauses(self, mutation: &Mutation) -> Vec<(ClauseKind, u32)> {
        let repeatable = self.repeatable();
        let mut clauses: Vec<_> = (0..mutation.count(repeatable))
            .map(|i| (repeatable, i))
            .collect();
        if let Some(terminal) = self.terminal() {
            if mutation.count(terminal) > 0 {
                clauses.push((terminal, 0));
            }
        }
        clauses
    }
}

/// Per-kind clause counts of a variable-arity block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    counts: BTreeMap<ClauseKind, u32>,
}

impl Mutation {
    pub fn count(&self, kind: ClauseKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Set a count; terminal clauses are clamped to at most one.
    pub fn set(&mut self, kind: ClauseKind, count: u32) {
        let count = if kind.is_terminal() { count.min(1) } else { count };
        if count == 0 {
            self.counts.remove(&kind);
        } else {
            self.counts.insert(kind, count);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Non-zero counts in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (ClauseKind, u32)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(inputs: &[Input]) -> Vec<&str> {
        inputs.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_conditional_layout_canonical_order() {
        let mut m = Mutation::default();
        m.set(ClauseKind::ElseIf, 2);
        m.set(ClauseKind::Else, 1);
        let layout = ClauseFamily::Conditional.layout(&m);
        assert_eq!(names(&layout), ["IF1", "DO1", "IF2", "DO2", "ELSE"]);
        assert!(layout.iter().all(|i| i.clause.is_some()));
    }

    #[test]
    fn test_switch_layout_canonical_order() {
        let mut m = Mutation::default();
        m.set(ClauseKind::Case, 3);
        m.set(ClauseKind::Default, 1);
        let layout = ClauseFamily::Switch.layout(&m);
        assert_eq!(
            names(&layout),
            ["CASE1", "DO1", "CASE2", "DO2", "CASE3", "DO3", "DEFAULT"]
        );
    }

    #[test]
    fn test_join_layout_is_zero_based() {
        let layout = ClauseFamily::Join.layout(&ClauseFamily::Join.initial_mutation());
        assert_eq!(names(&layout), ["ADD0", "ADD1"]);
    }

    #[test]
    fn test_terminal_count_is_clamped() {
        let mut m = Mutation::default();
        m.set(ClauseKind::Else, 4);
        assert_eq!(m.count(ClauseKind::Else), 1);
        m.set(ClauseKind::Else, 0);
        assert!(m.is_empty());
    }

    #[test]
    fn test_attr_round_trip() {
        for kind in [
            ClauseKind::ElseIf,
            ClauseKind::Else,
            ClauseKind::Case,
            ClauseKind::Default,
            ClauseKind::Item,
        ] {
            assert_eq!(ClauseKind::from_attr(kind.attr()), Some(kind));
        }
        assert_eq!(ClauseKind::from_attr("elif"), None);
    }

    #[test]
    fn test_family_accepts_only_own_kinds() {
        assert!(ClauseFamily::Conditional.accepts(ClauseKind::ElseIf));
        assert!(ClauseFamily::Conditional.accepts(ClauseKind::Else));
        assert!(!ClauseFamily::Conditional.accepts(ClauseKind::Case));
        assert!(!ClauseFamily::Join.accepts(ClauseKind::Default));
    }
}
