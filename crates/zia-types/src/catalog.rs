//! The block catalogue: fixed slots, fields and connections per kind.

use crate::block::{BlockKind, Input, InputKind, ValueType};
use crate::clause::ClauseFamily;

use ValueType::{Array, Boolean, Number, String as Str};

/// How a block attaches to its surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    /// A statement with a previous connection; `next` tells whether
    /// another statement may follow it.
    Statement { next: bool },
    /// A value producer. `None` produces any type.
    Value { output: Option<ValueType> },
}

/// Static definition of a block kind.
#[derive(Debug, Clone)]
pub struct BlockDef {
    pub kind: BlockKind,
    /// Fixed inputs, in display order.
    pub inputs: Vec<Input>,
    /// Field names carried by the block.
    pub fields: &'static [&'static str],
    /// Fields whose value is a variable id.
    pub variable_fields: &'static [&'static str],
    pub connection: Connection,
}

impl BlockDef {
    pub fn is_value(&self) -> bool {
        matches!(self.connection, Connection::Value { .. })
    }

    pub fn family(&self) -> Option<ClauseFamily> {
        ClauseFamily::of(self.kind)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains(&name)
    }
}

fn value(name: &str, check: &[ValueType]) -> Input {
    Input::new(name, InputKind::value(check))
}

fn any(name: &str) -> Input {
    Input::new(name, InputKind::any_value())
}

fn stmt(name: &str) -> Input {
    Input::new(name, InputKind::Statement)
}

const STATEMENT: Connection = Connection::Statement { next: true };

fn produces(output: ValueType) -> Connection {
    Connection::Value {
        output: Some(output),
    }
}

impl BlockKind {
    /// The catalogue entry for this kind.
    pub fn definition(self) -> BlockDef {
        let (inputs, fields, variable_fields, connection): (
            Vec<Input>,
            &'static [&'static str],
            &'static [&'static str],
            Connection,
        ) = match self {
            Self::AfficherText => (vec![value("TEXT", &[Str, Number])], &[], &[], STATEMENT),
            Self::VarDeclaration | Self::VariablesSet => (
                vec![value("VALUE", &[Str, Number, Boolean])],
                &["VAR"],
                &["VAR"],
                STATEMENT,
            ),
            Self::DemanderText => (vec![value("PROMPT", &[Str])], &["VAR"], &["VAR"], STATEMENT),
            Self::Attendre => (vec![value("DURATION", &[Number])], &[], &[], STATEMENT),
            Self::ControlsSi => (
                vec![value("IF0", &[Boolean]), stmt("DO0")],
                &[],
                &[],
                STATEMENT,
            ),
            Self::ControlsPour => (
                vec![value("FROM", &[Number]), value("TO", &[Number]), stmt("DO")],
                &["VAR"],
                &["VAR"],
                STATEMENT,
            ),
            Self::ControlsTantque => (
                vec![value("WHILE", &[Boolean]), stmt("DO")],
                &[],
                &[],
                STATEMENT,
            ),
            Self::ControlsSelon => (vec![any("SWITCH")], &[], &[], STATEMENT),
            Self::ControlsQuitter | Self::ControlsContinuer => (vec![], &[], &[], STATEMENT),
            Self::FonctionDefinition => (vec![stmt("STACK")], &["NAME", "PARAMS"], &[], STATEMENT),
            Self::FonctionCall => (vec![], &["NAME", "ARGS"], &[], STATEMENT),
            Self::Retourner => (
                vec![any("VALUE")],
                &[],
                &[],
                Connection::Statement { next: false },
            ),
            Self::ListeSet => (
                vec![value("LIST", &[Array]), value("INDEX", &[Number]), any("VALUE")],
                &[],
                &[],
                STATEMENT,
            ),
            Self::Commentaire => (vec![], &["TEXT"], &[], STATEMENT),
            Self::EssayerAttraper => (
                vec![stmt("TRY"), stmt("CATCH")],
                &["ERROR_VAR"],
                &["ERROR_VAR"],
                STATEMENT,
            ),
            Self::LancerErreur => (vec![value("MESSAGE", &[Str])], &[], &[], STATEMENT),

            Self::Text => (vec![], &["TEXT"], &[], produces(Str)),
            Self::MathNumber => (vec![], &["NUM"], &[], produces(Number)),
            Self::TextJoin => (vec![], &[], &[], produces(Str)),
            Self::MathArithmetic => (
                vec![value("A", &[Number]), value("B", &[Number])],
                &["OP"],
                &[],
                produces(Number),
            ),
            Self::MathNegate => (vec![value("NUM", &[Number])], &[], &[], produces(Number)),
            Self::LogicBoolean => (vec![], &["BOOL"], &[], produces(Boolean)),
            Self::LogicCompare => (vec![any("A"), any("B")], &["OP"], &[], produces(Boolean)),
            Self::LogicOperation => (
                vec![value("A", &[Boolean]), value("B", &[Boolean])],
                &["OP"],
                &[],
                produces(Boolean),
            ),
            Self::VariablesGet => (
                vec![],
                &["VAR"],
                &["VAR"],
                Connection::Value { output: None },
            ),
            Self::ListeCreate => (vec![any("ITEMS")], &[], &[], produces(Array)),
            Self::ListeGet => (
                vec![value("LIST", &[Array]), value("INDEX", &[Number])],
                &[],
                &[],
                Connection::Value { output: None },
            ),
            Self::TexteLongueur => (vec![value("TEXT", &[Str])], &[], &[], produces(Number)),
            Self::TexteSousChaine => (
                vec![value("TEXT", &[Str]), value("FROM", &[Number]), value("TO", &[Number])],
                &[],
                &[],
                produces(Str),
            ),
            Self::MathRandom => (
                vec![value("FROM", &[Number]), value("TO", &[Number])],
                &[],
                &[],
                produces(Number),
            ),
            Self::MathRound => (vec![value("NUM", &[Number])], &[], &[], produces(Number)),
        };
        BlockDef {
            kind: self,
            inputs,
            fields,
            variable_fields,
            connection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_blocks_have_no_statement_connection() {
        assert!(BlockKind::Text.definition().is_value());
        assert!(BlockKind::VariablesGet.definition().is_value());
        assert!(!BlockKind::AfficherText.definition().is_value());
    }

    #[test]
    fn test_return_ends_a_chain() {
        assert_eq!(
            BlockKind::Retourner.definition().connection,
            Connection::Statement { next: false }
        );
    }

    #[test]
    fn test_conditional_fixed_inputs() {
        let def = BlockKind::ControlsSi.definition();
        let names: Vec<_> = def.inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["IF0", "DO0"]);
        assert_eq!(def.family(), Some(ClauseFamily::Conditional));
    }

    #[test]
    fn test_variable_fields_are_declared_fields() {
        for kind in BlockKind::ALL {
            let def = kind.definition();
            assert!(def.variable_fields.iter().all(|f| def.has_field(f)), "{kind}");
        }
        assert!(!BlockKind::AfficherText.definition().has_field("TEXT"));
    }

    #[test]
    fn test_fixed_inputs_never_carry_a_clause_tag() {
        for kind in BlockKind::ALL {
            assert!(kind.definition().inputs.iter().all(|i| i.clause.is_none()));
        }
    }
}
