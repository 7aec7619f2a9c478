//! Value block rendering.
//!
//! Every value block renders to `(text, level)`. Slots are filled through
//! [`Renderer::value`], which applies the parenthesization rule and falls
//! back to a default literal when the slot is empty.

use crate::generator::Renderer;
use crate::precedence::{BinaryOp, Precedence};
use zia_types::{BlockId, BlockKind, BlockNode, ClauseKind};

impl Renderer<'_> {
    /// Render the value block `id`.
    pub(crate) fn expr(&self, id: BlockId) -> (String, Precedence) {
        let Some(node) = self.graph.get(id) else {
            return ("nul".to_string(), Precedence::Atomic);
        };
        match node.kind {
            BlockKind::Text => (
                string_literal(node.field("TEXT").unwrap_or_default()),
                Precedence::Atomic,
            ),
            BlockKind::MathNumber => number_literal(node.field("NUM")),
            BlockKind::LogicBoolean => {
                let code = if node.field("BOOL") == Some("TRUE") {
                    "vrai"
                } else {
                    "faux"
                };
                (code.to_string(), Precedence::Atomic)
            }
            BlockKind::VariablesGet => (
                self.names.resolve(node, "VAR"),
                Precedence::Atomic,
            ),

            BlockKind::MathArithmetic => {
                self.binary(node, BinaryOp::arithmetic(op_field(node)), "0")
            }
            BlockKind::LogicCompare => self.binary(node, BinaryOp::comparison(op_field(node)), "0"),
            BlockKind::LogicOperation => {
                self.binary(node, BinaryOp::logical(op_field(node)), "faux")
            }
            BlockKind::MathNegate => {
                let operand = self.value(id, "NUM", Precedence::Unary, "0");
                let code = if operand.starts_with('-') {
                    format!("-({operand})")
                } else {
                    format!("-{operand}")
                };
                (code, Precedence::Unary)
            }

            BlockKind::TextJoin => {
                let count = node
                    .mutation()
                    .map(|m| m.count(ClauseKind::Item))
                    .unwrap_or(0);
                let items: Vec<String> = (0..count)
                    .map(|i| self.value(id, &format!("ADD{i}"), Precedence::None, "\"\""))
                    .collect();
                (
                    format!("concatener({})", items.join(", ")),
                    Precedence::FunctionCall,
                )
            }
            BlockKind::ListeCreate => (
                format!("[{}]", self.value(id, "ITEMS", Precedence::None, "")),
                Precedence::Atomic,
            ),
            BlockKind::ListeGet => {
                let list = self.value(id, "LIST", Precedence::FunctionCall, "[]");
                let index = self.value(id, "INDEX", Precedence::None, "0");
                (format!("{list}[{index}]"), Precedence::FunctionCall)
            }
            BlockKind::TexteLongueur => self.call(id, "longueur", &[("TEXT", "\"\"")]),
            BlockKind::TexteSousChaine => self.call(
                id,
                "sous_chaine",
                &[("TEXT", "\"\""), ("FROM", "0"), ("TO", "1")],
            ),
            BlockKind::MathRandom => self.call(id, "aleatoire", &[("FROM", "0"), ("TO", "100")]),
            BlockKind::MathRound => self.call(id, "arrondir", &[("NUM", "0")]),

            // Statement blocks never sit in a value slot.
            _ => ("nul".to_string(), Precedence::Atomic),
        }
    }

    /// The block plugged into `input` of `block`, parenthesized when its
    /// level is looser than `required`, or `default` when the slot is empty.
    pub(crate) fn value(
        &self,
        block: BlockId,
        input: &str,
        required: Precedence,
        default: &str,
    ) -> String {
        let Some(child) = self.graph.get(block).and_then(|n| n.target(input)) else {
            return default.to_string();
        };
        let (code, level) = self.expr(child);
        if level.needs_parens(required) {
            format!("({code})")
        } else {
            code
        }
    }

    fn binary(&self, node: &BlockNode, op: BinaryOp, default: &str) -> (String, Precedence) {
        let (left, right) = op.operand_levels();
        let a = self.value(node.id, "A", left, default);
        let b = self.value(node.id, "B", right, default);
        (format!("{a} {} {b}", op.symbol), op.precedence)
    }

    fn call(&self, id: BlockId, name: &str, args: &[(&str, &str)]) -> (String, Precedence) {
        let args: Vec<String> = args
            .iter()
            .map(|(input, default)| self.value(id, input, Precedence::None, default))
            .collect();
        (format!("{name}({})", args.join(", ")), Precedence::FunctionCall)
    }
}

fn op_field(node: &BlockNode) -> &str {
    node.field("OP").unwrap_or_default()
}

/// A double-quoted literal with JSON escapes.
pub fn string_literal(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

/// Render a `math_number` field. Unparsable input renders as `0`; negative
/// numbers bind like a unary minus.
pub fn number_literal(raw: Option<&str>) -> (String, Precedence) {
    let n = raw.and_then(parse_number).unwrap_or(0.0);
    let code = format_number(n);
    let level = if code.starts_with('-') {
        Precedence::Unary
    } else {
        Precedence::Atomic
    };
    (code, level)
}

/// Longest numeric prefix of `raw`, like a lenient `parseFloat`.
fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .unwrap_or(s.len());
    let candidate = &s[..end];
    (1..=candidate.len())
        .rev()
        .find_map(|len| candidate[..len].parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Shortest decimal form: integers without a fraction, no negative zero.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(string_literal("Bonjour"), "\"Bonjour\"");
        assert_eq!(string_literal("dit \"oui\"\n"), r#""dit \"oui\"\n""#);
    }

    #[test]
    fn test_number_literal() {
        assert_eq!(number_literal(Some("42")).0, "42");
        assert_eq!(number_literal(Some("3.50")).0, "3.5");
        assert_eq!(number_literal(Some("  12abc")).0, "12");
        assert_eq!(number_literal(Some("abc")).0, "0");
        assert_eq!(number_literal(Some("-0")).0, "0");
        assert_eq!(number_literal(None).0, "0");
    }

    #[test]
    fn test_negative_number_is_unary() {
        assert_eq!(
            number_literal(Some("-3")),
            ("-3".to_string(), Precedence::Unary)
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(-7.0), "-7");
    }
}
