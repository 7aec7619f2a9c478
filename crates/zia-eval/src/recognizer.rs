//! Line classification.
//!
//! A source line (already trimmed, trailing `;` removed) is matched against
//! a fixed, ordered list of recognizers. The first one that accepts the line
//! decides what it is:
//!
//! 1. declaration or assignment (`var x = …`, `x = …`)
//! 2. output (`afficher(…)`, `afficher a, b`)
//! 3. blocking input (`var x = demander(…)`)
//! 4. timed pause (`attendre(…)`)
//! 5. unsupported control construct (`si (`, `pour (`, `fonction `, …)
//!
//! Lines that only continue a block (`{`, `}`, comments, case labels, jump
//! keywords) are structural and carry no action. Anything else is a fault.

use crate::error::{EvalError, EvalResult};
use regex::Regex;
use std::sync::OnceLock;

// ══════════════════════════════════════════════════════════════════════════════
// Patterns
// ══════════════════════════════════════════════════════════════════════════════

/// A regex compiled on first use.
struct Pattern {
    source: &'static str,
    compiled: OnceLock<Option<Regex>>,
}

impl Pattern {
    const fn new(source: &'static str) -> Self {
        Self {
            source,
            compiled: OnceLock::new(),
        }
    }

    fn get(&self) -> Option<&Regex> {
        self.compiled
            .get_or_init(|| Regex::new(self.source).ok())
            .as_ref()
    }

    fn captures<'t>(&self, line: &'t str) -> Option<regex::Captures<'t>> {
        self.get()?.captures(line)
    }

    fn is_match(&self, line: &str) -> bool {
        self.get().is_some_and(|re| re.is_match(line))
    }
}

static DECLARATION: Pattern =
    Pattern::new(r"^(?:var\s+)?([\p{L}_][\p{L}\p{N}_]*)\s*=\s*([^=].*)$");
static INPUT: Pattern =
    Pattern::new(r"^(?:var\s+)?([\p{L}_][\p{L}\p{N}_]*)\s*=\s*demander\s*\((.*)\)$");
static PAUSE: Pattern = Pattern::new(r"^attendre\s*\((.*)\)$");
static DEFERRED_INPUT: Pattern = Pattern::new(r"^demander\s*\(");
static CASE_LABEL: Pattern = Pattern::new(r"^cas\s+.*:$");

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// Family of a construct the direct interpreter does not execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    Control,
    Loop,
    Function,
}

impl Construct {
    /// The diagnostic shown in the run log.
    pub fn message(self) -> &'static str {
        match self {
            Self::Control => "Structures de contrôle non implémentées dans cette version",
            Self::Loop => "Boucles non implémentées dans cette version",
            Self::Function => "Fonctions non implémentées dans cette version",
        }
    }
}

/// A classified source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `var name = expr` or `name = expr`.
    Declare { name: String, expr: String },
    /// `afficher(expr)` or `afficher expr, expr, …`.
    Output { exprs: Vec<String> },
    /// `var name = demander(prompt)`.
    Input { name: String, prompt: String },
    /// `attendre(expr)`, in seconds.
    Pause { expr: String },
    Unsupported(Construct),
    /// A line with nothing to execute.
    Structural,
}

impl Statement {
    /// Short recognizer name, for tracing.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Declare { .. } => "declaration",
            Self::Output { .. } => "output",
            Self::Input { .. } => "input",
            Self::Pause { .. } => "pause",
            Self::Unsupported(_) => "unsupported",
            Self::Structural => "structural",
        }
    }
}

/// Classify one prepared line.
pub fn classify(line: &str) -> EvalResult<Statement> {
    if let Some(stmt) = declaration(line)? {
        return Ok(stmt);
    }
    if let Some(stmt) = output(line)? {
        return Ok(stmt);
    }
    if let Some(caps) = INPUT.captures(line) {
        return Ok(Statement::Input {
            name: caps[1].to_string(),
            prompt: caps[2].trim().to_string(),
        });
    }
    if let Some(caps) = PAUSE.captures(line) {
        let expr = non_empty(&caps[1], line)?;
        return Ok(Statement::Pause { expr });
    }
    if let Some(construct) = unsupported(line) {
        return Ok(Statement::Unsupported(construct));
    }
    if is_structural(line) {
        return Ok(Statement::Structural);
    }
    Err(EvalError::Unrecognized(line.to_string()))
}

fn declaration(line: &str) -> EvalResult<Option<Statement>> {
    let Some(caps) = DECLARATION.captures(line) else {
        return Ok(None);
    };
    let expr = caps[2].trim();
    if DEFERRED_INPUT.is_match(expr) {
        return Ok(None);
    }
    Ok(Some(Statement::Declare {
        name: caps[1].to_string(),
        expr: non_empty(expr, line)?,
    }))
}

fn output(line: &str) -> EvalResult<Option<Statement>> {
    let Some(rest) = line.strip_prefix("afficher") else {
        return Ok(None);
    };

    if let Some(inner) = rest.trim_start().strip_prefix('(') {
        if let Some(inner) = inner.strip_suffix(')') {
            if balanced(inner) {
                let expr = non_empty(inner, line)?;
                return Ok(Some(Statement::Output { exprs: vec![expr] }));
            }
        }
    }

    if !rest.starts_with(char::is_whitespace) {
        return Ok(None);
    }
    let exprs = split_arguments(rest)
        .into_iter()
        .map(|e| non_empty(e, line))
        .collect::<EvalResult<Vec<_>>>()?;
    Ok(Some(Statement::Output { exprs }))
}

fn unsupported(line: &str) -> Option<Construct> {
    const CONTROL: &[&str] = &[
        "si (",
        "si(",
        "sinon",
        "} sinon",
        "selon (",
        "selon(",
        "essayer",
        "} attraper",
    ];
    const LOOPS: &[&str] = &["pour (", "pour(", "tantque (", "tantque("];

    if CONTROL.iter().any(|p| line.starts_with(p)) {
        Some(Construct::Control)
    } else if LOOPS.iter().any(|p| line.starts_with(p)) {
        Some(Construct::Loop)
    } else if line.starts_with("fonction ") {
        Some(Construct::Function)
    } else {
        None
    }
}

fn is_structural(line: &str) -> bool {
    matches!(line, "{" | "}" | "defaut:" | "quitter" | "continuer" | "retourner")
        || line.starts_with("//")
        || line.starts_with("retourner ")
        || CASE_LABEL.is_match(line)
}

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn non_empty(expr: &str, line: &str) -> EvalResult<String> {
    let expr = expr.trim();
    if expr.is_empty() {
        Err(EvalError::EmptyExpression(line.to_string()))
    } else {
        Ok(expr.to_string())
    }
}

/// Parentheses outside string literals never close below depth zero.
fn balanced(text: &str) -> bool {
    let mut depth = 0i32;
    let mut quoted = false;
    let mut escaped = false;
    for c in text.chars() {
        if quoted {
            match (escaped, c) {
                (true, _) => escaped = false,
                (false, '\\') => escaped = true,
                (false, '"') => quoted = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => quoted = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0 && !quoted
}

/// Split on commas that sit outside string literals and parentheses.
fn split_arguments(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quoted = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if quoted {
            match (escaped, c) {
                (true, _) => escaped = false,
                (false, '\\') => escaped = true,
                (false, '"') => quoted = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => quoted = true,
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_and_assignment() {
        assert_eq!(
            classify("var x = 2 + 3").unwrap(),
            Statement::Declare {
                name: "x".into(),
                expr: "2 + 3".into()
            }
        );
        assert_eq!(
            classify("compteur = compteur + 1").unwrap(),
            Statement::Declare {
                name: "compteur".into(),
                expr: "compteur + 1".into()
            }
        );
        assert_eq!(
            classify("var réponse = \"oui\"").unwrap(),
            Statement::Declare {
                name: "réponse".into(),
                expr: "\"oui\"".into()
            }
        );
    }

    #[test]
    fn test_comparison_is_not_assignment() {
        assert!(classify("x == 3").is_err());
    }

    #[test]
    fn test_demander_is_deferred_to_input() {
        assert_eq!(
            classify("var nom = demander(\"Ton nom ?\")").unwrap(),
            Statement::Input {
                name: "nom".into(),
                prompt: "\"Ton nom ?\"".into()
            }
        );
    }

    #[test]
    fn test_output_forms() {
        assert_eq!(
            classify("afficher(\"a, b\")").unwrap(),
            Statement::Output {
                exprs: vec!["\"a, b\"".into()]
            }
        );
        assert_eq!(
            classify("afficher x, \"y, z\", longueur(a, b)").unwrap(),
            Statement::Output {
                exprs: vec!["x".into(), "\"y, z\"".into(), "longueur(a, b)".into()]
            }
        );
        assert_eq!(
            classify("afficher(a) + (b)").unwrap_err(),
            EvalError::Unrecognized("afficher(a) + (b)".into())
        );
    }

    #[test]
    fn test_empty_expressions() {
        assert_eq!(
            classify("afficher()").unwrap_err(),
            EvalError::EmptyExpression("afficher()".into())
        );
        assert_eq!(
            classify("attendre( )").unwrap_err(),
            EvalError::EmptyExpression("attendre( )".into())
        );
    }

    #[test]
    fn test_pause() {
        assert_eq!(
            classify("attendre(2)").unwrap(),
            Statement::Pause { expr: "2".into() }
        );
    }

    #[test]
    fn test_unsupported_families() {
        let cases = [
            ("si (x > 1) {", Construct::Control),
            ("} sinon si (x) {", Construct::Control),
            ("} sinon {", Construct::Control),
            ("selon (x) {", Construct::Control),
            ("pour (var i = 1; i <= 3; i = i + 1) {", Construct::Loop),
            ("tantque (vrai) {", Construct::Loop),
            ("fonction saluer(nom) {", Construct::Function),
        ];
        for (line, construct) in cases {
            assert_eq!(
                classify(line).unwrap(),
                Statement::Unsupported(construct),
                "{line}"
            );
        }
    }

    #[test]
    fn test_structural_lines() {
        for line in ["{", "}", "// note", "cas 1:", "defaut:", "quitter", "retourner x"] {
            assert_eq!(classify(line).unwrap(), Statement::Structural, "{line}");
        }
    }

    #[test]
    fn test_garbage_is_unrecognized() {
        assert_eq!(
            classify("bonjour le monde").unwrap_err(),
            EvalError::Unrecognized("bonjour le monde".into())
        );
    }
}
