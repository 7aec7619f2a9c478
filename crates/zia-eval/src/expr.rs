//! Expression evaluation.
//!
//! Deliberately small and non-standard: an expression is tried, in order,
//! as a string literal, a number, `vrai`/`faux`, and a known variable.
//! Failing all four, it is split on every occurrence of the first operator
//! token found among ` + `, ` * `, ` / `, ` - ` (in that order) and each
//! part is evaluated on its own. Parentheses carry no meaning. Anything
//! left over evaluates to its own text.

use crate::env::Environment;
use crate::value::{parse_number, Value};

/// Evaluate `expr` against `env`. Never fails.
pub fn evaluate(expr: &str, env: &Environment) -> Value {
    let expr = expr.trim();

    if let Some(text) = string_literal(expr) {
        return Value::Text(text);
    }
    if let Some(n) = parse_number(expr) {
        return Value::Number(n);
    }
    match expr {
        "vrai" => return Value::Bool(true),
        "faux" => return Value::Bool(false),
        _ => {}
    }
    if let Some(value) = env.get(expr) {
        return value.clone();
    }

    if expr.contains(" + ") {
        let parts: Vec<Value> = expr.split(" + ").map(|p| evaluate(p, env)).collect();
        return if parts.iter().all(Value::is_number) {
            Value::Number(parts.iter().map(Value::to_number).sum())
        } else {
            Value::Text(parts.iter().map(Value::to_string).collect())
        };
    }
    if expr.contains(" * ") {
        let product: f64 = expr
            .split(" * ")
            .map(|p| evaluate(p, env).to_number())
            .product();
        return Value::Number(product);
    }
    if expr.contains(" / ") {
        return Value::Number(fold(expr, " / ", env, |a, b| a / b));
    }
    if expr.contains(" - ") {
        return Value::Number(fold(expr, " - ", env, |a, b| a - b));
    }

    let unquoted = expr
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(expr);
    Value::Text(unquoted.to_string())
}

/// Left fold over the parts of `expr` split on `token`, starting from the
/// first part.
fn fold(expr: &str, token: &str, env: &Environment, op: fn(f64, f64) -> f64) -> f64 {
    let mut parts = expr.split(token).map(|p| evaluate(p, env).to_number());
    let first = parts.next().unwrap_or(f64::NAN);
    parts.fold(first, op)
}

/// The contents of a complete double-quoted literal, escapes resolved.
fn string_literal(expr: &str) -> Option<String> {
    if !expr.starts_with('"') {
        return None;
    }
    serde_json::from_str::<String>(expr).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &str) -> Value {
        evaluate(expr, &Environment::new())
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval("\"Bonjour\""), Value::from("Bonjour"));
        assert_eq!(eval("\"dit \\\"oui\\\"\""), Value::from("dit \"oui\""));
        assert_eq!(eval("42"), Value::Number(42.0));
        assert_eq!(eval("vrai"), Value::Bool(true));
    }

    #[test]
    fn test_two_literals_are_not_one_literal() {
        assert_eq!(eval("\"a\" + \"b\""), Value::from("ab"));
    }

    #[test]
    fn test_numeric_sum() {
        assert_eq!(eval("2 + 3"), Value::Number(5.0));
        assert_eq!(eval("1 + 2 + 3"), Value::Number(6.0));
    }

    #[test]
    fn test_mixed_sum_concatenates() {
        let mut env = Environment::new();
        env.define("nom", Value::from("Zia"));
        assert_eq!(
            evaluate("\"Bonjour \" + nom", &env),
            Value::from("Bonjour Zia")
        );
        assert_eq!(eval("\"n=\" + 4"), Value::from("n=4"));
    }

    #[test]
    fn test_loosest_token_wins() {
        // `*` is split before `-`, so this is 2 * (3 - 1).
        assert_eq!(eval("2 * 3 - 1"), Value::Number(4.0));
        assert_eq!(eval("2 * 3 + 1"), Value::Number(7.0));
        assert_eq!(eval("2 * 3 * 4"), Value::Number(24.0));
        assert_eq!(eval("12 / 2 / 3"), Value::Number(2.0));
        assert_eq!(eval("10 - 2 - 3"), Value::Number(5.0));
    }

    #[test]
    fn test_parentheses_are_not_grouping() {
        assert_eq!(eval("(2 + 3)"), Value::from("(23)"));
    }

    #[test]
    fn test_text_in_arithmetic_is_nan() {
        match eval("abc * 2") {
            Value::Number(n) => assert!(n.is_nan()),
            other => panic!("expected a number, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_name_is_its_own_text() {
        assert_eq!(eval("inconnu"), Value::from("inconnu"));
        assert_eq!(eval("\"abc\\q\""), Value::from("abc\\q"));
    }
}
