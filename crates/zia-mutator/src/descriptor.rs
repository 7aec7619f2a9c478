//! Persisted shape descriptors.
//!
//! A descriptor is the attribute map of a block's `mutation` element, e.g.
//! `{"elseif": 2, "else": 1}`. Reading one is lenient: counts may arrive as
//! numbers or strings, and anything negative, unparsable or unknown reads
//! as zero. Counts above [`MAX_CLAUSES`] read as [`MAX_CLAUSES`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use zia_types::{ClauseFamily, ClauseKind, Mutation};

/// Largest clause count a descriptor yields.
pub const MAX_CLAUSES: u32 = 512;

/// Attribute map describing a block's clause counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeDescriptor {
    attrs: BTreeMap<String, Value>,
}

impl ShapeDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Describe `mutation`. Empty shapes give an empty descriptor.
    pub fn from_mutation(mutation: &Mutation) -> Self {
        let attrs = mutation
            .iter()
            .map(|(kind, count)| (kind.attr().to_string(), Value::from(count)))
            .collect();
        Self { attrs }
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Raw count for an attribute, normalized to zero when absent,
    /// negative or unparsable and capped at [`MAX_CLAUSES`].
    pub fn count(&self, attr: &str) -> u32 {
        let raw = match self.attrs.get(attr) {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => parse_leading_int(s),
            Some(Value::Bool(true)) => Some(1),
            _ => None,
        };
        raw.map(|n| n.clamp(0, i64::from(MAX_CLAUSES)) as u32)
            .unwrap_or(0)
    }

    /// Counts for the clause kinds `family` understands. Other attributes
    /// are ignored.
    pub fn to_mutation(&self, family: ClauseFamily) -> Mutation {
        let mut mutation = Mutation::default();
        let kinds = std::iter::once(family.repeatable()).chain(family.terminal());
        for kind in kinds {
            mutation.set(kind, self.count(kind.attr()));
        }
        mutation
    }

    /// The attributes naming a known clause kind.
    pub fn known_kinds(&self) -> Vec<ClauseKind> {
        self.attrs
            .keys()
            .filter_map(|k| ClauseKind::from_attr(k))
            .collect()
    }
}

/// Integer prefix of `s` in the manner of a lenient `parseInt`:
/// leading whitespace, optional sign, then digits.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_from_strings_and_numbers() {
        let d = ShapeDescriptor::new()
            .with_attr("elseif", "3")
            .with_attr("else", 1);
        assert_eq!(d.count("elseif"), 3);
        assert_eq!(d.count("else"), 1);
    }

    #[test]
    fn test_malformed_counts_read_as_zero() {
        let d = ShapeDescriptor::new()
            .with_attr("elseif", "-2")
            .with_attr("case", "beaucoup")
            .with_attr("items", Value::Null);
        assert_eq!(d.count("elseif"), 0);
        assert_eq!(d.count("case"), 0);
        assert_eq!(d.count("items"), 0);
        assert_eq!(d.count("absent"), 0);
    }

    #[test]
    fn test_huge_counts_are_capped() {
        let d = ShapeDescriptor::new()
            .with_attr("elseif", 4_000_000_000u64)
            .with_attr("case", "99999999999999999999")
            .with_attr("items", 1e300);
        assert_eq!(d.count("elseif"), MAX_CLAUSES);
        assert_eq!(d.count("items"), MAX_CLAUSES);
        // Too long for an integer at all.
        assert_eq!(d.count("case"), 0);
    }

    #[test]
    fn test_leading_int_prefix() {
        assert_eq!(parse_leading_int("  12abc"), Some(12));
        assert_eq!(parse_leading_int("+4"), Some(4));
        assert_eq!(parse_leading_int("-7"), Some(-7));
        assert_eq!(parse_leading_int("x1"), None);
    }

    #[test]
    fn test_to_mutation_ignores_foreign_kinds() {
        let d = ShapeDescriptor::new()
            .with_attr("case", 2)
            .with_attr("elseif", 5)
            .with_attr("default", "4");
        let m = d.to_mutation(ClauseFamily::Switch);
        assert_eq!(m.count(ClauseKind::Case), 2);
        assert_eq!(m.count(ClauseKind::Default), 1);
        assert_eq!(m.count(ClauseKind::ElseIf), 0);
    }

    #[test]
    fn test_json_round_trip() {
        let mut m = Mutation::default();
        m.set(ClauseKind::ElseIf, 2);
        m.set(ClauseKind::Else, 1);
        let json = serde_json::to_string(&ShapeDescriptor::from_mutation(&m)).unwrap();
        assert_eq!(json, r#"{"else":1,"elseif":2}"#);
        let back: ShapeDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_mutation(ClauseFamily::Conditional), m);
    }
}
