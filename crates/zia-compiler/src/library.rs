//! Built-in example programs.
//!
//! Each example is a project document embedded at build time. Loading one
//! goes through the same forgiving loader as a saved project.

use crate::error::{ProjectError, ProjectResult};
use crate::persist::ProjectDocument;

/// The example a fresh editor starts with.
pub const DEFAULT_EXAMPLE: &str = "hello";

/// A named example program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Example {
    pub name: &'static str,
    pub title: &'static str,
    json: &'static str,
}

impl Example {
    /// The embedded document, unparsed.
    pub fn json(&self) -> &'static str {
        self.json
    }

    pub fn document(&self) -> ProjectResult<ProjectDocument> {
        Ok(serde_json::from_str(self.json)?)
    }

    /// Status line shown once the example is in the workspace.
    pub fn loaded_message(&self) -> String {
        format!(
            "Exemple \"{}\" chargé! Cliquez sur \"Exécuter le Code\" pour le tester.",
            self.name
        )
    }
}

/// Every built-in example, in menu order.
pub const EXAMPLES: &[Example] = &[
    Example {
        name: "hello",
        title: "Bonjour",
        json: include_str!("../library/hello.json"),
    },
    Example {
        name: "count",
        title: "Compter jusqu'à 5",
        json: include_str!("../library/count.json"),
    },
    Example {
        name: "story",
        title: "Jour de la semaine",
        json: include_str!("../library/story.json"),
    },
];

/// Look an example up by name.
pub fn example(name: &str) -> ProjectResult<&'static Example> {
    EXAMPLES
        .iter()
        .find(|e| e.name == name)
        .ok_or_else(|| ProjectError::UnknownExample(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        for (i, a) in EXAMPLES.iter().enumerate() {
            assert!(EXAMPLES[i + 1..].iter().all(|b| b.name != a.name));
        }
    }

    #[test]
    fn test_default_example_exists() {
        assert_eq!(example(DEFAULT_EXAMPLE).unwrap().name, "hello");
    }

    #[test]
    fn test_unknown_example() {
        assert!(matches!(
            example("robot"),
            Err(ProjectError::UnknownExample(name)) if name == "robot"
        ));
    }

    #[test]
    fn test_loaded_message() {
        assert_eq!(
            example("count").unwrap().loaded_message(),
            "Exemple \"count\" chargé! Cliquez sur \"Exécuter le Code\" pour le tester."
        );
    }
}
