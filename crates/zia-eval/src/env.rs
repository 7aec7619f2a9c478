//! Variable environment for one interpreter run.

use crate::value::Value;
use std::collections::BTreeMap;

/// Flat name to value map.
///
/// The direct interpreter has no scopes: every declaration or assignment
/// writes the single global map, and a fresh run starts from an empty one.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: BTreeMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any previous value.
    pub fn define(&mut self, name: &str, value: Value) {
        self.bindings.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// All bindings, sorted by name.
    pub fn bindings(&self) -> &BTreeMap<String, Value> {
        &self.bindings
    }
}
