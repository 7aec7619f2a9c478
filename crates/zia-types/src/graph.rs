//! The block graph: an arena of [`BlockNode`]s plus the variable map.
//!
//! Every connection edit goes through this type so that parent links,
//! slot targets and `next` links always agree, and so that no edit can
//! close a cycle.

use crate::block::{BlockId, BlockKind, BlockNode, Input, InputKind, Parent, Position};
use crate::catalog::Connection;
use crate::clause::Mutation;
use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a workspace variable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(pub String);

impl VariableId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A workspace variable: identity plus the name the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub id: VariableId,
    pub name: String,
}

/// Arena of blocks.
#[derive(Debug, Clone, Default)]
pub struct BlockGraph {
    blocks: BTreeMap<BlockId, BlockNode>,
    next_id: u32,
    variables: Vec<Variable>,
    next_variable: u32,
}

impl BlockGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ══════════════════════════════════════════════════════════════════════
    // Blocks
    // ══════════════════════════════════════════════════════════════════════

    /// Create a top-level block at the origin.
    pub fn create(&mut self, kind: BlockKind) -> BlockId {
        self.create_at(kind, Position::default())
    }

    /// Create a top-level block with its catalogue slots and initial shape.
    pub fn create_at(&mut self, kind: BlockKind, position: Position) -> BlockId {
        let def = kind.definition();
        let id = BlockId(self.next_id);
        self.next_id += 1;

        let family = def.family();
        let mut inputs = def.inputs;
        let mutation = family.map(|family| {
            let mutation = family.initial_mutation();
            inputs.extend(family.layout(&mutation));
            mutation
        });

        self.blocks.insert(
            id,
            BlockNode {
                id,
                kind,
                fields: BTreeMap::new(),
                position,
                inputs,
                next: None,
                parent: None,
                mutation,
            },
        );
        id
    }

    pub fn get(&self, id: BlockId) -> Option<&BlockNode> {
        self.blocks.get(&id)
    }

    pub fn node(&self, id: BlockId) -> GraphResult<&BlockNode> {
        self.blocks.get(&id).ok_or(GraphError::UnknownBlock(id))
    }

    fn node_mut(&mut self, id: BlockId) -> GraphResult<&mut BlockNode> {
        self.blocks.get_mut(&id).ok_or(GraphError::UnknownBlock(id))
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All blocks in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockNode> {
        self.blocks.values()
    }

    pub fn set_field(
        &mut self,
        id: BlockId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> GraphResult<()> {
        self.node_mut(id)?.fields.insert(name.into(), value.into());
        Ok(())
    }

    pub fn set_position(&mut self, id: BlockId, position: Position) -> GraphResult<()> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    /// Delete a block together with everything plugged into it and every
    /// statement that follows it. Returns the removed ids.
    pub fn delete(&mut self, id: BlockId) -> GraphResult<Vec<BlockId>> {
        self.node(id)?;
        self.detach(id);

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.blocks.remove(&current) {
                stack.extend(node.inputs.iter().filter_map(|i| i.target));
                stack.extend(node.next);
                removed.push(current);
            }
        }
        removed.sort();
        Ok(removed)
    }

    /// Remove every block and variable.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.variables.clear();
    }

    /// Unattached blocks in workspace order: top to bottom, then left to
    /// right, then creation order.
    pub fn top_blocks(&self) -> Vec<BlockId> {
        let mut top: Vec<&BlockNode> = self.blocks.values().filter(|b| b.is_top_level()).collect();
        top.sort_by_key(|b| (b.position.y, b.position.x, b.id));
        top.into_iter().map(|b| b.id).collect()
    }

    /// Iterate a statement chain starting at `head`.
    pub fn chain(&self, head: Option<BlockId>) -> Chain<'_> {
        Chain {
            graph: self,
            current: head,
            remaining: self.blocks.len(),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Connections
    // ══════════════════════════════════════════════════════════════════════

    /// Plug a value block into a value input. A block already in the slot
    /// is unplugged and returned; it stays in the graph as a top-level block.
    pub fn connect_value(
        &mut self,
        parent: BlockId,
        input: &str,
        child: BlockId,
    ) -> GraphResult<Option<BlockId>> {
        let child_kind = self.node(child)?.kind;
        let output = match child_kind.definition().connection {
            Connection::Value { output } => output,
            Connection::Statement { .. } => {
                return Err(GraphError::WrongInputKind {
                    block: parent,
                    input: input.to_string(),
                    found: "statement",
                })
            }
        };

        match &self.slot(parent, input)?.kind {
            InputKind::Statement => {
                return Err(GraphError::WrongInputKind {
                    block: parent,
                    input: input.to_string(),
                    found: "value",
                })
            }
            InputKind::Value { check: Some(check) } => {
                if let Some(output) = output {
                    if !check.contains(&output) {
                        return Err(GraphError::TypeMismatch {
                            block: parent,
                            input: input.to_string(),
                            child,
                            kind: child_kind,
                        });
                    }
                }
            }
            InputKind::Value { check: None } => {}
        }
        self.check_cycle(parent, child)?;

        self.detach(child);
        let displaced = self.attach_input(parent, input, child)?;
        Ok(displaced)
    }

    /// Plug a statement chain into a statement input. The chain previously
    /// in the slot is re-attached after the tail of the new chain when the
    /// tail allows it; otherwise it is unplugged and returned.
    pub fn connect_statement(
        &mut self,
        parent: BlockId,
        input: &str,
        child: BlockId,
    ) -> GraphResult<Option<BlockId>> {
        let child_kind = self.node(child)?.kind;
        if child_kind.definition().is_value() {
            return Err(GraphError::WrongInputKind {
                block: parent,
                input: input.to_string(),
                found: "value",
            });
        }
        if !self.slot(parent, input)?.kind.is_statement() {
            return Err(GraphError::WrongInputKind {
                block: parent,
                input: input.to_string(),
                found: "statement",
            });
        }
        self.check_cycle(parent, child)?;

        self.detach(child);
        let displaced = self.attach_input(parent, input, child)?;
        Ok(self.heal(child, displaced))
    }

    /// Link `next` after `prev` in a statement chain. Whatever followed
    /// `prev` is moved after the tail of `next`'s chain when possible.
    pub fn set_next(&mut self, prev: BlockId, next: BlockId) -> GraphResult<Option<BlockId>> {
        if !accepts_next(self.node(prev)?.kind) {
            return Err(GraphError::NotChainable(prev));
        }
        if self.node(next)?.kind.definition().is_value() {
            return Err(GraphError::NotChainable(next));
        }
        self.check_cycle(prev, next)?;

        self.detach(next);
        let node = self.node_mut(prev)?;
        let displaced = node.next.replace(next);
        self.node_mut(next)?.parent = Some(Parent::Next(prev));
        if let Some(old) = displaced {
            self.node_mut(old)?.parent = None;
        }
        Ok(self.heal(next, displaced))
    }

    /// Unplug a block from wherever it is attached. Its own children and
    /// the statements following it travel with it.
    pub fn disconnect(&mut self, child: BlockId) -> GraphResult<()> {
        self.node(child)?;
        self.detach(child);
        Ok(())
    }

    /// True when `ancestor` is above `block` in the tree (or is `block`).
    pub fn is_ancestor(&self, ancestor: BlockId, block: BlockId) -> bool {
        let mut current = Some(block);
        let mut remaining = self.blocks.len() + 1;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            if remaining == 0 {
                return false;
            }
            remaining -= 1;
            current = self
                .blocks
                .get(&id)
                .and_then(|b| b.parent.as_ref())
                .map(Parent::block);
        }
        false
    }

    // ══════════════════════════════════════════════════════════════════════
    // Shape support
    // ══════════════════════════════════════════════════════════════════════

    /// Replace every clause-owned input of a variable-arity block with
    /// `inputs`. Children of the removed inputs become top-level blocks and
    /// are returned in slot order.
    pub fn replace_clause_inputs(
        &mut self,
        id: BlockId,
        inputs: Vec<Input>,
    ) -> GraphResult<Vec<BlockId>> {
        let node = self.node_mut(id)?;
        if node.mutation.is_none() {
            return Err(GraphError::NoShape(id));
        }
        let detached: Vec<BlockId> = node
            .inputs
            .iter()
            .filter(|i| i.clause.is_some())
            .filter_map(|i| i.target)
            .collect();
        node.inputs.retain(|i| i.clause.is_none());
        node.inputs.extend(inputs.into_iter().map(|mut i| {
            i.target = None;
            i
        }));
        for child in &detached {
            self.node_mut(*child)?.parent = None;
        }
        Ok(detached)
    }

    pub fn set_mutation(&mut self, id: BlockId, mutation: Mutation) -> GraphResult<()> {
        let node = self.node_mut(id)?;
        match node.mutation.as_mut() {
            Some(current) => {
                *current = mutation;
                Ok(())
            }
            None => Err(GraphError::NoShape(id)),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Variables
    // ══════════════════════════════════════════════════════════════════════

    /// Create a variable with a fresh id.
    pub fn create_variable(&mut self, name: impl Into<String>) -> VariableId {
        let id = loop {
            let candidate = VariableId(format!("var{}", self.next_variable));
            self.next_variable += 1;
            if self.variable(&candidate).is_none() {
                break candidate;
            }
        };
        self.variables.push(Variable {
            id: id.clone(),
            name: name.into(),
        });
        id
    }

    /// Register a variable with a known id. An existing entry is renamed.
    pub fn add_variable(&mut self, id: VariableId, name: impl Into<String>) {
        let name = name.into();
        match self.variables.iter_mut().find(|v| v.id == id) {
            Some(existing) => existing.name = name,
            None => self.variables.push(Variable { id, name }),
        }
    }

    pub fn variable(&self, id: &VariableId) -> Option<&Variable> {
        self.variables.iter().find(|v| &v.id == id)
    }

    /// Variables in declaration order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    // ══════════════════════════════════════════════════════════════════════
    // Internals
    // ══════════════════════════════════════════════════════════════════════

    fn slot(&self, block: BlockId, input: &str) -> GraphResult<&Input> {
        self.node(block)?
            .input(input)
            .ok_or_else(|| GraphError::UnknownInput {
                block,
                input: input.to_string(),
            })
    }

    fn check_cycle(&self, parent: BlockId, child: BlockId) -> GraphResult<()> {
        if self.is_ancestor(child, parent) {
            Err(GraphError::Cycle { parent, child })
        } else {
            Ok(())
        }
    }

    /// Set the slot's target, returning the unplugged previous occupant.
    fn attach_input(
        &mut self,
        parent: BlockId,
        input: &str,
        child: BlockId,
    ) -> GraphResult<Option<BlockId>> {
        let slot = self
            .node_mut(parent)?
            .inputs
            .iter_mut()
            .find(|i| i.name == input)
            .ok_or_else(|| GraphError::UnknownInput {
                block: parent,
                input: input.to_string(),
            })?;
        let displaced = slot.target.replace(child);
        self.node_mut(child)?.parent = Some(Parent::Input {
            block: parent,
            input: input.to_string(),
        });
        if let Some(old) = displaced {
            self.node_mut(old)?.parent = None;
        }
        Ok(displaced)
    }

    /// Re-attach `displaced` after the tail of the chain starting at
    /// `head`. Returns the block left unattached, if any.
    fn heal(&mut self, head: BlockId, displaced: Option<BlockId>) -> Option<BlockId> {
        let displaced = displaced?;
        let tail = self.chain(Some(head)).last()?;
        if tail == displaced || !accepts_next(self.blocks.get(&tail)?.kind) {
            return Some(displaced);
        }
        if let Some(node) = self.blocks.get_mut(&tail) {
            node.next = Some(displaced);
        }
        if let Some(node) = self.blocks.get_mut(&displaced) {
            node.parent = Some(Parent::Next(tail));
        }
        None
    }

    fn detach(&mut self, child: BlockId) {
        let Some(parent) = self.blocks.get_mut(&child).and_then(|b| b.parent.take()) else {
            return;
        };
        match parent {
            Parent::Input { block, input } => {
                if let Some(slot) = self
                    .blocks
                    .get_mut(&block)
                    .and_then(|b| b.inputs.iter_mut().find(|i| i.name == input))
                {
                    slot.target = None;
                }
            }
            Parent::Next(block) => {
                if let Some(prev) = self.blocks.get_mut(&block) {
                    prev.next = None;
                }
            }
        }
    }
}

fn accepts_next(kind: BlockKind) -> bool {
    matches!(
        kind.definition().connection,
        Connection::Statement { next: true }
    )
}

/// Iterator over a statement chain.
pub struct Chain<'a> {
    graph: &'a BlockGraph,
    current: Option<BlockId>,
    remaining: usize,
}

impl Iterator for Chain<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<BlockId> {
        let id = self.current?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.current = self.graph.get(id).and_then(|b| b.next);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_gives_catalogue_inputs() {
        let mut g = BlockGraph::new();
        let id = g.create(BlockKind::ControlsPour);
        let names: Vec<_> = g.node(id).unwrap().inputs().iter().map(|i| i.name.clone()).collect();
        assert_eq!(names, ["FROM", "TO", "DO"]);
        assert!(g.node(id).unwrap().mutation().is_none());
    }

    #[test]
    fn test_text_join_starts_with_two_items() {
        let mut g = BlockGraph::new();
        let id = g.create(BlockKind::TextJoin);
        let node = g.node(id).unwrap();
        assert!(node.input("ADD0").is_some());
        assert!(node.input("ADD1").is_some());
        assert!(node.input("ADD2").is_none());
    }

    #[test]
    fn test_connect_value_sets_both_ends() {
        let mut g = BlockGraph::new();
        let print = g.create(BlockKind::AfficherText);
        let text = g.create(BlockKind::Text);
        assert_eq!(g.connect_value(print, "TEXT", text), Ok(None));
        assert_eq!(g.node(print).unwrap().target("TEXT"), Some(text));
        assert_eq!(
            g.node(text).unwrap().parent(),
            Some(&Parent::Input {
                block: print,
                input: "TEXT".into()
            })
        );
    }

    #[test]
    fn test_connect_value_rejects_wrong_type() {
        let mut g = BlockGraph::new();
        let wait = g.create(BlockKind::Attendre);
        let text = g.create(BlockKind::Text);
        assert!(matches!(
            g.connect_value(wait, "DURATION", text),
            Err(GraphError::TypeMismatch { .. })
        ));
        assert!(g.node(text).unwrap().is_top_level());
    }

    #[test]
    fn test_untyped_output_fits_any_slot() {
        let mut g = BlockGraph::new();
        let wait = g.create(BlockKind::Attendre);
        let get = g.create(BlockKind::VariablesGet);
        assert!(g.connect_value(wait, "DURATION", get).is_ok());
    }

    #[test]
    fn test_connect_value_displaces_occupant() {
        let mut g = BlockGraph::new();
        let print = g.create(BlockKind::AfficherText);
        let a = g.create(BlockKind::Text);
        let b = g.create(BlockKind::Text);
        g.connect_value(print, "TEXT", a).unwrap();
        assert_eq!(g.connect_value(print, "TEXT", b), Ok(Some(a)));
        assert!(g.node(a).unwrap().is_top_level());
    }

    #[test]
    fn test_statement_into_value_slot_rejected() {
        let mut g = BlockGraph::new();
        let print = g.create(BlockKind::AfficherText);
        let other = g.create(BlockKind::AfficherText);
        assert!(matches!(
            g.connect_value(print, "TEXT", other),
            Err(GraphError::WrongInputKind { .. })
        ));
    }

    #[test]
    fn test_set_next_rejects_cycle() {
        let mut g = BlockGraph::new();
        let a = g.create(BlockKind::AfficherText);
        let b = g.create(BlockKind::AfficherText);
        g.set_next(a, b).unwrap();
        assert_eq!(
            g.set_next(b, a),
            Err(GraphError::Cycle {
                parent: b,
                child: a
            })
        );
        assert_eq!(g.set_next(a, a), Err(GraphError::Cycle { parent: a, child: a }));
        assert_eq!(g.chain(Some(a)).collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_nesting_cycle_rejected() {
        let mut g = BlockGraph::new();
        let outer = g.create(BlockKind::ControlsTantque);
        let inner = g.create(BlockKind::ControlsTantque);
        g.connect_statement(outer, "DO", inner).unwrap();
        assert!(matches!(
            g.connect_statement(inner, "DO", outer),
            Err(GraphError::Cycle { .. })
        ));
    }

    #[test]
    fn test_return_cannot_be_followed() {
        let mut g = BlockGraph::new();
        let ret = g.create(BlockKind::Retourner);
        let print = g.create(BlockKind::AfficherText);
        assert_eq!(g.set_next(ret, print), Err(GraphError::NotChainable(ret)));
    }

    #[test]
    fn test_statement_insert_heals_chain() {
        let mut g = BlockGraph::new();
        let loop_ = g.create(BlockKind::ControlsTantque);
        let first = g.create(BlockKind::AfficherText);
        let inserted = g.create(BlockKind::Attendre);
        g.connect_statement(loop_, "DO", first).unwrap();
        assert_eq!(g.connect_statement(loop_, "DO", inserted), Ok(None));
        let body: Vec<_> = g.chain(g.node(loop_).unwrap().target("DO")).collect();
        assert_eq!(body, vec![inserted, first]);
    }

    #[test]
    fn test_delete_removes_subtree_and_following() {
        let mut g = BlockGraph::new();
        let a = g.create(BlockKind::VarDeclaration);
        let n = g.create(BlockKind::MathNumber);
        let b = g.create(BlockKind::AfficherText);
        let keep = g.create(BlockKind::AfficherText);
        g.connect_value(a, "VALUE", n).unwrap();
        g.set_next(keep, a).unwrap();
        g.set_next(a, b).unwrap();
        assert_eq!(g.delete(a).unwrap(), vec![a, n, b]);
        assert_eq!(g.len(), 1);
        assert_eq!(g.node(keep).unwrap().next(), None);
    }

    #[test]
    fn test_top_blocks_sorted_by_position() {
        let mut g = BlockGraph::new();
        let low = g.create_at(BlockKind::AfficherText, Position::new(0, 200));
        let right = g.create_at(BlockKind::AfficherText, Position::new(50, 10));
        let left = g.create_at(BlockKind::AfficherText, Position::new(5, 10));
        assert_eq!(g.top_blocks(), vec![left, right, low]);
    }

    #[test]
    fn test_variables_have_distinct_ids() {
        let mut g = BlockGraph::new();
        g.add_variable(VariableId("var0".into()), "x");
        let id = g.create_variable("x");
        assert_ne!(id.as_str(), "var0");
        assert_eq!(g.variables().len(), 2);
    }

    #[test]
    fn test_replace_clause_inputs_requires_shape() {
        let mut g = BlockGraph::new();
        let print = g.create(BlockKind::AfficherText);
        assert_eq!(
            g.replace_clause_inputs(print, vec![]),
            Err(GraphError::NoShape(print))
        );
    }
}
