//! Reshape operations for variable-arity blocks.
//!
//! Every reshape follows the same three steps:
//!
//! 1. snapshot what is plugged into each existing clause,
//! 2. replace the clause slots with the canonical layout for the new counts,
//! 3. reconnect each snapshot at the slot it was assigned to.
//!
//! Children that end up without a slot are left in the graph as top-level
//! blocks and listed in [`ReshapeReport::orphaned`].

use crate::descriptor::ShapeDescriptor;
use crate::editor::{ClauseRef, Marker, MarkerChain};
use std::collections::{BTreeMap, BTreeSet};
use zia_types::{BlockGraph, BlockId, ClauseFamily, GraphError, GraphResult, Mutation};

/// Outcome of a reshape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReshapeReport {
    pub block: BlockId,
    /// Counts after the reshape.
    pub mutation: Mutation,
    /// Children disconnected because their clause no longer exists.
    pub orphaned: Vec<BlockId>,
}

/// What was plugged into one clause.
#[derive(Debug, Clone, Copy, Default)]
struct Contents {
    condition: Option<BlockId>,
    body: Option<BlockId>,
}

impl Contents {
    fn is_empty(&self) -> bool {
        self.condition.is_none() && self.body.is_none()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Public operations
// ══════════════════════════════════════════════════════════════════════════════

/// Descriptor for persisting the block's shape. Blocks without optional
/// clauses (or with all counts at zero) have none.
pub fn serialize_shape(graph: &BlockGraph, id: BlockId) -> GraphResult<Option<ShapeDescriptor>> {
    let node = graph.node(id)?;
    Ok(node
        .mutation()
        .filter(|m| !m.is_empty())
        .map(ShapeDescriptor::from_mutation))
}

/// Apply persisted counts and rebuild the slots. Malformed counts read as
/// zero; this never fails for a block that has a shape.
pub fn restore_shape(
    graph: &mut BlockGraph,
    id: BlockId,
    descriptor: &ShapeDescriptor,
) -> GraphResult<ReshapeReport> {
    let (family, _) = shape_of(graph, id)?;
    graph.set_mutation(id, descriptor.to_mutation(family))?;
    rebuild(graph, id)
}

/// Re-create the clause slots from the block's current counts. Children
/// keep the clause with the same kind and index when it still exists.
pub fn rebuild(graph: &mut BlockGraph, id: BlockId) -> GraphResult<ReshapeReport> {
    let (family, mutation) = shape_of(graph, id)?;
    let mut snapshot = snapshot(graph, id, family)?;
    let assignments = family
        .clauses(&mutation)
        .into_iter()
        .map(|(kind, index)| {
            let slot = ClauseRef { kind, index };
            let contents = snapshot.remove(&slot).unwrap_or_default();
            (slot, contents)
        })
        .collect();
    apply(graph, id, family, mutation, assignments)
}

/// One marker per existing clause, in canonical order.
pub fn open_editor(graph: &BlockGraph, id: BlockId) -> GraphResult<MarkerChain> {
    let (family, mutation) = shape_of(graph, id)?;
    let markers = family
        .clauses(&mutation)
        .into_iter()
        .map(|(kind, index)| Marker {
            kind,
            origin: Some(ClauseRef { kind, index }),
        })
        .collect();
    Ok(MarkerChain::from_markers(id, markers))
}

/// Reshape the block to match an edited marker chain.
///
/// Counts come from walking the chain. Markers of a kind the block does not
/// understand are skipped, and the first terminal marker ends the walk. A
/// marker that was opened on a clause brings that clause's condition and
/// body to its new position; new markers get empty slots.
pub fn commit_editor(
    graph: &mut BlockGraph,
    chain: &MarkerChain,
    id: BlockId,
) -> GraphResult<ReshapeReport> {
    let (family, _) = shape_of(graph, id)?;
    let mut snapshot = snapshot(graph, id, family)?;
    let same_block = chain.owner() == id;

    let repeatable = family.repeatable();
    let mut repeats = 0;
    let mut terminal = None;
    let mut assignments = Vec::with_capacity(chain.len());

    for marker in chain.markers() {
        if !family.accepts(marker.kind) {
            continue;
        }
        let index = if marker.kind.is_terminal() {
            0
        } else {
            repeats += 1;
            repeats - 1
        };
        let contents = marker
            .origin
            .filter(|_| same_block)
            .and_then(|origin| snapshot.remove(&origin))
            .unwrap_or_default();
        assignments.push((ClauseRef { kind: marker.kind, index }, contents));
        if marker.kind.is_terminal() {
            terminal = Some(marker.kind);
            break;
        }
    }

    let mut mutation = Mutation::default();
    mutation.set(repeatable, repeats);
    if let Some(kind) = terminal {
        mutation.set(kind, 1);
    }
    apply(graph, id, family, mutation, assignments)
}

// ══════════════════════════════════════════════════════════════════════════════
// Internals
// ══════════════════════════════════════════════════════════════════════════════

fn shape_of(graph: &BlockGraph, id: BlockId) -> GraphResult<(ClauseFamily, Mutation)> {
    let node = graph.node(id)?;
    let family = ClauseFamily::of(node.kind).ok_or(GraphError::NoShape(id))?;
    let mutation = node.mutation().cloned().ok_or(GraphError::NoShape(id))?;
    Ok((family, mutation))
}

/// Current contents of every clause slot present on the block. Reads the
/// slots themselves rather than the counts, so it is correct even right
/// after the counts were overwritten.
fn snapshot(
    graph: &BlockGraph,
    id: BlockId,
    family: ClauseFamily,
) -> GraphResult<BTreeMap<ClauseRef, Contents>> {
    let node = graph.node(id)?;
    let mut found = BTreeMap::new();
    let kinds = std::iter::once(family.repeatable()).chain(family.terminal());

    for kind in kinds {
        let mut index = 0;
        loop {
            let names = kind.inputs(index);
            let condition = names.condition.as_deref().and_then(|n| node.input(n));
            let body = names.body.as_deref().and_then(|n| node.input(n));
            if condition.is_none() && body.is_none() {
                break;
            }
            let contents = Contents {
                condition: condition.and_then(|i| i.target),
                body: body.and_then(|i| i.target),
            };
            if !contents.is_empty() {
                found.insert(ClauseRef { kind, index }, contents);
            }
            if kind.is_terminal() {
                break;
            }
            index += 1;
        }
    }
    Ok(found)
}

fn apply(
    graph: &mut BlockGraph,
    id: BlockId,
    family: ClauseFamily,
    mutation: Mutation,
    assignments: Vec<(ClauseRef, Contents)>,
) -> GraphResult<ReshapeReport> {
    let previous = graph.node(id)?.mutation().cloned().unwrap_or_default();
    let detached = graph.replace_clause_inputs(id, family.layout(&mutation))?;
    graph.set_mutation(id, mutation.clone())?;

    let mut placed = BTreeSet::new();
    for (slot, contents) in assignments {
        let names = slot.kind.inputs(slot.index);
        if let (Some(input), Some(child)) = (names.condition, contents.condition) {
            match graph.connect_value(id, &input, child) {
                Ok(_) => {
                    placed.insert(child);
                }
                Err(err) => tracing::debug!(block = %id, %input, %err, "clause value not carried"),
            }
        }
        if let (Some(input), Some(child)) = (names.body, contents.body) {
            match graph.connect_statement(id, &input, child) {
                Ok(_) => {
                    placed.insert(child);
                }
                Err(err) => tracing::debug!(block = %id, %input, %err, "clause body not carried"),
            }
        }
    }

    let orphaned: Vec<BlockId> = detached
        .into_iter()
        .filter(|child| !placed.contains(child))
        .collect();

    tracing::debug!(
        block = %id,
        old = ?previous,
        new = ?mutation,
        orphaned = orphaned.len(),
        "reshaped block"
    );

    Ok(ReshapeReport {
        block: id,
        mutation,
        orphaned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zia_types::{BlockKind, ClauseKind};

    #[test]
    fn test_serialize_empty_shape_is_none() {
        let mut g = BlockGraph::new();
        let si = g.create(BlockKind::ControlsSi);
        assert_eq!(serialize_shape(&g, si), Ok(None));
        let print = g.create(BlockKind::AfficherText);
        assert_eq!(serialize_shape(&g, print), Ok(None));
    }

    #[test]
    fn test_fixed_shape_block_rejected() {
        let mut g = BlockGraph::new();
        let print = g.create(BlockKind::AfficherText);
        assert_eq!(open_editor(&g, print), Err(GraphError::NoShape(print)));
        assert_eq!(rebuild(&mut g, print), Err(GraphError::NoShape(print)));
    }

    #[test]
    fn test_open_editor_lists_clauses() {
        let mut g = BlockGraph::new();
        let si = g.create(BlockKind::ControlsSi);
        let d = ShapeDescriptor::new().with_attr("elseif", 2).with_attr("else", 1);
        restore_shape(&mut g, si, &d).unwrap();
        let chain = open_editor(&g, si).unwrap();
        assert_eq!(
            chain.kinds(),
            [ClauseKind::ElseIf, ClauseKind::ElseIf, ClauseKind::Else]
        );
        assert_eq!(
            chain.markers()[1].origin,
            Some(ClauseRef {
                kind: ClauseKind::ElseIf,
                index: 1
            })
        );
    }

    #[test]
    fn test_snapshot_reads_slots_not_counts() {
        let mut g = BlockGraph::new();
        let join = g.create(BlockKind::TextJoin);
        let t = g.create(BlockKind::Text);
        g.connect_value(join, "ADD1", t).unwrap();
        let snap = snapshot(&g, join, ClauseFamily::Join).unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(
            snap[&ClauseRef {
                kind: ClauseKind::Item,
                index: 1
            }]
            .condition,
            Some(t)
        );
    }
}
