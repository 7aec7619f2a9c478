//! Structural errors raised by the block graph.

use crate::{BlockId, BlockKind};
use thiserror::Error;

/// Errors raised when an edit would break a structural invariant of the
/// block graph. The graph is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// No block with this id lives in the graph.
    #[error("unknown block {0}")]
    UnknownBlock(BlockId),

    /// The block has no input with this name.
    #[error("block {block} has no input named '{input}'")]
    UnknownInput { block: BlockId, input: String },

    /// A value block was plugged into a statement input, or the reverse.
    #[error("input '{input}' of block {block} does not take {found} blocks")]
    WrongInputKind {
        block: BlockId,
        input: String,
        found: &'static str,
    },

    /// The child's output type is outside the input's accepted set.
    #[error("block {child} ({kind}) is not accepted by input '{input}' of block {block}")]
    TypeMismatch {
        block: BlockId,
        input: String,
        child: BlockId,
        kind: BlockKind,
    },

    /// The connection would make a block its own ancestor.
    #[error("connecting {child} under {parent} would create a cycle")]
    Cycle { parent: BlockId, child: BlockId },

    /// The block has no `next` (or no previous) connection.
    #[error("block {0} cannot be chained")]
    NotChainable(BlockId),

    /// The block has no variable-arity shape.
    #[error("block {0} has no mutable shape")]
    NoShape(BlockId),
}

/// Result alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphError::Cycle {
            parent: BlockId(3),
            child: BlockId(1),
        };
        assert_eq!(
            err.to_string(),
            "connecting #1 under #3 would create a cycle"
        );
    }

    #[test]
    fn test_type_mismatch_display_names_block_tag() {
        let err = GraphError::TypeMismatch {
            block: BlockId(0),
            input: "DURATION".into(),
            child: BlockId(4),
            kind: BlockKind::Text,
        };
        assert_eq!(
            err.to_string(),
            "block #4 (text) is not accepted by input 'DURATION' of block #0"
        );
    }
}
