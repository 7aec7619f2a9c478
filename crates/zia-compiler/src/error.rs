//! Project error types.

use thiserror::Error;
use zia_types::{BlockId, GraphError};

/// Errors that stop a project from loading or saving.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// The document is not valid project JSON.
    #[error("invalid project document: {0}")]
    Json(#[from] serde_json::Error),

    /// A graph edit failed while building the project.
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("no example program named '{0}'")]
    UnknownExample(String),
}

/// Project result type alias.
pub type ProjectResult<T> = Result<T, ProjectError>;

/// Anomalies found while loading a project. Loading keeps going: the
/// affected block is left top-level or the offending piece is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadWarning {
    #[error("unknown block type '{0}' skipped")]
    UnknownType(String),

    /// The document names a slot the block does not have.
    #[error("block {block} has no input '{input}'; {child} left unattached")]
    DanglingSlot {
        block: BlockId,
        input: String,
        child: BlockId,
    },

    /// The graph refused the connection.
    #[error("{child} could not be attached to {block}: {reason}")]
    Rejected {
        block: BlockId,
        child: BlockId,
        reason: GraphError,
    },

    /// The block kind carries no such field; the value was dropped.
    #[error("block {block} has no field '{field}'; value dropped")]
    UnknownField { block: BlockId, field: String },

    /// A shape attribute belongs to another block family.
    #[error("block {block} ignores shape attribute '{attr}'")]
    ForeignShape { block: BlockId, attr: String },
}
