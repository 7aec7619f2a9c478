//! Shared types for the Zia Junior block compiler.
//!
//! This crate defines the block graph (nodes, slots, variables), the closed
//! block catalogue, the variable-arity clause layouts, and the structural
//! error type used by every later stage.

mod error;
pub mod block;
pub mod catalog;
pub mod clause;
pub mod graph;

pub use block::{BlockId, BlockKind, BlockNode, Input, InputKind, Parent, Position, ValueType};
pub use catalog::{BlockDef, Connection};
pub use clause::{ClauseFamily, ClauseInputs, ClauseKind, Mutation};
pub use error::{GraphError, GraphResult};
pub use graph::{BlockGraph, Variable, VariableId};
