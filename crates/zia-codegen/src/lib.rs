//! Zia Junior code generator: renders a block graph as Zia source text.
//!
//! # Architecture
//!
//! A pass builds a [`NameTable`] for the whole graph, then walks every
//! top-level statement stack in workspace order. Value blocks render to a
//! `(text, Precedence)` pair so that the enclosing operator can decide
//! whether to parenthesize; statement blocks append lines at the current
//! nesting depth.
//!
//! Rendering never fails. Empty slots take a default literal, unknown field
//! values fall back to sensible names, and top-level value blocks are left
//! out and listed in [`GenerateResult::skipped`].
//!
//! ## Output
//!
//! ```text
//! var x = 2 + 3;
//! si (x > 4) {
//!     afficher "grand";
//! } sinon {
//!     afficher "petit";
//! }
//! ```

pub mod expr;
pub mod generator;
pub mod names;
pub mod precedence;
pub mod stmt;

pub use generator::{
    generate, generate_with, render_statement, render_value, source_hash, GenerateResult,
    GeneratorOptions, SourceProgram,
};
pub use names::{NameTable, RESERVED_WORDS};
pub use precedence::{BinaryOp, Precedence};
