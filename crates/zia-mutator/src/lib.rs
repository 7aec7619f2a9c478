//! Zia Junior shape mutator.
//!
//! Keeps the optional clause slots of `controls_si`, `controls_selon` and
//! `text_join` blocks in step with their per-kind clause counts. Subtrees
//! already plugged into clauses survive every reshape: they are carried to
//! their new slot, or disconnected and reported as orphans when their slot
//! disappears. Nothing is ever deleted here.
//!
//! ```text
//! restore_shape ─┐
//!                ├─> counts ──> rebuild ──> slots + reconnected children
//! commit_editor ─┘
//! ```

pub mod descriptor;
pub mod editor;
pub mod mutator;

pub use descriptor::{ShapeDescriptor, MAX_CLAUSES};
pub use editor::{ClauseRef, Marker, MarkerChain};
pub use mutator::{commit_editor, open_editor, rebuild, restore_shape, serialize_shape, ReshapeReport};
