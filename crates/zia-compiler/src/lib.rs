//! Zia Junior compiler: orchestrates the block-to-output pipeline.
//!
//! ```text
//! Project JSON → BlockGraph (+ Shape Mutator) → Code Generator → source text
//!                                                                  │
//!                                    ┌─────────────────────────────┤
//!                                    ▼                             ▼
//!                             Native engine               Direct interpreter
//!                           (opaque text result)             (OutputLog)
//! ```
//!
//! [`Workspace`] is the entry point. It owns the graph, caches the last
//! generation pass and dispatches runs to the backend chosen in
//! [`RunConfig`]. A workspace can start from a saved project or from one of
//! the built-in [`EXAMPLES`].

pub mod config;
pub mod engine;
pub mod error;
pub mod library;
pub mod persist;
pub mod workspace;

pub use config::{Backend, RunConfig};
pub use engine::{EngineFlags, EngineSlot, NativeEngine};
pub use error::{LoadWarning, ProjectError, ProjectResult};
pub use library::{example, Example, DEFAULT_EXAMPLE, EXAMPLES};
pub use persist::{load, load_str, save, BlockDocument, LoadedProject, ProjectDocument};
pub use workspace::{RunOutcome, Workspace, EMPTY_PROGRAM};
