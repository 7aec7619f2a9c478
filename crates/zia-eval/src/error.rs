//! Runtime fault types for the direct interpreter.
//!
//! Faults never abort a run: the machine turns each one into a log entry
//! and moves on to the next line. Messages are user-facing, hence French.

use thiserror::Error;

/// A single line that could not be executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// No recognizer matched the line.
    #[error("instruction non reconnue: {0}")]
    Unrecognized(String),

    /// A statement expected an expression and found nothing.
    #[error("expression manquante dans: {0}")]
    EmptyExpression(String),
}

/// Result alias for interpreter operations.
pub type EvalResult<T> = Result<T, EvalError>;
