//! Solver error taxonomy.
//!
//! Every variant carries the context a caller needs to log the failed
//! attempt (the challenge text, or the reason the model output was
//! rejected). The solver never retries internally; retry policy belongs
//! to the orchestrating layer.

use crate::llm::LlmError;

/// Terminal failures of a single solve attempt
#[derive(Debug, Clone, thiserror::Error)]
pub enum SolveError {
    /// Fewer than two numeric values recovered after extraction
    #[error("recovered {found} number(s), need at least 2: {challenge:?}")]
    InsufficientNumbers { challenge: String, found: usize },

    /// Model-assisted extraction returned a structurally invalid payload
    #[error("model extraction rejected: {reason}")]
    InvalidModelOutput { reason: String },

    /// Divide operation with a zero second operand
    #[error("division by zero: {challenge:?}")]
    DivisionByZero { challenge: String },

    /// Transport-level failure of the model backend
    #[error(transparent)]
    Llm(#[from] LlmError),
}
