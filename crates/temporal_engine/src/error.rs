//! Engine error types
//!
//! CONFIG and INVARIANT errors are programmer errors: they fail fast and
//! are never retried. Backend and consistency failures belong to the
//! store layer, which wraps this type.

use temporal_kernel::TemporalError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Misconfiguration: reserved-name collision, unregistered table or
    /// column, invalid sentinel, conflicting registration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A request that violates an engine invariant, e.g. a degenerate
    /// write window.
    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error(transparent)]
    Temporal(#[from] TemporalError),
}

impl EngineError {
    pub fn config(message: impl Into<String>) -> Self {
        EngineError::Config(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        EngineError::Invariant(message.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, EngineError::Config(_))
    }

    pub fn is_invariant(&self) -> bool {
        matches!(self, EngineError::Invariant(_))
    }
}
