//! Store error types
//!
//! Engine errors (CONFIG, INVARIANT) pass through untouched. Backend
//! errors carry the operation that failed; transient classification and
//! retry are the caller's concern. Consistency violations identify the
//! offending business key and window and always follow a rollback.

use temporal_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// An error surfaced by SQLite, annotated with the operation.
    #[error("backend error during {context}: {source}")]
    Backend {
        context: String,
        #[source]
        source: sqlx::Error,
    },

    /// A result row could not be decoded into its record type.
    #[error("row decode failed: {0}")]
    Decode(String),

    /// The snapshot-uniqueness post-condition failed after a write; the
    /// transaction was rolled back.
    #[error(
        "consistency violation in {table} for {key} over {window}: \
         {conflicts} overlapping open row pair(s)"
    )]
    Consistency {
        table: String,
        key: String,
        window: String,
        conflicts: i64,
    },
}

impl StoreError {
    pub fn backend(context: impl Into<String>, source: sqlx::Error) -> Self {
        StoreError::Backend {
            context: context.into(),
            source,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        StoreError::Decode(message.into())
    }

    pub fn is_consistency(&self) -> bool {
        matches!(self, StoreError::Consistency { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, StoreError::Engine(e) if e.is_config())
    }

    pub fn is_invariant(&self) -> bool {
        matches!(self, StoreError::Engine(e) if e.is_invariant())
    }
}
