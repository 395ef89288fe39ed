//! Errors raised by the period algebra

use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("invalid period: open {open} must be before close {close}")]
    InvalidPeriod { open: String, close: String },

    #[error("unparseable instant: {0:?}")]
    UnparseableInstant(String),
}
