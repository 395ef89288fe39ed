//! Decoding temporal columns from result rows

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use temporal_engine::TableDescriptor;
use temporal_kernel::{parse_instant, Instant, Period};

use crate::error::StoreError;

/// The two periods carried by every bitemporal row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordSpan {
    /// Real-world validity window.
    pub valid: Period,
    /// Window during which the system asserted this row.
    pub txn: Period,
}

impl RecordSpan {
    /// Reads the four temporal columns from a result row.
    pub fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        let valid = Period::new(
            instant_column(row, "valid_open")?,
            instant_column(row, "valid_close")?,
        )
        .map_err(|e| StoreError::decode(e.to_string()))?;
        let txn = Period::new(
            instant_column(row, "txn_open")?,
            instant_column(row, "txn_close")?,
        )
        .map_err(|e| StoreError::decode(e.to_string()))?;
        Ok(Self { valid, txn })
    }

    /// True while the row is part of the current transaction snapshot.
    pub fn is_open(&self) -> bool {
        self.txn.is_open_ended()
    }
}

/// Reads one temporal TEXT column as an instant.
pub fn instant_column(row: &SqliteRow, column: &str) -> Result<Instant, StoreError> {
    let text: String = row
        .try_get(column)
        .map_err(|e| StoreError::backend(format!("reading column {column}"), e))?;
    parse_instant(&text)
        .map_err(|e| StoreError::decode(format!("column {column}: {e}")))
}

/// The capability set a domain record supplies to the engine: which table
/// it lives in and how to decode a result row. Repositories stay thin
/// wrappers; the engine never learns column types.
pub trait TableBinding: Sized {
    /// The table descriptor to register with the engine.
    fn table() -> TableDescriptor;

    /// Decodes a result row carrying the business columns plus the four
    /// temporal columns.
    fn decode(row: &SqliteRow) -> Result<Self, StoreError>;
}
