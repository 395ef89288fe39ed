//! Infrastructure Store
//!
//! SQLite-backed execution layer for the bitemporal engine. The engine
//! produces SQL text with named parameters; this crate owns the
//! connection pool, runs snapshot reads, applies write plans atomically,
//! and hosts the thin domain repositories that decode result rows.

pub mod error;
pub mod pool;
pub mod repositories;
pub mod row;
pub mod store;

pub use error::StoreError;
pub use pool::{connect, StoreConfig};
pub use row::{RecordSpan, TableBinding};
pub use store::{TemporalStore, WriteOutcome};
