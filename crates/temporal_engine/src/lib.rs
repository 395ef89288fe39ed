//! Bitemporal Engine
//!
//! The storage-agnostic core of the bitemporal store: an immutable table
//! registry, the READ-path query rewriter that restricts every registered
//! table to a snapshot at a caller-selected `(valid, system)` point, and
//! the WRITE-path update planner that rewrites a valid-time window by
//! superseding, splitting, and inserting rows.
//!
//! The engine produces SQL text plus named parameters; executing them
//! against a backend is the store layer's job.

pub mod collapse;
pub mod config;
pub mod error;
pub mod fragment;
pub mod planner;
pub mod registry;
pub mod rewriter;

pub use collapse::{collapse, ValueSpan};
pub use config::{EngineConfig, WriteMode};
pub use error::EngineError;
pub use fragment::{bind_positional, QueryFragment, Value, RESERVED_PARAMS};
pub use planner::{UpdateRequest, WritePlan};
pub use registry::{Engine, EngineBuilder, TableDescriptor};
