//! Temporal Kernel - Foundational types for the bitemporal engine
//!
//! This crate provides the building blocks shared by every layer:
//! - Instants at second resolution and the END_OF_TIME sentinel
//! - Half-open periods with the overlap algebra used by the write planner
//! - The temporal context carried through read operations

pub mod context;
pub mod error;
pub mod instant;
pub mod period;

pub use context::TemporalContext;
pub use error::TemporalError;
pub use instant::{end_of_time, format_instant, now, parse_instant, Instant, INSTANT_FORMAT};
pub use period::{Period, WindowFit};
