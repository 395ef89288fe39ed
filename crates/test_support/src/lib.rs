//! Test Support
//!
//! Shared infrastructure for the workspace test suites:
//!
//! - `fixtures`: schema DDL and the seeded salary history used by the
//!   window-update scenarios
//! - `assertions`: timeline and snapshot-uniqueness checks

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes a test-friendly tracing subscriber once per process.
/// Filtering follows `RUST_LOG`; output goes to the test writer.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
