//! Engine configuration

use serde::{Deserialize, Serialize};
use temporal_kernel::{end_of_time, Instant};

/// How the update planner treats values already stored inside the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteMode {
    /// The new fact fully replaces stored values within the window.
    #[default]
    Erasing,
    /// Existing values are split at the window boundaries and re-emitted
    /// unchanged; no new fact is inserted. The fragments are left for a
    /// separate business operation to mutate.
    Preserving,
}

/// Tunable behavior of an [`Engine`](crate::Engine).
///
/// Built through [`Engine::builder`](crate::Engine::builder); immutable
/// once the engine is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Emit every rewritten query and its bound parameters to the
    /// diagnostic stream.
    pub dump_queries: bool,
    /// Default write mode for planned updates.
    pub write_mode: WriteMode,
    /// The sentinel instant closing open periods. Must be greater than
    /// any real valid-time value the application uses.
    pub end_of_time: Instant,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dump_queries: false,
            write_mode: WriteMode::default(),
            end_of_time: end_of_time(),
        }
    }
}
