//! Caller-selected temporal viewpoint for read operations

use serde::{Deserialize, Serialize};

use crate::instant::{now, Instant};

/// The `(valid, system)` viewpoint a read is evaluated at.
///
/// Either axis may be unset, in which case the query rewriter omits that
/// axis's predicate. A context with neither axis set reads the full
/// transaction history (audit mode). The context is an explicit value
/// passed through every engine call; there is no ambient state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalContext {
    /// The valid-time moment, or `None` for no valid-time restriction.
    pub valid_moment: Option<Instant>,
    /// The system-time moment, or `None` for no system-time restriction.
    pub system_moment: Option<Instant>,
}

impl TemporalContext {
    /// No restriction on either axis: the full audit history.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Snapshot at a `(valid, system)` point.
    pub fn at(valid_moment: Instant, system_moment: Instant) -> Self {
        Self {
            valid_moment: Some(valid_moment),
            system_moment: Some(system_moment),
        }
    }

    /// Restricts only the valid axis.
    pub fn valid_at(moment: Instant) -> Self {
        Self {
            valid_moment: Some(moment),
            system_moment: None,
        }
    }

    /// Restricts only the system axis.
    pub fn system_at(moment: Instant) -> Self {
        Self {
            valid_moment: None,
            system_moment: Some(moment),
        }
    }

    pub fn with_valid_moment(mut self, moment: Instant) -> Self {
        self.valid_moment = Some(moment);
        self
    }

    pub fn with_system_moment(mut self, moment: Instant) -> Self {
        self.system_moment = Some(moment);
        self
    }

    /// Populates any unset axis with the present instant.
    pub fn initialize(mut self) -> Self {
        let present = now();
        self.valid_moment.get_or_insert(present);
        self.system_moment.get_or_insert(present);
        self
    }

    /// True when neither axis restricts the read.
    pub fn is_unrestricted(&self) -> bool {
        self.valid_moment.is_none() && self.system_moment.is_none()
    }
}
