//! Instants at second resolution
//!
//! The engine models time as naive wall-clock instants. Instants cross the
//! SQL boundary as `%Y-%m-%d %H:%M:%S` text so that SQLite's lexicographic
//! comparison agrees with chronological order.

use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use once_cell::sync::Lazy;

use crate::error::TemporalError;

/// A point on the time line at second resolution.
pub type Instant = NaiveDateTime;

/// Canonical textual form of an [`Instant`].
pub const INSTANT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepted on input alongside [`INSTANT_FORMAT`]; midnight is implied.
const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";

static END_OF_TIME: Lazy<Instant> = Lazy::new(|| {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .expect("sentinel literal is a valid instant")
});

/// The open upper bound sentinel, `9999-12-31 23:59:59`.
///
/// Persisted rows carry this value as `txn_close` (and as `valid_close`
/// for open-ended facts). Importers using a shorter sentinel must
/// canonicalize to this value before insert.
pub fn end_of_time() -> Instant {
    *END_OF_TIME
}

/// The present instant, truncated to second resolution.
pub fn now() -> Instant {
    Utc::now()
        .naive_utc()
        .with_nanosecond(0)
        .expect("zero nanoseconds is always in range")
}

/// Formats an instant in the canonical textual form.
pub fn format_instant(instant: &Instant) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

/// Parses `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD` (midnight implied).
pub fn parse_instant(text: &str) -> Result<Instant, TemporalError> {
    if let Ok(instant) = NaiveDateTime::parse_from_str(text, INSTANT_FORMAT) {
        return Ok(instant);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_ONLY_FORMAT) {
        if let Some(instant) = date.and_hms_opt(0, 0, 0) {
            return Ok(instant);
        }
    }
    Err(TemporalError::UnparseableInstant(text.to_string()))
}
