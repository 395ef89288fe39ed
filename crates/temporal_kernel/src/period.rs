//! Half-open periods and the window algebra
//!
//! A [`Period`] is the interval `[open, close)`. Both temporal dimensions
//! of a stored row (valid time, transaction time) are periods, and the
//! write planner's splitting rules are expressed through the five-case
//! classification in [`WindowFit`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TemporalError;
use crate::instant::{end_of_time, format_instant, Instant};

/// A half-open interval `[open, close)` of instants with `open < close`.
///
/// A period whose close equals [`end_of_time`](crate::instant::end_of_time)
/// is still open. Zero-duration periods cannot be constructed; stored rows
/// must never contain them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub open: Instant,
    pub close: Instant,
}

/// Position of an existing row's valid period against a write window.
///
/// Each case determines which fragments of the row survive the write:
///
/// | Case | Fragments re-emitted |
/// |---|---|
/// | `Disjoint` | the row is untouched |
/// | `Within` | none, the window fully replaces it |
/// | `LeftOverhang` | `[row.open, window.open)` |
/// | `RightOverhang` | `[window.close, row.close)` |
/// | `Enclosing` | both of the above |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFit {
    Disjoint,
    Within,
    LeftOverhang,
    RightOverhang,
    Enclosing,
}

impl Period {
    /// Creates a period, rejecting empty and inverted intervals.
    pub fn new(open: Instant, close: Instant) -> Result<Self, TemporalError> {
        if open >= close {
            return Err(TemporalError::InvalidPeriod {
                open: format_instant(&open),
                close: format_instant(&close),
            });
        }
        Ok(Self { open, close })
    }

    /// Creates a period closed by the END_OF_TIME sentinel.
    pub fn open_ended(open: Instant) -> Self {
        Self {
            open,
            close: end_of_time(),
        }
    }

    /// True when the period is closed by the END_OF_TIME sentinel.
    pub fn is_open_ended(&self) -> bool {
        self.close == end_of_time()
    }

    /// True when `open <= instant < close`.
    pub fn contains_instant(&self, instant: Instant) -> bool {
        self.open <= instant && instant < self.close
    }

    /// True when the two periods share at least one instant.
    pub fn overlaps(&self, other: &Period) -> bool {
        self.open < other.close && other.open < self.close
    }

    /// True when `other` lies entirely within this period.
    pub fn contains(&self, other: &Period) -> bool {
        self.open <= other.open && other.close <= self.close
    }

    /// True when this period ends exactly where `other` begins.
    pub fn meets(&self, other: &Period) -> bool {
        self.close == other.open
    }

    /// The shared sub-interval, or `None` when the periods are disjoint.
    pub fn intersect(&self, other: &Period) -> Option<Period> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Period {
            open: self.open.max(other.open),
            close: self.close.min(other.close),
        })
    }

    /// Classifies this period (an existing row) against a write window.
    pub fn fit(&self, window: &Period) -> WindowFit {
        if !self.overlaps(window) {
            WindowFit::Disjoint
        } else if window.open <= self.open && self.close <= window.close {
            WindowFit::Within
        } else if self.open < window.open && window.close < self.close {
            WindowFit::Enclosing
        } else if self.open < window.open {
            WindowFit::LeftOverhang
        } else {
            WindowFit::RightOverhang
        }
    }

    /// The fragments of this period that fall outside an overlapping
    /// window, as `(left, right)`.
    ///
    /// Fragments that would collapse to zero duration (a window boundary
    /// coinciding with a row boundary) are suppressed. Disjoint periods
    /// yield no fragments; the row is kept whole instead.
    pub fn overhangs(&self, window: &Period) -> (Option<Period>, Option<Period>) {
        if !self.overlaps(window) {
            return (None, None);
        }
        let left = (self.open < window.open).then_some(Period {
            open: self.open,
            close: window.open,
        });
        let right = (window.close < self.close).then_some(Period {
            open: window.close,
            close: self.close,
        });
        (left, right)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            format_instant(&self.open),
            format_instant(&self.close)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instant::parse_instant;

    fn period(open: &str, close: &str) -> Period {
        Period::new(parse_instant(open).unwrap(), parse_instant(close).unwrap()).unwrap()
    }

    #[test]
    fn zero_duration_is_rejected() {
        let at = parse_instant("2024-01-01").unwrap();
        assert!(Period::new(at, at).is_err());
    }

    #[test]
    fn inverted_is_rejected() {
        let open = parse_instant("2024-06-01").unwrap();
        let close = parse_instant("2024-01-01").unwrap();
        assert!(Period::new(open, close).is_err());
    }

    #[test]
    fn adjacent_periods_meet_but_do_not_overlap() {
        let first = period("1985-02-18", "1986-02-18");
        let second = period("1986-02-18", "1987-02-18");
        assert!(first.meets(&second));
        assert!(!first.overlaps(&second));
        assert_eq!(first.intersect(&second), None);
    }

    #[test]
    fn intersect_clamps_to_both() {
        let a = period("1990-01-01", "1995-01-01");
        let b = period("1993-01-01", "1999-01-01");
        assert_eq!(a.intersect(&b), Some(period("1993-01-01", "1995-01-01")));
    }

    #[test]
    fn fit_covers_all_five_cases() {
        let window = period("1995-01-01", "2000-01-01");
        assert_eq!(
            period("1985-01-01", "1990-01-01").fit(&window),
            WindowFit::Disjoint
        );
        assert_eq!(
            period("1996-01-01", "1998-01-01").fit(&window),
            WindowFit::Within
        );
        assert_eq!(
            period("1994-01-01", "1996-01-01").fit(&window),
            WindowFit::LeftOverhang
        );
        assert_eq!(
            period("1999-01-01", "2001-01-01").fit(&window),
            WindowFit::RightOverhang
        );
        assert_eq!(
            period("1990-01-01", "2005-01-01").fit(&window),
            WindowFit::Enclosing
        );
    }

    #[test]
    fn window_matching_row_exactly_is_within() {
        let window = period("1995-01-01", "2000-01-01");
        assert_eq!(window.fit(&window), WindowFit::Within);
    }

    #[test]
    fn enclosing_row_emits_both_overhangs() {
        let row = period("1990-01-01", "2005-01-01");
        let window = period("1995-01-01", "2000-01-01");
        let (left, right) = row.overhangs(&window);
        assert_eq!(left, Some(period("1990-01-01", "1995-01-01")));
        assert_eq!(right, Some(period("2000-01-01", "2005-01-01")));
    }

    #[test]
    fn boundary_coincidence_suppresses_the_empty_fragment() {
        // Row starts exactly at the window boundary: no left overhang.
        let row = period("1995-01-01", "2001-01-01");
        let window = period("1995-01-01", "2000-01-01");
        let (left, right) = row.overhangs(&window);
        assert_eq!(left, None);
        assert_eq!(right, Some(period("2000-01-01", "2001-01-01")));
    }

    #[test]
    fn disjoint_rows_yield_no_fragments() {
        let row = period("1980-01-01", "1985-01-01");
        let window = period("1995-01-01", "2000-01-01");
        assert_eq!(row.overhangs(&window), (None, None));
    }

    #[test]
    fn open_ended_period_reaches_the_sentinel() {
        let open = parse_instant("2023-06-15").unwrap();
        let p = Period::open_ended(open);
        assert!(p.is_open_ended());
        assert!(p.contains_instant(parse_instant("2400-01-01").unwrap()));
    }
}
