//! Optional post-processing: collapsing contiguous same-value spans
//!
//! Operates on decoded result rows only; stored data is never mutated.

use temporal_kernel::Period;

/// A result row the collapse helper can merge: a valid period, a
/// transaction period, and a business-value identity.
pub trait ValueSpan: Sized {
    fn valid(&self) -> Period;
    fn txn(&self) -> Period;
    /// True when the business-value tuples of two rows are equal.
    fn same_value(&self, other: &Self) -> bool;
    /// A copy of this row carrying different periods.
    fn respan(&self, valid: Period, txn: Period) -> Self;
}

/// Merges runs of contiguous rows with equal business values into single
/// spans, preserving the earliest `txn_open` of each run.
///
/// Rows must be ordered by `valid_open`; a gap or a value change starts a
/// new span.
pub fn collapse<R: ValueSpan>(rows: Vec<R>) -> Vec<R> {
    let mut collapsed: Vec<R> = Vec::with_capacity(rows.len());
    for row in rows {
        match collapsed.last_mut() {
            Some(last) if last.same_value(&row) && last.valid().meets(&row.valid()) => {
                let valid = Period {
                    open: last.valid().open,
                    close: row.valid().close,
                };
                let txn = Period {
                    open: last.txn().open.min(row.txn().open),
                    close: last.txn().close,
                };
                *last = last.respan(valid, txn);
            }
            _ => collapsed.push(row),
        }
    }
    collapsed
}
