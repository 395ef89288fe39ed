//! Timeline assertions
//!
//! Checks shared by the window-update and correction suites, with
//! messages naming the offending rows.

use temporal_kernel::Period;

/// Asserts the periods are ordered by open instant.
pub fn assert_ordered(periods: &[Period]) {
    for (index, pair) in periods.windows(2).enumerate() {
        assert!(
            pair[0].open <= pair[1].open,
            "rows out of order: row {} ({}) opens after row {} ({})",
            index,
            pair[0],
            index + 1,
            pair[1],
        );
    }
}

/// Asserts an ordered timeline has no gaps and no overlaps: each period
/// ends exactly where the next begins.
pub fn assert_contiguous(periods: &[Period]) {
    assert_ordered(periods);
    for (index, pair) in periods.windows(2).enumerate() {
        assert!(
            pair[0].meets(&pair[1]),
            "timeline broken between row {} ({}) and row {} ({})",
            index,
            pair[0],
            index + 1,
            pair[1],
        );
    }
}

/// Asserts snapshot uniqueness over `(valid, txn)` period pairs: no two
/// rows may be simultaneously visible at any `(V, S)` point.
pub fn assert_snapshot_unique(rows: &[(Period, Period)]) {
    for (i, (valid_a, txn_a)) in rows.iter().enumerate() {
        for (j, (valid_b, txn_b)) in rows.iter().enumerate().skip(i + 1) {
            assert!(
                !(valid_a.overlaps(valid_b) && txn_a.overlaps(txn_b)),
                "snapshot uniqueness violated: row {i} (valid {valid_a}, txn {txn_a}) \
                 and row {j} (valid {valid_b}, txn {txn_b}) are both visible somewhere",
            );
        }
    }
}
