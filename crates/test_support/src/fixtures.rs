//! Shared fixtures
//!
//! The salary history mirrors employee 10009 of the classic employees
//! sample dataset: eighteen adjacent yearly spans imported in one batch.
//! The importer's short sentinel is canonicalized to END_OF_TIME before
//! insert.

use temporal_kernel::{end_of_time, format_instant, parse_instant, Instant, Period};

/// Business key used throughout the window-update scenarios.
pub const EMP_NO: i64 = 10009;

/// Transaction stamp of the seeded import batch.
pub const IMPORT_MOMENT: &str = "2023-01-01 00:00:00";

/// DDL for the registered tables, with the recommended indexes.
pub const SCHEMA_SQL: &str = "\
CREATE TABLE salaries (
    emp_no      INTEGER NOT NULL,
    salary      INTEGER NOT NULL,
    valid_open  TEXT NOT NULL,
    valid_close TEXT NOT NULL,
    txn_open    TEXT NOT NULL,
    txn_close   TEXT NOT NULL
);
CREATE INDEX idx_salaries_txn ON salaries (emp_no, txn_close, valid_open);
CREATE INDEX idx_salaries_valid ON salaries (emp_no, valid_open, valid_close);

CREATE TABLE employees (
    emp_no      INTEGER NOT NULL,
    birth_date  TEXT NOT NULL,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    gender      TEXT NOT NULL,
    hire_date   TEXT NOT NULL,
    valid_open  TEXT NOT NULL,
    valid_close TEXT NOT NULL,
    txn_open    TEXT NOT NULL,
    txn_close   TEXT NOT NULL
);
CREATE INDEX idx_employees_txn ON employees (emp_no, txn_close, valid_open);
CREATE INDEX idx_employees_valid ON employees (emp_no, valid_open, valid_close);
";

/// The seeded salary spans as `(salary, valid_open, valid_close)`.
/// Open bounds are date-only; the final span is open-ended.
pub fn salary_baseline() -> Vec<(i64, &'static str, &'static str)> {
    vec![
        (60929, "1985-02-18", "1986-02-18"),
        (64604, "1986-02-18", "1987-02-18"),
        (64780, "1987-02-18", "1988-02-18"),
        (66302, "1988-02-18", "1989-02-17"),
        (69042, "1989-02-17", "1990-02-17"),
        (70889, "1990-02-17", "1991-02-17"),
        (71434, "1991-02-17", "1992-02-17"),
        (74612, "1992-02-17", "1993-02-16"),
        (76518, "1993-02-16", "1994-02-16"),
        (78335, "1994-02-16", "1995-02-16"),
        (80944, "1995-02-16", "1996-02-16"),
        (82507, "1996-02-16", "1997-02-15"),
        (85875, "1997-02-15", "1998-02-15"),
        (89324, "1998-02-15", "1999-02-15"),
        (90668, "1999-02-15", "2000-02-15"),
        (93507, "2000-02-15", "2001-02-14"),
        (94443, "2001-02-14", "2002-02-14"),
        (94409, "2002-02-14", "9999-12-31 23:59:59"),
    ]
}

/// The baseline as validated periods, in valid order.
pub fn baseline_periods() -> Vec<(i64, Period)> {
    salary_baseline()
        .into_iter()
        .map(|(salary, open, close)| (salary, period(open, close)))
        .collect()
}

/// INSERT statements seeding the baseline salary history.
pub fn salary_seed_sql() -> String {
    let stamp = IMPORT_MOMENT;
    let close_of_time = format_instant(&end_of_time());
    salary_baseline()
        .into_iter()
        .map(|(salary, open, close)| {
            format!(
                "INSERT INTO salaries \
                 (emp_no, salary, valid_open, valid_close, txn_open, txn_close) VALUES \
                 ({EMP_NO}, {salary}, '{}', '{}', '{stamp}', '{close_of_time}');",
                format_instant(&instant(open)),
                format_instant(&instant(close)),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses a fixture timestamp, date-only accepted.
pub fn instant(text: &str) -> Instant {
    parse_instant(text).expect("fixture instants are well-formed")
}

/// Builds a fixture period from two timestamps.
pub fn period(open: &str, close: &str) -> Period {
    Period::new(instant(open), instant(close)).expect("fixture periods are non-empty")
}
