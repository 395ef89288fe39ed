//! WRITE path: planning a valid-time window update
//!
//! A write asserts a new fact over the half-open window
//! `[valid_from, valid_to)` for one business key. The planner turns that
//! into a statement sequence the store runs inside a single transaction:
//!
//! 1. read the pre-image of affected rows (observability),
//! 2. close the transaction period of every open row overlapping the
//!    window,
//! 3. re-insert the valid-time fragments of those rows that fall outside
//!    the window, carrying their original business values,
//! 4. insert the new fact (skipped in preserving mode),
//! 5. verify the snapshot-uniqueness post-condition.
//!
//! All statements bind the same `@txn_moment`; superseded rows are never
//! mutated beyond their `txn_close`.

use std::collections::BTreeMap;

use temporal_kernel::{now, Instant, Period};

use crate::config::WriteMode;
use crate::error::EngineError;
use crate::fragment::{QueryFragment, Value};
use crate::registry::{quote_identifier, Engine, TableDescriptor};

/// A request to rewrite the history of one business key over a window.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    /// Registered table whose history is being rewritten.
    pub table: String,
    /// Business-key columns and values identifying the affected rows.
    pub filters: Vec<(String, Value)>,
    /// The new fact's content.
    pub values: Vec<(String, Value)>,
    /// Start of the asserted window (inclusive).
    pub valid_from: Instant,
    /// End of the asserted window (exclusive).
    pub valid_to: Instant,
    /// System instant stamped on the write; defaults to the present.
    pub txn_moment: Option<Instant>,
}

impl UpdateRequest {
    pub fn new(table: impl Into<String>, valid_from: Instant, valid_to: Instant) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            values: Vec::new(),
            valid_from,
            valid_to,
            txn_moment: None,
        }
    }

    /// Adds a business-key filter column.
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    /// Adds a business column of the new fact.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }

    /// Stamps the write with an explicit system instant.
    pub fn stamped(mut self, txn_moment: Instant) -> Self {
        self.txn_moment = Some(txn_moment);
        self
    }
}

/// The statement sequence produced for one [`UpdateRequest`], to be run
/// atomically in a single backend transaction.
#[derive(Debug, Clone)]
pub struct WritePlan {
    pub table: String,
    pub window: Period,
    pub txn_moment: Instant,
    pub mode: WriteMode,
    /// Current-snapshot rows overlapping the window, for diagnostics.
    pub pre_image: QueryFragment,
    /// Closes the transaction period of affected rows.
    pub supersede: QueryFragment,
    /// Re-inserts preserved valid-time fragments of superseded rows.
    pub reemit: QueryFragment,
    /// Inserts the new fact; absent in preserving mode.
    pub insert: Option<QueryFragment>,
    /// Post-condition: counts open rows for this key that overlap in
    /// valid time (duplicated open instants included). Anything above
    /// zero means the write must roll back.
    pub guard: QueryFragment,
    /// Human-readable business key, used in consistency reports.
    pub key: String,
}

impl Engine {
    /// Plans the statement sequence for a window update.
    pub fn plan_update(&self, request: &UpdateRequest) -> Result<WritePlan, EngineError> {
        let descriptor = self.descriptor(&request.table).ok_or_else(|| {
            EngineError::config(format!("table {:?} is not registered", request.table))
        })?;

        if request.valid_from >= request.valid_to {
            return Err(EngineError::invariant(format!(
                "degenerate window: valid_from {} is not before valid_to {}",
                temporal_kernel::format_instant(&request.valid_from),
                temporal_kernel::format_instant(&request.valid_to),
            )));
        }
        let window = Period::new(request.valid_from, request.valid_to)?;

        let end_of_time = self.config().end_of_time;
        if request.valid_to > end_of_time {
            return Err(EngineError::invariant(format!(
                "window {window} reaches past end of time"
            )));
        }
        let txn_moment = request.txn_moment.unwrap_or_else(now);
        if txn_moment >= end_of_time {
            return Err(EngineError::invariant(format!(
                "txn_moment {} is not before end of time",
                temporal_kernel::format_instant(&txn_moment)
            )));
        }

        validate_columns(descriptor, request, self.config().write_mode)?;

        let table = quote_identifier(&request.table);
        let column_list = descriptor
            .business_columns()
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let filter_clause = filter_clause(&request.filters, None);

        let mut filter_params: BTreeMap<String, Value> = BTreeMap::new();
        for (column, value) in &request.filters {
            filter_params.insert(column.clone(), value.clone());
        }

        let temporal = |with_txn: bool| {
            let mut params = filter_params.clone();
            params.insert("valid_from".into(), Value::Instant(request.valid_from));
            params.insert("valid_to".into(), Value::Instant(request.valid_to));
            params.insert("infinity".into(), Value::Instant(end_of_time));
            if with_txn {
                params.insert("txn_moment".into(), Value::Instant(txn_moment));
            }
            params
        };

        let pre_image = QueryFragment {
            sql: format!(
                "SELECT {column_list}, valid_open, valid_close, txn_open, txn_close \
                 FROM {table} \
                 WHERE {filter_clause} AND txn_close = @infinity \
                 AND valid_open < @valid_to AND @valid_from < valid_close \
                 ORDER BY valid_open"
            ),
            params: temporal(false),
        };

        let supersede = QueryFragment {
            sql: format!(
                "UPDATE {table} SET txn_close = @txn_moment \
                 WHERE {filter_clause} AND txn_close = @infinity \
                 AND valid_open < @valid_to AND @valid_from < valid_close"
            ),
            params: temporal(true),
        };

        let left_overhang = format!(
            "SELECT {column_list}, valid_open, @valid_from, @txn_moment, @infinity \
             FROM {table} \
             WHERE {filter_clause} AND txn_close = @txn_moment \
             AND valid_open < @valid_from AND @valid_from < valid_close"
        );
        let right_overhang = format!(
            "SELECT {column_list}, @valid_to, valid_close, @txn_moment, @infinity \
             FROM {table} \
             WHERE {filter_clause} AND txn_close = @txn_moment \
             AND valid_open < @valid_to AND @valid_to < valid_close"
        );
        // In preserving mode the window-clamped remainder of every
        // superseded row is re-emitted as well, so each row splits into
        // at most three contiguous fragments.
        let clamped_middle = format!(
            "SELECT {column_list}, \
             CASE WHEN valid_open < @valid_from THEN @valid_from ELSE valid_open END, \
             CASE WHEN @valid_to < valid_close THEN @valid_to ELSE valid_close END, \
             @txn_moment, @infinity \
             FROM {table} \
             WHERE {filter_clause} AND txn_close = @txn_moment \
             AND valid_open < @valid_to AND @valid_from < valid_close"
        );

        let mode = self.config().write_mode;
        let branches = match mode {
            WriteMode::Erasing => vec![left_overhang, right_overhang],
            WriteMode::Preserving => vec![left_overhang, clamped_middle, right_overhang],
        };
        let reemit = QueryFragment {
            sql: format!(
                "INSERT INTO {table} ({column_list}, valid_open, valid_close, txn_open, txn_close) \
                 {}",
                branches.join(" UNION ALL ")
            ),
            params: temporal(true),
        };

        let insert = match mode {
            WriteMode::Preserving => None,
            WriteMode::Erasing => {
                let placeholders = descriptor
                    .business_columns()
                    .iter()
                    .map(|c| format!("@{c}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut params = temporal(true);
                for (column, value) in &request.values {
                    params.insert(column.clone(), value.clone());
                }
                Some(QueryFragment {
                    sql: format!(
                        "INSERT INTO {table} \
                         ({column_list}, valid_open, valid_close, txn_open, txn_close) \
                         VALUES ({placeholders}, @valid_from, @valid_to, @txn_moment, @infinity)"
                    ),
                    params,
                })
            }
        };

        // Pairs are deduplicated by a strict valid_open ordering; two
        // open rows sharing a valid_open always overlap, so those are
        // caught separately as duplicate groups. Plain ANSI SQL: the
        // fragment must run on any backend the store targets.
        let mut guard_params = filter_params;
        guard_params.insert("infinity".into(), Value::Instant(end_of_time));
        let guard = QueryFragment {
            sql: format!(
                "SELECT \
                 (SELECT COUNT(*) FROM {table} a JOIN {table} b \
                 ON a.valid_open < b.valid_open AND b.valid_open < a.valid_close \
                 WHERE {} AND {} \
                 AND a.txn_close = @infinity AND b.txn_close = @infinity) \
                 + \
                 (SELECT COUNT(*) FROM \
                 (SELECT valid_open FROM {table} \
                 WHERE {filter_clause} AND txn_close = @infinity \
                 GROUP BY valid_open HAVING COUNT(*) > 1) dup)",
                filter_clause_prefixed(&request.filters, "a"),
                filter_clause_prefixed(&request.filters, "b"),
            ),
            params: guard_params,
        };

        let key = request
            .filters
            .iter()
            .map(|(column, value)| format!("{column}={value}"))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(WritePlan {
            table: request.table.clone(),
            window,
            txn_moment,
            mode,
            pre_image,
            supersede,
            reemit,
            insert,
            guard,
            key,
        })
    }
}

fn filter_clause(filters: &[(String, Value)], prefix: Option<&str>) -> String {
    filters
        .iter()
        .map(|(column, _)| match prefix {
            Some(p) => format!("{p}.{} = @{column}", quote_identifier(column)),
            None => format!("{} = @{column}", quote_identifier(column)),
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn filter_clause_prefixed(filters: &[(String, Value)], prefix: &str) -> String {
    filter_clause(filters, Some(prefix))
}

fn validate_columns(
    descriptor: &TableDescriptor,
    request: &UpdateRequest,
    mode: WriteMode,
) -> Result<(), EngineError> {
    if request.filters.is_empty() {
        return Err(EngineError::config(
            "a write requires at least one filter column",
        ));
    }

    let mut seen: Vec<&str> = Vec::new();
    for (column, _) in request.filters.iter().chain(request.values.iter()) {
        if !descriptor
            .business_columns()
            .iter()
            .any(|c| c == column)
        {
            return Err(EngineError::config(format!(
                "column {column:?} is not registered for table {:?}",
                descriptor.name()
            )));
        }
        if seen.contains(&column.as_str()) {
            return Err(EngineError::config(format!(
                "column {column:?} appears more than once in the request"
            )));
        }
        seen.push(column);
    }

    if mode == WriteMode::Erasing {
        for column in descriptor.business_columns() {
            if !seen.contains(&column.as_str()) {
                return Err(EngineError::config(format!(
                    "the new fact must supply business column {column:?}"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TableDescriptor;
    use temporal_kernel::parse_instant;

    fn engine() -> Engine {
        Engine::builder()
            .register(TableDescriptor::new("salaries", ["emp_no", "salary"]))
            .build()
            .unwrap()
    }

    fn request() -> UpdateRequest {
        UpdateRequest::new(
            "salaries",
            parse_instant("1995-01-01").unwrap(),
            parse_instant("2000-01-01").unwrap(),
        )
        .filter("emp_no", 10009i64)
        .set("salary", 69i64)
        .stamped(parse_instant("2024-03-01 12:00:00").unwrap())
    }

    #[test]
    fn unregistered_table_is_a_config_error() {
        let err = engine()
            .plan_update(&UpdateRequest::new(
                "titles",
                parse_instant("1995-01-01").unwrap(),
                parse_instant("2000-01-01").unwrap(),
            ))
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn degenerate_window_is_an_invariant_error() {
        let mut req = request();
        req.valid_to = req.valid_from;
        assert!(engine().plan_update(&req).unwrap_err().is_invariant());

        req.valid_to = parse_instant("1990-01-01").unwrap();
        assert!(engine().plan_update(&req).unwrap_err().is_invariant());
    }

    #[test]
    fn txn_moment_at_the_sentinel_is_an_invariant_error() {
        let req = request().stamped(temporal_kernel::end_of_time());
        assert!(engine().plan_update(&req).unwrap_err().is_invariant());
    }

    #[test]
    fn window_past_the_sentinel_is_an_invariant_error() {
        let mut req = request();
        req.valid_to = temporal_kernel::end_of_time() + chrono::Duration::seconds(1);
        assert!(engine().plan_update(&req).unwrap_err().is_invariant());
    }

    #[test]
    fn unknown_column_is_a_config_error() {
        let req = request().set("bonus", 1i64);
        assert!(engine().plan_update(&req).unwrap_err().is_config());
    }

    #[test]
    fn missing_business_column_is_a_config_error_when_erasing() {
        let req = UpdateRequest::new(
            "salaries",
            parse_instant("1995-01-01").unwrap(),
            parse_instant("2000-01-01").unwrap(),
        )
        .filter("emp_no", 10009i64);
        assert!(engine().plan_update(&req).unwrap_err().is_config());
    }

    #[test]
    fn missing_filter_is_a_config_error() {
        let req = UpdateRequest::new(
            "salaries",
            parse_instant("1995-01-01").unwrap(),
            parse_instant("2000-01-01").unwrap(),
        )
        .set("emp_no", 10009i64)
        .set("salary", 69i64);
        assert!(engine().plan_update(&req).unwrap_err().is_config());
    }

    #[test]
    fn every_statement_stamps_the_same_txn_moment() {
        let plan = engine().plan_update(&request()).unwrap();
        let stamp = Value::Instant(plan.txn_moment);
        for fragment in [
            &plan.supersede,
            &plan.reemit,
            plan.insert.as_ref().unwrap(),
        ] {
            assert_eq!(fragment.params.get("txn_moment"), Some(&stamp));
        }
    }

    #[test]
    fn txn_moment_defaults_to_the_present() {
        let mut req = request();
        req.txn_moment = None;
        let plan = engine().plan_update(&req).unwrap();
        assert!(plan.txn_moment <= temporal_kernel::now());
    }

    #[test]
    fn preserving_mode_skips_the_new_fact() {
        let engine = Engine::builder()
            .register(TableDescriptor::new("salaries", ["emp_no", "salary"]))
            .write_mode(WriteMode::Preserving)
            .build()
            .unwrap();
        let plan = engine
            .plan_update(&request())
            .unwrap();
        assert!(plan.insert.is_none());
        assert_eq!(plan.reemit.sql.matches("UNION ALL").count(), 2);
        assert!(plan.reemit.sql.contains("CASE WHEN"));
    }

    #[test]
    fn key_description_names_the_business_key() {
        let plan = engine().plan_update(&request()).unwrap();
        assert_eq!(plan.key, "emp_no=10009");
    }
}
