//! The planner's SQL contract: every statement binds cleanly through the
//! positional binder and carries the expected shape.

use temporal_engine::{
    bind_positional, Engine, QueryFragment, TableDescriptor, UpdateRequest, Value, WriteMode,
};
use temporal_kernel::{parse_instant, TemporalContext};

fn engine() -> Engine {
    Engine::builder()
        .register(TableDescriptor::new("salaries", ["emp_no", "salary"]))
        .register(TableDescriptor::new(
            "employees",
            ["emp_no", "first_name", "last_name"],
        ))
        .build()
        .unwrap()
}

fn salary_request() -> UpdateRequest {
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
fn every_plan_statement_binds_positionally() {
    let plan = engine().plan_update(&salary_request()).unwrap();
    let statements = [
        &plan.pre_image,
        &plan.supersede,
        &plan.reemit,
        plan.insert.as_ref().unwrap(),
        &plan.guard,
    ];
    for fragment in statements {
        let (sql, values) = bind_positional(fragment).unwrap();
        assert_eq!(
            sql.matches('?').count(),
            values.len(),
            "placeholder / value mismatch in: {sql}"
        );
        assert!(!sql.contains('@'), "unbound name left in: {sql}");
    }
}

#[test]
fn supersede_targets_only_open_overlapping_rows() {
    let plan = engine().plan_update(&salary_request()).unwrap();
    let sql = &plan.supersede.sql;
    assert!(sql.starts_with("UPDATE \"salaries\" SET txn_close = @txn_moment"));
    assert!(sql.contains("txn_close = @infinity"));
    assert!(sql.contains("valid_open < @valid_to AND @valid_from < valid_close"));
}

#[test]
fn reemit_copies_original_values_and_trims_at_the_boundaries() {
    let plan = engine().plan_update(&salary_request()).unwrap();
    let sql = &plan.reemit.sql;
    assert!(sql.starts_with(
        "INSERT INTO \"salaries\" (\"emp_no\", \"salary\", valid_open, valid_close, txn_open, txn_close)"
    ));
    // Left overhang keeps the stored open, closes at the window start.
    assert!(sql.contains("valid_open, @valid_from, @txn_moment, @infinity"));
    // Right overhang opens at the window end, keeps the stored close.
    assert!(sql.contains("@valid_to, valid_close, @txn_moment, @infinity"));
    // Fragments are taken from rows superseded by this very write.
    assert!(sql.contains("txn_close = @txn_moment"));
    assert_eq!(sql.matches("UNION ALL").count(), 1);
}

#[test]
fn overhang_predicates_suppress_zero_duration_fragments() {
    let plan = engine().plan_update(&salary_request()).unwrap();
    let sql = &plan.reemit.sql;
    assert!(sql.contains("valid_open < @valid_from AND @valid_from < valid_close"));
    assert!(sql.contains("valid_open < @valid_to AND @valid_to < valid_close"));
}

#[test]
fn insert_appends_the_new_fact_with_the_shared_stamp() {
    let plan = engine().plan_update(&salary_request()).unwrap();
    let insert = plan.insert.unwrap();
    assert_eq!(
        insert.sql,
        "INSERT INTO \"salaries\" (\"emp_no\", \"salary\", valid_open, valid_close, txn_open, txn_close) \
         VALUES (@emp_no, @salary, @valid_from, @valid_to, @txn_moment, @infinity)"
    );
    assert_eq!(insert.params.get("salary"), Some(&Value::Integer(69)));
}

#[test]
fn preserving_plan_binds_cleanly_without_an_insert() {
    let engine = Engine::builder()
        .register(TableDescriptor::new("salaries", ["emp_no", "salary"]))
        .write_mode(WriteMode::Preserving)
        .build()
        .unwrap();
    let plan = engine.plan_update(&salary_request()).unwrap();
    assert!(plan.insert.is_none());
    for fragment in [&plan.pre_image, &plan.supersede, &plan.reemit, &plan.guard] {
        let (sql, values) = bind_positional(fragment).unwrap();
        assert_eq!(sql.matches('?').count(), values.len());
    }
}

#[test]
fn guard_detects_overlapping_open_rows_with_portable_sql() {
    let plan = engine().plan_update(&salary_request()).unwrap();
    let sql = &plan.guard.sql;
    // Strictly ordered overlapping pairs, by columns the engine owns.
    assert!(sql.contains("a.valid_open < b.valid_open AND b.valid_open < a.valid_close"));
    assert!(sql.contains("a.\"emp_no\" = @emp_no AND b.\"emp_no\" = @emp_no"));
    // Rows sharing an open instant are caught as duplicate groups.
    assert!(sql.contains("GROUP BY valid_open HAVING COUNT(*) > 1"));
    // No backend-specific pseudo-columns in an engine-emitted fragment.
    assert!(!sql.contains("rowid"));
}

#[test]
fn rewritten_read_binds_cleanly_with_user_parameters() {
    let ctx = TemporalContext::at(
        parse_instant("1997-06-01").unwrap(),
        parse_instant("2024-03-01").unwrap(),
    );
    let fragment = QueryFragment::new(
        "SELECT emp_no, salary FROM salaries$ WHERE emp_no = @emp_no ORDER BY valid_open",
    )
    .with_param("emp_no", 10009i64);
    let rewritten = engine().snapshot_query(&ctx, fragment).unwrap();
    let (sql, values) = bind_positional(&rewritten).unwrap();
    // Two predicates per table CTE plus the user parameter.
    assert_eq!(sql.matches('?').count(), values.len());
    assert_eq!(values.len(), 2 * 2 * 2 + 1);
}
