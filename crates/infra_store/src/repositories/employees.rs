//! Employee repository

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use temporal_engine::{QueryFragment, TableDescriptor, UpdateRequest, Value};
use temporal_kernel::{Instant, Period, TemporalContext};

use crate::error::StoreError;
use crate::repositories::AuditTrail;
use crate::row::{RecordSpan, TableBinding};
use crate::store::{TemporalStore, WriteOutcome};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The business tuple of an employee version.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EmployeeFact {
    pub emp_no: i64,
    pub birth_date: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub hire_date: NaiveDate,
}

/// An employee version as stored: the fact plus its two periods.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Employee {
    pub fact: EmployeeFact,
    pub span: RecordSpan,
}

impl TableBinding for Employee {
    fn table() -> TableDescriptor {
        TableDescriptor::new(
            "employees",
            [
                "emp_no",
                "birth_date",
                "first_name",
                "last_name",
                "gender",
                "hire_date",
            ],
        )
    }

    fn decode(row: &SqliteRow) -> Result<Self, StoreError> {
        Ok(Employee {
            fact: EmployeeFact {
                emp_no: integer_column(row, "emp_no")?,
                birth_date: date_column(row, "birth_date")?,
                first_name: text_column(row, "first_name")?,
                last_name: text_column(row, "last_name")?,
                gender: text_column(row, "gender")?,
                hire_date: date_column(row, "hire_date")?,
            },
            span: RecordSpan::from_row(row)?,
        })
    }
}

fn integer_column(row: &SqliteRow, column: &str) -> Result<i64, StoreError> {
    row.try_get(column)
        .map_err(|e| StoreError::backend(format!("reading column {column}"), e))
}

fn text_column(row: &SqliteRow, column: &str) -> Result<String, StoreError> {
    row.try_get(column)
        .map_err(|e| StoreError::backend(format!("reading column {column}"), e))
}

fn date_column(row: &SqliteRow, column: &str) -> Result<NaiveDate, StoreError> {
    let text: String = row
        .try_get(column)
        .map_err(|e| StoreError::backend(format!("reading column {column}"), e))?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT)
        .map_err(|e| StoreError::decode(format!("column {column}: {e}")))
}

const COLUMNS: &str = "emp_no, birth_date, first_name, last_name, gender, hire_date, \
                       valid_open, valid_close, txn_open, txn_close";

#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    store: TemporalStore,
}

impl EmployeeRepository {
    pub fn new(store: TemporalStore) -> Self {
        Self { store }
    }

    /// The employee version visible at the context's snapshot.
    pub async fn by_id(
        &self,
        context: &TemporalContext,
        emp_no: i64,
    ) -> Result<Option<Employee>, StoreError> {
        let fragment = QueryFragment::new(format!(
            "SELECT {COLUMNS} FROM employees$ WHERE emp_no = @emp_no \
             ORDER BY txn_open, valid_open LIMIT 1"
        ))
        .with_param("emp_no", emp_no);
        let row = self.store.query_row(context, fragment).await?;
        row.as_ref().map(Employee::decode).transpose()
    }

    /// Records a fact about an employee over a valid-time window.
    pub async fn record(
        &self,
        fact: &EmployeeFact,
        window: Period,
        txn_moment: Option<Instant>,
    ) -> Result<WriteOutcome, StoreError> {
        let mut request = UpdateRequest::new("employees", window.open, window.close)
            .filter("emp_no", fact.emp_no)
            .set(
                "birth_date",
                Value::Text(fact.birth_date.format(DATE_FORMAT).to_string()),
            )
            .set("first_name", fact.first_name.as_str())
            .set("last_name", fact.last_name.as_str())
            .set("gender", fact.gender.as_str())
            .set(
                "hire_date",
                Value::Text(fact.hire_date.format(DATE_FORMAT).to_string()),
            );
        request.txn_moment = txn_moment;
        self.store.apply(&request).await
    }
}

#[async_trait]
impl AuditTrail for EmployeeRepository {
    type Record = Employee;

    async fn audit_trail(&self, key: i64) -> Result<Vec<Employee>, StoreError> {
        let fragment = QueryFragment::new(format!(
            "SELECT {COLUMNS} FROM employees WHERE emp_no = @emp_no \
             ORDER BY txn_open, valid_open"
        ))
        .with_param("emp_no", key);
        let rows = self
            .store
            .query_rows(&TemporalContext::unrestricted(), fragment)
            .await?;
        rows.iter().map(Employee::decode).collect()
    }
}
