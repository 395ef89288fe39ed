//! Salary history repository

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use temporal_engine::{collapse, QueryFragment, TableDescriptor, UpdateRequest, ValueSpan};
use temporal_kernel::{Instant, Period, TemporalContext};

use crate::error::StoreError;
use crate::repositories::AuditTrail;
use crate::row::{RecordSpan, TableBinding};
use crate::store::{TemporalStore, WriteOutcome};

/// One salary span of an employee.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Salary {
    pub emp_no: i64,
    pub salary: i64,
    pub span: RecordSpan,
}

impl TableBinding for Salary {
    fn table() -> TableDescriptor {
        TableDescriptor::new("salaries", ["emp_no", "salary"])
    }

    fn decode(row: &SqliteRow) -> Result<Self, StoreError> {
        Ok(Salary {
            emp_no: row
                .try_get("emp_no")
                .map_err(|e| StoreError::backend("reading column emp_no", e))?,
            salary: row
                .try_get("salary")
                .map_err(|e| StoreError::backend("reading column salary", e))?,
            span: RecordSpan::from_row(row)?,
        })
    }
}

impl ValueSpan for Salary {
    fn valid(&self) -> Period {
        self.span.valid
    }

    fn txn(&self) -> Period {
        self.span.txn
    }

    fn same_value(&self, other: &Self) -> bool {
        self.emp_no == other.emp_no && self.salary == other.salary
    }

    fn respan(&self, valid: Period, txn: Period) -> Self {
        Salary {
            emp_no: self.emp_no,
            salary: self.salary,
            span: RecordSpan { valid, txn },
        }
    }
}

const COLUMNS: &str = "emp_no, salary, valid_open, valid_close, txn_open, txn_close";

#[derive(Debug, Clone)]
pub struct SalaryRepository {
    store: TemporalStore,
}

impl SalaryRepository {
    pub fn new(store: TemporalStore) -> Self {
        Self { store }
    }

    /// The salary timeline of an employee in the snapshot selected by
    /// the context.
    pub async fn timeline(
        &self,
        context: &TemporalContext,
        emp_no: i64,
    ) -> Result<Vec<Salary>, StoreError> {
        let fragment = QueryFragment::new(format!(
            "SELECT {COLUMNS} FROM salaries$ WHERE emp_no = @emp_no ORDER BY valid_open"
        ))
        .with_param("emp_no", emp_no);
        let rows = self.store.query_rows(context, fragment).await?;
        rows.iter().map(Salary::decode).collect()
    }

    /// Like [`Self::timeline`] with contiguous equal-salary spans merged.
    pub async fn collapsed_timeline(
        &self,
        context: &TemporalContext,
        emp_no: i64,
    ) -> Result<Vec<Salary>, StoreError> {
        Ok(collapse(self.timeline(context, emp_no).await?))
    }

    /// Snapshot rows in the neighborhood of a window: anything whose
    /// valid period touches `[window.open, window.close]`, boundary
    /// contact included.
    pub async fn overlapping(
        &self,
        context: &TemporalContext,
        emp_no: i64,
        window: Period,
    ) -> Result<Vec<Salary>, StoreError> {
        let fragment = QueryFragment::new(format!(
            "SELECT {COLUMNS} FROM salaries$ WHERE emp_no = @emp_no \
             AND valid_open <= @to AND @from <= valid_close ORDER BY valid_open"
        ))
        .with_param("emp_no", emp_no)
        .with_param("from", window.open)
        .with_param("to", window.close);
        let rows = self.store.query_rows(context, fragment).await?;
        rows.iter().map(Salary::decode).collect()
    }

    /// The rows a particular write created, in valid order. Raw-table
    /// read; useful for inspecting what one stamp produced.
    pub async fn rows_stamped(
        &self,
        emp_no: i64,
        stamp: Instant,
    ) -> Result<Vec<Salary>, StoreError> {
        let fragment = QueryFragment::new(format!(
            "SELECT {COLUMNS} FROM salaries WHERE emp_no = @emp_no \
             AND txn_open = @stamp ORDER BY valid_open"
        ))
        .with_param("emp_no", emp_no)
        .with_param("stamp", stamp);
        let rows = self
            .store
            .query_rows(&TemporalContext::unrestricted(), fragment)
            .await?;
        rows.iter().map(Salary::decode).collect()
    }

    /// Asserts a salary over a valid-time window.
    pub async fn update_window(
        &self,
        emp_no: i64,
        salary: i64,
        window: Period,
        txn_moment: Option<Instant>,
    ) -> Result<WriteOutcome, StoreError> {
        let mut request = UpdateRequest::new("salaries", window.open, window.close)
            .filter("emp_no", emp_no)
            .set("salary", salary);
        request.txn_moment = txn_moment;
        self.store.apply(&request).await
    }
}

#[async_trait]
impl AuditTrail for SalaryRepository {
    type Record = Salary;

    async fn audit_trail(&self, key: i64) -> Result<Vec<Salary>, StoreError> {
        let fragment = QueryFragment::new(format!(
            "SELECT {COLUMNS} FROM salaries WHERE emp_no = @emp_no \
             ORDER BY txn_open, valid_open"
        ))
        .with_param("emp_no", key);
        let rows = self
            .store
            .query_rows(&TemporalContext::unrestricted(), fragment)
            .await?;
        rows.iter().map(Salary::decode).collect()
    }
}
