//! Domain repositories
//!
//! Thin wrappers over the store: each supplies a table descriptor, the
//! SQL fragments naming its snapshot view (`table$`), and the row
//! decoding. All temporal mechanics stay in the engine.

pub mod employees;
pub mod salaries;

pub use employees::{Employee, EmployeeFact, EmployeeRepository};
pub use salaries::{Salary, SalaryRepository};

use async_trait::async_trait;

use crate::error::StoreError;

/// Raw-history access common to the bitemporal repositories: every
/// version of a key ever asserted, superseded rows included.
#[async_trait]
pub trait AuditTrail {
    type Record;

    /// All physical rows for a business key, ordered by transaction
    /// period then valid period.
    async fn audit_trail(&self, key: i64) -> Result<Vec<Self::Record>, StoreError>;
}
