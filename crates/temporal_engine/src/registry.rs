//! Table registry and engine construction
//!
//! The engine owns an immutable catalog of bitemporal tables, assembled
//! once through [`EngineBuilder`] during single-threaded initialization.
//! The catalog knows table names and business columns only; column types
//! are the backend's concern.

use serde::{Deserialize, Serialize};

use temporal_kernel::{now, TemporalContext};

use crate::config::{EngineConfig, WriteMode};
use crate::error::EngineError;
use crate::fragment::{is_reserved, QueryFragment};
use crate::rewriter;

/// The four temporal columns every registered table carries.
pub const TEMPORAL_COLUMNS: [&str; 4] = ["valid_open", "valid_close", "txn_open", "txn_close"];

/// A registered bitemporal table: its name and business columns.
///
/// Business columns include the key columns used to filter writes; the
/// persisted row layout is the business columns followed by the four
/// temporal columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    name: String,
    business_columns: Vec<String>,
}

impl TableDescriptor {
    pub fn new<I, S>(name: impl Into<String>, business_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            business_columns: business_columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn business_columns(&self) -> &[String] {
        &self.business_columns
    }
}

/// Builder assembling an [`Engine`].
#[derive(Debug, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    tables: Vec<TableDescriptor>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table to the catalog. Registration is idempotent by name:
    /// re-registering an identical descriptor is a no-op, while a
    /// conflicting descriptor under the same name fails at build time.
    pub fn register(mut self, table: TableDescriptor) -> Self {
        self.tables.push(table);
        self
    }

    pub fn dump_queries(mut self, enabled: bool) -> Self {
        self.config.dump_queries = enabled;
        self
    }

    pub fn write_mode(mut self, mode: WriteMode) -> Self {
        self.config.write_mode = mode;
        self
    }

    pub fn end_of_time(mut self, sentinel: temporal_kernel::Instant) -> Self {
        self.config.end_of_time = sentinel;
        self
    }

    /// Validates the catalog and configuration and produces an immutable
    /// engine.
    pub fn build(self) -> Result<Engine, EngineError> {
        if self.config.end_of_time <= now() {
            return Err(EngineError::config(format!(
                "invalid end_of_time {}: must be later than any real instant",
                temporal_kernel::format_instant(&self.config.end_of_time)
            )));
        }

        let mut tables: Vec<TableDescriptor> = Vec::with_capacity(self.tables.len());
        for table in self.tables {
            validate_descriptor(&table)?;
            match tables.iter().find(|t| t.name == table.name) {
                Some(existing) if existing == &table => continue,
                Some(_) => {
                    return Err(EngineError::config(format!(
                        "table {:?} registered twice with conflicting columns",
                        table.name
                    )))
                }
                None => tables.push(table),
            }
        }

        Ok(Engine {
            tables,
            config: self.config,
        })
    }
}

fn validate_descriptor(table: &TableDescriptor) -> Result<(), EngineError> {
    validate_identifier("table name", &table.name)?;
    if table.business_columns.is_empty() {
        return Err(EngineError::config(format!(
            "table {:?} has no business columns",
            table.name
        )));
    }
    for (index, column) in table.business_columns.iter().enumerate() {
        validate_identifier("column name", column)?;
        if is_reserved(column) {
            return Err(EngineError::config(format!(
                "column {column:?} of table {:?} collides with a reserved parameter name",
                table.name
            )));
        }
        if TEMPORAL_COLUMNS.contains(&column.as_str()) {
            return Err(EngineError::config(format!(
                "column {column:?} of table {:?} collides with a temporal column",
                table.name
            )));
        }
        if table.business_columns[..index].contains(column) {
            return Err(EngineError::config(format!(
                "column {column:?} of table {:?} is listed twice",
                table.name
            )));
        }
    }
    Ok(())
}

/// Identifiers are never interpolated from user input; anything that is
/// not a plain SQL identifier is rejected at registration.
pub(crate) fn validate_identifier(kind: &str, candidate: &str) -> Result<(), EngineError> {
    let mut chars = candidate.chars();
    let valid_head = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_head || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(EngineError::config(format!(
            "invalid {kind} {candidate:?}"
        )));
    }
    Ok(())
}

pub(crate) fn quote_identifier(identifier: &str) -> String {
    format!("\"{identifier}\"")
}

/// The period-arithmetic engine: an immutable table catalog plus
/// configuration, shared by the read and write paths.
#[derive(Debug, Clone)]
pub struct Engine {
    tables: Vec<TableDescriptor>,
    config: EngineConfig,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tables(&self) -> &[TableDescriptor] {
        &self.tables
    }

    /// Looks up a registered table by name.
    pub fn descriptor(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Rewrites a user fragment into its snapshot-restricted form for the
    /// given temporal context. See [`crate::rewriter`].
    pub fn snapshot_query(
        &self,
        context: &TemporalContext,
        fragment: QueryFragment,
    ) -> Result<QueryFragment, EngineError> {
        rewriter::snapshot_query(self, context, fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salaries() -> TableDescriptor {
        TableDescriptor::new("salaries", ["emp_no", "salary"])
    }

    #[test]
    fn registration_is_idempotent_by_name() {
        let engine = Engine::builder()
            .register(salaries())
            .register(salaries())
            .build()
            .unwrap();
        assert_eq!(engine.tables().len(), 1);
    }

    #[test]
    fn conflicting_registration_fails() {
        let err = Engine::builder()
            .register(salaries())
            .register(TableDescriptor::new("salaries", ["emp_no", "amount"]))
            .build()
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn reserved_column_names_are_rejected() {
        let err = Engine::builder()
            .register(TableDescriptor::new("t", ["valid_from"]))
            .build()
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn temporal_column_names_are_rejected() {
        let err = Engine::builder()
            .register(TableDescriptor::new("t", ["valid_open"]))
            .build()
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn hostile_identifiers_are_rejected() {
        for name in ["", "1abc", "sal aries", "salaries; DROP TABLE x", "sal\"aries"] {
            let err = Engine::builder()
                .register(TableDescriptor::new(name, ["emp_no"]))
                .build()
                .unwrap_err();
            assert!(err.is_config(), "expected rejection of {name:?}");
        }
    }

    #[test]
    fn stale_sentinel_is_rejected() {
        let err = Engine::builder()
            .register(salaries())
            .end_of_time(temporal_kernel::parse_instant("1999-01-01").unwrap())
            .build()
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn descriptor_lookup_finds_registered_tables() {
        let engine = Engine::builder().register(salaries()).build().unwrap();
        assert!(engine.descriptor("salaries").is_some());
        assert!(engine.descriptor("titles").is_none());
    }
}
