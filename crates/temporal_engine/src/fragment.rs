//! Query fragments and the parameter binder
//!
//! Named parameters (`@name`) are the canonical form throughout the
//! engine. [`bind_positional`] converts a fragment to the positional form
//! backends expect: each `@name` occurrence becomes `?` and contributes
//! one entry to the value list, in reference order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use temporal_kernel::{format_instant, Instant};

use crate::error::EngineError;

/// Parameter names the engine injects; user-supplied names must be
/// disjoint from this set.
pub const RESERVED_PARAMS: [&str; 6] = [
    "valid_at",
    "system_at",
    "valid_from",
    "valid_to",
    "txn_moment",
    "infinity",
];

pub(crate) fn is_reserved(name: &str) -> bool {
    RESERVED_PARAMS.contains(&name)
}

/// A scalar bound to a query parameter.
///
/// Instants are carried as typed values and rendered to canonical text at
/// the SQL boundary, keeping comparisons chronological in TEXT-affinity
/// backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Instant(Instant),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v:?}"),
            Value::Instant(v) => write!(f, "{}", format_instant(v)),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Instant> for Value {
    fn from(v: Instant) -> Self {
        Value::Instant(v)
    }
}

/// A piece of SQL plus the named parameters it references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFragment {
    pub sql: String,
    pub params: BTreeMap<String, Value>,
}

impl QueryFragment {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.params.insert(name.into(), value.into());
    }
}

/// Converts a fragment to positional form: `(sql with ?, values)`.
///
/// A `@name` with no bound value, or a bound value never referenced, is a
/// CONFIG error — both indicate a drifted statement/parameter pair.
/// Repeated references to one name each get their own positional slot.
pub fn bind_positional(fragment: &QueryFragment) -> Result<(String, Vec<Value>), EngineError> {
    let mut sql = String::with_capacity(fragment.sql.len());
    let mut values = Vec::new();
    let mut used: Vec<&str> = Vec::new();

    let mut chars = fragment.sql.char_indices();
    let mut in_literal = false;
    while let Some((index, ch)) = chars.next() {
        if ch == '\'' {
            in_literal = !in_literal;
            sql.push(ch);
            continue;
        }
        if in_literal || ch != '@' {
            sql.push(ch);
            continue;
        }

        let rest = &fragment.sql[index + 1..];
        let len = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .count();
        if len == 0 {
            sql.push(ch);
            continue;
        }
        let name = &rest[..len];
        for _ in 0..len {
            chars.next();
        }

        let value = fragment
            .params
            .get(name)
            .ok_or_else(|| EngineError::config(format!("parameter @{name} is not bound")))?;
        values.push(value.clone());
        if !used.contains(&name) {
            used.push(name);
        }
        sql.push('?');
    }

    for name in fragment.params.keys() {
        if !used.iter().any(|u| u == name) {
            return Err(EngineError::config(format!(
                "parameter @{name} is bound but never referenced"
            )));
        }
    }

    Ok((sql, values))
}
