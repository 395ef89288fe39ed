//! READ path: snapshot query rewriting
//!
//! User fragments reference a registered table `T` as `T$` to mean "the
//! snapshot of T at the current temporal context"; `T` without the suffix
//! reads raw history. The rewriter prepends one CTE per registered table:
//!
//! ```sql
//! WITH "t1$" AS (SELECT * FROM "t1" WHERE (<predicates>)),
//!      "t2$" AS (SELECT * FROM "t2" WHERE (<predicates>))
//! <user fragment>
//! ```
//!
//! A CTE is emitted for every registered table whether or not the
//! fragment references it; the backend's planner is expected to elide the
//! unused ones. The engine never parses the user SQL.

use temporal_kernel::TemporalContext;

use crate::error::EngineError;
use crate::fragment::{QueryFragment, RESERVED_PARAMS};
use crate::registry::{quote_identifier, Engine};

const PARAM_VALID_AT: &str = "valid_at";
const PARAM_SYSTEM_AT: &str = "system_at";

pub(crate) fn snapshot_query(
    engine: &Engine,
    context: &TemporalContext,
    mut fragment: QueryFragment,
) -> Result<QueryFragment, EngineError> {
    for reserved in RESERVED_PARAMS {
        if fragment.params.contains_key(reserved) {
            return Err(EngineError::config(format!(
                "user parameter @{reserved} collides with a reserved name"
            )));
        }
    }

    if engine.tables().is_empty() {
        return Ok(fragment);
    }

    let mut predicates = Vec::new();
    if let Some(valid_moment) = context.valid_moment {
        predicates.push("valid_open <= @valid_at AND @valid_at < valid_close");
        fragment.bind(PARAM_VALID_AT, valid_moment);
    }
    if let Some(system_moment) = context.system_moment {
        predicates.push("txn_open <= @system_at AND @system_at < txn_close");
        fragment.bind(PARAM_SYSTEM_AT, system_moment);
    }
    let predicate = if predicates.is_empty() {
        String::new()
    } else {
        format!(" WHERE ({})", predicates.join(" AND "))
    };

    let ctes: Vec<String> = engine
        .tables()
        .iter()
        .map(|table| {
            format!(
                "{} AS (SELECT * FROM {}{})",
                quote_identifier(&format!("{}$", table.name())),
                quote_identifier(table.name()),
                predicate
            )
        })
        .collect();

    fragment.sql = format!("WITH {}\n{}", ctes.join(",\n     "), fragment.sql);
    Ok(fragment)
}
