#![allow(dead_code)]

use std::sync::Arc;

use infra_store::repositories::{Employee, Salary};
use infra_store::{StoreConfig, TableBinding, TemporalStore};
use temporal_engine::{Engine, WriteMode};
use test_support::{salary_seed_sql, SCHEMA_SQL};

pub fn engine(mode: WriteMode, dump_queries: bool) -> Arc<Engine> {
    Arc::new(
        Engine::builder()
            .register(Salary::table())
            .register(Employee::table())
            .write_mode(mode)
            .dump_queries(dump_queries)
            .build()
            .expect("test engine configuration is valid"),
    )
}

pub async fn empty_store_with(mode: WriteMode, dump_queries: bool) -> TemporalStore {
    test_support::init_tracing();
    let store = TemporalStore::connect(&StoreConfig::in_memory(), engine(mode, dump_queries))
        .await
        .expect("in-memory store connects");
    store
        .execute_raw(SCHEMA_SQL)
        .await
        .expect("schema applies cleanly");
    store
}

pub async fn empty_store() -> TemporalStore {
    empty_store_with(WriteMode::Erasing, false).await
}

pub async fn seeded_store_with(mode: WriteMode) -> TemporalStore {
    let store = empty_store_with(mode, false).await;
    store
        .execute_raw(&salary_seed_sql())
        .await
        .expect("seed applies cleanly");
    store
}

pub async fn seeded_store() -> TemporalStore {
    seeded_store_with(WriteMode::Erasing).await
}
