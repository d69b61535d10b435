#![forbid(unsafe_code)]

use cmdq_core::CommandRecord;
use cmdq_storage::{CatalogConfig, CatalogStore, IndexError};
use rusqlite::{Connection, params};

fn records(prefix: &str, count: usize) -> Vec<CommandRecord> {
    (0..count)
        .map(|index| {
            CommandRecord::try_new(
                format!("{prefix}-{index:05}"),
                format!("Command number {index} of the {prefix} set."),
            )
            .expect("valid record")
        })
        .collect()
}

#[test]
fn build_batches_and_counts_records() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = CatalogConfig::at(dir.path().join("nested/catalog.db")).with_batch_size(100);
    let store = CatalogStore::open(config).expect("open store");

    let report = store.build(&records("alpha", 250)).expect("build catalog");
    assert_eq!(report.record_count, 250);
    assert_eq!(report.batches, 3);
    assert_eq!(report.generation, 1);

    let stats = store.stats().expect("stats").expect("catalog built");
    assert_eq!(stats.record_count, 250);
    assert_eq!(stats.generation, 1);
    assert!(stats.built_at_ms > 0);
    assert_eq!(store.resolve("").expect("resolve all").len(), 250);
}

#[test]
fn rebuild_replaces_previous_contents() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store =
        CatalogStore::open(CatalogConfig::at(dir.path().join("catalog.db"))).expect("open store");

    store.build(&records("alpha", 10)).expect("first build");
    let report = store.build(&records("beta", 4)).expect("second build");
    assert_eq!(report.generation, 2);

    assert!(store.resolve("alpha").expect("resolve alpha").is_empty());
    assert_eq!(store.resolve("beta").expect("resolve beta").len(), 4);
    assert_eq!(store.resolve("").expect("resolve all").len(), 4);
}

#[test]
fn large_catalog_builds_with_default_batches() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store =
        CatalogStore::open(CatalogConfig::at(dir.path().join("catalog.db"))).expect("open store");

    let report = store.build(&records("bulk", 20_000)).expect("build catalog");
    assert_eq!(report.batches, 40);

    let every = store.resolve("").expect("resolve all");
    assert_eq!(every.len(), 20_000);
    assert_eq!(every.names.first().map(String::as_str), Some("bulk-00000"));
    assert_eq!(every.names.last().map(String::as_str), Some("bulk-19999"));
    assert_eq!(
        store.resolve("19999").expect("resolve by number").names,
        vec!["bulk-19999"]
    );
}

#[test]
fn duplicate_names_are_rejected_before_touching_the_store() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store =
        CatalogStore::open(CatalogConfig::at(dir.path().join("catalog.db"))).expect("open store");
    store.build(&records("alpha", 3)).expect("first build");

    let mut dupes = records("beta", 2);
    dupes.push(dupes[0].clone());
    let err = store.build(&dupes).expect_err("duplicate names");
    match err {
        IndexError::InvalidRecord { name, .. } => assert_eq!(name, "beta-00000"),
        other => panic!("expected InvalidRecord, got {other:?}"),
    }

    assert_eq!(store.resolve("alpha").expect("resolve alpha").len(), 3);
    assert_eq!(store.stats().expect("stats").expect("built").generation, 1);
}

#[test]
fn zero_batch_size_is_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let err = CatalogStore::open(CatalogConfig::at(dir.path().join("c.db")).with_batch_size(0))
        .expect_err("zero batch size");
    assert!(matches!(err, IndexError::BuildFailed { .. }));
}

#[test]
fn unwritable_path_fails_the_build() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = CatalogStore::open(CatalogConfig::at(dir.path())).expect("open store");

    let err = store.build(&records("alpha", 1)).expect_err("path is a directory");
    assert!(matches!(err, IndexError::BuildFailed { .. }));
}

#[test]
fn locked_store_fails_and_keeps_previous_catalog() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("catalog.db");
    let store = CatalogStore::open(CatalogConfig::at(&path)).expect("open store");
    store.build(&records("alpha", 5)).expect("first build");

    let mut blocker = Connection::open(&path).expect("open blocker");
    let tx = blocker
        .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
        .expect("hold write lock");

    let err = store.build(&records("beta", 5)).expect_err("writer is locked out");
    assert!(matches!(err, IndexError::BuildFailed { .. }));
    tx.rollback().expect("release write lock");

    let all = store.resolve("").expect("resolve all");
    assert_eq!(all.len(), 5);
    assert!(all.names.iter().all(|name| name.starts_with("alpha-")));
}

#[test]
fn leftover_staging_table_is_invisible_and_replaced() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("catalog.db");
    let store = CatalogStore::open(CatalogConfig::at(&path)).expect("open store");
    store.build(&records("alpha", 2)).expect("first build");

    {
        let conn = Connection::open(&path).expect("open raw connection");
        conn.execute_batch(
            "CREATE VIRTUAL TABLE catalog_next USING fts5(name, description);",
        )
        .expect("simulate interrupted build");
        conn.execute(
            "INSERT INTO catalog_next(rowid, name, description) VALUES (?1, ?2, ?3)",
            params![1, "half-built", "Only part of a rebuild."],
        )
        .expect("insert partial row");
    }

    assert!(store.resolve("half").expect("resolve half").is_empty());
    assert_eq!(store.resolve("").expect("resolve all").len(), 2);

    store.build(&records("beta", 3)).expect("rebuild");
    let all = store.resolve("").expect("resolve all");
    assert_eq!(all.names, vec!["beta-00000", "beta-00001", "beta-00002"]);

    store.clear().expect("clear");
    let conn = Connection::open(&path).expect("open raw connection");
    let leftovers: i64 = conn
        .query_row(
            "SELECT COUNT(1) FROM sqlite_master WHERE name GLOB 'catalog*' AND name != 'catalog_meta'",
            [],
            |row| row.get(0),
        )
        .expect("count catalog tables");
    assert_eq!(leftovers, 0);
}

#[test]
fn clear_returns_store_to_unbuilt() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store =
        CatalogStore::open(CatalogConfig::at(dir.path().join("catalog.db"))).expect("open store");
    store.build(&records("alpha", 2)).expect("build");
    assert!(store.is_built());

    store.clear().expect("clear");
    assert!(!store.is_built());
    assert!(store.resolve("alpha").is_err());
}

#[test]
fn empty_enumeration_builds_an_empty_catalog() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store =
        CatalogStore::open(CatalogConfig::at(dir.path().join("catalog.db"))).expect("open store");

    let report = store.build(&[]).expect("build empty");
    assert_eq!(report.batches, 0);
    assert!(store.resolve("").expect("resolve all").is_empty());
    assert!(store.is_built());
}
