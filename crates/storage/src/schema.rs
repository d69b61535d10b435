#![forbid(unsafe_code)]

use crate::error::StoreError;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) const LIVE_TABLE: &str = "catalog";
pub(crate) const STAGING_PREFIX: &str = "catalog_next";

pub(crate) const META_GENERATION: &str = "generation";
pub(crate) const META_RECORD_COUNT: &str = "record_count";
pub(crate) const META_BUILT_AT_MS: &str = "built_at_ms";

pub(crate) fn install_meta(conn: &Connection) -> Result<(), StoreError> {
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
    conn.execute_batch(
        r#"
        PRAGMA synchronous=NORMAL;

        CREATE TABLE IF NOT EXISTS catalog_meta (
          key TEXT PRIMARY KEY,
          value INTEGER NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Staging table name unique to one build, across handles and processes.
pub(crate) fn staging_table_name() -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or(0);
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{STAGING_PREFIX}_{}_{nanos}_{seq}", std::process::id())
}

pub(crate) fn create_staging(conn: &Connection, table: &str) -> Result<(), StoreError> {
    conn.execute_batch(&format!(
        "CREATE VIRTUAL TABLE {table} USING fts5(name, description, tokenize = 'unicode61');"
    ))?;
    Ok(())
}

pub(crate) fn drop_staging(conn: &Connection, table: &str) -> Result<(), StoreError> {
    conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))?;
    Ok(())
}

pub(crate) fn count_rows(conn: &Connection, table: &str) -> Result<i64, StoreError> {
    Ok(conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |row| {
        row.get::<_, i64>(0)
    })?)
}

/// Replaces the live table with `staging`. Must run inside the transaction
/// that also records the new meta values.
pub(crate) fn swap_staging_tx(tx: &Transaction<'_>, staging: &str) -> Result<(), StoreError> {
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {LIVE_TABLE};\n\
         ALTER TABLE {staging} RENAME TO {LIVE_TABLE};"
    ))?;
    Ok(())
}

/// Drops the live table, the meta rows and every staging table, including
/// ones left behind by interrupted builds.
pub(crate) fn drop_all(conn: &Connection) -> Result<(), StoreError> {
    let staging = {
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type='table' AND name GLOB ?1",
        )?;
        let rows = stmt.query_map(params![format!("{STAGING_PREFIX}*")], |row| {
            row.get::<_, String>(0)
        })?;
        rows.collect::<Result<Vec<_>, _>>()?
    };
    for table in staging.iter().filter(|table| is_staging_root(table)) {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))?;
    }
    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {LIVE_TABLE};\n\
         DELETE FROM catalog_meta;"
    ))?;
    Ok(())
}

fn is_staging_root(table: &str) -> bool {
    ["_data", "_idx", "_content", "_docsize", "_config"]
        .iter()
        .all(|suffix| !table.ends_with(suffix))
}

pub(crate) fn meta_get(conn: &Connection, key: &str) -> Result<Option<i64>, rusqlite::Error> {
    conn.query_row(
        "SELECT value FROM catalog_meta WHERE key=?1",
        params![key],
        |row| row.get::<_, i64>(0),
    )
    .optional()
}

pub(crate) fn meta_set_tx(tx: &Transaction<'_>, key: &str, value: i64) -> Result<(), StoreError> {
    tx.execute(
        "INSERT INTO catalog_meta(key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT COUNT(1) FROM sqlite_master WHERE type='table' AND name=?1",
        params![table],
        |row| row.get::<_, i64>(0),
    )
    .map(|count| count > 0)
}
