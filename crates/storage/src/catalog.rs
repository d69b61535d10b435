#![forbid(unsafe_code)]

use crate::config::{CatalogConfig, WRITER_BUSY_TIMEOUT};
use crate::error::{IndexError, StoreError};
use crate::fts_query::match_expression;
use crate::schema::{
    self, LIVE_TABLE, META_BUILT_AT_MS, META_GENERATION, META_RECORD_COUNT,
};
use cmdq_core::{CandidateSource, CommandRecord, QueryError, Resolution};
use rusqlite::{Connection, OpenFlags, TransactionBehavior, params};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const PROGRESS_OPS: i32 = 1_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildReport {
    pub record_count: usize,
    pub batches: usize,
    pub generation: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogStats {
    pub record_count: i64,
    pub generation: i64,
    pub built_at_ms: i64,
}

/// Full-text catalog over `(name, description)`. Holds no connection: each
/// query opens a read-only handle and releases it before returning, so one
/// store can serve any number of concurrent readers.
#[derive(Debug)]
pub struct CatalogStore {
    config: CatalogConfig,
    writer: Mutex<()>,
}

impl CatalogStore {
    pub fn open(config: CatalogConfig) -> Result<Self, IndexError> {
        if config.batch_size == 0 {
            return Err(StoreError::InvalidInput("batch_size must be greater than zero").into());
        }
        Ok(Self {
            config,
            writer: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Replaces the catalog wholesale. Rows are written to a staging table of
    /// this build's own in batches and swapped in with one transaction; on
    /// failure the previous catalog is left untouched.
    pub fn build(&self, records: &[CommandRecord]) -> Result<BuildReport, IndexError> {
        ensure_unique(records)?;
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let started = Instant::now();
        tracing::info!(
            path = %self.config.path.display(),
            records = records.len(),
            batch_size = self.config.batch_size,
            "rebuilding catalog"
        );

        let mut conn = self.open_writer().map_err(|err| {
            tracing::error!(error = %err, "catalog store could not be opened for writing");
            IndexError::from(err)
        })?;

        let staging = schema::staging_table_name();
        match self.build_with(&mut conn, &staging, records) {
            Ok(report) => {
                tracing::info!(
                    records = report.record_count,
                    batches = report.batches,
                    generation = report.generation,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "catalog committed"
                );
                Ok(report)
            }
            Err(err) => {
                if let Err(cleanup) = schema::drop_staging(&conn, &staging) {
                    tracing::warn!(error = %cleanup, table = %staging, "failed to drop staging table");
                }
                tracing::error!(error = %err, "catalog build failed");
                Err(err.into())
            }
        }
    }

    fn build_with(
        &self,
        conn: &mut Connection,
        staging: &str,
        records: &[CommandRecord],
    ) -> Result<BuildReport, StoreError> {
        schema::create_staging(conn, staging)?;

        let insert =
            format!("INSERT INTO {staging}(rowid, name, description) VALUES (?1, ?2, ?3)");
        let mut rowid: i64 = 0;
        let mut batches = 0;
        for chunk in records.chunks(self.config.batch_size) {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(&insert)?;
                for record in chunk {
                    rowid += 1;
                    stmt.execute(params![rowid, record.name(), record.description()])?;
                }
            }
            tx.commit()?;
            batches += 1;
            tracing::trace!(batch = batches, rows = chunk.len(), "staged batch");
        }

        let record_count =
            i64::try_from(records.len()).map_err(|_| StoreError::InvalidInput("too many records"))?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let staged = schema::count_rows(&tx, staging)?;
        if staged != record_count {
            return Err(StoreError::Incomplete {
                expected: record_count,
                staged,
            });
        }
        let generation = schema::meta_get(&tx, META_GENERATION)?.unwrap_or(0) + 1;
        schema::swap_staging_tx(&tx, staging)?;
        schema::meta_set_tx(&tx, META_GENERATION, generation)?;
        schema::meta_set_tx(&tx, META_RECORD_COUNT, record_count)?;
        schema::meta_set_tx(&tx, META_BUILT_AT_MS, now_ms())?;
        tx.commit()?;

        Ok(BuildReport {
            record_count: records.len(),
            batches,
            generation,
        })
    }

    /// Name tier first; the description tier is consulted only when no name
    /// matches. Both tiers read the same snapshot. A blank query matches every
    /// record.
    pub fn resolve(&self, query: &str) -> Result<Resolution, QueryError> {
        let result = self
            .open_reader()
            .and_then(|mut conn| resolve_tiers(&mut conn, query));
        match result {
            Ok(resolution) => {
                tracing::debug!(
                    query,
                    tier = resolution.tier.as_str(),
                    hits = resolution.len(),
                    "catalog query"
                );
                Ok(resolution)
            }
            Err(err) => {
                tracing::warn!(query, error = %err, "catalog query failed");
                Err(err.into())
            }
        }
    }

    /// `None` until a build has committed.
    pub fn stats(&self) -> Result<Option<CatalogStats>, QueryError> {
        if !self.config.path.exists() {
            return Ok(None);
        }
        let conn = self.open_reader()?;
        Ok(read_stats(&conn)?)
    }

    pub fn is_built(&self) -> bool {
        matches!(self.stats(), Ok(Some(_)))
    }

    /// Drops the catalog so the store reads as never built.
    pub fn clear(&self) -> Result<(), IndexError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let conn = self.open_writer()?;
        schema::drop_all(&conn)?;
        tracing::info!(path = %self.config.path.display(), "catalog cleared");
        Ok(())
    }

    fn open_writer(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.config.path)?;
        conn.busy_timeout(WRITER_BUSY_TIMEOUT)?;
        schema::install_meta(&conn)?;
        Ok(conn)
    }

    fn open_reader(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open_with_flags(
            &self.config.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(self.config.query_timeout)?;
        let deadline = Instant::now() + self.config.query_timeout;
        conn.progress_handler(PROGRESS_OPS, Some(move || Instant::now() >= deadline));
        Ok(conn)
    }
}

impl CandidateSource for CatalogStore {
    fn resolve(&self, query: &str) -> Result<Resolution, QueryError> {
        CatalogStore::resolve(self, query)
    }
}

fn ensure_unique(records: &[CommandRecord]) -> Result<(), IndexError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.name()) {
            return Err(IndexError::invalid_record(record.name(), "duplicate name"));
        }
    }
    Ok(())
}

fn resolve_tiers(conn: &mut Connection, query: &str) -> Result<Resolution, StoreError> {
    let tx = conn.transaction().map_err(StoreError::from_query)?;
    if query.trim().is_empty() {
        return Ok(Resolution::by_name(select_all(&tx)?));
    }

    let Some(name_expr) = match_expression(query, "name") else {
        return Ok(Resolution::empty());
    };
    let by_name = select_matching(&tx, &name_expr)?;
    if !by_name.is_empty() {
        return Ok(Resolution::by_name(by_name));
    }

    let Some(description_expr) = match_expression(query, "description") else {
        return Ok(Resolution::empty());
    };
    Ok(Resolution::by_description(select_matching(
        &tx,
        &description_expr,
    )?))
}

fn select_all(conn: &Connection) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn
        .prepare(&format!("SELECT name FROM {LIVE_TABLE} ORDER BY rowid"))
        .map_err(StoreError::from_query)?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(StoreError::from_query)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from_query)
}

fn select_matching(conn: &Connection, expr: &str) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT name FROM {LIVE_TABLE} WHERE {LIVE_TABLE} MATCH ?1 ORDER BY rowid"
        ))
        .map_err(StoreError::from_query)?;
    let rows = stmt
        .query_map(params![expr], |row| row.get::<_, String>(0))
        .map_err(StoreError::from_query)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from_query)
}

fn read_stats(conn: &Connection) -> Result<Option<CatalogStats>, StoreError> {
    if !schema::table_exists(conn, "catalog_meta")? || !schema::table_exists(conn, LIVE_TABLE)? {
        return Ok(None);
    }
    let Some(generation) = schema::meta_get(conn, META_GENERATION)? else {
        return Ok(None);
    };
    Ok(Some(CatalogStats {
        record_count: schema::meta_get(conn, META_RECORD_COUNT)?.unwrap_or(0),
        generation,
        built_at_ms: schema::meta_get(conn, META_BUILT_AT_MS)?.unwrap_or(0),
    }))
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
