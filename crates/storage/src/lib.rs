#![forbid(unsafe_code)]

//! SQLite FTS5 catalog of command records: wholesale rebuilds and the
//! name-then-description query resolver.

mod catalog;
mod config;
mod error;
mod fts_query;
mod schema;

pub use catalog::{BuildReport, CatalogStats, CatalogStore};
pub use config::{CatalogConfig, DEFAULT_BATCH_SIZE, DEFAULT_QUERY_TIMEOUT, default_catalog_path};
pub use error::IndexError;
