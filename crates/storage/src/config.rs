#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 500;
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(250);
pub(crate) const WRITER_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn default_catalog_path() -> PathBuf {
    std::env::temp_dir().join("cmdq").join("catalog.db")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogConfig {
    pub path: PathBuf,
    pub batch_size: usize,
    pub query_timeout: Duration,
}

impl CatalogConfig {
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            batch_size: DEFAULT_BATCH_SIZE,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}
