#![forbid(unsafe_code)]

use clap::Args;
use cmdq_storage::{CatalogConfig, DEFAULT_BATCH_SIZE, DEFAULT_QUERY_TIMEOUT, default_catalog_path};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const ENV_STORAGE_PATH: &str = "CMDQ_STORAGE_PATH";
pub const ENV_BATCH_SIZE: &str = "CMDQ_BATCH_SIZE";
pub const ENV_QUERY_TIMEOUT_MS: &str = "CMDQ_QUERY_TIMEOUT_MS";
pub const ENV_MANIFEST: &str = "CMDQ_MANIFEST";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("batch size must be a positive integer (got `{0}`)")]
    InvalidBatchSize(String),
    #[error("query timeout must be a positive number of milliseconds (got `{0}`)")]
    InvalidQueryTimeout(String),
    #[error("no command manifest configured (pass --manifest or set CMDQ_MANIFEST)")]
    MissingManifest,
    #[error("cannot read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("manifest entry `{name}` is invalid: {reason}")]
    InvalidEntry { name: String, reason: String },
}

/// Command-line overrides. Each unset flag falls back to its environment
/// variable, then to the built-in default.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigFlags {
    /// Catalog database file.
    #[arg(long, global = true, value_name = "PATH")]
    pub storage_path: Option<PathBuf>,
    /// Records per insert transaction while indexing.
    #[arg(long, global = true, value_name = "N")]
    pub batch_size: Option<String>,
    /// Per-query deadline in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    pub query_timeout_ms: Option<String>,
    /// JSON manifest listing the available commands.
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest: Option<PathBuf>,
    /// Log filter (overrides RUST_LOG).
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub storage_path: PathBuf,
    pub batch_size: usize,
    pub query_timeout: Duration,
    pub manifest_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: default_catalog_path(),
            batch_size: DEFAULT_BATCH_SIZE,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            manifest_path: None,
            log_level: None,
        }
    }
}

impl Config {
    pub fn load(flags: &ConfigFlags) -> Result<Self, ConfigError> {
        Self::load_with(flags, |key| std::env::var(key).ok())
    }

    pub fn load_with<E>(flags: &ConfigFlags, env: E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let storage_path = flags
            .storage_path
            .clone()
            .or_else(|| non_blank(env(ENV_STORAGE_PATH)).map(PathBuf::from))
            .unwrap_or(defaults.storage_path);

        let batch_size = match flags
            .batch_size
            .clone()
            .or_else(|| non_blank(env(ENV_BATCH_SIZE)))
        {
            Some(raw) => parse_batch_size(&raw)?,
            None => defaults.batch_size,
        };

        let query_timeout = match flags
            .query_timeout_ms
            .clone()
            .or_else(|| non_blank(env(ENV_QUERY_TIMEOUT_MS)))
        {
            Some(raw) => parse_timeout_ms(&raw)?,
            None => defaults.query_timeout,
        };

        let manifest_path = flags
            .manifest
            .clone()
            .or_else(|| non_blank(env(ENV_MANIFEST)).map(PathBuf::from));

        Ok(Self {
            storage_path,
            batch_size,
            query_timeout,
            manifest_path,
            log_level: flags.log_level.clone(),
        })
    }

    pub fn catalog(&self) -> CatalogConfig {
        CatalogConfig::at(&self.storage_path)
            .with_batch_size(self.batch_size)
            .with_query_timeout(self.query_timeout)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_batch_size(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidBatchSize(raw.to_string())),
    }
}

fn parse_timeout_ms(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(Duration::from_millis(value)),
        _ => Err(ConfigError::InvalidQueryTimeout(raw.to_string())),
    }
}
