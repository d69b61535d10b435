#![forbid(unsafe_code)]

use cmdq_core::QueryError;
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("catalog build failed: {reason}")]
    BuildFailed { reason: String },
    #[error("invalid record `{name}`: {reason}")]
    InvalidRecord { name: String, reason: String },
}

impl IndexError {
    pub(crate) fn build_failed(reason: impl std::fmt::Display) -> Self {
        Self::BuildFailed {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_record(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidRecord {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Low-level failure inside the store; mapped onto [`IndexError`] or
/// [`QueryError`] at the public edge.
#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("query timed out")]
    TimedOut,
    #[error("staging table holds {staged} rows, expected {expected}")]
    Incomplete { expected: i64, staged: i64 },
}

impl StoreError {
    pub(crate) fn is_interrupt(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(inner, _) if inner.code == ErrorCode::OperationInterrupted
        )
    }

    /// Classifies a statement failure, treating an interrupt raised by the
    /// progress handler as a timeout.
    pub(crate) fn from_query(err: rusqlite::Error) -> Self {
        if Self::is_interrupt(&err) {
            Self::TimedOut
        } else {
            Self::Sql(err)
        }
    }
}

impl From<StoreError> for IndexError {
    fn from(value: StoreError) -> Self {
        Self::build_failed(value)
    }
}

impl From<StoreError> for QueryError {
    fn from(value: StoreError) -> Self {
        QueryError::unavailable(value.to_string())
    }
}
