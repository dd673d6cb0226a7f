//! Persistence port for records.

use crate::record::{Record, RecordValues};
use crate::schema::HUMIDITY_OUT_OF_RANGE;
use async_trait::async_trait;
use sensorlog_core::ValidationErrors;
use thiserror::Error;

/// Message for a timestamp that is already taken
pub const DUPLICATE_TIMESTAMP: &str = "A record with this timestamp already exists.";

/// Errors raised by a [`RecordRepository`]
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The unique index on `timestamp` rejected the write
    #[error("duplicate timestamp")]
    DuplicateTimestamp,

    /// A table check constraint rejected the write
    #[error("check constraint violated: {constraint}")]
    CheckViolation {
        /// Constraint name as reported by the database, if any
        constraint: String,
    },

    /// Any other database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl RepositoryError {
    /// Field errors to report to the client, for failures the client caused.
    ///
    /// `None` means the failure is internal.
    pub fn field_errors(&self) -> Option<ValidationErrors> {
        match self {
            Self::DuplicateTimestamp => Some(ValidationErrors::single(
                "timestamp",
                DUPLICATE_TIMESTAMP,
            )),
            Self::CheckViolation { .. } => Some(ValidationErrors::single(
                "humidity",
                HUMIDITY_OUT_OF_RANGE,
            )),
            Self::Database(_) | Self::Migrate(_) => None,
        }
    }
}

/// Result alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage operations the record resources need.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Load a record by id.
    async fn find(&self, record_id: i64) -> RepositoryResult<Option<Record>>;

    /// Insert new values; the store assigns the id.
    async fn insert(&self, values: RecordValues) -> RepositoryResult<Record>;

    /// Overwrite the row with `record.record_id` and return it as stored.
    ///
    /// `None` when the row no longer exists.
    async fn update(&self, record: Record) -> RepositoryResult<Option<Record>>;

    /// Remove a record, returning its last values.
    async fn delete(&self, record_id: i64) -> RepositoryResult<Option<Record>>;

    /// Records with `min <= timestamp <= max`, by ascending id.
    async fn query_range(&self, min: f64, max: f64) -> RepositoryResult<Vec<Record>>;
}
