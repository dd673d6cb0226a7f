//! # SQL Storage
//!
//! [`RecordRepository`] over a SQLite or PostgreSQL pool, plus the embedded
//! schema migrations for both backends.
//!
//! Writes use `RETURNING` so each operation is a single statement.

use crate::record::{Record, RecordValues};
use crate::repository::{RecordRepository, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use sensorlog_core::DatabasePool;
use sqlx::migrate::Migrator;
use tracing::{debug, info};

static SQLITE_MIGRATOR: Migrator = sqlx::migrate!("./migrations/sqlite");
static POSTGRES_MIGRATOR: Migrator = sqlx::migrate!("./migrations/postgres");

mod sqlite {
    pub const FIND: &str =
        "SELECT record_id, timestamp, temperature, humidity FROM records WHERE record_id = ?";
    pub const INSERT: &str = "INSERT INTO records (timestamp, temperature, humidity) \
         VALUES (?, ?, ?) RETURNING record_id, timestamp, temperature, humidity";
    pub const UPDATE: &str = "UPDATE records SET timestamp = ?, temperature = ?, humidity = ? \
         WHERE record_id = ? RETURNING record_id, timestamp, temperature, humidity";
    pub const DELETE: &str = "DELETE FROM records WHERE record_id = ? \
         RETURNING record_id, timestamp, temperature, humidity";
    pub const RANGE: &str = "SELECT record_id, timestamp, temperature, humidity FROM records \
         WHERE timestamp >= ? AND timestamp <= ? ORDER BY record_id";
}

mod postgres {
    pub const FIND: &str =
        "SELECT record_id, timestamp, temperature, humidity FROM records WHERE record_id = $1";
    pub const INSERT: &str = "INSERT INTO records (timestamp, temperature, humidity) \
         VALUES ($1, $2, $3) RETURNING record_id, timestamp, temperature, humidity";
    pub const UPDATE: &str = "UPDATE records SET timestamp = $1, temperature = $2, humidity = $3 \
         WHERE record_id = $4 RETURNING record_id, timestamp, temperature, humidity";
    pub const DELETE: &str = "DELETE FROM records WHERE record_id = $1 \
         RETURNING record_id, timestamp, temperature, humidity";
    pub const RANGE: &str = "SELECT record_id, timestamp, temperature, humidity FROM records \
         WHERE timestamp >= $1 AND timestamp <= $2 ORDER BY record_id";
}

/// Apply the pending migrations for the pool's backend.
///
/// # Errors
///
/// Returns `RepositoryError::Migrate` if a migration fails.
pub async fn migrate(pool: &DatabasePool) -> RepositoryResult<()> {
    match pool {
        DatabasePool::Sqlite(p) => SQLITE_MIGRATOR.run(p).await?,
        DatabasePool::Postgres(p) => POSTGRES_MIGRATOR.run(p).await?,
    }
    info!(backend = pool.backend(), "Migrations applied");
    Ok(())
}

/// Map constraint violations to their domain errors
fn classify(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return RepositoryError::DuplicateTimestamp;
        }
        if db.is_check_violation() {
            return RepositoryError::CheckViolation {
                constraint: db.constraint().unwrap_or_default().to_string(),
            };
        }
    }
    RepositoryError::Database(err)
}

/// Record storage backed by sqlx
#[derive(Clone, Debug)]
pub struct SqlRecordRepository {
    pool: DatabasePool,
}

impl SqlRecordRepository {
    /// Wrap an open pool
    pub const fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    pub const fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

#[async_trait]
impl RecordRepository for SqlRecordRepository {
    async fn find(&self, record_id: i64) -> RepositoryResult<Option<Record>> {
        let found = match &self.pool {
            DatabasePool::Sqlite(p) => {
                sqlx::query_as::<_, Record>(sqlite::FIND)
                    .bind(record_id)
                    .fetch_optional(p)
                    .await
            }
            DatabasePool::Postgres(p) => {
                sqlx::query_as::<_, Record>(postgres::FIND)
                    .bind(record_id)
                    .fetch_optional(p)
                    .await
            }
        };
        found.map_err(classify)
    }

    async fn insert(&self, values: RecordValues) -> RepositoryResult<Record> {
        let inserted = match &self.pool {
            DatabasePool::Sqlite(p) => {
                sqlx::query_as::<_, Record>(sqlite::INSERT)
                    .bind(values.timestamp)
                    .bind(values.temperature)
                    .bind(values.humidity)
                    .fetch_one(p)
                    .await
            }
            DatabasePool::Postgres(p) => {
                sqlx::query_as::<_, Record>(postgres::INSERT)
                    .bind(values.timestamp)
                    .bind(values.temperature)
                    .bind(values.humidity)
                    .fetch_one(p)
                    .await
            }
        }
        .map_err(classify)?;
        debug!(record_id = inserted.record_id, "Record inserted");
        Ok(inserted)
    }

    async fn update(&self, record: Record) -> RepositoryResult<Option<Record>> {
        let updated = match &self.pool {
            DatabasePool::Sqlite(p) => {
                sqlx::query_as::<_, Record>(sqlite::UPDATE)
                    .bind(record.timestamp)
                    .bind(record.temperature)
                    .bind(record.humidity)
                    .bind(record.record_id)
                    .fetch_optional(p)
                    .await
            }
            DatabasePool::Postgres(p) => {
                sqlx::query_as::<_, Record>(postgres::UPDATE)
                    .bind(record.timestamp)
                    .bind(record.temperature)
                    .bind(record.humidity)
                    .bind(record.record_id)
                    .fetch_optional(p)
                    .await
            }
        };
        updated.map_err(classify)
    }

    async fn delete(&self, record_id: i64) -> RepositoryResult<Option<Record>> {
        let deleted = match &self.pool {
            DatabasePool::Sqlite(p) => {
                sqlx::query_as::<_, Record>(sqlite::DELETE)
                    .bind(record_id)
                    .fetch_optional(p)
                    .await
            }
            DatabasePool::Postgres(p) => {
                sqlx::query_as::<_, Record>(postgres::DELETE)
                    .bind(record_id)
                    .fetch_optional(p)
                    .await
            }
        };
        deleted.map_err(classify)
    }

    async fn query_range(&self, min: f64, max: f64) -> RepositoryResult<Vec<Record>> {
        let records = match &self.pool {
            DatabasePool::Sqlite(p) => {
                sqlx::query_as::<_, Record>(sqlite::RANGE)
                    .bind(min)
                    .bind(max)
                    .fetch_all(p)
                    .await
            }
            DatabasePool::Postgres(p) => {
                sqlx::query_as::<_, Record>(postgres::RANGE)
                    .bind(min)
                    .bind(max)
                    .fetch_all(p)
                    .await
            }
        };
        records.map_err(classify)
    }
}
