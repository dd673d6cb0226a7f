//! # Database Module
//!
//! SQLx connection pools for SQLite and PostgreSQL behind one enum, so the
//! service picks the backend from the database URL at startup.

use crate::error::{Error, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Default pool size when none is configured
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Database connection pool supporting multiple backends
#[derive(Clone, Debug)]
pub enum DatabasePool {
    /// SQLite connection pool
    Sqlite(SqlitePool),
    /// PostgreSQL connection pool
    Postgres(PgPool),
}

impl DatabasePool {
    /// Connect to the backend named by the URL scheme
    ///
    /// `sqlite:` URLs go to SQLite, `postgres:`/`postgresql:` to PostgreSQL.
    ///
    /// # Errors
    ///
    /// Returns `Error::Database` for an unknown scheme or a failed connection.
    pub async fn connect(url: &str, max_connections: Option<u32>) -> Result<Self> {
        let scheme = url.split_once(':').map(|(scheme, _)| scheme);
        match scheme {
            Some("sqlite") => Self::connect_sqlite(url, max_connections).await,
            Some("postgres" | "postgresql") => Self::connect_postgres(url, max_connections).await,
            _ => Err(Error::Database {
                message: format!("Unsupported database URL: {url}"),
            }),
        }
    }

    /// Connect to a SQLite database
    ///
    /// The database file is created if missing. An in-memory database lives
    /// only as long as its connection, so `:memory:` URLs get a single
    /// connection that is never recycled.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let pool = DatabasePool::connect_sqlite("sqlite::memory:", None).await?;
    /// let pool = DatabasePool::connect_sqlite("sqlite://sensorlog.db", Some(20)).await?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `Error::Database` if the URL is invalid or the connection fails.
    pub async fn connect_sqlite(url: &str, max_connections: Option<u32>) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| Error::Database {
                message: format!("Invalid SQLite URL: {e}"),
            })?
            .create_if_missing(true);

        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| Error::Database {
                message: format!("SQLite connection failed: {e}"),
            })?;

        Ok(Self::Sqlite(pool))
    }

    /// Connect to a PostgreSQL database
    ///
    /// # Example
    ///
    /// ```ignore
    /// let pool = DatabasePool::connect_postgres("postgres://localhost/sensorlog", None).await?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `Error::Database` if the connection fails.
    pub async fn connect_postgres(url: &str, max_connections: Option<u32>) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
            .connect(url)
            .await
            .map_err(|e| Error::Database {
                message: format!("PostgreSQL connection failed: {e}"),
            })?;

        Ok(Self::Postgres(pool))
    }

    /// Backend name for logging
    #[must_use]
    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Postgres(_) => "postgres",
        }
    }

    /// Close the database connection pool
    pub async fn close(&self) {
        match self {
            Self::Sqlite(pool) => pool.close().await,
            Self::Postgres(pool) => pool.close().await,
        }
    }
}
