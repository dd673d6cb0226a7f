//! # sensorlog
//!
//! HTTP service storing temperature and humidity readings.
//!
//! ## Modules
//!
//! - `record` - Record entity and partial updates
//! - `schema` - Payload and query validation
//! - `envelope` - `{record|records, errors}` response shapes
//! - `repository` - Storage port and its errors
//! - `storage` - SQLite/PostgreSQL implementation and migrations
//! - `resources` - HTTP handlers
//! - `config` - YAML configuration
//! - `logging` - Tracing setup

pub mod config;
pub mod envelope;
pub mod logging;
pub mod record;
pub mod repository;
pub mod resources;
pub mod schema;
pub mod storage;

pub use config::AppConfig;
pub use record::{Record, RecordPatch, RecordValues};
pub use repository::{RecordRepository, RepositoryError};
pub use storage::SqlRecordRepository;

use sensorlog_core::{CorsMiddleware, LoggingMiddleware, Server, ServerConfig};
use std::sync::Arc;

/// Assemble the HTTP server: middleware plus every record route.
///
/// # Errors
///
/// Returns `Error::InvalidRoutePattern` if a route cannot be registered.
pub fn build_server(
    config: ServerConfig,
    cors_allow_origin: &str,
    repository: Arc<dyn RecordRepository>,
) -> sensorlog_core::Result<Server> {
    let mut server = Server::with_config(config);
    server.add_middleware(LoggingMiddleware::new());
    server.add_middleware(CorsMiddleware::new().allow_origin(cors_allow_origin));
    resources::register(&mut server, &repository)?;
    Ok(server)
}
