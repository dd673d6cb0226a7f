//! # sensorlog Core
//!
//! Runtime library for the sensorlog service: HTTP server, routing,
//! middleware, JSON codec, field validation errors and database pools.
//!
//! ## Modules
//!
//! - `server` - HTTP server built on Hyper, plus the `Response` type
//! - `router` - Routing using matchit (radix trie), one trie per method
//! - `route` - Route metadata and information
//! - `request` - HTTP request wrapper with headers, query and JSON body access
//! - `middleware` - Request/response middleware (logging, CORS)
//! - `json` - JSON parsing with simd-json
//! - `validation` - Field-level validation errors
//! - `database` - SQLx connection pools (SQLite, PostgreSQL)
//! - `types` - Path parameter types and conversion
//! - `error` - Error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod database;
pub mod error;
pub mod json;
pub mod middleware;
pub mod request;
pub mod route;
pub mod router;
pub mod server;
pub mod types;
pub mod validation;

pub use database::DatabasePool;
pub use error::{Error, Result};
pub use json::{parse_json, to_json};
pub use middleware::{CorsMiddleware, LoggingMiddleware, Middleware, MiddlewareChain};
pub use request::Request;
pub use route::RouteInfo;
pub use router::{Method, Router};
pub use server::{handler, Handler, Response, Server, ServerConfig};
pub use types::{ParamType, ParamValue};
pub use validation::{ValidationErrors, ValidationResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
