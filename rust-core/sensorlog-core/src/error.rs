//! # Error Handling
//!
//! Centralized error types for the sensorlog runtime.
//! Uses `thiserror` for ergonomic error definitions.

use crate::router::Method;
use thiserror::Error;

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the HTTP runtime
#[derive(Error, Debug)]
pub enum Error {
    /// Server failed to bind to the specified address
    #[error("Failed to bind server to {address}: {source}")]
    BindError {
        /// The address we tried to bind to
        address: String,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Router failed to match the requested path
    #[error("No route found for path: {path}")]
    RouteNotFound {
        /// The path that wasn't matched
        path: String,
    },

    /// The path exists but not for the requested method
    #[error("Method {method} not allowed for path: {path}")]
    MethodNotAllowed {
        /// Method of the rejected request
        method: Method,
        /// The matched path
        path: String,
        /// Methods registered for the path
        allowed: Vec<Method>,
    },

    /// Invalid route pattern provided
    #[error("Invalid route pattern: {pattern}: {reason}")]
    InvalidRoutePattern {
        /// The invalid pattern
        pattern: String,
        /// Reason for invalidity
        reason: String,
    },

    /// A path segment could not be converted to its declared type
    #[error("Cannot convert '{value}' to {expected}")]
    InvalidParam {
        /// Raw segment value
        value: String,
        /// Declared parameter type
        expected: &'static str,
    },

    /// HTTP method the runtime does not route
    #[error("Unsupported HTTP method: {method}")]
    UnsupportedMethod {
        /// Method as sent by the client
        method: String,
    },

    /// Request body is not valid JSON
    #[error("Malformed JSON: {reason}")]
    MalformedJson {
        /// Parser diagnostic
        reason: String,
    },

    /// HTTP protocol error
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {message}")]
    Database {
        /// Error message from database
        message: String,
    },

    /// Request payload too large
    #[error("Payload too large: limit={limit} bytes, received={actual} bytes")]
    PayloadTooLarge {
        /// Max allowed size
        limit: usize,
        /// Actual size
        actual: usize,
    },
}
