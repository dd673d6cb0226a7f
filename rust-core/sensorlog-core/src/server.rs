//! # HTTP Server
//!
//! HTTP/1 server built on Hyper and Tokio.
//!
//! ## Key Features
//!
//! - One Tokio task per connection
//! - Graceful shutdown: stop accepting, then drain in-flight connections for
//!   up to `shutdown_timeout`
//! - Request body size limit
//! - `test_request` runs the full middleware/router/handler pipeline without
//!   a socket

use crate::error::{Error, Result};
use crate::json::to_json;
use crate::middleware::{Middleware, MiddlewareChain, MiddlewareResult};
use crate::request::Request;
use crate::router::{Method, Router};
use http_body_util::Full;
pub use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::StatusCode;
use hyper_util::rt::TokioIo;
use serde::Serialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// HTTP Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub address: SocketAddr,
    /// Enable keep-alive connections
    pub keep_alive: bool,
    /// Shutdown timeout for graceful shutdown (default: 30 seconds)
    pub shutdown_timeout: Duration,
    /// Max request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: ([127, 0, 0, 1], 8000).into(),
            keep_alive: true,
            shutdown_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024,
        }
    }
}

/// HTTP response produced by handlers and middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
    /// Content type, omitted when empty
    pub content_type: String,
    /// Extra headers, keyed by lower-case name
    pub headers: HashMap<String, String>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            body: String::new(),
            content_type: "application/json".to_string(),
            headers: HashMap::new(),
        }
    }
}

impl Response {
    /// Create a JSON response from an already serialized body
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Serialize `value` into a JSON response with the given status
    ///
    /// Serialization failures become a 500.
    #[must_use]
    pub fn json_of<T: Serialize>(status: u16, value: &T) -> Self {
        match to_json(value) {
            Ok(body) => Self::json(body).with_status(status),
            Err(e) => {
                error!("Failed to serialize response body: {}", e);
                Self::json(r#"{"error": "Internal Server Error"}"#).with_status(500)
            }
        }
    }

    /// Create a text response
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: "text/plain; charset=utf-8".to_string(),
            ..Self::default()
        }
    }

    /// Create a bodiless response
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: String::new(),
            ..Self::default()
        }
    }

    /// Set status code
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Set header
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.set_header(key, value);
        self
    }

    /// Set or override a header
    pub fn set_header(&mut self, key: &str, value: &str) {
        if key.eq_ignore_ascii_case("content-type") {
            self.content_type = value.to_string();
        } else {
            self.headers
                .insert(key.to_ascii_lowercase(), value.to_string());
        }
    }

    /// Get a header value by name (case-insensitive)
    #[must_use]
    pub fn header(&self, key: &str) -> Option<&str> {
        if key.eq_ignore_ascii_case("content-type") {
            return (!self.content_type.is_empty()).then_some(self.content_type.as_str());
        }
        self.headers
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Convert to hyper Response
    fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
        let mut response = hyper::Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let headers = response.headers_mut();
        if !self.content_type.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&self.content_type) {
                headers.insert(CONTENT_TYPE, value);
            }
        }
        for (k, v) in &self.headers {
            if let (Ok(name), Ok(value)) =
                (HeaderName::from_bytes(k.as_bytes()), HeaderValue::from_str(v))
            {
                headers.insert(name, value);
            }
        }
        response
    }
}

/// Future returned by a handler
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Handler function type (async)
///
/// Handlers receive an owned request with path parameters already attached.
pub type Handler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

/// Wrap an async function or closure into a [`Handler`]
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)))
}

/// Routing table, handlers and middleware shared by all connections
#[derive(Clone, Default)]
struct Dispatch {
    router: Router,
    handlers: Vec<Handler>,
    middleware: MiddlewareChain,
}

impl Dispatch {
    /// Network-agnostic request pipeline
    async fn process(&self, req: &mut Request) -> Response {
        if req.header("x-request-id").is_none() {
            let request_id = generate_request_id();
            req.set_header("x-request-id", &request_id);
        }

        let mut response = match self.middleware.run_before(req) {
            MiddlewareResult::Continue => self.route(req).await,
            MiddlewareResult::Respond(resp) => resp,
        };

        if let Some(request_id) = req.header("x-request-id") {
            response.set_header("x-request-id", request_id);
        }
        self.middleware.run_after(req, &mut response);
        response
    }

    async fn route(&self, req: &mut Request) -> Response {
        match self.router.match_route(req.method, &req.path) {
            Ok(matched) => {
                req.params = matched.params;
                match self.handlers.get(matched.handler_id) {
                    Some(handler) => handler(req.clone()).await,
                    None => {
                        error!(handler_id = matched.handler_id, "Route has no handler");
                        Response::json(r#"{"error": "Internal Server Error"}"#).with_status(500)
                    }
                }
            }
            Err(Error::MethodNotAllowed { allowed, .. }) => {
                let allow = allowed
                    .iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                Response::json(r#"{"error": "Method Not Allowed"}"#)
                    .with_status(405)
                    .with_header("Allow", &allow)
            }
            Err(_) => Response::json(r#"{"error": "Not Found"}"#).with_status(404),
        }
    }
}

/// HTTP server
#[derive(Default)]
pub struct Server {
    config: ServerConfig,
    dispatch: Dispatch,
}

impl Server {
    /// Create a new Server instance with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Server instance with the given configuration
    #[must_use]
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            config,
            dispatch: Dispatch::default(),
        }
    }

    /// Bind the server to an address
    #[must_use]
    pub const fn bind(mut self, addr: SocketAddr) -> Self {
        self.config.address = addr;
        self
    }

    /// Current configuration
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Set max request body size
    pub fn set_max_body_size(&mut self, bytes: usize) {
        self.config.max_body_size = bytes;
    }

    /// Add a middleware to the chain
    pub fn add_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        self.dispatch.middleware.add(middleware);
    }

    /// Add a route and its handler
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRoutePattern` if the router rejects the path.
    pub fn add_route(&mut self, method: Method, path: &str, handler: Handler) -> Result<()> {
        let handler_id = self.dispatch.router.add_route(method, path)?;
        debug_assert_eq!(handler_id, self.dispatch.handlers.len());
        self.dispatch.handlers.push(handler);
        Ok(())
    }

    /// Start the server and run until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns `Error::BindError` or `Error::Io` if the listener cannot be set up.
    pub async fn serve(&self) -> Result<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Start the server and run until `signal` completes
    ///
    /// # Errors
    ///
    /// Returns `Error::BindError` or `Error::Io` if the listener cannot be set up.
    pub async fn serve_with_shutdown(&self, signal: impl Future<Output = ()>) -> Result<()> {
        let addr = self.config.address;

        let socket = if addr.is_ipv4() {
            tokio::net::TcpSocket::new_v4()?
        } else {
            tokio::net::TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr).map_err(|source| Error::BindError {
            address: addr.to_string(),
            source,
        })?;

        let listener = socket.listen(1024)?;

        info!("Server listening on http://{}", addr);

        let dispatch = Arc::new(self.dispatch.clone());
        let active = Arc::new(AtomicUsize::new(0));
        let max_body_size = self.config.max_body_size;
        let keep_alive = self.config.keep_alive;

        tokio::pin!(signal);

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    let (stream, remote_addr) = match accept_result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };
                    let io = TokioIo::new(stream);

                    let dispatch = dispatch.clone();
                    let active = active.clone();

                    active.fetch_add(1, Ordering::SeqCst);
                    tokio::task::spawn(async move {
                        let service = service_fn(move |req| {
                            let dispatch = dispatch.clone();
                            async move {
                                handle_request(req, &dispatch, remote_addr, max_body_size).await
                            }
                        });

                        if let Err(err) = http1::Builder::new()
                            .keep_alive(keep_alive)
                            .serve_connection(io, service)
                            .await
                        {
                            debug!("Error serving connection from {}: {:?}", remote_addr, err);
                        }
                        active.fetch_sub(1, Ordering::SeqCst);
                    });
                }
                () = &mut signal => {
                    info!("Shutdown signal received, stopping server...");
                    break;
                }
            }
        }

        let timeout = self.config.shutdown_timeout;
        let drain = async {
            while active.load(Ordering::SeqCst) > 0 {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };
        if tokio::time::timeout(timeout, drain).await.is_err() {
            warn!(
                remaining = active.load(Ordering::SeqCst),
                "Shutdown timeout elapsed with connections still open"
            );
        }
        Ok(())
    }

    /// Execute a request directly without network stack
    pub async fn test_request(
        &self,
        method: Method,
        path: impl Into<String>,
        headers: HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Response {
        if let Some(b) = body.as_ref() {
            if b.len() > self.config.max_body_size {
                return Response::json(r#"{"error": "Payload Too Large"}"#).with_status(413);
            }
        }
        let mut req = Request::new(method, path, headers, body);
        self.dispatch.process(&mut req).await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn handle_request(
    req: hyper::Request<hyper::body::Incoming>,
    dispatch: &Dispatch,
    remote_addr: SocketAddr,
    max_body_size: usize,
) -> std::result::Result<hyper::Response<Full<Bytes>>, Infallible> {
    let mut request = match Request::from_hyper_with_limit(req, max_body_size).await {
        Ok(r) => r,
        Err(e) => {
            warn!(client = %remote_addr, "Rejected request: {}", e);
            let response = match e {
                Error::PayloadTooLarge { .. } => {
                    Response::json(r#"{"error": "Payload Too Large"}"#).with_status(413)
                }
                Error::UnsupportedMethod { .. } => {
                    Response::json(r#"{"error": "Method Not Allowed"}"#).with_status(405)
                }
                _ => Response::json(r#"{"error": "Bad Request"}"#).with_status(400),
            };
            return Ok(response.into_hyper());
        }
    };

    let response = dispatch.process(&mut request).await;
    Ok(response.into_hyper())
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", now.as_nanos(), counter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::CorsMiddleware;

    fn echo_server() -> Server {
        let mut server = Server::new();
        server
            .add_route(
                Method::Get,
                "/api/records/{record_id:int}",
                handler(|req: Request| async move {
                    let id = req.param_int("record_id").unwrap_or_default();
                    Response::json(format!(r#"{{"record_id": {id}}}"#))
                }),
            )
            .unwrap();
        server
            .add_route(
                Method::Post,
                "/api/records",
                handler(|req: Request| async move {
                    let len = req.body_bytes().map_or(0, <[u8]>::len);
                    Response::text(len.to_string()).with_status(201)
                }),
            )
            .unwrap();
        server
    }

    #[test]
    fn test_response_json() {
        let resp = Response::json(r#"{"status": "ok"}"#);
        assert_eq!(resp.status, 200);
        assert_eq!(resp.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_response_json_of() {
        let resp = Response::json_of(201, &serde_json::json!({"record_id": 1}));
        assert_eq!(resp.status, 201);
        assert_eq!(resp.body, r#"{"record_id":1}"#);
    }

    #[test]
    fn test_response_headers_are_case_insensitive() {
        let resp = Response::text("Not Found")
            .with_status(404)
            .with_header("X-Request-Id", "abc");
        assert_eq!(resp.status, 404);
        assert_eq!(resp.header("x-request-id"), Some("abc"));
    }

    #[test]
    fn test_into_hyper() {
        let resp = Response::empty(204).with_header("Allow", "GET").into_hyper();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(resp.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(resp.headers().get("allow").unwrap(), "GET");
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.address.port(), 8000);
        assert!(config.keep_alive);
        assert_eq!(config.max_body_size, 1024 * 1024);
    }

    #[tokio::test]
    async fn test_request_reaches_handler_with_params() {
        let server = echo_server();
        let resp = server
            .test_request(Method::Get, "/api/records/7", HashMap::new(), None)
            .await;
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, r#"{"record_id": 7}"#);
        assert!(resp.header("x-request-id").is_some());
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let server = echo_server();
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), "req-42".to_string());
        let resp = server
            .test_request(Method::Get, "/api/records/7", headers, None)
            .await;
        assert_eq!(resp.header("x-request-id"), Some("req-42"));
    }

    #[tokio::test]
    async fn test_not_found_and_method_not_allowed() {
        let server = echo_server();

        let resp = server
            .test_request(Method::Get, "/api/records/abc", HashMap::new(), None)
            .await;
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body, r#"{"error": "Not Found"}"#);

        let resp = server
            .test_request(Method::Delete, "/api/records", HashMap::new(), None)
            .await;
        assert_eq!(resp.status, 405);
        assert_eq!(resp.header("allow"), Some("POST"));
    }

    #[tokio::test]
    async fn test_body_limit() {
        let mut server = echo_server();
        server.set_max_body_size(4);
        let resp = server
            .test_request(
                Method::Post,
                "/api/records",
                HashMap::new(),
                Some(Bytes::from_static(b"12345")),
            )
            .await;
        assert_eq!(resp.status, 413);

        let resp = server
            .test_request(
                Method::Post,
                "/api/records",
                HashMap::new(),
                Some(Bytes::from_static(b"1234")),
            )
            .await;
        assert_eq!(resp.status, 201);
        assert_eq!(resp.body, "4");
    }

    #[tokio::test]
    async fn test_middleware_runs_on_router_errors() {
        let mut server = echo_server();
        server.add_middleware(CorsMiddleware::new());

        let resp = server
            .test_request(Method::Get, "/nowhere", HashMap::new(), None)
            .await;
        assert_eq!(resp.status, 404);
        assert_eq!(resp.header("access-control-allow-origin"), Some("*"));

        let resp = server
            .test_request(Method::Options, "/api/records", HashMap::new(), None)
            .await;
        assert_eq!(resp.status, 204);
        assert_eq!(resp.header("access-control-allow-origin"), Some("*"));
    }

    #[tokio::test]
    async fn test_serve_stops_on_signal() {
        let server = Server::new().bind(([127, 0, 0, 1], 0).into());
        tokio_test::assert_ok!(server.serve_with_shutdown(async {}).await);
    }

    #[tokio::test]
    async fn test_bind_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Server::new().bind(addr);
        let result = server.serve_with_shutdown(async {}).await;
        assert!(matches!(result, Err(Error::BindError { .. })));
    }
}
