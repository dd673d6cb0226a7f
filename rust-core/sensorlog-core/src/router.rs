//! # Router
//!
//! Radix-trie based router using `matchit`, one trie per HTTP method.
//!
//! ## Features
//!
//! - Path parameter extraction (`/api/records/{record_id}`)
//! - Typed parameters (`/api/records/{record_id:int}`); a segment that does
//!   not convert is treated as a non-match
//! - Distinguishes an unknown path (404) from a known path requested with the
//!   wrong method (405)

use crate::error::{Error, Result};
use crate::route::RouteInfo;
use crate::types::{convert_param, ParamValue};
use matchit::Router as MatchitRouter;
use std::collections::HashMap;

/// HTTP methods supported by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP DELETE
    Delete,
    /// HTTP PATCH
    Patch,
    /// HTTP HEAD
    Head,
    /// HTTP OPTIONS
    Options,
}

impl Method {
    /// Every routable method, in `Allow` header order
    pub const ALL: [Self; 7] = [
        Self::Get,
        Self::Head,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Options,
    ];

    /// Canonical upper-case method name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// Map a hyper method, `None` for extension methods
    #[must_use]
    pub fn from_hyper(method: &hyper::Method) -> Option<Self> {
        match *method {
            hyper::Method::GET => Some(Self::Get),
            hyper::Method::POST => Some(Self::Post),
            hyper::Method::PUT => Some(Self::Put),
            hyper::Method::DELETE => Some(Self::Delete),
            hyper::Method::PATCH => Some(Self::Patch),
            hyper::Method::HEAD => Some(Self::Head),
            hyper::Method::OPTIONS => Some(Self::Options),
            _ => None,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route handler identifier
pub type HandlerId = usize;

/// Matched route with converted parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// The handler ID for this route
    pub handler_id: HandlerId,
    /// Typed path parameters
    pub params: HashMap<String, ParamValue>,
}

impl Match {
    /// Get a parameter by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Get a parameter as i64
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.params.get(name).and_then(ParamValue::as_int)
    }

    /// Get a parameter as f64
    #[must_use]
    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.params.get(name).and_then(ParamValue::as_float)
    }
}

/// HTTP router
#[derive(Clone, Default)]
pub struct Router {
    /// Per-method tries
    method_routes: HashMap<Method, MatchitRouter<HandlerId>>,
    /// Route metadata indexed by handler ID
    routes: Vec<RouteInfo>,
}

impl Router {
    /// Create a new empty router
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route with the given method and path pattern
    ///
    /// Handler IDs are assigned sequentially from zero.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRoutePattern` if the pattern is malformed or
    /// conflicts with an existing route for the same method.
    pub fn add_route(&mut self, method: Method, path: &str) -> Result<HandlerId> {
        let handler_id = self.routes.len();
        let route_info = RouteInfo::new(handler_id, path);

        self.method_routes
            .entry(method)
            .or_default()
            .insert(route_info.match_pattern.clone(), handler_id)
            .map_err(|e| Error::InvalidRoutePattern {
                pattern: path.to_string(),
                reason: e.to_string(),
            })?;

        self.routes.push(route_info);
        Ok(handler_id)
    }

    /// Match a request against registered routes
    ///
    /// # Errors
    ///
    /// Returns `Error::MethodNotAllowed` if the path is routed for other
    /// methods only, `Error::RouteNotFound` if it is not routed at all.
    pub fn match_route(&self, method: Method, path: &str) -> Result<Match> {
        if let Some(matched) = self
            .method_routes
            .get(&method)
            .and_then(|trie| self.resolve(trie, path))
        {
            return Ok(matched);
        }

        let allowed = self.allowed_methods(path);
        if allowed.is_empty() {
            Err(Error::RouteNotFound {
                path: path.to_string(),
            })
        } else {
            Err(Error::MethodNotAllowed {
                method,
                path: path.to_string(),
                allowed,
            })
        }
    }

    /// Methods for which `path` resolves to a handler
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        Method::ALL
            .into_iter()
            .filter(|method| {
                self.method_routes
                    .get(method)
                    .and_then(|trie| self.resolve(trie, path))
                    .is_some()
            })
            .collect()
    }

    /// Route metadata for a handler
    #[must_use]
    pub fn route(&self, handler_id: HandlerId) -> Option<&RouteInfo> {
        self.routes.get(handler_id)
    }

    fn resolve(&self, trie: &MatchitRouter<HandlerId>, path: &str) -> Option<Match> {
        let matched = trie.at(path).ok()?;
        let handler_id = *matched.value;
        let route_info = self.routes.get(handler_id)?;

        let mut params = HashMap::new();
        for (name, raw) in matched.params.iter() {
            let value = convert_param(raw, route_info.param_type(name)).ok()?;
            params.insert(name.to_string(), value);
        }

        Some(Match { handler_id, params })
    }

    /// Convenience method to add a GET route
    ///
    /// # Errors
    ///
    /// See [`Router::add_route`].
    pub fn get(&mut self, path: &str) -> Result<HandlerId> {
        self.add_route(Method::Get, path)
    }

    /// Convenience method to add a POST route
    ///
    /// # Errors
    ///
    /// See [`Router::add_route`].
    pub fn post(&mut self, path: &str) -> Result<HandlerId> {
        self.add_route(Method::Post, path)
    }

    /// Convenience method to add a PUT route
    ///
    /// # Errors
    ///
    /// See [`Router::add_route`].
    pub fn put(&mut self, path: &str) -> Result<HandlerId> {
        self.add_route(Method::Put, path)
    }

    /// Convenience method to add a DELETE route
    ///
    /// # Errors
    ///
    /// See [`Router::add_route`].
    pub fn delete(&mut self, path: &str) -> Result<HandlerId> {
        self.add_route(Method::Delete, path)
    }
}
