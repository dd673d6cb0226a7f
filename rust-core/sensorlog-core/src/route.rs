//! # Route Metadata
//!
//! Holds what the router needs to know about a single registered route.

use crate::router::HandlerId;
use crate::types::{parse_param_pattern, ParamType};
use std::collections::HashMap;

/// Route metadata containing handler and parameter type information
#[derive(Debug, Clone)]
pub struct RouteInfo {
    /// Unique handler identifier
    pub handler_id: HandlerId,
    /// Original path pattern (e.g., "/api/records/{record_id:int}")
    pub path_pattern: String,
    /// Normalized path for matchit (e.g., "/api/records/{record_id}")
    pub match_pattern: String,
    /// Parameter name to type mapping
    pub param_types: HashMap<String, ParamType>,
}

impl RouteInfo {
    /// Create route metadata from a path pattern
    ///
    /// `{name:type}` segments are rewritten to `{name}` for matchit and their
    /// types recorded.
    #[must_use]
    pub fn new(handler_id: HandlerId, path: &str) -> Self {
        let mut param_types = HashMap::new();
        let segments: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match parse_param_pattern(segment) {
                Some((name, param_type)) => {
                    let normalized = format!("{{{name}}}");
                    param_types.insert(name, param_type);
                    normalized
                }
                None => segment.to_string(),
            })
            .collect();

        Self {
            handler_id,
            path_pattern: path.to_string(),
            match_pattern: format!("/{}", segments.join("/")),
            param_types,
        }
    }

    /// Declared type of a parameter, `ParamType::String` when undeclared
    #[must_use]
    pub fn param_type(&self, name: &str) -> ParamType {
        self.param_types.get(name).copied().unwrap_or_default()
    }
}
