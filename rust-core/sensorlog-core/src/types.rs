//! # Path Parameter Types
//!
//! Declared types for path segments (`{record_id:int}`) and their conversion.
//! A segment that fails conversion does not match the route at all, so a
//! handler registered for `{id:int}` only ever sees integers.

use crate::error::{Error, Result};
use std::fmt;

/// Supported path parameter types
///
/// Default is `String`, which performs no conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamType {
    /// Raw segment
    #[default]
    String,
    /// Non-negative decimal integer (digits only), stored as i64
    Int,
    /// Floating point number
    Float,
}

impl ParamType {
    /// Parse type specifier from route pattern (e.g., "int" from "{id:int}")
    ///
    /// Unknown specifiers fall back to `String`.
    #[must_use]
    pub fn from_specifier(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "int" | "integer" | "i64" => Self::Int,
            "float" | "f64" | "number" => Self::Float,
            _ => Self::String,
        }
    }

    /// Get the type name for error messages
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Converted parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Unconverted segment
    String(String),
    /// Integer segment
    Int(i64),
    /// Float segment
    Float(f64),
}

impl ParamValue {
    /// Get as i64 if Int variant
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if Float variant
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as str if String variant
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Convert a raw path segment to the declared type
///
/// # Errors
///
/// Returns `Error::InvalidParam` if the segment does not fit the type.
pub fn convert_param(raw: &str, param_type: ParamType) -> Result<ParamValue> {
    let invalid = || Error::InvalidParam {
        value: raw.to_string(),
        expected: param_type.type_name(),
    };

    match param_type {
        ParamType::String => Ok(ParamValue::String(raw.to_string())),
        ParamType::Int => {
            // Signs and whitespace are not part of an identifier segment
            if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            raw.parse::<i64>().map(ParamValue::Int).map_err(|_| invalid())
        }
        ParamType::Float => match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(ParamValue::Float(f)),
            _ => Err(invalid()),
        },
    }
}

/// Split a `{name}` or `{name:type}` path segment
///
/// Returns `None` for static segments.
#[must_use]
pub fn parse_param_pattern(segment: &str) -> Option<(String, ParamType)> {
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;

    Some(match inner.split_once(':') {
        Some((name, type_spec)) => (name.to_string(), ParamType::from_specifier(type_spec)),
        None => (inner.to_string(), ParamType::String),
    })
}
