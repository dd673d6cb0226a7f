//! # Validation Module
//!
//! Field-level validation errors for API responses.
//!
//! Errors are collected per field and serialize as a plain map from field
//! name to the list of messages for that field:
//!
//! ```json
//! {"humidity": ["humidity must be between 0 and 100 percent (inclusive)"],
//!  "sensor": ["Unknown field."]}
//! ```
//!
//! Keys are kept sorted so responses are stable.

use serde::Serialize;
use std::collections::BTreeMap;

/// Key for errors that concern the payload as a whole
pub const SCHEMA_KEY: &str = "_schema";

/// Message for a missing required field
pub const REQUIRED: &str = "Missing data for required field.";
/// Message for a field the schema does not declare
pub const UNKNOWN_FIELD: &str = "Unknown field.";
/// Message for a value that is not a number
pub const NOT_A_NUMBER: &str = "Not a valid number.";
/// Message for an explicit `null`
pub const NOT_NULL: &str = "Field may not be null.";
/// Message for NaN and infinities where they are not accepted
pub const SPECIAL_NUMBER: &str = "Special numeric values (nan or infinity) are not permitted.";
/// Message for a payload that is not a mapping
pub const INVALID_INPUT_TYPE: &str = "Invalid input type.";

/// Collection of validation errors keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Create an empty error collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection holding a single message
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Append a message for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Add a "required field" error
    pub fn add_required(&mut self, field: impl Into<String>) {
        self.add(field, REQUIRED);
    }

    /// Add an "unknown field" error
    pub fn add_unknown(&mut self, field: impl Into<String>) {
        self.add(field, UNKNOWN_FIELD);
    }

    /// Messages recorded for a field
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Whether a field has any error
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Check if there are any errors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with errors
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over `(field, messages)` in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`
    ///
    /// # Errors
    ///
    /// Returns the collection itself when it holds any error.
    pub fn into_result<T>(self, value: T) -> ValidationResult<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Result type for validation operations
pub type ValidationResult<T> = std::result::Result<T, ValidationErrors>;
