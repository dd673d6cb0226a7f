//! # Schemas
//!
//! Turn untrusted JSON bodies and query strings into typed values.
//!
//! Every field is checked and every problem is collected before returning,
//! so a client sees all of its mistakes in one response.

use crate::record::{RecordPatch, RecordValues, HUMIDITY_RANGE};
use sensorlog_core::validation::{
    ValidationErrors, ValidationResult, INVALID_INPUT_TYPE, NOT_A_NUMBER, NOT_NULL, SCHEMA_KEY,
    SPECIAL_NUMBER,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Fields a record payload may carry
pub const RECORD_FIELDS: [&str; 3] = ["timestamp", "temperature", "humidity"];

/// Message for a humidity outside [`HUMIDITY_RANGE`]
pub const HUMIDITY_OUT_OF_RANGE: &str = "humidity must be between 0 and 100 percent (inclusive)";

/// Validate a creation payload: all three fields are required.
///
/// # Errors
///
/// Returns every field error found in `input`.
pub fn load_record(input: &Value) -> ValidationResult<RecordValues> {
    let (patch, mut errors) = load_fields(input)?;
    for field in RECORD_FIELDS {
        if !present(input, field) {
            errors.add_required(field);
        }
    }

    match patch.complete() {
        Some(values) if errors.is_empty() => Ok(values),
        _ => Err(errors),
    }
}

/// Validate a partial update payload: any subset of fields, including none.
///
/// # Errors
///
/// Returns every field error found in `input`.
pub fn load_patch(input: &Value) -> ValidationResult<RecordPatch> {
    let (patch, errors) = load_fields(input)?;
    errors.into_result(patch)
}

fn present(input: &Value, field: &str) -> bool {
    input.as_object().is_some_and(|o| o.contains_key(field))
}

fn load_fields(input: &Value) -> ValidationResult<(RecordPatch, ValidationErrors)> {
    let Value::Object(object) = input else {
        return Err(ValidationErrors::single(SCHEMA_KEY, INVALID_INPUT_TYPE));
    };

    let mut errors = ValidationErrors::new();
    for key in object.keys() {
        if !RECORD_FIELDS.contains(&key.as_str()) {
            errors.add_unknown(key.as_str());
        }
    }

    let patch = RecordPatch {
        timestamp: field(object, "timestamp", &mut errors),
        temperature: field(object, "temperature", &mut errors),
        humidity: field(object, "humidity", &mut errors)
            .filter(|h| check_humidity(*h, &mut errors)),
    };
    Ok((patch, errors))
}

fn field(object: &Map<String, Value>, name: &str, errors: &mut ValidationErrors) -> Option<f64> {
    let value = object.get(name)?;
    match number(value) {
        Ok(n) => Some(n),
        Err(message) => {
            errors.add(name, message);
            None
        }
    }
}

fn check_humidity(humidity: f64, errors: &mut ValidationErrors) -> bool {
    let ok = HUMIDITY_RANGE.contains(&humidity);
    if !ok {
        errors.add("humidity", HUMIDITY_OUT_OF_RANGE);
    }
    ok
}

/// A finite float from a JSON number or a numeric string
fn number(value: &Value) -> Result<f64, &'static str> {
    let n = match value {
        Value::Null => return Err(NOT_NULL),
        Value::Number(n) => n.as_f64().ok_or(NOT_A_NUMBER)?,
        Value::String(s) => parse_float(s)?,
        _ => return Err(NOT_A_NUMBER),
    };
    if n.is_finite() {
        Ok(n)
    } else {
        Err(SPECIAL_NUMBER)
    }
}

fn parse_float(raw: &str) -> Result<f64, &'static str> {
    raw.trim().parse::<f64>().map_err(|_| NOT_A_NUMBER)
}

/// Inclusive timestamp bounds for the collection query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeQuery {
    /// Lower bound, default `0`
    pub min_timestamp: f64,
    /// Upper bound, default `+inf`
    pub max_timestamp: f64,
}

impl Default for RangeQuery {
    fn default() -> Self {
        Self {
            min_timestamp: 0.0,
            max_timestamp: f64::INFINITY,
        }
    }
}

impl RangeQuery {
    /// Whether `timestamp` falls within the bounds
    pub fn contains(&self, timestamp: f64) -> bool {
        self.min_timestamp <= timestamp && timestamp <= self.max_timestamp
    }
}

/// Read `min_timestamp` and `max_timestamp` from decoded query parameters.
///
/// Missing bounds take their defaults, infinities are accepted and NaN is
/// not. Other parameters are ignored.
///
/// # Errors
///
/// Returns an error per bound that is not a number.
pub fn load_range_query(params: &HashMap<String, String>) -> ValidationResult<RangeQuery> {
    let mut query = RangeQuery::default();
    let mut errors = ValidationErrors::new();

    for (name, slot) in [
        ("min_timestamp", &mut query.min_timestamp),
        ("max_timestamp", &mut query.max_timestamp),
    ] {
        let Some(raw) = params.get(name) else {
            continue;
        };
        match parse_float(raw) {
            Ok(n) if n.is_nan() => errors.add(name, SPECIAL_NUMBER),
            Ok(n) => *slot = n,
            Err(message) => errors.add(name, message),
        }
    }

    errors.into_result(query)
}
