//! Sensor record types.
use serde::Serialize;
use std::ops::RangeInclusive;

/// Accepted relative humidity, in percent.
pub const HUMIDITY_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// One persisted sensor observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, sqlx::FromRow)]
pub struct Record {
    /// Storage-assigned identifier, never reused.
    pub record_id: i64,
    /// Time of the observation, seconds since the epoch. Unique across records.
    pub timestamp: f64,
    /// Temperature in degrees celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

impl Record {
    /// The record's values without its identifier.
    pub const fn values(&self) -> RecordValues {
        RecordValues {
            timestamp: self.timestamp,
            temperature: self.temperature,
            humidity: self.humidity,
        }
    }

    /// Overwrite the fields present in `patch`, leaving the others untouched.
    pub fn apply(&mut self, patch: &RecordPatch) {
        if let Some(timestamp) = patch.timestamp {
            self.timestamp = timestamp;
        }
        if let Some(temperature) = patch.temperature {
            self.temperature = temperature;
        }
        if let Some(humidity) = patch.humidity {
            self.humidity = humidity;
        }
    }
}

/// A complete set of record values, as accepted on creation and returned
/// after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordValues {
    /// Time of the observation, seconds since the epoch.
    pub timestamp: f64,
    /// Temperature in degrees celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

impl RecordValues {
    /// Attach an identifier.
    pub const fn with_id(self, record_id: i64) -> Record {
        Record {
            record_id,
            timestamp: self.timestamp,
            temperature: self.temperature,
            humidity: self.humidity,
        }
    }
}

/// A partial update: only `Some` fields change.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecordPatch {
    /// New timestamp.
    pub timestamp: Option<f64>,
    /// New temperature.
    pub temperature: Option<f64>,
    /// New humidity.
    pub humidity: Option<f64>,
}

impl RecordPatch {
    /// Whether the patch changes nothing.
    pub const fn is_empty(&self) -> bool {
        self.timestamp.is_none() && self.temperature.is_none() && self.humidity.is_none()
    }

    /// Complete values when every field is present.
    pub const fn complete(&self) -> Option<RecordValues> {
        match (self.timestamp, self.temperature, self.humidity) {
            (Some(timestamp), Some(temperature), Some(humidity)) => Some(RecordValues {
                timestamp,
                temperature,
                humidity,
            }),
            _ => None,
        }
    }
}
