//! Response envelopes.
//!
//! Single-record responses are `{"record": ..., "errors": ...}` and list
//! responses are `{"records": [...], "errors": ...}`. On failure the payload
//! is empty (`{}` or `[]`). On success `errors` is `{}`.

use crate::record::Record;
use sensorlog_core::validation::SCHEMA_KEY;
use sensorlog_core::{Response, ValidationErrors};
use serde::Serialize;

/// Body of a 400 for an absent or unparsable JSON body
pub const MALFORMED_BODY: &str =
    "The browser (or proxy) sent a request that this server could not understand.";

/// Message for storage failures that are not the client's fault
pub const STORAGE_FAILURE: &str = "Internal storage error.";

#[derive(Serialize)]
struct Empty {}

#[derive(Serialize)]
#[serde(untagged)]
enum Errors {
    Fields(ValidationErrors),
    NotFound { record_id: &'static str },
}

#[derive(Serialize)]
struct RecordEnvelope<T> {
    record: T,
    errors: Errors,
}

#[derive(Serialize)]
struct RecordsEnvelope<'a> {
    records: &'a [Record],
    errors: ValidationErrors,
}

#[derive(Serialize)]
struct Message {
    message: &'static str,
}

/// `status` with `{"record": record, "errors": {}}`
pub fn record_response<T: Serialize>(status: u16, record: &T) -> Response {
    Response::json_of(
        status,
        &RecordEnvelope {
            record,
            errors: Errors::Fields(ValidationErrors::new()),
        },
    )
}

/// `status` with `{"record": {}, "errors": errors}`
pub fn record_errors(status: u16, errors: ValidationErrors) -> Response {
    Response::json_of(
        status,
        &RecordEnvelope {
            record: Empty {},
            errors: Errors::Fields(errors),
        },
    )
}

/// 404 for an unknown record id
pub fn not_found() -> Response {
    Response::json_of(
        404,
        &RecordEnvelope {
            record: Empty {},
            errors: Errors::NotFound {
                record_id: "does not exist",
            },
        },
    )
}

/// 200 with the listed records
pub fn records_response(records: &[Record]) -> Response {
    Response::json_of(
        200,
        &RecordsEnvelope {
            records,
            errors: ValidationErrors::new(),
        },
    )
}

/// `status` with `{"records": [], "errors": errors}`
pub fn records_errors(status: u16, errors: ValidationErrors) -> Response {
    Response::json_of(
        status,
        &RecordsEnvelope {
            records: &[],
            errors,
        },
    )
}

/// 400 for a body that is not JSON
pub fn malformed_body() -> Response {
    Response::json_of(
        400,
        &Message {
            message: MALFORMED_BODY,
        },
    )
}

/// 500 for a single-record route
pub fn storage_failure() -> Response {
    record_errors(500, ValidationErrors::single(SCHEMA_KEY, STORAGE_FAILURE))
}

/// 500 for the list route
pub fn records_storage_failure() -> Response {
    records_errors(500, ValidationErrors::single(SCHEMA_KEY, STORAGE_FAILURE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn body(response: &Response) -> Value {
        serde_json::from_str(&response.body).unwrap()
    }

    fn record() -> Record {
        Record {
            record_id: 1,
            timestamp: 936_868_149.0,
            temperature: 25.0,
            humidity: 50.0,
        }
    }

    #[test]
    fn test_record_response() {
        let resp = record_response(201, &record());
        assert_eq!(resp.status, 201);
        assert_eq!(
            body(&resp),
            json!({
                "record": {"record_id": 1, "timestamp": 936_868_149.0, "temperature": 25.0, "humidity": 50.0},
                "errors": {}
            })
        );
    }

    #[test]
    fn test_record_errors() {
        let resp = record_errors(422, ValidationErrors::single("humidity", "bad"));
        assert_eq!(resp.status, 422);
        assert_eq!(
            body(&resp),
            json!({"record": {}, "errors": {"humidity": ["bad"]}})
        );
    }

    #[test]
    fn test_not_found() {
        let resp = not_found();
        assert_eq!(resp.status, 404);
        assert_eq!(
            body(&resp),
            json!({"record": {}, "errors": {"record_id": "does not exist"}})
        );
    }

    #[test]
    fn test_records_envelopes() {
        let resp = records_response(&[record()]);
        assert_eq!(resp.status, 200);
        assert_eq!(body(&resp)["records"][0]["record_id"], 1);
        assert_eq!(body(&resp)["errors"], json!({}));

        let resp = records_errors(422, ValidationErrors::single("min_timestamp", "x"));
        assert_eq!(
            body(&resp),
            json!({"records": [], "errors": {"min_timestamp": ["x"]}})
        );
    }

    #[test]
    fn test_malformed_body() {
        let resp = malformed_body();
        assert_eq!(resp.status, 400);
        assert_eq!(body(&resp), json!({"message": MALFORMED_BODY}));
    }

    #[test]
    fn test_storage_failures() {
        let resp = storage_failure();
        assert_eq!(resp.status, 500);
        assert_eq!(
            body(&resp),
            json!({"record": {}, "errors": {"_schema": [STORAGE_FAILURE]}})
        );
        assert_eq!(body(&records_storage_failure())["records"], json!([]));
    }
}
