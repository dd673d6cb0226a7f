//! # Record Resources
//!
//! HTTP handlers for the records API:
//!
//! - `GET /` - liveness text
//! - `GET /api/records` - range query over timestamp
//! - `POST /api/records` - create
//! - `GET|PUT|DELETE /api/records/{record_id}` - single record
//!
//! Handlers never fail: every outcome, including storage errors, becomes a
//! response envelope.

use crate::envelope;
use crate::repository::{RecordRepository, RepositoryError};
use crate::schema::{load_patch, load_range_query, load_record};
use sensorlog_core::{handler, Method, Request, Response, Server};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Collection route
pub const RECORDS_PATH: &str = "/api/records";
/// Single-record route, digits only
pub const RECORD_PATH: &str = "/api/records/{record_id:int}";

type Repository = Arc<dyn RecordRepository>;

/// Register every record route on `server`.
///
/// # Errors
///
/// Returns `Error::InvalidRoutePattern` if a route cannot be added.
pub fn register(server: &mut Server, repository: &Repository) -> sensorlog_core::Result<()> {
    server.add_route(Method::Get, "/", handler(|_req: Request| index()))?;

    let repo = repository.clone();
    server.add_route(
        Method::Get,
        RECORDS_PATH,
        handler(move |req| list_records(repo.clone(), req)),
    )?;
    let repo = repository.clone();
    server.add_route(
        Method::Post,
        RECORDS_PATH,
        handler(move |req| create_record(repo.clone(), req)),
    )?;
    let repo = repository.clone();
    server.add_route(
        Method::Get,
        RECORD_PATH,
        handler(move |req| get_record(repo.clone(), req)),
    )?;
    let repo = repository.clone();
    server.add_route(
        Method::Put,
        RECORD_PATH,
        handler(move |req| update_record(repo.clone(), req)),
    )?;
    let repo = repository.clone();
    server.add_route(
        Method::Delete,
        RECORD_PATH,
        handler(move |req| delete_record(repo.clone(), req)),
    )?;
    Ok(())
}

async fn index() -> Response {
    Response::text("Hello World!")
}

async fn list_records(repo: Repository, req: Request) -> Response {
    let query = match load_range_query(req.query_map()) {
        Ok(query) => query,
        Err(errors) => {
            debug!(%errors, "Rejected range query");
            return envelope::records_errors(422, errors);
        }
    };

    match repo
        .query_range(query.min_timestamp, query.max_timestamp)
        .await
    {
        Ok(records) => {
            debug!(
                min = query.min_timestamp,
                max = query.max_timestamp,
                count = records.len(),
                "Listed records"
            );
            envelope::records_response(&records)
        }
        Err(err) => {
            error!(error = %err, "Failed to list records");
            envelope::records_storage_failure()
        }
    }
}

async fn create_record(repo: Repository, req: Request) -> Response {
    let Some(body) = json_body(&req) else {
        return envelope::malformed_body();
    };
    let values = match load_record(&body) {
        Ok(values) => values,
        Err(errors) => {
            debug!(%errors, "Rejected new record");
            return envelope::record_errors(422, errors);
        }
    };

    match repo.insert(values).await {
        Ok(record) => envelope::record_response(201, &record),
        Err(err) => write_failure(&err),
    }
}

async fn get_record(repo: Repository, req: Request) -> Response {
    let Some(record_id) = req.param_int("record_id") else {
        return envelope::not_found();
    };

    match repo.find(record_id).await {
        Ok(Some(record)) => envelope::record_response(200, &record),
        Ok(None) => envelope::not_found(),
        Err(err) => {
            error!(record_id, error = %err, "Failed to load record");
            envelope::storage_failure()
        }
    }
}

async fn update_record(repo: Repository, req: Request) -> Response {
    let Some(record_id) = req.param_int("record_id") else {
        return envelope::not_found();
    };

    let mut record = match repo.find(record_id).await {
        Ok(Some(record)) => record,
        Ok(None) => return envelope::not_found(),
        Err(err) => {
            error!(record_id, error = %err, "Failed to load record");
            return envelope::storage_failure();
        }
    };

    let Some(body) = json_body(&req) else {
        return envelope::malformed_body();
    };
    let patch = match load_patch(&body) {
        Ok(patch) => patch,
        Err(errors) => {
            debug!(record_id, %errors, "Rejected record update");
            return envelope::record_errors(422, errors);
        }
    };

    record.apply(&patch);
    match repo.update(record).await {
        Ok(Some(updated)) => envelope::record_response(200, &updated),
        Ok(None) => envelope::not_found(),
        Err(err) => write_failure(&err),
    }
}

async fn delete_record(repo: Repository, req: Request) -> Response {
    let Some(record_id) = req.param_int("record_id") else {
        return envelope::not_found();
    };

    match repo.delete(record_id).await {
        Ok(Some(record)) => {
            debug!(record_id, "Record deleted");
            envelope::record_response(200, &record.values())
        }
        Ok(None) => envelope::not_found(),
        Err(err) => {
            error!(record_id, error = %err, "Failed to delete record");
            envelope::storage_failure()
        }
    }
}

/// Parsed JSON body, `None` when absent or malformed
fn json_body(req: &Request) -> Option<Value> {
    match req.json::<Value>() {
        Ok(body) => Some(body),
        Err(e) => {
            warn!(path = %req.path, "Malformed request body: {}", e);
            None
        }
    }
}

fn write_failure(err: &RepositoryError) -> Response {
    if let Some(errors) = err.field_errors() {
        warn!(error = %err, "Write rejected by storage");
        envelope::record_errors(422, errors)
    } else {
        error!(error = %err, "Failed to write record");
        envelope::storage_failure()
    }
}
