#![allow(dead_code)]

use sensorlog::{build_server, storage, SqlRecordRepository};
use sensorlog_core::server::Bytes;
use sensorlog_core::{DatabasePool, Method, Response, Server, ServerConfig};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Server over a fresh, migrated in-memory database
pub async fn app() -> Server {
    let pool = DatabasePool::connect("sqlite::memory:", None)
        .await
        .expect("in-memory database");
    storage::migrate(&pool).await.expect("migrations");
    build_server(
        ServerConfig::default(),
        "*",
        Arc::new(SqlRecordRepository::new(pool)),
    )
    .expect("routes")
}

pub fn seed_payload() -> Value {
    json!({"timestamp": 936_868_149.0, "temperature": 25.0, "humidity": 50.0})
}

/// Server holding the seed record, and the seed's id
pub async fn seeded() -> (Server, i64) {
    let server = app().await;
    let (status, body) = send(&server, Method::Post, "/api/records", Some(seed_payload())).await;
    assert_eq!(status, 201, "seed failed: {body}");
    let id = body["record"]["record_id"].as_i64().expect("record_id");
    (server, id)
}

/// Send raw bytes
pub async fn send_raw(
    server: &Server,
    method: Method,
    path: &str,
    body: Option<&'static [u8]>,
) -> Response {
    server
        .test_request(method, path, HashMap::new(), body.map(Bytes::from_static))
        .await
}

/// Send an optional JSON body and decode the JSON response
pub async fn send(server: &Server, method: Method, path: &str, body: Option<Value>) -> (u16, Value) {
    let body = body.map(|b| Bytes::from(b.to_string()));
    let response = server
        .test_request(method, path, HashMap::new(), body)
        .await;
    let decoded = serde_json::from_str(&response.body).unwrap_or(Value::Null);
    (response.status, decoded)
}

pub async fn count(server: &Server) -> usize {
    let (_, body) = send(server, Method::Get, "/api/records", None).await;
    body["records"].as_array().map_or(0, Vec::len)
}
