mod common;

use common::{app, count, seed_payload, seeded, send, send_raw};
use sensorlog::envelope::MALFORMED_BODY;
use sensorlog::repository::DUPLICATE_TIMESTAMP;
use sensorlog::schema::HUMIDITY_OUT_OF_RANGE;
use sensorlog_core::Method;
use serde_json::json;

#[tokio::test]
async fn test_index() {
    let server = app().await;
    let resp = send_raw(&server, Method::Get, "/", None).await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, "Hello World!");
    assert!(resp
        .header("content-type")
        .is_some_and(|ct| ct.starts_with("text/plain")));
}

#[tokio::test]
async fn test_create_and_get() {
    let (server, id) = seeded().await;
    assert_eq!(id, 1);

    let (status, body) = send(&server, Method::Get, "/api/records/1", None).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "record": {"record_id": 1, "timestamp": 936_868_149.0, "temperature": 25.0, "humidity": 50.0},
            "errors": {}
        })
    );
}

#[tokio::test]
async fn test_create_assigns_fresh_ids() {
    let (server, first) = seeded().await;
    let (status, body) = send(
        &server,
        Method::Post,
        "/api/records",
        Some(json!({"timestamp": 1.0, "temperature": -5, "humidity": "12.5"})),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["errors"], json!({}));
    assert_eq!(body["record"]["humidity"], 12.5);
    let second = body["record"]["record_id"].as_i64().unwrap();
    assert!(second > first);
}

#[tokio::test]
async fn test_get_missing() {
    let server = app().await;
    let (status, body) = send(&server, Method::Get, "/api/records/42", None).await;
    assert_eq!(status, 404);
    assert_eq!(
        body,
        json!({"record": {}, "errors": {"record_id": "does not exist"}})
    );
}

#[tokio::test]
async fn test_non_numeric_id_is_not_routed() {
    let server = app().await;
    let (status, body) = send(&server, Method::Get, "/api/records/abc", None).await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({"error": "Not Found"}));

    let (status, _) = send(&server, Method::Get, "/api/records/-1", None).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_create_unknown_field() {
    let server = app().await;
    let mut payload = seed_payload();
    payload["sensor"] = json!("kitchen");

    let (status, body) = send(&server, Method::Post, "/api/records", Some(payload)).await;
    assert_eq!(status, 422);
    assert_eq!(
        body,
        json!({"record": {}, "errors": {"sensor": ["Unknown field."]}})
    );
    assert_eq!(count(&server).await, 0);
}

#[tokio::test]
async fn test_create_humidity_out_of_range() {
    let server = app().await;
    for humidity in [-1.0, 100.5] {
        let mut payload = seed_payload();
        payload["humidity"] = json!(humidity);
        let (status, body) = send(&server, Method::Post, "/api/records", Some(payload)).await;
        assert_eq!(status, 422);
        assert_eq!(body["errors"]["humidity"], json!([HUMIDITY_OUT_OF_RANGE]));
    }
    assert_eq!(count(&server).await, 0);
}

#[tokio::test]
async fn test_create_missing_fields() {
    let server = app().await;
    let (status, body) = send(&server, Method::Post, "/api/records", Some(json!({}))).await;
    assert_eq!(status, 422);
    assert_eq!(
        body["errors"],
        json!({
            "humidity": ["Missing data for required field."],
            "temperature": ["Missing data for required field."],
            "timestamp": ["Missing data for required field."]
        })
    );
}

#[tokio::test]
async fn test_create_non_object() {
    let server = app().await;
    let (status, body) = send(&server, Method::Post, "/api/records", Some(json!([1, 2]))).await;
    assert_eq!(status, 422);
    assert_eq!(body["errors"], json!({"_schema": ["Invalid input type."]}));
}

#[tokio::test]
async fn test_create_duplicate_timestamp() {
    let (server, _) = seeded().await;
    let (status, body) = send(&server, Method::Post, "/api/records", Some(seed_payload())).await;
    assert_eq!(status, 422);
    assert_eq!(
        body,
        json!({"record": {}, "errors": {"timestamp": [DUPLICATE_TIMESTAMP]}})
    );
    assert_eq!(count(&server).await, 1);
}

#[tokio::test]
async fn test_malformed_body() {
    let server = app().await;
    let resp = send_raw(&server, Method::Post, "/api/records", Some(b"{not json")).await;
    assert_eq!(resp.status, 400);
    let body: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(body, json!({"message": MALFORMED_BODY}));

    let resp = send_raw(&server, Method::Post, "/api/records", None).await;
    assert_eq!(resp.status, 400);
}

#[tokio::test]
async fn test_update_single_field() {
    let (server, id) = seeded().await;
    let (status, body) = send(
        &server,
        Method::Put,
        &format!("/api/records/{id}"),
        Some(json!({"timestamp": 500.0})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "record": {"record_id": id, "timestamp": 500.0, "temperature": 25.0, "humidity": 50.0},
            "errors": {}
        })
    );

    let (_, body) = send(&server, Method::Get, &format!("/api/records/{id}"), None).await;
    assert_eq!(body["record"]["timestamp"], 500.0);
}

#[tokio::test]
async fn test_update_empty_object_changes_nothing() {
    let (server, id) = seeded().await;
    let (status, body) = send(
        &server,
        Method::Put,
        &format!("/api/records/{id}"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["record"]["timestamp"], 936_868_149.0);
}

#[tokio::test]
async fn test_update_missing_record() {
    let server = app().await;
    let (status, body) = send(
        &server,
        Method::Put,
        "/api/records/9",
        Some(json!({"humidity": 10})),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["errors"], json!({"record_id": "does not exist"}));

    // lookup happens before the body is read
    let resp = send_raw(&server, Method::Put, "/api/records/9", Some(b"garbage")).await;
    assert_eq!(resp.status, 404);
}

#[tokio::test]
async fn test_update_rejects_invalid_fields() {
    let (server, id) = seeded().await;
    let path = format!("/api/records/{id}");

    let (status, body) = send(
        &server,
        Method::Put,
        &path,
        Some(json!({"humidity": 101, "record_id": 7})),
    )
    .await;
    assert_eq!(status, 422);
    assert_eq!(
        body,
        json!({
            "record": {},
            "errors": {
                "humidity": [HUMIDITY_OUT_OF_RANGE],
                "record_id": ["Unknown field."]
            }
        })
    );

    let (_, body) = send(&server, Method::Get, &path, None).await;
    assert_eq!(body["record"]["humidity"], 50.0);

    let resp = send_raw(&server, Method::Put, &path, Some(b"[")).await;
    assert_eq!(resp.status, 400);
}

#[tokio::test]
async fn test_update_duplicate_timestamp() {
    let (server, _) = seeded().await;
    let (_, body) = send(
        &server,
        Method::Post,
        "/api/records",
        Some(json!({"timestamp": 2.0, "temperature": 0, "humidity": 0})),
    )
    .await;
    let second = body["record"]["record_id"].as_i64().unwrap();

    let (status, body) = send(
        &server,
        Method::Put,
        &format!("/api/records/{second}"),
        Some(json!({"timestamp": 936_868_149.0})),
    )
    .await;
    assert_eq!(status, 422);
    assert_eq!(body["errors"], json!({"timestamp": [DUPLICATE_TIMESTAMP]}));
}

#[tokio::test]
async fn test_delete() {
    let (server, id) = seeded().await;
    let path = format!("/api/records/{id}");

    let (status, body) = send(&server, Method::Delete, &path, None).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "record": {"timestamp": 936_868_149.0, "temperature": 25.0, "humidity": 50.0},
            "errors": {}
        })
    );

    let (status, body) = send(&server, Method::Delete, &path, None).await;
    assert_eq!(status, 404);
    assert_eq!(body["errors"], json!({"record_id": "does not exist"}));

    let (status, _) = send(&server, Method::Get, &path, None).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_ids_not_reused_after_delete() {
    let (server, id) = seeded().await;
    send(&server, Method::Delete, &format!("/api/records/{id}"), None).await;

    let (status, body) = send(&server, Method::Post, "/api/records", Some(seed_payload())).await;
    assert_eq!(status, 201);
    assert!(body["record"]["record_id"].as_i64().unwrap() > id);
}

#[tokio::test]
async fn test_range_query() {
    let (server, _) = seeded().await;

    let (status, body) = send(
        &server,
        Method::Get,
        "/api/records?min_timestamp=936868148.0",
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["records"].as_array().unwrap().len(), 1);
    assert_eq!(body["errors"], json!({}));

    let (_, body) = send(
        &server,
        Method::Get,
        "/api/records?min_timestamp=936868150.0",
        None,
    )
    .await;
    assert_eq!(body["records"], json!([]));
}

#[tokio::test]
async fn test_range_query_inclusive_bounds() {
    let (server, _) = seeded().await;
    for query in [
        "min_timestamp=936868149",
        "max_timestamp=936868149",
        "min_timestamp=936868149&max_timestamp=936868149",
    ] {
        let (status, body) = send(&server, Method::Get, &format!("/api/records?{query}"), None).await;
        assert_eq!(status, 200);
        assert_eq!(body["records"].as_array().unwrap().len(), 1, "{query}");
    }

    let (_, body) = send(
        &server,
        Method::Get,
        "/api/records?min_timestamp=936868150&max_timestamp=1",
        None,
    )
    .await;
    assert_eq!(body["records"], json!([]));
}

#[tokio::test]
async fn test_range_query_ordered_by_id() {
    let server = app().await;
    for ts in [30.0, 10.0, 20.0] {
        let payload = json!({"timestamp": ts, "temperature": 1, "humidity": 1});
        send(&server, Method::Post, "/api/records", Some(payload)).await;
    }

    let (_, body) = send(&server, Method::Get, "/api/records", None).await;
    let ids: Vec<i64> = body["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["record_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_range_query_rejects_bad_values() {
    let server = app().await;
    let (status, body) = send(
        &server,
        Method::Get,
        "/api/records?min_timestamp=abc&page=2",
        None,
    )
    .await;
    assert_eq!(status, 422);
    assert_eq!(
        body,
        json!({"records": [], "errors": {"min_timestamp": ["Not a valid number."]}})
    );
}

#[tokio::test]
async fn test_method_not_allowed() {
    let server = app().await;
    let resp = send_raw(&server, Method::Delete, "/api/records", None).await;
    assert_eq!(resp.status, 405);
    let allow = resp.header("allow").unwrap();
    assert!(allow.contains("GET") && allow.contains("POST"));
}

#[tokio::test]
async fn test_cors_headers() {
    let (server, _) = seeded().await;
    let resp = send_raw(&server, Method::Get, "/api/records/1", None).await;
    assert_eq!(resp.header("access-control-allow-origin"), Some("*"));

    let resp = send_raw(&server, Method::Get, "/api/records/77", None).await;
    assert_eq!(resp.status, 404);
    assert_eq!(resp.header("access-control-allow-origin"), Some("*"));

    let resp = send_raw(&server, Method::Options, "/api/records", None).await;
    assert_eq!(resp.status, 204);
    assert_eq!(resp.header("access-control-allow-origin"), Some("*"));
}
