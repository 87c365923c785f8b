use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use home_inv::{app, connect, ensure_tables, AppState, Settings};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> Router {
    let settings = Settings::in_memory();
    let pool = connect(&settings).await.expect("connect in-memory database");
    ensure_tables(&pool).await.expect("create tables");
    app(AppState { pool }, &settings)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_item(app: &Router, body: Value) -> Value {
    let (status, res) = send(app, Method::POST, "/items", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", res);
    res["data"].clone()
}

#[tokio::test]
async fn health_and_ready() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["states"], 2);
    let (status, body) = send(&app, Method::GET, "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "home-inv");
}

#[tokio::test]
async fn not_ready_without_schema() {
    let settings = Settings::in_memory();
    let pool = connect(&settings).await.unwrap();
    let app = app(AppState { pool }, &settings);
    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["database"], "unavailable");
}

#[tokio::test]
async fn item_lifecycle() {
    let app = test_app().await;
    let created = create_item(&app, json!({"name": "Sleeping bag", "quantity": 2, "location": "Attic"})).await;
    let id = created["item_id"].as_i64().unwrap();
    assert_eq!(created["quantity"], 2);
    assert_eq!(created["tags"], json!([]));

    let (status, read) = send(&app, Method::GET, &format!("/items/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["data"], created);

    let (status, patched) = send(
        &app,
        Method::PATCH,
        &format!("/items/{}", id),
        Some(json!({"comment": "zip is broken", "state_id": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["data"]["comment"], "zip is broken");
    assert_eq!(patched["data"]["state_name"], "not stored");
    assert_eq!(patched["data"]["location"], "Attic");

    let (status, replaced) = send(
        &app,
        Method::PUT,
        &format!("/items/{}", id),
        Some(json!({"name": "Sleeping bag (winter)"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["data"]["quantity"], 1);
    assert_eq!(replaced["data"]["location"], Value::Null);
    assert_eq!(replaced["data"]["state_id"], Value::Null);

    let (status, events) = send(&app, Method::GET, &format!("/items/{}/events", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events["meta"]["count"], 3);

    let (status, _) = send(&app, Method::DELETE, &format!("/items/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, Method::GET, &format!("/items/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn invalid_payload_lists_every_field_and_writes_nothing() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/items",
        Some(json!({"name": "", "quantity": -5, "label_id": "x", "extra": true})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_error");
    let mut fields: Vec<String> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap().to_string())
        .collect();
    fields.sort();
    assert_eq!(fields, vec!["extra", "label_id", "name", "quantity"]);

    let (_, list) = send(&app, Method::GET, "/items", None).await;
    assert_eq!(list["meta"]["count"], 0);
}

#[tokio::test]
async fn malformed_json_and_ids_are_bad_requests() {
    let app = test_app().await;
    let req = Request::builder()
        .method(Method::POST)
        .uri("/items")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/items/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, Method::GET, "/items/-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn updating_missing_item_is_not_found() {
    let app = test_app().await;
    let (status, _) = send(&app, Method::PATCH, "/items/42", Some(json!({"name": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, "/items/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn containment_and_children() {
    let app = test_app().await;
    let shelf = create_item(&app, json!({"name": "Shelf"})).await;
    let shelf_id = shelf["item_id"].as_i64().unwrap();
    create_item(&app, json!({"name": "Glue", "parent_item_id": shelf_id})).await;
    create_item(&app, json!({"name": "Tape", "parent_item_id": shelf_id})).await;

    let (_, children) = send(&app, Method::GET, &format!("/items/{}/children", shelf_id), None).await;
    assert_eq!(children["meta"]["count"], 2);

    let (_, shelf) = send(&app, Method::GET, &format!("/items/{}", shelf_id), None).await;
    assert_eq!(shelf["data"]["children_count"], 2);

    let (status, body) = send(&app, Method::DELETE, &format!("/items/{}", shelf_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");

    let (_, roots) = send(&app, Method::GET, "/items?root=true", None).await;
    assert_eq!(roots["meta"]["count"], 1);

    let (status, _) = send(&app, Method::GET, "/items?limit=0", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn tags_and_labels() {
    let app = test_app().await;
    let (status, tag) = send(&app, Method::POST, "/tags", Some(json!({"tag_name": "electronics"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let tag_id = tag["data"]["tag_id"].as_i64().unwrap();
    let (status, _) = send(&app, Method::POST, "/tags", Some(json!({"tag_name": "electronics"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, labels) = send(&app, Method::POST, "/labels", Some(json!({"count": 2}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(labels["meta"]["count"], 2);
    let label_id = labels["data"][0]["label_id"].as_i64().unwrap();

    let radio = create_item(&app, json!({"name": "Radio", "label_id": label_id})).await;
    let radio_id = radio["item_id"].as_i64().unwrap();

    let (status, tagged) = send(
        &app,
        Method::PUT,
        &format!("/items/{}/tags/{}", radio_id, tag_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tagged["data"]["tags"][0]["tag_name"], "electronics");

    let (_, by_tag) = send(&app, Method::GET, &format!("/items?tag_id={}", tag_id), None).await;
    assert_eq!(by_tag["meta"]["count"], 1);

    let (status, scanned) = send(&app, Method::GET, &format!("/labels/{}/item", label_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scanned["data"]["item_id"], radio_id);

    let (status, _) = send(&app, Method::POST, "/items", Some(json!({"name": "TV", "label_id": label_id}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, free) = send(&app, Method::GET, "/labels?unassigned=true", None).await;
    assert_eq!(free["meta"]["count"], 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/tags/{}", tag_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, radio) = send(&app, Method::GET, &format!("/items/{}", radio_id), None).await;
    assert_eq!(radio["data"]["tags"], json!([]));
}

#[tokio::test]
async fn states_are_seeded() {
    let app = test_app().await;
    let (status, states) = send(&app, Method::GET, "/states", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(states["data"][0]["state_name"], "stored");
    assert_eq!(states["data"][1]["state_name"], "not stored");
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let settings = Settings {
        body_limit: 64,
        ..Settings::in_memory()
    };
    let pool = connect(&settings).await.unwrap();
    ensure_tables(&pool).await.unwrap();
    let app = app(AppState { pool }, &settings);
    let body = json!({"name": "Box", "comment": "x".repeat(200)}).to_string();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/items")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let err: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(err["error"]["code"], "payload_too_large");

    let (_, list) = send(&app, Method::GET, "/items", None).await;
    assert_eq!(list["meta"]["count"], 0);
}
