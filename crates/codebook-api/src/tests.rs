//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use codebook_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.unwrap())
}

async fn send(store: &Arc<SqliteStore>, method: &str, uri: &str, body: Option<Value>) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  api_router(store.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap()
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

// ── Messages ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn message_crud_round_trip() {
  let store = store().await;

  let resp = send(&store, "POST", "/messages/create", Some(json!({ "content": "I'm a message!" }))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created = json_body(resp).await;
  assert_eq!(created["content"], "I'm a message!");
  let id = created["id"].as_i64().unwrap();

  let listed = json_body(send(&store, "GET", "/messages", None).await).await;
  assert_eq!(listed, json!([{ "id": id, "content": "I'm a message!" }]));

  let resp = send(
    &store,
    "POST",
    "/messages/update",
    Some(json!({ "id": id, "content": "I'm an updated message!" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);

  let fetched = json_body(send(&store, "GET", &format!("/messages/{id}"), None).await).await;
  assert_eq!(fetched["content"], "I'm an updated message!");

  let resp = send(&store, "POST", "/messages/delete", Some(json!({ "id": id }))).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let count = json_body(send(&store, "GET", "/count", None).await).await;
  assert_eq!(count, json!(0));
}

#[tokio::test]
async fn message_search_via_query_string() {
  let store = store().await;
  for content in ["What's on your mind?", "I'm so scared for tonight"] {
    send(&store, "POST", "/messages/create", Some(json!({ "content": content }))).await;
  }

  let found = json_body(send(&store, "GET", "/messages?search=scared", None).await).await;
  let found = found.as_array().unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0]["content"], "I'm so scared for tonight");

  let sorted =
    json_body(send(&store, "GET", "/messages?sort_by=content&sort_asc=false&limit=1", None).await)
      .await;
  assert_eq!(sorted[0]["content"], "What's on your mind?");
}

#[tokio::test]
async fn updating_missing_message_returns_404() {
  let store = store().await;
  let resp = send(&store, "POST", "/messages/update", Some(json!({ "id": 3, "content": "x" }))).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body = json_body(resp).await;
  assert!(body["error"].as_str().unwrap().contains("message not found"));
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
  let store = store().await;

  let resp = send(&store, "POST", "/messages/create", Some(json!({ "text": "wrong field" }))).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  assert!(json_body(resp).await["error"].is_string());

  let req = Request::builder()
    .method("POST")
    .uri("/messages/create")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let resp = api_router(store.clone()).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].is_string());

  let resp = send(&store, "GET", "/messages?limit=lots", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].is_string());

  let resp = send(&store, "GET", "/messages/abc", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].is_string());
}

// ── Codes ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn code_create_rename_delete() {
  let store = store().await;

  let resp = send(&store, "POST", "/codes/create", Some(json!({ "code": "/a/b/c" }))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let leaf = json_body(resp).await;
  assert_eq!(leaf["code"], "/a/b/c");

  let count = json_body(send(&store, "GET", "/codes/count", None).await).await;
  assert_eq!(count, json!(3));

  let ab = json_body(send(&store, "GET", "/codes?search=/a/b", None).await).await;
  let ab_id = ab[0]["id"].as_i64().unwrap();
  assert_eq!(ab[0]["code"], "/a/b");

  let renamed = json_body(
    send(&store, "POST", "/codes/update", Some(json!({ "id": ab_id, "code": "/x/y" }))).await,
  )
  .await;
  assert_eq!(renamed[0]["code"], "/x/y");
  assert_eq!(renamed[1]["code"], "/x/y/c");
  assert_eq!(renamed[1]["id"], leaf["id"]);

  let deleted =
    json_body(send(&store, "POST", "/codes/delete", Some(json!({ "code": "/x" }))).await).await;
  assert_eq!(deleted, json!({ "deleted": 3 }));

  let remaining = json_body(send(&store, "GET", "/codes", None).await).await;
  assert_eq!(remaining, json!([{ "id": 1, "code": "/a" }]));
}

#[tokio::test]
async fn invalid_and_conflicting_code_inputs() {
  let store = store().await;

  let resp = send(&store, "POST", "/codes/create", Some(json!({ "code": "/" }))).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

  send(&store, "POST", "/codes/create", Some(json!({ "code": "/a" }))).await;
  send(&store, "POST", "/codes/create", Some(json!({ "code": "/b" }))).await;
  let resp = send(&store, "POST", "/codes/update", Some(json!({ "id": 1, "code": "/b" }))).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let resp = send(&store, "POST", "/codes/update", Some(json!({ "id": 99, "code": "/c" }))).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn over_deep_and_control_character_paths_are_rejected() {
  let store = store().await;

  let deep = "/a".repeat(8000);
  let resp = send(&store, "POST", "/codes/create", Some(json!({ "code": deep }))).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

  let resp = send(&store, "POST", "/codes/create", Some(json!({ "code": "/a\0b/c" }))).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

  let count = json_body(send(&store, "GET", "/codes/count", None).await).await;
  assert_eq!(count, json!(0));
  let tree = json_body(send(&store, "GET", "/codes/tree", None).await).await;
  assert_eq!(tree, json!([]));
}

#[tokio::test]
async fn code_tree_endpoint() {
  let store = store().await;
  send(&store, "POST", "/codes/create", Some(json!({ "code": "/feelings/fear" }))).await;

  let tree = json_body(send(&store, "GET", "/codes/tree", None).await).await;
  assert_eq!(tree[0]["name"], "feelings");
  assert_eq!(tree[0]["children"][0]["code"], "/feelings/fear");
  assert_eq!(tree[0]["children"][0]["children"], json!([]));
}

// ── Annotations ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn creating_annotation_for_nonexistent_message_returns_404() {
  let store = store().await;
  let resp = send(
    &store,
    "POST",
    "/annotations/42/create",
    Some(json!({ "message_id": 42, "code_id": 1000, "start_idx": 5, "end_idx": 6 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn annotation_lifecycle() {
  let store = store().await;
  let message = json_body(
    send(&store, "POST", "/messages/create", Some(json!({ "content": "I'm so scared" }))).await,
  )
  .await;
  let message_id = message["id"].as_i64().unwrap();
  let code = json_body(
    send(&store, "POST", "/codes/create", Some(json!({ "code": "/emotion/fear" }))).await,
  )
  .await;

  let resp = send(
    &store,
    "POST",
    &format!("/annotations/{message_id}/create"),
    Some(json!({ "code_id": code["id"], "start_idx": 7, "end_idx": 13 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let annotation = json_body(resp).await;

  let listed = json_body(send(&store, "GET", &format!("/annotations/{message_id}"), None).await).await;
  assert_eq!(listed[0]["id"], annotation["id"]);
  assert_eq!(listed[0]["code"], "/emotion/fear");
  assert_eq!(listed[0]["start_idx"], 7);

  let resp = send(
    &store,
    "POST",
    "/annotations/update",
    Some(json!({ "id": annotation["id"], "start_idx": 14 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

  let resp = send(&store, "POST", "/annotations/delete", Some(json!({ "id": annotation["id"] }))).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  send(&store, "POST", "/messages/delete", Some(json!({ "id": message_id }))).await;
  let resp = send(&store, "GET", &format!("/annotations/{message_id}"), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mismatched_message_ids_are_rejected() {
  let store = store().await;
  let resp = send(
    &store,
    "POST",
    "/annotations/1/create",
    Some(json!({ "message_id": 2, "code_id": 1, "start_idx": 0, "end_idx": 1 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
