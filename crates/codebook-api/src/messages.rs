//! Handlers for `/messages` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/messages` | Optional `search`, `limit`, `offset`, `sort_by=id\|content`, `sort_asc` |
//! | `GET`  | `/messages/count` | Total number of messages |
//! | `GET`  | `/messages/:id` | 404 if not found |
//! | `POST` | `/messages/create` | Body: `{"content":"..."}`; returns 201 |
//! | `POST` | `/messages/update` | Body: `{"id":1,"content":"..."}` |
//! | `POST` | `/messages/delete` | Body: `{"id":1}`; returns 204, cascades annotations |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use codebook_core::{
  message::Message,
  store::{CodebookStore, MessageQuery, MessageSort},
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Case-sensitive substring filter on the content.
  pub search:   Option<String>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
  pub sort_by:  Option<MessageSort>,
  /// Defaults to `true`.
  pub sort_asc: Option<bool>,
}

impl From<ListParams> for MessageQuery {
  fn from(p: ListParams) -> Self {
    MessageQuery {
      search:   p.search,
      limit:    p.limit,
      offset:   p.offset.unwrap_or(0),
      sort_by:  p.sort_by.unwrap_or_default(),
      sort_asc: p.sort_asc.unwrap_or(true),
    }
  }
}

/// `GET /messages[?search=...][&limit=...][&offset=...][&sort_by=...][&sort_asc=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<Message>>, ApiError>
where
  S: CodebookStore,
{
  let query = MessageQuery::from(params);
  let messages = store
    .list_messages(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(messages))
}

/// `GET /messages/count`
pub async fn count<S>(State(store): State<Arc<S>>) -> Result<Json<u64>, ApiError>
where
  S: CodebookStore,
{
  let n = store.count_messages().await.map_err(ApiError::from_store)?;
  Ok(Json(n))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /messages/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<i64>,
) -> Result<Json<Message>, ApiError>
where
  S: CodebookStore,
{
  let message = store
    .get_message(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("message {id} not found")))?;
  Ok(Json(message))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub content: String,
}

/// `POST /messages/create` — body: `{"content":"..."}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CodebookStore,
{
  let message = store
    .create_message(body.content)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(message)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub id:      i64,
  pub content: String,
}

/// `POST /messages/update` — body: `{"id":1,"content":"..."}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<UpdateBody>,
) -> Result<Json<Message>, ApiError>
where
  S: CodebookStore,
{
  let message = store
    .update_message(body.id, body.content)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(message))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteBody {
  pub id: i64,
}

/// `POST /messages/delete` — body: `{"id":1}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<DeleteBody>,
) -> Result<StatusCode, ApiError>
where
  S: CodebookStore,
{
  store
    .delete_message(body.id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
