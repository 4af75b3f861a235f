//! Handlers for `/codes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/codes` | Optional `search`, `sort_by=code\|id`, `sort_asc` |
//! | `GET`  | `/codes/count` | Total number of codes |
//! | `GET`  | `/codes/tree` | Nested view of the taxonomy |
//! | `GET`  | `/codes/:id` | 404 if not found |
//! | `POST` | `/codes/create` | Body: `{"code":"/a/b"}`; creates missing ancestors, returns 201 |
//! | `POST` | `/codes/update` | Body: `{"id":1,"code":"/x/y"}`; renames the whole subtree |
//! | `POST` | `/codes/delete` | Body: `{"code":"/a/b"}`; deletes the subtree and its annotations |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use codebook_core::{
  code::Code,
  store::{CodeQuery, CodeSort, CodebookStore},
  tree::CodeNode,
};
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Case-sensitive substring filter on the path.
  pub search:   Option<String>,
  pub sort_by:  Option<CodeSort>,
  /// Defaults to `true`.
  pub sort_asc: Option<bool>,
}

/// `GET /codes[?search=...][&sort_by=...][&sort_asc=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<Code>>, ApiError>
where
  S: CodebookStore,
{
  let query = CodeQuery {
    search:   params.search,
    sort_by:  params.sort_by.unwrap_or_default(),
    sort_asc: params.sort_asc.unwrap_or(true),
  };
  let codes = store
    .list_codes(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(codes))
}

/// `GET /codes/count`
pub async fn count<S>(State(store): State<Arc<S>>) -> Result<Json<u64>, ApiError>
where
  S: CodebookStore,
{
  let n = store.count_codes().await.map_err(ApiError::from_store)?;
  Ok(Json(n))
}

/// `GET /codes/tree`
pub async fn tree<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<CodeNode>>, ApiError>
where
  S: CodebookStore,
{
  let forest = store.code_tree().await.map_err(ApiError::from_store)?;
  Ok(Json(forest))
}

/// `GET /codes/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<i64>,
) -> Result<Json<Code>, ApiError>
where
  S: CodebookStore,
{
  let code = store
    .get_code(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("code {id} not found")))?;
  Ok(Json(code))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub code: String,
}

/// `POST /codes/create` — body: `{"code":"/a/b/c"}`
///
/// Returns the code at the full path, whether it was just created or
/// already existed.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CodebookStore,
{
  let code = store
    .create_code(&body.code)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(code)))
}

// ─── Rename ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub id:   i64,
  pub code: String,
}

/// `POST /codes/update` — body: `{"id":1,"code":"/x/y"}`
///
/// Returns every renamed code (the target and its descendants).
pub async fn update<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<UpdateBody>,
) -> Result<Json<Vec<Code>>, ApiError>
where
  S: CodebookStore,
{
  let renamed = store
    .rename_code(body.id, &body.code)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(renamed))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteBody {
  pub code: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
  pub deleted: u64,
}

/// `POST /codes/delete` — body: `{"code":"/a/b"}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<DeleteBody>,
) -> Result<Json<DeleteResponse>, ApiError>
where
  S: CodebookStore,
{
  let deleted = store
    .delete_code(&body.code)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(DeleteResponse { deleted }))
}
