//! Handlers for `/annotations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/annotations/:message_id` | 404 if the message does not exist |
//! | `POST` | `/annotations/:message_id/create` | Body: `{"code_id":1,"start_idx":0,"end_idx":4}`; returns 201 |
//! | `POST` | `/annotations/update` | Body: `{"id":1}` plus any of `code_id`, `start_idx`, `end_idx` |
//! | `POST` | `/annotations/delete` | Body: `{"id":1}`; returns 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use codebook_core::{
  annotation::{Annotation, AnnotationPatch, AnnotationWithCode, NewAnnotation},
  store::CodebookStore,
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParam},
};

/// `GET /annotations/:message_id`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  PathParam(message_id): PathParam<i64>,
) -> Result<Json<Vec<AnnotationWithCode>>, ApiError>
where
  S: CodebookStore,
{
  let annotations = store
    .list_annotations(message_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(annotations))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /annotations/:message_id/create`.
///
/// `message_id` may be repeated in the body; it must then match the path.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub message_id: Option<i64>,
  pub code_id:    i64,
  pub start_idx:  i64,
  pub end_idx:    i64,
}

pub async fn create<S>(
  State(store): State<Arc<S>>,
  PathParam(message_id): PathParam<i64>,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CodebookStore,
{
  if let Some(in_body) = body.message_id
    && in_body != message_id
  {
    return Err(ApiError::BadRequest(format!(
      "body message_id {in_body} does not match path message_id {message_id}"
    )));
  }

  let annotation = store
    .create_annotation(NewAnnotation {
      message_id,
      code_id:   body.code_id,
      start_idx: body.start_idx,
      end_idx:   body.end_idx,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(annotation)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub id:        i64,
  pub code_id:   Option<i64>,
  pub start_idx: Option<i64>,
  pub end_idx:   Option<i64>,
}

/// `POST /annotations/update`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<UpdateBody>,
) -> Result<Json<Annotation>, ApiError>
where
  S: CodebookStore,
{
  let patch = AnnotationPatch {
    code_id:   body.code_id,
    start_idx: body.start_idx,
    end_idx:   body.end_idx,
  };
  let annotation = store
    .update_annotation(body.id, patch)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(annotation))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteBody {
  pub id: i64,
}

/// `POST /annotations/delete` — body: `{"id":1}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<DeleteBody>,
) -> Result<StatusCode, ApiError>
where
  S: CodebookStore,
{
  store
    .delete_annotation(body.id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
