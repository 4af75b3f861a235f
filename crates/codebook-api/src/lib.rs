//! JSON HTTP API for Codebook.
//!
//! Exposes an axum [`Router`] backed by any
//! [`codebook_core::store::CodebookStore`]. CORS, tracing and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = Router::new().merge(codebook_api::api_router(store.clone()));
//! ```

pub mod annotations;
pub mod codes;
pub mod error;
pub mod extract;
pub mod messages;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use codebook_core::store::CodebookStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CodebookStore + 'static,
{
  Router::new()
    // Messages
    .route("/messages",                   get(messages::list::<S>))
    .route("/messages/count",             get(messages::count::<S>))
    .route("/messages/create",            post(messages::create::<S>))
    .route("/messages/update",            post(messages::update::<S>))
    .route("/messages/delete",            post(messages::delete::<S>))
    .route("/messages/{id}",              get(messages::get_one::<S>))
    .route("/count",                      get(messages::count::<S>))
    // Codes
    .route("/codes",                      get(codes::list::<S>))
    .route("/codes/count",                get(codes::count::<S>))
    .route("/codes/tree",                 get(codes::tree::<S>))
    .route("/codes/create",               post(codes::create::<S>))
    .route("/codes/update",               post(codes::update::<S>))
    .route("/codes/delete",               post(codes::delete::<S>))
    .route("/codes/{id}",                 get(codes::get_one::<S>))
    // Annotations
    .route("/annotations/update",         post(annotations::update::<S>))
    .route("/annotations/delete",         post(annotations::delete::<S>))
    .route("/annotations/{message_id}",   get(annotations::list::<S>))
    .route("/annotations/{message_id}/create", post(annotations::create::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;
