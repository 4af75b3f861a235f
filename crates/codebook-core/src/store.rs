//! The `CodebookStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `codebook-store-sqlite`). Higher layers (`codebook-api`,
//! `codebook-server`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use serde::Deserialize;

use crate::{
  annotation::{Annotation, AnnotationPatch, AnnotationWithCode, NewAnnotation},
  code::Code,
  message::Message,
  tree::CodeNode,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Column a message listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSort {
  /// Insertion order.
  #[default]
  Id,
  Content,
}

/// Column a code listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeSort {
  Id,
  /// Path order, which walks each subtree right after its root.
  #[default]
  Code,
}

/// Parameters for [`CodebookStore::list_messages`].
#[derive(Debug, Clone)]
pub struct MessageQuery {
  /// Case-sensitive substring the content must contain.
  pub search:   Option<String>,
  pub limit:    Option<usize>,
  pub offset:   usize,
  pub sort_by:  MessageSort,
  pub sort_asc: bool,
}

impl Default for MessageQuery {
  fn default() -> Self {
    Self {
      search:   None,
      limit:    None,
      offset:   0,
      sort_by:  MessageSort::default(),
      sort_asc: true,
    }
  }
}

/// Parameters for [`CodebookStore::list_codes`].
#[derive(Debug, Clone)]
pub struct CodeQuery {
  /// Case-sensitive substring the path must contain.
  pub search:   Option<String>,
  pub sort_by:  CodeSort,
  pub sort_asc: bool,
}

impl Default for CodeQuery {
  fn default() -> Self {
    Self { search: None, sort_by: CodeSort::default(), sort_asc: true }
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Error bound for store backends.
///
/// Backends wrap domain failures in their own error type; `as_core` lets the
/// boundary layer recover them without knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn as_core(&self) -> Option<&crate::Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Codebook store backend.
///
/// Every method is one unit of work: it either applies completely or leaves
/// the store untouched.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CodebookStore: Send + Sync {
  type Error: StoreError;

  // ── Messages ──────────────────────────────────────────────────────────

  fn count_messages(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Persist a new message and return it with its generated id.
  fn create_message(
    &self,
    content: String,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  /// Retrieve a message by id. Returns `None` if not found.
  fn get_message(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Message>, Self::Error>> + Send + '_;

  /// Search, order and page through messages.
  fn list_messages<'a>(
    &'a self,
    query: &'a MessageQuery,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + 'a;

  /// Replace a message's content. Fails with `MessageNotFound` if absent.
  fn update_message(
    &self,
    id: i64,
    content: String,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  /// Delete a message and every annotation on it.
  fn delete_message(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Codes ─────────────────────────────────────────────────────────────

  fn count_codes(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Create the code at `path` along with any missing ancestors.
  ///
  /// Returns the code for the full path; if it already existed it is
  /// returned unchanged and nothing is written.
  fn create_code<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<Code, Self::Error>> + Send + 'a;

  fn get_code(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Code>, Self::Error>> + Send + '_;

  fn list_codes<'a>(
    &'a self,
    query: &'a CodeQuery,
  ) -> impl Future<Output = Result<Vec<Code>, Self::Error>> + Send + 'a;

  /// Rename code `id` to `new_path`, carrying its whole subtree along.
  ///
  /// Returns the renamed codes ordered by their new path.
  fn rename_code<'a>(
    &'a self,
    id: i64,
    new_path: &'a str,
  ) -> impl Future<Output = Result<Vec<Code>, Self::Error>> + Send + 'a;

  /// Delete the code at `path` and everything beneath it, together with
  /// their annotations. Returns the number of codes removed.
  fn delete_code<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// The forest implied by all stored code paths.
  fn code_tree(
    &self,
  ) -> impl Future<Output = Result<Vec<CodeNode>, Self::Error>> + Send + '_;

  // ── Annotations ───────────────────────────────────────────────────────

  /// Attach a code to a span of a message.
  ///
  /// Fails with `MessageNotFound` / `CodeNotFound` when either side is
  /// missing, and with `InvalidSpan` for a malformed span.
  fn create_annotation(
    &self,
    input: NewAnnotation,
  ) -> impl Future<Output = Result<Annotation, Self::Error>> + Send + '_;

  fn get_annotation(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Annotation>, Self::Error>> + Send + '_;

  /// All annotations on a message in stored order, each with its code path.
  fn list_annotations(
    &self,
    message_id: i64,
  ) -> impl Future<Output = Result<Vec<AnnotationWithCode>, Self::Error>> + Send + '_;

  fn update_annotation(
    &self,
    id: i64,
    patch: AnnotationPatch,
  ) -> impl Future<Output = Result<Annotation, Self::Error>> + Send + '_;

  fn delete_annotation(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
