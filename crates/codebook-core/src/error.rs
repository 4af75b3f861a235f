//! Error types for `codebook-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("message not found: {0}")]
  MessageNotFound(i64),

  #[error("code not found: {0}")]
  CodeNotFound(i64),

  #[error("annotation not found: {0}")]
  AnnotationNotFound(i64),

  #[error("invalid code path: {0:?}")]
  InvalidCodePath(String),

  #[error("invalid span: start {start} must be >= 0 and <= end {end}")]
  InvalidSpan { start: i64, end: i64 },

  #[error("cannot move code {from} beneath itself ({to})")]
  CodeBeneathItself { from: String, to: String },

  #[error("code path already exists: {0}")]
  DuplicateCode(String),
}

/// Coarse classification of an [`Error`], used by boundary layers to pick a
/// protocol-level response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// A referenced message, code or annotation does not exist.
  NotFound,
  /// The input is malformed.
  Validation,
  /// The input collides with the unique-path invariant.
  Conflict,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::MessageNotFound(_)
      | Self::CodeNotFound(_)
      | Self::AnnotationNotFound(_) => ErrorKind::NotFound,
      Self::InvalidCodePath(_)
      | Self::InvalidSpan { .. }
      | Self::CodeBeneathItself { .. } => ErrorKind::Validation,
      Self::DuplicateCode(_) => ErrorKind::Conflict,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
