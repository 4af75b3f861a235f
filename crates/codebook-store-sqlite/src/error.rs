//! Error type for `codebook-store-sqlite`.

use codebook_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] codebook_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  /// A stored value no longer satisfies a domain rule (e.g. a code path
  /// written by another tool).
  #[error("corrupt row in {table}: {detail}")]
  Corrupt { table: &'static str, detail: String },
}

/// Errors raised inside a connection closure travel back boxed in
/// [`tokio_rusqlite::Error::Other`] (see [`reject`]); unwrap them here so
/// callers see e.g. [`Error::Core`] rather than an opaque database failure.
impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Other(boxed) => match boxed.downcast::<Error>() {
        Ok(ours) => *ours,
        Err(other) => Error::Database(tokio_rusqlite::Error::Other(other)),
      },
      tokio_rusqlite::Error::Rusqlite(e) => Error::Sqlite(e),
      other => Error::Database(other),
    }
  }
}

/// Abort a connection closure with one of our errors.
pub(crate) fn reject(e: impl Into<Error>) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e.into()))
}

impl StoreError for Error {
  fn as_core(&self) -> Option<&codebook_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
