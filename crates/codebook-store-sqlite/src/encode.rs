//! Encoding and decoding helpers between Rust domain types and SQLite rows.
//!
//! Ids are SQLite rowids. Code paths are stored in canonical form; a row
//! whose path does not survive [`CodePath::parse`] unchanged is reported as
//! corrupt rather than silently rewritten.

use codebook_core::{
  annotation::Annotation,
  code::Code,
  message::Message,
  path::CodePath,
  store::{CodeSort, MessageSort},
};
use rusqlite::Row;

use crate::{Error, Result};

// ─── Rows ────────────────────────────────────────────────────────────────────

pub fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
  Ok(Message { id: row.get(0)?, content: row.get(1)? })
}

pub fn annotation_from_row(row: &Row<'_>) -> rusqlite::Result<Annotation> {
  Ok(Annotation {
    id:         row.get(0)?,
    message_id: row.get(1)?,
    code_id:    row.get(2)?,
    start_idx:  row.get(3)?,
    end_idx:    row.get(4)?,
  })
}

/// A `codes` row before its path is validated.
#[derive(Debug)]
pub struct RawCode {
  pub id:   i64,
  pub code: String,
}

impl RawCode {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { id: row.get(0)?, code: row.get(1)? })
  }

  pub fn into_code(self) -> Result<Code> {
    Ok(Code { id: self.id, code: decode_path(&self.code)? })
  }
}

pub fn decode_codes(raws: Vec<RawCode>) -> Result<Vec<Code>> {
  raws.into_iter().map(RawCode::into_code).collect()
}

pub fn decode_path(stored: &str) -> Result<CodePath> {
  match CodePath::parse(stored) {
    Ok(path) if path.as_str() == stored => Ok(path),
    _ => Err(Error::Corrupt {
      table:  "codes",
      detail: format!("non-canonical code path {stored:?}"),
    }),
  }
}

// ─── Ordering & paging ───────────────────────────────────────────────────────

fn direction(asc: bool) -> &'static str { if asc { "ASC" } else { "DESC" } }

/// `ORDER BY` body for message listings. Ties fall back to insertion order.
pub fn message_order(sort: MessageSort, asc: bool) -> String {
  let dir = direction(asc);
  match sort {
    MessageSort::Id => format!("id {dir}"),
    MessageSort::Content => format!("content {dir}, id {dir}"),
  }
}

/// `ORDER BY` body for code listings.
pub fn code_order(sort: CodeSort, asc: bool) -> String {
  let dir = direction(asc);
  match sort {
    CodeSort::Id => format!("id {dir}"),
    CodeSort::Code => format!("code {dir}"),
  }
}

/// SQLite treats a negative `LIMIT` as "no limit".
pub fn encode_limit(limit: Option<usize>) -> i64 {
  limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX))
}

pub fn encode_offset(offset: usize) -> i64 {
  i64::try_from(offset).unwrap_or(i64::MAX)
}
