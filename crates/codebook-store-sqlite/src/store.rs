//! [`SqliteStore`] — the SQLite implementation of [`CodebookStore`].

use std::{collections::BTreeMap, path::Path};

use codebook_core::{
  annotation::{Annotation, AnnotationPatch, AnnotationWithCode, NewAnnotation},
  code::{Code, plan_rename},
  message::Message,
  path::CodePath,
  store::{CodeQuery, CodebookStore, MessageQuery},
  tree::{CodeNode, build_forest},
};
use rusqlite::{Connection, OptionalExtension as _};

use crate::{
  Error, Result,
  encode::{
    RawCode, annotation_from_row, code_order, decode_codes, decode_path,
    encode_limit, encode_offset, message_from_row, message_order,
  },
  error::reject,
  schema::SCHEMA,
};

type CoreError = codebook_core::Error;

/// `?1` is a canonical path; matches it and every path beneath it by whole
/// segments. Descendants are exactly the paths in `[?1 || '/', ?1 || '0')`
/// under binary collation, since `'0'` is the byte after `'/'`.
const SUBTREE_FILTER: &str =
  "(code = ?1 OR (code >= ?1 || '/' AND code < ?1 || '0'))";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Codebook store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn count(&self, table: &'static str) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| {
          r.get(0)
        })?)
      })
      .await?;
    Ok(n as u64)
  }
}

// ─── Connection-level helpers ────────────────────────────────────────────────
//
// These run on the connection thread, usually inside a transaction.

fn row_exists(conn: &Connection, table: &str, id: i64) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        &format!("SELECT 1 FROM {table} WHERE id = ?1"),
        rusqlite::params![id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn fetch_code(conn: &Connection, id: i64) -> rusqlite::Result<Option<RawCode>> {
  conn
    .query_row(
      "SELECT id, code FROM codes WHERE id = ?1",
      rusqlite::params![id],
      RawCode::from_row,
    )
    .optional()
}

fn fetch_subtree(conn: &Connection, root: &CodePath) -> rusqlite::Result<Vec<RawCode>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT id, code FROM codes WHERE {SUBTREE_FILTER} ORDER BY code"
  ))?;
  stmt
    .query_map(rusqlite::params![root.as_str()], RawCode::from_row)?
    .collect()
}

/// Insert every prefix of `path` that is not stored yet. Returns how many
/// rows were created.
fn insert_missing_prefixes(conn: &Connection, path: &CodePath) -> rusqlite::Result<usize> {
  let mut stmt = conn.prepare("INSERT OR IGNORE INTO codes (code) VALUES (?1)")?;
  let mut created = 0;
  for prefix in path.prefixes() {
    created += stmt.execute(rusqlite::params![prefix.as_str()])?;
  }
  Ok(created)
}

// ─── CodebookStore impl ──────────────────────────────────────────────────────

impl CodebookStore for SqliteStore {
  type Error = Error;

  // ── Messages ──────────────────────────────────────────────────────────────

  async fn count_messages(&self) -> Result<u64> { self.count("messages").await }

  async fn create_message(&self, content: String) -> Result<Message> {
    let message = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO messages (content) VALUES (?1)",
          rusqlite::params![content],
        )?;
        Ok(Message { id: conn.last_insert_rowid(), content })
      })
      .await?;
    Ok(message)
  }

  async fn get_message(&self, id: i64) -> Result<Option<Message>> {
    let message = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, content FROM messages WHERE id = ?1",
              rusqlite::params![id],
              message_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(message)
  }

  async fn list_messages(&self, query: &MessageQuery) -> Result<Vec<Message>> {
    let search = query.search.clone();
    let order  = message_order(query.sort_by, query.sort_asc);
    let limit  = encode_limit(query.limit);
    let offset = encode_offset(query.offset);

    let messages = self
      .conn
      .call(move |conn| {
        // `instr` keeps the containment check case-sensitive, unlike LIKE.
        let mut stmt = conn.prepare(&format!(
          "SELECT id, content FROM messages
           WHERE ?1 IS NULL OR instr(content, ?1) > 0
           ORDER BY {order}
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![search, limit, offset], message_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(messages)
  }

  async fn update_message(&self, id: i64, content: String) -> Result<Message> {
    let message = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE messages SET content = ?1 WHERE id = ?2",
          rusqlite::params![content, id],
        )?;
        if changed == 0 {
          return Err(reject(CoreError::MessageNotFound(id)));
        }
        Ok(Message { id, content })
      })
      .await?;
    Ok(message)
  }

  async fn delete_message(&self, id: i64) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let annotations: i64 = tx.query_row(
          "SELECT COUNT(*) FROM annotations WHERE message_id = ?1",
          rusqlite::params![id],
          |r| r.get(0),
        )?;
        let changed =
          tx.execute("DELETE FROM messages WHERE id = ?1", rusqlite::params![id])?;
        if changed == 0 {
          return Err(reject(CoreError::MessageNotFound(id)));
        }
        tx.commit()?;
        Ok(annotations)
      })
      .await?;

    tracing::debug!(message_id = id, annotations = removed, "deleted message");
    Ok(())
  }

  // ── Codes ─────────────────────────────────────────────────────────────────

  async fn count_codes(&self) -> Result<u64> { self.count("codes").await }

  async fn create_code(&self, path: &str) -> Result<Code> {
    let path = CodePath::parse(path)?;

    let (raw, created) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let created = insert_missing_prefixes(&tx, &path)?;
        let raw = tx.query_row(
          "SELECT id, code FROM codes WHERE code = ?1",
          rusqlite::params![path.as_str()],
          RawCode::from_row,
        )?;
        tx.commit()?;
        Ok((raw, created))
      })
      .await?;

    tracing::debug!(code = %raw.code, created, "created code path");
    raw.into_code()
  }

  async fn get_code(&self, id: i64) -> Result<Option<Code>> {
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_code(conn, id)?))
      .await?;
    raw.map(RawCode::into_code).transpose()
  }

  async fn list_codes(&self, query: &CodeQuery) -> Result<Vec<Code>> {
    let search = query.search.clone();
    let order  = code_order(query.sort_by, query.sort_asc);

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT id, code FROM codes
           WHERE ?1 IS NULL OR instr(code, ?1) > 0
           ORDER BY {order}"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![search], RawCode::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    decode_codes(raws)
  }

  async fn rename_code(&self, id: i64, new_path: &str) -> Result<Vec<Code>> {
    let to = CodePath::parse(new_path)?;

    let (renamed, ancestors) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let from = fetch_code(&tx, id)?
          .ok_or_else(|| reject(CoreError::CodeNotFound(id)))?
          .into_code()
          .map_err(reject)?
          .code;

        // Snapshot both subtrees before writing anything: the one being moved
        // and the one receiving it, which holds every possible collision.
        let mut snapshot: BTreeMap<i64, RawCode> = BTreeMap::new();
        for raw in fetch_subtree(&tx, &from)?.into_iter().chain(fetch_subtree(&tx, &to)?) {
          snapshot.insert(raw.id, raw);
        }
        let snapshot = decode_codes(snapshot.into_values().collect()).map_err(reject)?;

        let plan = plan_rename(&snapshot, &from, &to).map_err(reject)?;

        // With every ancestor stored, an accepted plan never targets a path
        // inside the moving subtree, so rows can be rewritten one at a time.
        // Should that ever fail, UNIQUE aborts and the transaction rolls back.
        if from != to {
          let mut place = tx.prepare("UPDATE codes SET code = ?1 WHERE id = ?2")?;
          for r in &plan {
            place.execute(rusqlite::params![r.to.as_str(), r.id])?;
          }
        }

        let ancestors = insert_missing_prefixes(&tx, &to)?;
        tx.commit()?;

        let mut renamed: Vec<Code> = plan
          .into_iter()
          .map(|r| Code { id: r.id, code: r.to })
          .collect();
        renamed.sort_by(|a, b| a.code.cmp(&b.code));
        Ok((renamed, ancestors))
      })
      .await?;

    tracing::debug!(
      code_id = id,
      to = %new_path,
      renamed = renamed.len(),
      ancestors,
      "renamed code subtree"
    );
    Ok(renamed)
  }

  async fn delete_code(&self, path: &str) -> Result<u64> {
    let root = CodePath::parse(path)?;
    let root_str = root.to_string();

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let deleted = tx.execute(
          &format!("DELETE FROM codes WHERE {SUBTREE_FILTER}"),
          rusqlite::params![root_str],
        )?;
        tx.commit()?;
        Ok(deleted)
      })
      .await?;

    tracing::debug!(code = %root, deleted, "deleted code subtree");
    Ok(deleted as u64)
  }

  async fn code_tree(&self) -> Result<Vec<CodeNode>> {
    let codes = self.list_codes(&CodeQuery::default()).await?;
    Ok(build_forest(codes))
  }

  // ── Annotations ───────────────────────────────────────────────────────────

  async fn create_annotation(&self, input: NewAnnotation) -> Result<Annotation> {
    input.validate()?;

    let annotation = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !row_exists(&tx, "messages", input.message_id)? {
          return Err(reject(CoreError::MessageNotFound(input.message_id)));
        }
        if !row_exists(&tx, "codes", input.code_id)? {
          return Err(reject(CoreError::CodeNotFound(input.code_id)));
        }
        tx.execute(
          "INSERT INTO annotations (message_id, code_id, start_idx, end_idx)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            input.message_id,
            input.code_id,
            input.start_idx,
            input.end_idx,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Annotation {
          id,
          message_id: input.message_id,
          code_id:    input.code_id,
          start_idx:  input.start_idx,
          end_idx:    input.end_idx,
        })
      })
      .await?;
    Ok(annotation)
  }

  async fn get_annotation(&self, id: i64) -> Result<Option<Annotation>> {
    let annotation = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, message_id, code_id, start_idx, end_idx
               FROM annotations WHERE id = ?1",
              rusqlite::params![id],
              annotation_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(annotation)
  }

  async fn list_annotations(&self, message_id: i64) -> Result<Vec<AnnotationWithCode>> {
    let rows: Vec<(Annotation, String)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !row_exists(&tx, "messages", message_id)? {
          return Err(reject(CoreError::MessageNotFound(message_id)));
        }
        let rows = {
          let mut stmt = tx.prepare(
            "SELECT a.id, a.message_id, a.code_id, a.start_idx, a.end_idx, c.code
             FROM annotations a
             JOIN codes c ON c.id = a.code_id
             WHERE a.message_id = ?1
             ORDER BY a.id",
          )?;
          stmt
            .query_map(rusqlite::params![message_id], |row| {
              Ok((annotation_from_row(row)?, row.get(5)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(annotation, code)| {
        Ok(AnnotationWithCode { annotation, code: decode_path(&code)? })
      })
      .collect()
  }

  async fn update_annotation(
    &self,
    id:    i64,
    patch: AnnotationPatch,
  ) -> Result<Annotation> {
    let annotation = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let current = tx
          .query_row(
            "SELECT id, message_id, code_id, start_idx, end_idx
             FROM annotations WHERE id = ?1",
            rusqlite::params![id],
            annotation_from_row,
          )
          .optional()?
          .ok_or_else(|| reject(CoreError::AnnotationNotFound(id)))?;

        let updated = patch.apply(&current).map_err(reject)?;
        if updated.code_id != current.code_id && !row_exists(&tx, "codes", updated.code_id)? {
          return Err(reject(CoreError::CodeNotFound(updated.code_id)));
        }

        tx.execute(
          "UPDATE annotations SET code_id = ?1, start_idx = ?2, end_idx = ?3
           WHERE id = ?4",
          rusqlite::params![updated.code_id, updated.start_idx, updated.end_idx, id],
        )?;
        tx.commit()?;
        Ok(updated)
      })
      .await?;
    Ok(annotation)
  }

  async fn delete_annotation(&self, id: i64) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let changed =
          conn.execute("DELETE FROM annotations WHERE id = ?1", rusqlite::params![id])?;
        if changed == 0 {
          return Err(reject(CoreError::AnnotationNotFound(id)));
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}
