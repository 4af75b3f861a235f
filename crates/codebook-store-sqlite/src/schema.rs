//! SQL schema for the Codebook SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS messages (
    id       INTEGER PRIMARY KEY,
    content  TEXT NOT NULL
);

-- Canonical slash-delimited paths, e.g. '/topic/subtopic'.
-- The tree is implied by path prefixes; there is no parent column.
CREATE TABLE IF NOT EXISTS codes (
    id    INTEGER PRIMARY KEY,
    code  TEXT NOT NULL UNIQUE
);

-- Half-open span [start_idx, end_idx) of a message classified by a code.
-- Owned by both sides: removing either the message or the code removes it.
CREATE TABLE IF NOT EXISTS annotations (
    id          INTEGER PRIMARY KEY,
    message_id  INTEGER NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
    code_id     INTEGER NOT NULL REFERENCES codes(id)    ON DELETE CASCADE,
    start_idx   INTEGER NOT NULL,
    end_idx     INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS annotations_message_idx ON annotations(message_id);
CREATE INDEX IF NOT EXISTS annotations_code_idx    ON annotations(code_id);

PRAGMA user_version = 1;
";
