//! SQL schema for the loudquiz SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS questions (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    question_text TEXT NOT NULL,
    answer_text   TEXT NOT NULL,
    author_id     INTEGER NOT NULL,
    status        TEXT NOT NULL DEFAULT 'active',  -- 'active' | 'deleted' | 'draft'
    created_at    TEXT NOT NULL,                   -- ISO 8601 UTC; store-assigned
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS questions_author_status_idx ON questions(author_id, status);

-- Exposure history. Strictly append-only: rows are never updated or deleted,
-- so a user's unseen set is monotone even across delete/recreate cycles.
CREATE TABLE IF NOT EXISTS user_seen_questions (
    user_id     INTEGER NOT NULL,
    question_id INTEGER NOT NULL REFERENCES questions(id),
    seen_at     TEXT NOT NULL,
    PRIMARY KEY (user_id, question_id)
);

-- Transient authoring sessions, one per user, JSON-encoded FormState.
-- expires_at is advanced on every write (sliding TTL); reads treat an
-- expired row the same as a missing one.
CREATE TABLE IF NOT EXISTS form_sessions (
    user_id    INTEGER PRIMARY KEY,
    state_json TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

PRAGMA user_version = 1;
";
