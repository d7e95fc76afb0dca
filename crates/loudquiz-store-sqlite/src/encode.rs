//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. The draft-session state is
//! stored as compact JSON. Statuses are stored as their lowercase
//! discriminant strings.

use chrono::{DateTime, Utc};
use loudquiz_core::question::{Question, QuestionStatus};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `questions` row.
pub struct RawQuestion {
  pub id:            i64,
  pub question_text: String,
  pub answer_text:   String,
  pub author_id:     i64,
  pub status:        String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawQuestion {
  pub fn into_question(self) -> Result<Question> {
    Ok(Question {
      id:            self.id,
      question_text: self.question_text,
      answer_text:   self.answer_text,
      author_id:     self.author_id,
      status:        QuestionStatus::parse(&self.status).map_err(Error::Core)?,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// The column list matching [`RawQuestion`]'s field order; interpolated into
/// every SELECT/RETURNING over `questions`.
pub const QUESTION_COLUMNS: &str =
  "id, question_text, answer_text, author_id, status, created_at, updated_at";

/// Map a row produced with [`QUESTION_COLUMNS`] into a [`RawQuestion`].
pub fn raw_question_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawQuestion> {
  Ok(RawQuestion {
    id:            row.get(0)?,
    question_text: row.get(1)?,
    answer_text:   row.get(2)?,
    author_id:     row.get(3)?,
    status:        row.get(4)?,
    created_at:    row.get(5)?,
    updated_at:    row.get(6)?,
  })
}
