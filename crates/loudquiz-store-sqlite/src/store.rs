//! [`SqliteStore`] — the SQLite implementation of [`QuestionStore`] and
//! [`FormStore`].

use std::path::Path;

use chrono::{Duration, Utc};
use rusqlite::OptionalExtension as _;

use loudquiz_core::{
  form::FormState,
  question::{NewQuestion, Question, QuestionDraft, QuestionId, UserId},
  store::{FormStore, QuestionListing, QuestionStore},
};

use crate::{
  Error, Result,
  encode::{QUESTION_COLUMNS, encode_dt, raw_question_from_row},
  schema::SCHEMA,
};

/// Abandoned authoring sessions self-expire after this long.
const FORM_TTL_HOURS: i64 = 24;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A loudquiz store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:     tokio_rusqlite::Connection,
  form_ttl: Duration,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self {
      conn,
      form_ttl: Duration::hours(FORM_TTL_HOURS),
    };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self {
      conn,
      form_ttl: Duration::hours(FORM_TTL_HOURS),
    };
    store.init_schema().await?;
    Ok(store)
  }

  /// Override the session TTL; used by expiry tests.
  pub fn with_form_ttl(mut self, ttl: Duration) -> Self {
    self.form_ttl = ttl;
    self
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
}

// ─── QuestionStore impl ──────────────────────────────────────────────────────

impl QuestionStore for SqliteStore {
  type Error = Error;

  async fn create(&self, input: NewQuestion) -> Result<Question> {
    let now = Utc::now();
    let now_str = encode_dt(now);
    let question_text = input.question_text.clone();
    let answer_text = input.answer_text.clone();
    let status = input.status.as_str().to_owned();
    let author_id = input.author_id;

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO questions
             (question_text, answer_text, author_id, status, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![question_text, answer_text, author_id, status, now_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Question {
      id,
      question_text: input.question_text,
      answer_text: input.answer_text,
      author_id: input.author_id,
      status: input.status,
      created_at: now,
      updated_at: now,
    })
  }

  async fn get_by_id(&self, id: QuestionId) -> Result<Option<Question>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
              rusqlite::params![id],
              raw_question_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(|r| r.into_question()).transpose()
  }

  async fn get_active_unseen_by_user(&self, user: UserId) -> Result<Option<Question>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {QUESTION_COLUMNS} FROM questions q
                 WHERE q.status = 'active'
                   AND NOT EXISTS (
                     SELECT 1 FROM user_seen_questions usq
                     WHERE usq.user_id = ?1 AND usq.question_id = q.id
                   )
                 ORDER BY RANDOM()
                 LIMIT 1"
              ),
              rusqlite::params![user],
              raw_question_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(|r| r.into_question()).transpose()
  }

  async fn mark_seen(&self, user: UserId, id: QuestionId) -> Result<bool> {
    let now_str = encode_dt(Utc::now());
    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT OR IGNORE INTO user_seen_questions (user_id, question_id, seen_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![user, id, now_str],
        )?;
        Ok(changed > 0)
      })
      .await?;
    Ok(inserted)
  }

  async fn list_by_author(
    &self,
    author: UserId,
    page: u32,
    page_size: u32,
  ) -> Result<QuestionListing> {
    let page = page.max(1);
    // Widen before multiplying: callback payloads can carry any u32 page.
    let offset = (i64::from(page) - 1) * i64::from(page_size);

    let (total, raws) = self
      .conn
      .call(move |conn| {
        let total: u32 = conn.query_row(
          "SELECT COUNT(*) FROM questions WHERE author_id = ?1 AND status = 'active'",
          rusqlite::params![author],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {QUESTION_COLUMNS} FROM questions
           WHERE author_id = ?1 AND status = 'active'
           ORDER BY id DESC
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![author, page_size, offset],
            raw_question_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(|r| r.into_question())
      .collect::<Result<Vec<_>>>()?;

    Ok(QuestionListing { items, total })
  }

  async fn update_by_author(
    &self,
    author: UserId,
    id: QuestionId,
    draft: QuestionDraft,
  ) -> Result<Option<Question>> {
    let now_str = encode_dt(Utc::now());

    // Single conditional write: the (id, author, active) predicate is the
    // whole authorization check. Zero rows matched means forbidden.
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE questions
                 SET question_text = ?1, answer_text = ?2, updated_at = ?3
                 WHERE id = ?4 AND author_id = ?5 AND status = 'active'
                 RETURNING {QUESTION_COLUMNS}"
              ),
              rusqlite::params![
                draft.question_text,
                draft.answer_text,
                now_str,
                id,
                author
              ],
              raw_question_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(|r| r.into_question()).transpose()
  }

  async fn soft_delete_by_author(&self, author: UserId, id: QuestionId) -> Result<bool> {
    let now_str = encode_dt(Utc::now());
    let deleted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE questions
           SET status = 'deleted', updated_at = ?1
           WHERE id = ?2 AND author_id = ?3 AND status = 'active'",
          rusqlite::params![now_str, id, author],
        )?;
        Ok(changed > 0)
      })
      .await?;
    Ok(deleted)
  }
}

// ─── FormStore impl ──────────────────────────────────────────────────────────

impl FormStore for SqliteStore {
  type Error = Error;

  async fn get(&self, user: UserId) -> Result<Option<FormState>> {
    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT state_json, expires_at FROM form_sessions WHERE user_id = ?1",
              rusqlite::params![user],
              |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let Some((state_json, expires_at)) = row else {
      return Ok(None);
    };

    // An expired row reads the same as a missing one.
    if crate::encode::decode_dt(&expires_at)? <= Utc::now() {
      return Ok(None);
    }

    Ok(Some(serde_json::from_str(&state_json)?))
  }

  async fn set(&self, user: UserId, state: FormState) -> Result<()> {
    let state_json = serde_json::to_string(&state)?;
    // Sliding expiry: every write restarts the TTL clock.
    let expires_at = encode_dt(Utc::now() + self.form_ttl);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO form_sessions (user_id, state_json, expires_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (user_id) DO UPDATE
             SET state_json = excluded.state_json,
                 expires_at = excluded.expires_at",
          rusqlite::params![user, state_json, expires_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete(&self, user: UserId) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM form_sessions WHERE user_id = ?1",
          rusqlite::params![user],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
