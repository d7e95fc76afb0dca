//! Question types — the durable records the whole bot revolves around.
//!
//! A question is only ever soft-deleted: its status flips to `Deleted` and
//! from that point it behaves as nonexistent for players and authors alike.
//! The exposure history (which user has seen which question) lives in a
//! separate append-only relation owned by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Telegram-style numeric user identifier.
pub type UserId = i64;

/// Store-assigned, monotonically increasing question identifier.
pub type QuestionId = i64;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle status of a question.
///
/// Only `Active` questions are served to players, listed to their author, or
/// editable. `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
  Active,
  Deleted,
  Draft,
}

impl QuestionStatus {
  /// The string stored in the `status` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Deleted => "deleted",
      Self::Draft => "draft",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "active" => Ok(Self::Active),
      "deleted" => Ok(Self::Deleted),
      "draft" => Ok(Self::Draft),
      other => Err(crate::Error::UnknownStatus(other.to_owned())),
    }
  }

  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

// ─── Question ────────────────────────────────────────────────────────────────

/// A durable question/answer record. Identity and author never change after
/// creation; text fields change only through author-scoped updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
  pub id:            QuestionId,
  pub question_text: String,
  pub answer_text:   String,
  pub author_id:     UserId,
  pub status:        QuestionStatus,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl Question {
  /// The draft that would reproduce this question's text fields.
  pub fn draft(&self) -> QuestionDraft {
    QuestionDraft {
      question_text: self.question_text.clone(),
      answer_text:   self.answer_text.clone(),
    }
  }
}

// ─── NewQuestion ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::QuestionStore::create`].
/// The identifier and both timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewQuestion {
  pub question_text: String,
  pub answer_text:   String,
  pub author_id:     UserId,
  pub status:        QuestionStatus,
}

impl NewQuestion {
  /// An active question built from a finished draft.
  pub fn from_draft(author_id: UserId, draft: QuestionDraft) -> Self {
    Self {
      question_text: draft.question_text,
      answer_text:   draft.answer_text,
      author_id,
      status: QuestionStatus::Active,
    }
  }
}

// ─── QuestionDraft ───────────────────────────────────────────────────────────

/// The in-progress text pair assembled or amended by an authoring session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
  #[serde(default)]
  pub question_text: String,
  #[serde(default)]
  pub answer_text:   String,
}
