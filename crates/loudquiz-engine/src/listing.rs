//! Paginated browsing of an author's own questions, plus the card and
//! delete operations reached from the listing.

use std::sync::Arc;

use loudquiz_core::{
  question::{Question, QuestionId, UserId},
  store::QuestionStore,
};

use crate::{EngineError, Result};

/// Questions per listing page. Fixed by policy, not per call.
pub const PAGE_SIZE: u32 = 10;

// ─── Page ────────────────────────────────────────────────────────────────────

/// One rendered page window over an author's active questions.
#[derive(Debug, Clone)]
pub struct QuestionPage {
  pub items: Vec<Question>,
  /// 1-based, already clamped into `1..=total_pages`.
  pub page: u32,
  pub total: u32,
  /// Never zero — an empty result set still reports one empty page so
  /// navigation controls stay well-defined.
  pub total_pages: u32,
}

impl QuestionPage {
  pub fn has_prev(&self) -> bool { self.page > 1 }

  pub fn has_next(&self) -> bool { self.page < self.total_pages }

  /// The 1-based position of item `index` within the whole listing.
  pub fn ordinal(&self, index: usize) -> u32 {
    (self.page - 1) * PAGE_SIZE + index as u32 + 1
  }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Outcome of [`ListingEngine::question_card`].
#[derive(Debug, Clone)]
pub enum CardOutcome {
  Card(Question),
  /// The question exists but belongs to someone else.
  Forbidden,
  /// Nonexistent or no longer active.
  NotFound,
}

/// Outcome of [`ListingEngine::delete_question`].
#[derive(Debug, Clone)]
pub enum DeleteOutcome {
  Deleted,
  /// Not the author's active question (wrong owner, already deleted, or
  /// never existed — all equivalent from the caller's side).
  Forbidden,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Computes page windows and serves the browse-manage operations.
pub struct ListingEngine<S> {
  questions: Arc<S>,
}

impl<S: QuestionStore> ListingEngine<S> {
  pub fn new(questions: Arc<S>) -> Self { Self { questions } }

  /// Fetch page `page` of `author`'s active questions, newest-first.
  ///
  /// `page < 1` clamps to 1. A page past the end re-fetches the clamped
  /// last valid page — items may have been deleted between the user viewing
  /// the list and pressing "next", and an empty tail page would render
  /// inconsistent navigation.
  pub async fn my_questions(&self, author: UserId, page: u32) -> Result<QuestionPage> {
    let mut page = page.max(1);
    let mut listing = self
      .questions
      .list_by_author(author, page, PAGE_SIZE)
      .await
      .map_err(EngineError::store)?;

    let total_pages = total_pages(listing.total);
    if page > total_pages {
      page = total_pages;
      listing = self
        .questions
        .list_by_author(author, page, PAGE_SIZE)
        .await
        .map_err(EngineError::store)?;
    }

    Ok(QuestionPage {
      items: listing.items,
      page,
      total: listing.total,
      total_pages,
    })
  }

  /// The detail card for one of `author`'s own active questions.
  pub async fn question_card(&self, author: UserId, id: QuestionId) -> Result<CardOutcome> {
    let Some(question) = self
      .questions
      .get_by_id(id)
      .await
      .map_err(EngineError::store)?
    else {
      return Ok(CardOutcome::NotFound);
    };

    if !question.status.is_active() {
      return Ok(CardOutcome::NotFound);
    }
    if question.author_id != author {
      return Ok(CardOutcome::Forbidden);
    }
    Ok(CardOutcome::Card(question))
  }

  /// Soft-delete one of `author`'s active questions. The store's
  /// author-scoped conditional update makes this race-safe against a
  /// concurrent delete or edit.
  pub async fn delete_question(&self, author: UserId, id: QuestionId) -> Result<DeleteOutcome> {
    let deleted = self
      .questions
      .soft_delete_by_author(author, id)
      .await
      .map_err(EngineError::store)?;

    Ok(if deleted {
      DeleteOutcome::Deleted
    } else {
      DeleteOutcome::Forbidden
    })
  }
}

/// ceil(total / PAGE_SIZE) with a floor of one page.
fn total_pages(total: u32) -> u32 {
  (total.div_ceil(PAGE_SIZE)).max(1)
}
