//! The `QuestionStore` and `FormStore` traits.
//!
//! The traits are implemented by storage backends (e.g.
//! `loudquiz-store-sqlite`). The engines in `loudquiz-engine` depend on these
//! abstractions, not on any concrete backend.
//!
//! Absence-shaped outcomes are part of the Ok type (`Option`, `bool`) so
//! callers can classify them without inspecting backend error values:
//! a scoped update that matches zero rows returns `None`/`false`, which the
//! engines surface as forbidden; only infrastructure faults travel through
//! `Self::Error`.

use std::future::Future;

use crate::{
  form::FormState,
  question::{NewQuestion, Question, QuestionDraft, QuestionId, UserId},
};

// ─── Listing result ──────────────────────────────────────────────────────────

/// One page of an author's active questions plus the total count used to
/// derive page navigation.
#[derive(Debug, Clone, Default)]
pub struct QuestionListing {
  pub items: Vec<Question>,
  pub total: u32,
}

// ─── QuestionStore ───────────────────────────────────────────────────────────

/// Abstraction over the durable question store.
///
/// The seen relation is append-only and idempotent: marking a pair that
/// already exists is a no-op, and pairs are never removed, so a user's
/// unseen set only ever shrinks.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait QuestionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new question; the store assigns the identifier and both
  /// timestamps.
  fn create(
    &self,
    input: NewQuestion,
  ) -> impl Future<Output = Result<Question, Self::Error>> + Send + '_;

  /// Retrieve a question by identifier regardless of status.
  /// Returns `None` if no such row exists.
  fn get_by_id(
    &self,
    id: QuestionId,
  ) -> impl Future<Output = Result<Option<Question>, Self::Error>> + Send + '_;

  /// Pick one active question `user` has not seen, at random.
  /// Returns `None` when the user's seen set covers every active question.
  fn get_active_unseen_by_user(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Option<Question>, Self::Error>> + Send + '_;

  /// Record that `user` has seen `id`. Returns `true` iff the pair was newly
  /// inserted; marking an existing pair is a no-op returning `false`.
  fn mark_seen(
    &self,
    user: UserId,
    id: QuestionId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// List `author`'s active questions, newest-first by identifier.
  /// `page` is 1-based; the caller is responsible for clamping.
  fn list_by_author(
    &self,
    author: UserId,
    page: u32,
    page_size: u32,
  ) -> impl Future<Output = Result<QuestionListing, Self::Error>> + Send + '_;

  /// Replace the text fields of the question, but only if it is active and
  /// owned by `author` — a single conditional write. Returns `None` when no
  /// row matched (wrong author, deleted, or gone).
  fn update_by_author(
    &self,
    author: UserId,
    id: QuestionId,
    draft: QuestionDraft,
  ) -> impl Future<Output = Result<Option<Question>, Self::Error>> + Send + '_;

  /// Flip the question to deleted, but only if it is active and owned by
  /// `author`. Returns `false` when no row matched.
  fn soft_delete_by_author(
    &self,
    author: UserId,
    id: QuestionId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── FormStore ───────────────────────────────────────────────────────────────

/// Abstraction over the transient draft-session store.
///
/// One record per user, with a sliding TTL: every `set` resets the clock, so
/// an active flow never expires mid-step. An expired or never-written record
/// reads back as `None`.
pub trait FormStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Option<FormState>, Self::Error>> + Send + '_;

  fn set(
    &self,
    user: UserId,
    state: FormState,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove the session. Deleting an absent session is a no-op.
  fn delete(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
