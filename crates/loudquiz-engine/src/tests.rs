//! Engine tests against the real in-memory SQLite store.

use std::sync::Arc;

use chrono::Utc;
use loudquiz_core::{
  form::FormField,
  question::{NewQuestion, Question, QuestionDraft, QuestionId, QuestionStatus},
  store::{QuestionListing, QuestionStore},
};
use loudquiz_store_sqlite::SqliteStore;

use crate::{
  authoring::{AuthoringEngine, AuthoringOutcome},
  listing::{CardOutcome, DeleteOutcome, ListingEngine, PAGE_SIZE},
  rotation::{NextQuestion, RotationEngine},
};

async fn store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"))
}

fn engines(
  store: &Arc<SqliteStore>,
) -> (
  RotationEngine<SqliteStore>,
  AuthoringEngine<SqliteStore, SqliteStore>,
  ListingEngine<SqliteStore>,
) {
  (
    RotationEngine::new(store.clone()),
    AuthoringEngine::new(store.clone(), store.clone()),
    ListingEngine::new(store.clone()),
  )
}

async fn seed_question(store: &SqliteStore, author: i64, text: &str) -> QuestionId {
  let q = store
    .create(NewQuestion {
      question_text: text.into(),
      answer_text:   format!("answer: {text}"),
      author_id:     author,
      status:        QuestionStatus::Active,
    })
    .await
    .unwrap();
  store.mark_seen(author, q.id).await.unwrap();
  q.id
}

// ─── Rotation ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rotation_never_repeats_a_question() {
  let s = store().await;
  let (rotation, _, _) = engines(&s);
  for i in 0..3 {
    seed_question(&s, 1, &format!("q{i}")).await;
  }

  let mut served = Vec::new();
  for _ in 0..3 {
    match rotation.next_question(7).await.unwrap() {
      NextQuestion::Question(q) => served.push(q.id),
      NextQuestion::NoNewQuestions => panic!("pool exhausted too early"),
    }
  }
  served.sort_unstable();
  served.dedup();
  assert_eq!(served.len(), 3, "a question was served twice");

  assert!(matches!(
    rotation.next_question(7).await.unwrap(),
    NextQuestion::NoNewQuestions
  ));
}

#[tokio::test]
async fn new_question_becomes_eligible_after_exhaustion() {
  let s = store().await;
  let (rotation, _, _) = engines(&s);
  seed_question(&s, 1, "first").await;

  assert!(matches!(
    rotation.next_question(7).await.unwrap(),
    NextQuestion::Question(_)
  ));
  assert!(matches!(
    rotation.next_question(7).await.unwrap(),
    NextQuestion::NoNewQuestions
  ));

  let fresh = seed_question(&s, 1, "second").await;
  match rotation.next_question(7).await.unwrap() {
    NextQuestion::Question(q) => assert_eq!(q.id, fresh),
    NextQuestion::NoNewQuestions => panic!("fresh question not served"),
  }
}

/// A scripted store: hands out a fixed sequence of picks and seen-mark
/// results, so the losing side of the pick/mark race can be staged
/// deterministically.
struct ScriptedStore {
  picks: std::sync::Mutex<std::collections::VecDeque<Question>>,
  marks: std::sync::Mutex<std::collections::VecDeque<bool>>,
}

impl ScriptedStore {
  fn new(picks: Vec<Question>, marks: Vec<bool>) -> Self {
    Self {
      picks: std::sync::Mutex::new(picks.into()),
      marks: std::sync::Mutex::new(marks.into()),
    }
  }
}

impl QuestionStore for ScriptedStore {
  type Error = std::convert::Infallible;

  async fn create(&self, _input: NewQuestion) -> Result<Question, Self::Error> {
    unreachable!("rotation never creates")
  }

  async fn get_by_id(&self, _id: QuestionId) -> Result<Option<Question>, Self::Error> {
    unreachable!("rotation picks, it does not fetch by id here")
  }

  async fn get_active_unseen_by_user(&self, _user: i64) -> Result<Option<Question>, Self::Error> {
    Ok(self.picks.lock().unwrap().pop_front())
  }

  async fn mark_seen(&self, _user: i64, _id: QuestionId) -> Result<bool, Self::Error> {
    Ok(self.marks.lock().unwrap().pop_front().unwrap_or(true))
  }

  async fn list_by_author(
    &self,
    _author: i64,
    _page: u32,
    _page_size: u32,
  ) -> Result<QuestionListing, Self::Error> {
    unreachable!()
  }

  async fn update_by_author(
    &self,
    _author: i64,
    _id: QuestionId,
    _draft: QuestionDraft,
  ) -> Result<Option<Question>, Self::Error> {
    unreachable!()
  }

  async fn soft_delete_by_author(
    &self,
    _author: i64,
    _id: QuestionId,
  ) -> Result<bool, Self::Error> {
    unreachable!()
  }
}

fn scripted_question(id: QuestionId) -> Question {
  Question {
    id,
    question_text: format!("q{id}"),
    answer_text: format!("a{id}"),
    author_id: 1,
    status: QuestionStatus::Active,
    created_at: Utc::now(),
    updated_at: Utc::now(),
  }
}

#[tokio::test]
async fn lost_seen_mark_race_re_picks_the_next_candidate() {
  // First pick loses the seen-mark race (the pair was already present);
  // the engine must come back with the second candidate, never the
  // contested one.
  let store = Arc::new(ScriptedStore::new(
    vec![scripted_question(1), scripted_question(2)],
    vec![false, true],
  ));
  let rotation = RotationEngine::new(store);

  match rotation.next_question(7).await.unwrap() {
    NextQuestion::Question(q) => assert_eq!(q.id, 2),
    NextQuestion::NoNewQuestions => panic!("second candidate not served"),
  }
}

#[tokio::test]
async fn exhaustion_after_a_lost_race_reports_no_new_questions() {
  // Only one candidate, and a concurrent call already claimed it.
  let store = Arc::new(ScriptedStore::new(vec![scripted_question(1)], vec![false]));
  let rotation = RotationEngine::new(store);

  assert!(matches!(
    rotation.next_question(7).await.unwrap(),
    NextQuestion::NoNewQuestions
  ));
}

#[tokio::test]
async fn authors_never_get_their_own_questions() {
  let s = store().await;
  let (rotation, _, _) = engines(&s);
  seed_question(&s, 1, "mine").await;

  assert!(matches!(
    rotation.next_question(1).await.unwrap(),
    NextQuestion::NoNewQuestions
  ));
  assert!(matches!(
    rotation.next_question(2).await.unwrap(),
    NextQuestion::Question(_)
  ));
}

#[tokio::test]
async fn answer_lookup_hides_deleted_questions() {
  let s = store().await;
  let (rotation, _, listing) = engines(&s);
  let id = seed_question(&s, 1, "ephemeral").await;

  assert_eq!(
    rotation.answer_by_question_id(id).await.unwrap().as_deref(),
    Some("answer: ephemeral")
  );

  assert!(matches!(
    listing.delete_question(1, id).await.unwrap(),
    DeleteOutcome::Deleted
  ));

  // A stale button to a deleted question behaves like a dangling one.
  assert!(rotation.answer_by_question_id(id).await.unwrap().is_none());
  assert!(rotation.answer_by_question_id(id + 1000).await.unwrap().is_none());
}

// ─── Authoring: create flow ──────────────────────────────────────────────────

#[tokio::test]
async fn create_flow_reaches_preview_and_commits() {
  let s = store().await;
  let (rotation, authoring, listing) = engines(&s);

  assert!(matches!(
    authoring.start_create(1).await.unwrap(),
    AuthoringOutcome::AwaitingQuestionText
  ));
  assert!(matches!(
    authoring.text_input(1, "Q1").await.unwrap(),
    AuthoringOutcome::AwaitingAnswerText
  ));

  let preview = authoring.text_input(1, "A1").await.unwrap();
  let AuthoringOutcome::Preview(state) = preview else {
    panic!("expected preview, got {preview:?}");
  };
  assert_eq!(state.draft.question_text, "Q1");
  assert_eq!(state.draft.answer_text, "A1");

  let committed = authoring.confirm(1).await.unwrap();
  let AuthoringOutcome::Created(q) = committed else {
    panic!("expected created, got {committed:?}");
  };
  assert_eq!(q.author_id, 1);
  assert_eq!(q.status, QuestionStatus::Active);
  assert_eq!(q.question_text, "Q1");

  // Session is gone; the author never gets served their own question.
  assert!(authoring.session(1).await.unwrap().is_none());
  assert!(matches!(
    rotation.next_question(1).await.unwrap(),
    NextQuestion::NoNewQuestions
  ));

  // But other players do.
  match rotation.next_question(2).await.unwrap() {
    NextQuestion::Question(served) => assert_eq!(served.id, q.id),
    NextQuestion::NoNewQuestions => panic!("new question not in rotation"),
  }

  let page = listing.my_questions(1, 1).await.unwrap();
  assert_eq!(page.total, 1);
}

#[tokio::test]
async fn cancel_commits_nothing() {
  let s = store().await;
  let (_, authoring, listing) = engines(&s);

  authoring.start_create(1).await.unwrap();
  authoring.text_input(1, "Q1").await.unwrap();
  assert!(matches!(
    authoring.cancel(1).await.unwrap(),
    AuthoringOutcome::Cancelled
  ));

  assert!(authoring.session(1).await.unwrap().is_none());
  assert_eq!(listing.my_questions(1, 1).await.unwrap().total, 0);

  // Cancelling an already-absent session is a no-op.
  assert!(matches!(
    authoring.cancel(1).await.unwrap(),
    AuthoringOutcome::Cancelled
  ));
}

#[tokio::test]
async fn text_without_a_session_is_expired() {
  let s = store().await;
  let (_, authoring, _) = engines(&s);
  assert!(matches!(
    authoring.text_input(1, "hello").await.unwrap(),
    AuthoringOutcome::SessionExpired
  ));
}

#[tokio::test]
async fn stray_text_in_preview_is_rejected() {
  let s = store().await;
  let (_, authoring, _) = engines(&s);

  authoring.start_create(1).await.unwrap();
  authoring.text_input(1, "Q1").await.unwrap();
  authoring.text_input(1, "A1").await.unwrap();

  assert!(matches!(
    authoring.text_input(1, "stray").await.unwrap(),
    AuthoringOutcome::UnexpectedText
  ));
}

#[tokio::test]
async fn preview_edit_loop_amends_the_draft() {
  let s = store().await;
  let (_, authoring, _) = engines(&s);

  authoring.start_create(1).await.unwrap();
  authoring.text_input(1, "Q1").await.unwrap();
  authoring.text_input(1, "A1").await.unwrap();

  assert!(matches!(
    authoring.request_edit(1).await.unwrap(),
    AuthoringOutcome::ChoosingField
  ));
  assert!(matches!(
    authoring.choose_field(1, FormField::Question).await.unwrap(),
    AuthoringOutcome::AwaitingEditText(FormField::Question)
  ));

  let outcome = authoring.text_input(1, "Q2").await.unwrap();
  let AuthoringOutcome::Preview(state) = outcome else {
    panic!("expected preview, got {outcome:?}");
  };
  assert_eq!(state.draft.question_text, "Q2");
  assert_eq!(state.draft.answer_text, "A1");
}

#[tokio::test]
async fn back_returns_to_preview_unchanged() {
  let s = store().await;
  let (_, authoring, _) = engines(&s);

  authoring.start_create(1).await.unwrap();
  authoring.text_input(1, "Q1").await.unwrap();
  authoring.text_input(1, "A1").await.unwrap();
  authoring.request_edit(1).await.unwrap();

  let outcome = authoring.back_to_preview(1).await.unwrap();
  let AuthoringOutcome::Preview(state) = outcome else {
    panic!("expected preview, got {outcome:?}");
  };
  assert_eq!(state.draft.question_text, "Q1");
  assert_eq!(state.draft.answer_text, "A1");
}

// ─── Authoring: edit flow ────────────────────────────────────────────────────

#[tokio::test]
async fn edit_flow_replaces_one_field_and_saves() {
  let s = store().await;
  let (_, authoring, _) = engines(&s);
  let id = seed_question(&s, 1, "original").await;

  assert!(matches!(
    authoring.start_edit(1, id, 2).await.unwrap(),
    AuthoringOutcome::ChoosingField
  ));
  authoring.choose_field(1, FormField::Answer).await.unwrap();

  let outcome = authoring.text_input(1, "better answer").await.unwrap();
  let AuthoringOutcome::Preview(state) = outcome else {
    panic!("expected preview, got {outcome:?}");
  };
  // The untouched field keeps the preloaded text.
  assert_eq!(state.draft.question_text, "original");
  assert_eq!(state.draft.answer_text, "better answer");

  let saved = authoring.save(1).await.unwrap();
  let AuthoringOutcome::Saved { question, page } = saved else {
    panic!("expected saved, got {saved:?}");
  };
  assert_eq!(page, 2);
  assert_eq!(question.answer_text, "better answer");

  let stored = s.get_by_id(id).await.unwrap().unwrap();
  assert_eq!(stored.answer_text, "better answer");
  assert!(authoring.session(1).await.unwrap().is_none());
}

#[tokio::test]
async fn start_edit_rejects_foreign_and_missing_questions() {
  let s = store().await;
  let (_, authoring, _) = engines(&s);
  let id = seed_question(&s, 1, "not yours").await;

  assert!(matches!(
    authoring.start_edit(2, id, 1).await.unwrap(),
    AuthoringOutcome::Forbidden
  ));
  assert!(matches!(
    authoring.start_edit(2, id + 1000, 1).await.unwrap(),
    AuthoringOutcome::NotFound
  ));
}

#[tokio::test]
async fn save_after_concurrent_delete_is_forbidden() {
  let s = store().await;
  let (_, authoring, listing) = engines(&s);
  let id = seed_question(&s, 1, "contested").await;

  authoring.start_edit(1, id, 1).await.unwrap();
  authoring.choose_field(1, FormField::Question).await.unwrap();
  authoring.text_input(1, "rewritten").await.unwrap();

  // The question disappears under the open form.
  assert!(matches!(
    listing.delete_question(1, id).await.unwrap(),
    DeleteOutcome::Deleted
  ));

  assert!(matches!(
    authoring.save(1).await.unwrap(),
    AuthoringOutcome::Forbidden
  ));

  // Not resurrected, not overwritten.
  let stored = s.get_by_id(id).await.unwrap().unwrap();
  assert_eq!(stored.status, QuestionStatus::Deleted);
  assert_eq!(stored.question_text, "contested");
}

#[tokio::test]
async fn commits_in_the_wrong_mode_are_rejected() {
  let s = store().await;
  let (_, authoring, _) = engines(&s);

  // save on a create-mode session
  authoring.start_create(1).await.unwrap();
  authoring.text_input(1, "Q").await.unwrap();
  authoring.text_input(1, "A").await.unwrap();
  assert!(matches!(
    authoring.save(1).await.unwrap(),
    AuthoringOutcome::WrongMode
  ));

  // confirm on an edit-mode session
  let id = seed_question(&s, 2, "editable").await;
  authoring.start_edit(2, id, 1).await.unwrap();
  assert!(matches!(
    authoring.confirm(2).await.unwrap(),
    AuthoringOutcome::WrongMode
  ));

  // Neither session was consumed by the rejected commit.
  assert!(authoring.session(1).await.unwrap().is_some());
  assert!(authoring.session(2).await.unwrap().is_some());
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_listing_is_one_empty_page() {
  let s = store().await;
  let (_, _, listing) = engines(&s);

  let page = listing.my_questions(1, 1).await.unwrap();
  assert!(page.items.is_empty());
  assert_eq!(page.total, 0);
  assert_eq!(page.total_pages, 1);
  assert!(!page.has_prev());
  assert!(!page.has_next());
}

#[tokio::test]
async fn listing_windows_and_navigation() {
  let s = store().await;
  let (_, _, listing) = engines(&s);
  for i in 0..23 {
    seed_question(&s, 1, &format!("q{i}")).await;
  }

  let p1 = listing.my_questions(1, 1).await.unwrap();
  assert_eq!(p1.items.len(), 10);
  assert_eq!(p1.total_pages, 3);
  assert!(!p1.has_prev());
  assert!(p1.has_next());

  let p3 = listing.my_questions(1, 3).await.unwrap();
  assert_eq!(p3.items.len(), 3);
  assert!(p3.has_prev());
  assert!(!p3.has_next());

  // Ordinals continue across pages.
  assert_eq!(p1.ordinal(0), 1);
  assert_eq!(p3.ordinal(0), 2 * PAGE_SIZE + 1);
}

#[tokio::test]
async fn out_of_range_pages_clamp() {
  let s = store().await;
  let (_, _, listing) = engines(&s);
  for i in 0..23 {
    seed_question(&s, 1, &format!("q{i}")).await;
  }

  // Far past the end: same window as the last valid page.
  let p99 = listing.my_questions(1, 99).await.unwrap();
  assert_eq!(p99.page, 3);
  assert_eq!(p99.items.len(), 3);

  // Below the start: clamped to 1.
  let p0 = listing.my_questions(1, 0).await.unwrap();
  assert_eq!(p0.page, 1);
  assert_eq!(p0.items.len(), 10);
}

#[tokio::test]
async fn question_card_is_owner_gated() {
  let s = store().await;
  let (_, _, listing) = engines(&s);
  let id = seed_question(&s, 1, "card").await;

  assert!(matches!(
    listing.question_card(1, id).await.unwrap(),
    CardOutcome::Card(_)
  ));
  assert!(matches!(
    listing.question_card(2, id).await.unwrap(),
    CardOutcome::Forbidden
  ));
  assert!(matches!(
    listing.question_card(1, id + 1000).await.unwrap(),
    CardOutcome::NotFound
  ));

  listing.delete_question(1, id).await.unwrap();
  assert!(matches!(
    listing.question_card(1, id).await.unwrap(),
    CardOutcome::NotFound
  ));
}

#[tokio::test]
async fn delete_by_non_author_is_forbidden() {
  let s = store().await;
  let (_, _, listing) = engines(&s);
  let id = seed_question(&s, 1, "protected").await;

  assert!(matches!(
    listing.delete_question(2, id).await.unwrap(),
    DeleteOutcome::Forbidden
  ));
  let stored = s.get_by_id(id).await.unwrap().unwrap();
  assert_eq!(stored.status, QuestionStatus::Active);
}
