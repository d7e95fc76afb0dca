//! The authoring state machine: multi-step create/edit of questions.
//!
//! Per-user state lives in the form store between events; the engine holds
//! nothing. Each operation loads the session, applies one transition, and
//! writes the session back (or deletes it on a terminal transition). A
//! missing session where a continuation was expected surfaces as
//! [`AuthoringOutcome::SessionExpired`] — the TTL may have elapsed, or the
//! flow was never started.

use std::sync::Arc;

use loudquiz_core::{
  form::{FormField, FormMode, FormState, FormStep},
  question::{NewQuestion, Question, QuestionId, UserId},
  store::{FormStore, QuestionStore},
};

use crate::{EngineError, Result};

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Tagged result of one state-machine transition. The transport adapter
/// renders these; the engine never formats presentation strings.
#[derive(Debug, Clone)]
pub enum AuthoringOutcome {
  /// Session created; the next free-text message is the question text.
  AwaitingQuestionText,
  /// Question text accepted; the next message is the answer text.
  AwaitingAnswerText,
  /// The full current draft, for the user to verify before committing.
  Preview(FormState),
  /// Awaiting a button press choosing which field to replace.
  ChoosingField,
  /// Field chosen; the next message replaces that field's text.
  AwaitingEditText(FormField),
  /// Create commit succeeded; session cleared.
  Created(Question),
  /// Edit commit succeeded; session cleared. `page` is the listing page the
  /// flow was started from.
  Saved { question: Question, page: u32 },
  /// Session cleared without committing anything.
  Cancelled,
  /// No session found where a continuation was expected.
  SessionExpired,
  /// The target question exists but is not this user's to edit, or was
  /// concurrently deleted.
  Forbidden,
  /// The target question does not exist.
  NotFound,
  /// A commit action that does not match the session's mode; rejected.
  WrongMode,
  /// Free text arrived in a step that only accepts button presses.
  UnexpectedText,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Drives the create/edit conversational flow.
pub struct AuthoringEngine<Q, F> {
  questions: Arc<Q>,
  forms:     Arc<F>,
}

impl<Q: QuestionStore, F: FormStore> AuthoringEngine<Q, F> {
  pub fn new(questions: Arc<Q>, forms: Arc<F>) -> Self {
    Self { questions, forms }
  }

  /// The user's current session, if any. Absence is the idle state.
  pub async fn session(&self, user: UserId) -> Result<Option<FormState>> {
    self.forms.get(user).await.map_err(EngineError::store)
  }

  // ── Session start ─────────────────────────────────────────────────────────

  /// Begin a create flow, replacing any session the user already had.
  pub async fn start_create(&self, user: UserId) -> Result<AuthoringOutcome> {
    self
      .forms
      .set(user, FormState::start_create())
      .await
      .map_err(EngineError::store)?;
    Ok(AuthoringOutcome::AwaitingQuestionText)
  }

  /// Begin an edit flow on `id`, preloading the draft from the stored
  /// question. Only the author of a still-active question may start one.
  pub async fn start_edit(
    &self,
    user: UserId,
    id: QuestionId,
    page: u32,
  ) -> Result<AuthoringOutcome> {
    let Some(question) = self
      .questions
      .get_by_id(id)
      .await
      .map_err(EngineError::store)?
    else {
      return Ok(AuthoringOutcome::NotFound);
    };

    if question.author_id != user || !question.status.is_active() {
      return Ok(AuthoringOutcome::Forbidden);
    }

    self
      .forms
      .set(user, FormState::start_edit(question.id, page, question.draft()))
      .await
      .map_err(EngineError::store)?;
    Ok(AuthoringOutcome::ChoosingField)
  }

  // ── Step transitions ──────────────────────────────────────────────────────

  /// Feed one free-text message into the session.
  pub async fn text_input(&self, user: UserId, text: &str) -> Result<AuthoringOutcome> {
    let Some(mut state) = self.session(user).await? else {
      return Ok(AuthoringOutcome::SessionExpired);
    };

    match state.step {
      FormStep::Question => {
        state.draft.question_text = text.to_owned();
        state.step = FormStep::Answer;
        self.save_session(user, state).await?;
        Ok(AuthoringOutcome::AwaitingAnswerText)
      }
      FormStep::Answer => {
        state.draft.answer_text = text.to_owned();
        state.step = FormStep::Preview;
        self.save_session(user, state.clone()).await?;
        Ok(AuthoringOutcome::Preview(state))
      }
      FormStep::EditInput => {
        let Some(field) = state.field else {
          // A session can only reach EditInput through choose_field, which
          // always sets the field; treat a missing one as stray input.
          return Ok(AuthoringOutcome::UnexpectedText);
        };
        state.apply_field(field, text.to_owned());
        state.step = FormStep::Preview;
        self.save_session(user, state.clone()).await?;
        Ok(AuthoringOutcome::Preview(state))
      }
      FormStep::Preview | FormStep::ChooseField => Ok(AuthoringOutcome::UnexpectedText),
    }
  }

  /// Preview → choose-field (the "edit" button on the preview).
  pub async fn request_edit(&self, user: UserId) -> Result<AuthoringOutcome> {
    let Some(mut state) = self.session(user).await? else {
      return Ok(AuthoringOutcome::SessionExpired);
    };
    state.step = FormStep::ChooseField;
    self.save_session(user, state).await?;
    Ok(AuthoringOutcome::ChoosingField)
  }

  /// Choose-field → edit-input for the picked field.
  pub async fn choose_field(&self, user: UserId, field: FormField) -> Result<AuthoringOutcome> {
    let Some(mut state) = self.session(user).await? else {
      return Ok(AuthoringOutcome::SessionExpired);
    };
    state.field = Some(field);
    state.step = FormStep::EditInput;
    self.save_session(user, state).await?;
    Ok(AuthoringOutcome::AwaitingEditText(field))
  }

  /// Choose-field → preview (the "back" button).
  pub async fn back_to_preview(&self, user: UserId) -> Result<AuthoringOutcome> {
    let Some(mut state) = self.session(user).await? else {
      return Ok(AuthoringOutcome::SessionExpired);
    };
    state.step = FormStep::Preview;
    self.save_session(user, state.clone()).await?;
    Ok(AuthoringOutcome::Preview(state))
  }

  // ── Commits ───────────────────────────────────────────────────────────────

  /// Commit a create-mode draft: store the question owned by `user`, mark it
  /// seen by its author (so rotation never serves authors their own
  /// question), and clear the session. A failure to record the seen mark
  /// fails the whole commit; the session is kept so the user can retry.
  pub async fn confirm(&self, user: UserId) -> Result<AuthoringOutcome> {
    let Some(state) = self.session(user).await? else {
      return Ok(AuthoringOutcome::SessionExpired);
    };
    if state.mode != FormMode::Create {
      return Ok(AuthoringOutcome::WrongMode);
    }

    let created = self
      .questions
      .create(NewQuestion::from_draft(user, state.draft))
      .await
      .map_err(EngineError::store)?;
    self
      .questions
      .mark_seen(user, created.id)
      .await
      .map_err(EngineError::store)?;

    self.forms.delete(user).await.map_err(EngineError::store)?;
    Ok(AuthoringOutcome::Created(created))
  }

  /// Commit an edit-mode draft through the store's author-scoped conditional
  /// update. If the question was deleted or reassigned since the flow
  /// started, the update matches nothing and the commit is forbidden — the
  /// session is kept untouched, nothing is written.
  pub async fn save(&self, user: UserId) -> Result<AuthoringOutcome> {
    let Some(state) = self.session(user).await? else {
      return Ok(AuthoringOutcome::SessionExpired);
    };
    if state.mode != FormMode::Edit {
      return Ok(AuthoringOutcome::WrongMode);
    }

    let updated = self
      .questions
      .update_by_author(user, state.question_id, state.draft)
      .await
      .map_err(EngineError::store)?;

    let Some(question) = updated else {
      return Ok(AuthoringOutcome::Forbidden);
    };

    self.forms.delete(user).await.map_err(EngineError::store)?;
    Ok(AuthoringOutcome::Saved { question, page: state.page })
  }

  /// Drop the session unconditionally. Cancelling with no session is a
  /// no-op, not an error.
  pub async fn cancel(&self, user: UserId) -> Result<AuthoringOutcome> {
    self.forms.delete(user).await.map_err(EngineError::store)?;
    Ok(AuthoringOutcome::Cancelled)
  }

  async fn save_session(&self, user: UserId, state: FormState) -> Result<()> {
    self.forms.set(user, state).await.map_err(EngineError::store)
  }
}
