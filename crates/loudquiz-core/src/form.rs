//! Draft-session state for the authoring flow.
//!
//! A [`FormState`] is the externally persisted cursor of the per-user
//! create/edit state machine. It lives in the form store under the user's
//! identifier with a sliding TTL; its absence is the idle state. The record
//! must round-trip through JSON losslessly, including the zero values of the
//! edit-only fields while `mode` is `Create`.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  question::{QuestionDraft, QuestionId},
};

// ─── Mode / step / field ─────────────────────────────────────────────────────

/// Whether the session builds a new question or amends an existing one.
/// Chosen at session start, immutable for the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
  Create,
  Edit,
}

/// The state-machine cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
  /// Awaiting the question text (create mode, first step).
  Question,
  /// Awaiting the answer text (create mode, second step).
  Answer,
  /// Showing the full draft, awaiting confirm/save/edit/cancel.
  Preview,
  /// Awaiting a button press choosing which field to replace.
  ChooseField,
  /// Awaiting the replacement text for the chosen field.
  EditInput,
}

/// Which draft field an edit-input step replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
  Question,
  Answer,
}

impl FormField {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Question => "question",
      Self::Answer => "answer",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "question" => Ok(Self::Question),
      "answer" => Ok(Self::Answer),
      other => Err(crate::Error::UnknownFormField(other.to_owned())),
    }
  }
}

// ─── FormState ───────────────────────────────────────────────────────────────

/// One user's in-flight authoring session.
///
/// `question_id`, `page` and `field` are meaningful only in edit mode; a
/// create-mode session carries their zero values and never reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
  pub mode: FormMode,
  pub step: FormStep,
  /// Edit mode: the question being amended.
  #[serde(default)]
  pub question_id: QuestionId,
  /// Edit mode: the admin listing page to return to after save/cancel.
  #[serde(default)]
  pub page: u32,
  /// Edit mode: the field currently being replaced.
  #[serde(default)]
  pub field: Option<FormField>,
  pub draft: QuestionDraft,
}

impl FormState {
  /// Fresh create-mode session, awaiting the question text.
  pub fn start_create() -> Self {
    Self {
      mode:        FormMode::Create,
      step:        FormStep::Question,
      question_id: 0,
      page:        0,
      field:       None,
      draft:       QuestionDraft::default(),
    }
  }

  /// Fresh edit-mode session preloaded with the target question's draft,
  /// awaiting a field choice.
  pub fn start_edit(question_id: QuestionId, page: u32, draft: QuestionDraft) -> Self {
    Self {
      mode: FormMode::Edit,
      step: FormStep::ChooseField,
      question_id,
      page,
      field: None,
      draft,
    }
  }

  /// Write `text` into the draft field selected by `field`.
  pub fn apply_field(&mut self, field: FormField, text: String) {
    match field {
      FormField::Question => self.draft.question_text = text,
      FormField::Answer => self.draft.answer_text = text,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn create_state_roundtrips_with_zero_edit_fields() {
    let state = FormState::start_create();
    let json = serde_json::to_string(&state).unwrap();
    let back: FormState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);
    assert_eq!(back.question_id, 0);
    assert_eq!(back.page, 0);
    assert!(back.field.is_none());
  }

  #[test]
  fn edit_state_roundtrips() {
    let mut state = FormState::start_edit(
      42,
      3,
      QuestionDraft {
        question_text: "Q".into(),
        answer_text:   "A".into(),
      },
    );
    state.step = FormStep::EditInput;
    state.field = Some(FormField::Answer);

    let json = serde_json::to_string(&state).unwrap();
    let back: FormState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);
  }

  #[test]
  fn apply_field_targets_the_right_text() {
    let mut state = FormState::start_create();
    state.apply_field(FormField::Question, "what?".into());
    state.apply_field(FormField::Answer, "that.".into());
    assert_eq!(state.draft.question_text, "what?");
    assert_eq!(state.draft.answer_text, "that.");
  }
}
