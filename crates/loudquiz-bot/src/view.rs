//! Outbound message rendering: user-facing text plus inline keyboards.
//!
//! Everything a chat ever sees is built here, from engine outcomes. Buttons
//! carry [`Action`] values; the payload string is only produced at the
//! transport edge.

use loudquiz_core::{
  form::{FormField, FormMode, FormState},
  question::{Question, QuestionId},
};
use loudquiz_engine::listing::QuestionPage;

use crate::action::Action;

/// Listing rows show at most this many characters of question text.
const ROW_TEXT_MAX: usize = 40;

// ─── Types ───────────────────────────────────────────────────────────────────

/// One outbound chat message.
#[derive(Debug, Clone)]
pub struct Reply {
  pub text:     String,
  /// Rows of inline buttons; empty means no keyboard.
  pub keyboard: Vec<Vec<Button>>,
}

impl Reply {
  pub fn text(text: impl Into<String>) -> Self {
    Self { text: text.into(), keyboard: Vec::new() }
  }

  pub fn with_keyboard(text: impl Into<String>, keyboard: Vec<Vec<Button>>) -> Self {
    Self { text: text.into(), keyboard }
  }
}

#[derive(Debug, Clone)]
pub struct Button {
  pub label:  String,
  pub action: Action,
}

impl Button {
  pub fn new(label: impl Into<String>, action: Action) -> Self {
    Self { label: label.into(), action }
  }
}

// ─── Player surface ──────────────────────────────────────────────────────────

fn main_menu_keyboard(is_admin: bool) -> Vec<Vec<Button>> {
  let mut rows = vec![vec![Button::new("▶️ Play", Action::Play)]];
  if is_admin {
    rows.push(vec![Button::new("🛠 Manage questions", Action::AdminMenu)]);
  }
  rows
}

pub fn welcome(is_admin: bool) -> Reply {
  Reply::with_keyboard(
    "Welcome to LoudQuiz! Press Play and I'll throw questions at you.",
    main_menu_keyboard(is_admin),
  )
}

pub fn main_menu(is_admin: bool) -> Reply {
  Reply::with_keyboard("Main menu", main_menu_keyboard(is_admin))
}

pub fn question(q: &Question) -> Reply {
  Reply::with_keyboard(q.question_text.clone(), vec![
    vec![Button::new("💡 Show answer", Action::ShowAnswer(q.id))],
    vec![Button::new("➡️ Next question", Action::Play)],
  ])
}

pub fn answer(text: &str) -> Reply {
  Reply::with_keyboard(format!("Answer: {text}"), vec![vec![Button::new(
    "➡️ Next question",
    Action::Play,
  )]])
}

pub fn no_new_questions(is_admin: bool) -> Reply {
  Reply::with_keyboard(
    "You've seen every question there is — check back later for new ones.",
    main_menu_keyboard(is_admin),
  )
}

pub fn question_unavailable() -> Reply {
  Reply::with_keyboard("That question is no longer available.", vec![vec![
    Button::new("➡️ Next question", Action::Play),
  ]])
}

// ─── Admin surface ───────────────────────────────────────────────────────────

pub fn admin_menu() -> Reply {
  Reply::with_keyboard("Question management", vec![
    vec![Button::new("➕ Add question", Action::AddQuestion)],
    vec![Button::new("📋 My questions", Action::ListQuestions { page: 1 })],
    vec![Button::new("⬅️ Back", Action::Menu)],
  ])
}

pub fn no_permission() -> Reply {
  Reply::text("This section is for question authors only.")
}

/// The paginated listing of the caller's own questions.
pub fn listing(page: &QuestionPage) -> Reply {
  let mut rows: Vec<Vec<Button>> = page
    .items
    .iter()
    .enumerate()
    .map(|(i, q)| {
      vec![Button::new(
        format!("{}. {}", page.ordinal(i), short_text(&q.question_text, ROW_TEXT_MAX)),
        Action::OpenQuestion { id: q.id, page: page.page },
      )]
    })
    .collect();

  if page.total_pages > 1 {
    let mut nav = Vec::new();
    if page.has_prev() {
      nav.push(Button::new("⬅️", Action::ListQuestions { page: page.page - 1 }));
    }
    nav.push(Button::new(
      format!("{}/{}", page.page, page.total_pages),
      Action::Noop,
    ));
    if page.has_next() {
      nav.push(Button::new("➡️", Action::ListQuestions { page: page.page + 1 }));
    }
    rows.push(nav);
  }
  rows.push(vec![Button::new("⬅️ Back", Action::AdminMenu)]);

  let text = if page.total == 0 {
    "You have no questions yet.".to_owned()
  } else {
    format!("Your questions ({} total):", page.total)
  };
  Reply::with_keyboard(text, rows)
}

/// Detail card for one own question, reached from the listing.
pub fn card(q: &Question, page: u32) -> Reply {
  Reply::with_keyboard(
    format!("Question:\n{}\n\nAnswer:\n{}", q.question_text, q.answer_text),
    vec![
      vec![
        Button::new("✏️ Edit", Action::EditQuestion { id: q.id, page }),
        Button::new("🗑 Delete", Action::AskDelete { id: q.id, page }),
      ],
      vec![Button::new("⬅️ Back to list", Action::ListQuestions { page })],
    ],
  )
}

pub fn delete_confirm(id: QuestionId, page: u32) -> Reply {
  Reply::with_keyboard("Delete this question? This cannot be undone.", vec![vec![
    Button::new("🗑 Yes, delete", Action::ConfirmDelete { id, page }),
    Button::new("⬅️ No, back", Action::OpenQuestion { id, page }),
  ]])
}

pub fn deleted() -> Reply {
  Reply::text("Question deleted.")
}

/// A card action hit a question that vanished (stale button).
pub fn card_missing(page: u32) -> Reply {
  Reply::with_keyboard("That question no longer exists.", vec![vec![Button::new(
    "⬅️ Back to list",
    Action::ListQuestions { page },
  )]])
}

pub fn not_your_question() -> Reply {
  Reply::text("You can only manage your own questions.")
}

// ─── Form surface ────────────────────────────────────────────────────────────

pub fn prompt_question_text() -> Reply {
  Reply::with_keyboard("Send the question text:", vec![vec![Button::new(
    "✖️ Cancel",
    Action::FormCancel,
  )]])
}

pub fn prompt_answer_text() -> Reply {
  Reply::with_keyboard("Got it. Now send the answer:", vec![vec![Button::new(
    "✖️ Cancel",
    Action::FormCancel,
  )]])
}

pub fn prompt_edit_text(field: FormField) -> Reply {
  let what = match field {
    FormField::Question => "question",
    FormField::Answer => "answer",
  };
  Reply::with_keyboard(format!("Send the new {what} text:"), vec![vec![
    Button::new("⬅️ Back", Action::FormBack),
    Button::new("✖️ Cancel", Action::FormCancel),
  ]])
}

/// The full draft with a commit button matching the session's mode.
pub fn preview(state: &FormState) -> Reply {
  let commit = match state.mode {
    FormMode::Create => Button::new("✅ Add question", Action::FormConfirm),
    FormMode::Edit => Button::new("💾 Save changes", Action::FormSave),
  };
  Reply::with_keyboard(
    format!(
      "Question:\n{}\n\nAnswer:\n{}",
      state.draft.question_text, state.draft.answer_text
    ),
    vec![
      vec![commit],
      vec![
        Button::new("✏️ Edit", Action::FormEdit),
        Button::new("✖️ Cancel", Action::FormCancel),
      ],
    ],
  )
}

pub fn choose_field() -> Reply {
  Reply::with_keyboard("Which field do you want to change?", vec![
    vec![
      Button::new("Question", Action::FormField(FormField::Question)),
      Button::new("Answer", Action::FormField(FormField::Answer)),
    ],
    vec![
      Button::new("⬅️ Back", Action::FormBack),
      Button::new("✖️ Cancel", Action::FormCancel),
    ],
  ])
}

pub fn created() -> Reply {
  Reply::text("Question added. Your players will never see you coming.")
}

pub fn saved() -> Reply {
  Reply::text("Changes saved.")
}

pub fn form_expired() -> Reply {
  Reply::text("That form has expired. Start again from the menu.")
}

pub fn use_the_buttons() -> Reply {
  Reply::text("Please use the buttons above.")
}

pub fn menu_hint() -> Reply {
  Reply::text("I didn't catch that — try /menu.")
}

pub fn something_went_wrong() -> Reply {
  Reply::text("Something went wrong on my side. Please try again.")
}

/// Truncate to `max` characters on a char boundary, marking the cut.
pub fn short_text(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    return s.to_owned();
  }
  let cut: String = s.chars().take(max.saturating_sub(1)).collect();
  format!("{}…", cut.trim_end())
}
