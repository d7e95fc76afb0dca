//! Event routing: one inbound chat event in, zero or more replies out.
//!
//! The dispatcher owns the three engines and the admin allowlist. It maps
//! engine outcomes to rendered replies and never touches the stores
//! directly. Store failures are logged here and collapse to a single
//! generic-failure reply; the user is never shown an error chain.

use std::sync::Arc;

use loudquiz_core::{
  question::UserId,
  store::{FormStore, QuestionStore},
};
use loudquiz_engine::{
  authoring::{AuthoringEngine, AuthoringOutcome},
  listing::{CardOutcome, DeleteOutcome, ListingEngine},
  rotation::{NextQuestion, RotationEngine},
};

use crate::{access::Access, action::Action, view, view::Reply};

// ─── Events ──────────────────────────────────────────────────────────────────

/// Slash commands the bot reacts to. Anything else is ignored upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Start,
  Menu,
}

#[derive(Debug, Clone)]
pub enum Input {
  Command(Command),
  /// Free-form message text.
  Text(String),
  /// A decoded inline-button press.
  Callback(Action),
}

/// One inbound chat event, already reduced to what routing needs.
#[derive(Debug, Clone)]
pub struct Event {
  pub user_id: UserId,
  pub chat_id: i64,
  pub input:   Input,
}

// ─── Dispatcher ──────────────────────────────────────────────────────────────

pub struct Dispatcher<Q, F> {
  rotation:  RotationEngine<Q>,
  authoring: AuthoringEngine<Q, F>,
  listing:   ListingEngine<Q>,
  access:    Access,
}

impl<Q: QuestionStore, F: FormStore> Dispatcher<Q, F> {
  pub fn new(questions: Arc<Q>, forms: Arc<F>, access: Access) -> Self {
    Self {
      rotation: RotationEngine::new(questions.clone()),
      authoring: AuthoringEngine::new(questions.clone(), forms),
      listing: ListingEngine::new(questions),
      access,
    }
  }

  /// Route one event. Infrastructure failures never escape: they are logged
  /// and the user gets a generic apology.
  pub async fn handle(&self, event: Event) -> Vec<Reply> {
    match self.route(&event).await {
      Ok(replies) => replies,
      Err(err) => {
        tracing::error!(user = event.user_id, error = %err, "event handling failed");
        vec![view::something_went_wrong()]
      }
    }
  }

  async fn route(&self, event: &Event) -> loudquiz_engine::Result<Vec<Reply>> {
    let user = event.user_id;
    let is_admin = self.access.is_admin(user);

    match &event.input {
      Input::Command(cmd) => self.on_command(user, *cmd, is_admin).await,
      Input::Text(text) => self.on_text(user, text, is_admin).await,
      Input::Callback(action) => self.on_callback(user, *action, is_admin).await,
    }
  }

  /// `/start` and `/menu` both abandon any in-flight form and land on the
  /// main menu; a user who types a command mid-form wants out.
  async fn on_command(
    &self,
    user: UserId,
    cmd: Command,
    is_admin: bool,
  ) -> loudquiz_engine::Result<Vec<Reply>> {
    self.authoring.cancel(user).await?;
    Ok(vec![match cmd {
      Command::Start => view::welcome(is_admin),
      Command::Menu => view::main_menu(is_admin),
    }])
  }

  /// Free text feeds an authoring session when one exists; outside a
  /// session only a typed "play" means anything.
  async fn on_text(
    &self,
    user: UserId,
    text: &str,
    is_admin: bool,
  ) -> loudquiz_engine::Result<Vec<Reply>> {
    let text = text.trim();
    if text.is_empty() {
      return Ok(Vec::new());
    }

    Ok(match self.authoring.text_input(user, text).await? {
      AuthoringOutcome::AwaitingAnswerText => vec![view::prompt_answer_text()],
      AuthoringOutcome::Preview(state) => vec![view::preview(&state)],
      AuthoringOutcome::UnexpectedText => vec![view::use_the_buttons()],
      // No session: plain chatter outside any flow.
      AuthoringOutcome::SessionExpired if text.eq_ignore_ascii_case("play") => {
        self.play(user, is_admin).await?
      }
      AuthoringOutcome::SessionExpired => vec![view::menu_hint()],
      _ => vec![view::use_the_buttons()],
    })
  }

  async fn play(&self, user: UserId, is_admin: bool) -> loudquiz_engine::Result<Vec<Reply>> {
    Ok(match self.rotation.next_question(user).await? {
      NextQuestion::Question(q) => vec![view::question(&q)],
      NextQuestion::NoNewQuestions => vec![view::no_new_questions(is_admin)],
    })
  }

  async fn on_callback(
    &self,
    user: UserId,
    action: Action,
    is_admin: bool,
  ) -> loudquiz_engine::Result<Vec<Reply>> {
    use Action::*;

    // Everything past the player surface needs the allowlist.
    if !is_admin && !matches!(action, Menu | Play | ShowAnswer(_) | Noop) {
      return Ok(vec![view::no_permission()]);
    }

    Ok(match action {
      Noop => Vec::new(),

      Menu => {
        self.authoring.cancel(user).await?;
        vec![view::main_menu(is_admin)]
      }

      Play => self.play(user, is_admin).await?,

      ShowAnswer(id) => match self.rotation.answer_by_question_id(id).await? {
        Some(answer) => vec![view::answer(&answer)],
        None => vec![view::question_unavailable()],
      },

      AdminMenu => vec![view::admin_menu()],

      AddQuestion => match self.authoring.start_create(user).await? {
        AuthoringOutcome::AwaitingQuestionText => vec![view::prompt_question_text()],
        _ => Vec::new(),
      },

      ListQuestions { page } => {
        let page = self.listing.my_questions(user, page).await?;
        vec![view::listing(&page)]
      }

      OpenQuestion { id, page } => match self.listing.question_card(user, id).await? {
        CardOutcome::Card(q) => vec![view::card(&q, page)],
        CardOutcome::Forbidden => vec![view::not_your_question()],
        CardOutcome::NotFound => vec![view::card_missing(page)],
      },

      EditQuestion { id, page } => match self.authoring.start_edit(user, id, page).await? {
        AuthoringOutcome::ChoosingField => vec![view::choose_field()],
        AuthoringOutcome::Forbidden => vec![view::not_your_question()],
        AuthoringOutcome::NotFound => vec![view::card_missing(page)],
        _ => Vec::new(),
      },

      AskDelete { id, page } => vec![view::delete_confirm(id, page)],

      ConfirmDelete { id, page } => match self.listing.delete_question(user, id).await? {
        DeleteOutcome::Deleted => {
          let refreshed = self.listing.my_questions(user, page).await?;
          vec![view::deleted(), view::listing(&refreshed)]
        }
        DeleteOutcome::Forbidden => vec![view::not_your_question()],
      },

      FormEdit => match self.authoring.request_edit(user).await? {
        AuthoringOutcome::ChoosingField => vec![view::choose_field()],
        _ => vec![view::form_expired()],
      },

      FormBack => match self.authoring.back_to_preview(user).await? {
        AuthoringOutcome::Preview(state) => vec![view::preview(&state)],
        _ => vec![view::form_expired()],
      },

      FormField(field) => match self.authoring.choose_field(user, field).await? {
        AuthoringOutcome::AwaitingEditText(field) => vec![view::prompt_edit_text(field)],
        _ => vec![view::form_expired()],
      },

      FormConfirm => match self.authoring.confirm(user).await? {
        AuthoringOutcome::Created(_) => vec![view::created(), view::admin_menu()],
        AuthoringOutcome::WrongMode => vec![view::use_the_buttons()],
        _ => vec![view::form_expired()],
      },

      FormSave => match self.authoring.save(user).await? {
        AuthoringOutcome::Saved { question, page } => {
          vec![view::saved(), view::card(&question, page)]
        }
        AuthoringOutcome::Forbidden => vec![view::not_your_question()],
        AuthoringOutcome::WrongMode => vec![view::use_the_buttons()],
        _ => vec![view::form_expired()],
      },

      FormCancel => {
        self.authoring.cancel(user).await?;
        vec![view::admin_menu()]
      }
    })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
