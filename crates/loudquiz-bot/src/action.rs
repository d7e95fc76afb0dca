//! Typed callback actions.
//!
//! Inline-keyboard button payloads are decoded into this closed enum before
//! any dispatch happens; a payload that fails to parse is dropped, so routing
//! is exhaustive over known variants instead of string-prefix matching at
//! every call site. The wire strings are stable — keyboards already delivered
//! to chats keep working across deployments.

use loudquiz_core::{form::FormField, question::QuestionId};

/// Every button the bot ever renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  /// Back to the main menu.
  Menu,
  /// Serve the next unseen question.
  Play,
  /// Reveal the answer of a served question.
  ShowAnswer(QuestionId),
  /// Open the admin panel.
  AdminMenu,
  /// Start a create flow.
  AddQuestion,
  /// Open page `page` of the caller's own questions.
  ListQuestions { page: u32 },
  /// Open the detail card of one own question.
  OpenQuestion { id: QuestionId, page: u32 },
  /// Start an edit flow on one own question.
  EditQuestion { id: QuestionId, page: u32 },
  /// Ask for delete confirmation.
  AskDelete { id: QuestionId, page: u32 },
  /// Confirmed delete.
  ConfirmDelete { id: QuestionId, page: u32 },
  /// Commit a create-mode draft.
  FormConfirm,
  /// Commit an edit-mode draft.
  FormSave,
  /// Preview → choose which field to change.
  FormEdit,
  /// Choose-field → back to preview.
  FormBack,
  /// Pick the field to replace.
  FormField(FormField),
  /// Abandon the form.
  FormCancel,
  /// Inert button (e.g. the page indicator).
  Noop,
}

impl Action {
  /// Decode a callback payload. Unknown tags, missing parts, and
  /// non-numeric ids all yield `None`.
  pub fn parse(data: &str) -> Option<Self> {
    let parts: Vec<&str> = data.split(':').collect();
    match parts.as_slice() {
      ["menu"] => Some(Self::Menu),
      ["play"] => Some(Self::Play),
      ["noop"] => Some(Self::Noop),
      ["ans", id] => Some(Self::ShowAnswer(id.parse().ok()?)),
      ["adm", "menu"] => Some(Self::AdminMenu),
      ["adm", "add"] => Some(Self::AddQuestion),
      ["adm", "list", page] => Some(Self::ListQuestions { page: page.parse().ok()? }),
      ["adm", "open", id, page] => Some(Self::OpenQuestion {
        id:   id.parse().ok()?,
        page: page.parse().ok()?,
      }),
      ["adm", "edit", id, page] => Some(Self::EditQuestion {
        id:   id.parse().ok()?,
        page: page.parse().ok()?,
      }),
      ["adm", "delask", id, page] => Some(Self::AskDelete {
        id:   id.parse().ok()?,
        page: page.parse().ok()?,
      }),
      ["adm", "del", id, page] => Some(Self::ConfirmDelete {
        id:   id.parse().ok()?,
        page: page.parse().ok()?,
      }),
      ["frm", "c"] => Some(Self::FormConfirm),
      ["frm", "s"] => Some(Self::FormSave),
      ["frm", "e"] => Some(Self::FormEdit),
      ["frm", "b"] => Some(Self::FormBack),
      ["frm", "f", "q"] => Some(Self::FormField(FormField::Question)),
      ["frm", "f", "a"] => Some(Self::FormField(FormField::Answer)),
      ["frm", "x"] => Some(Self::FormCancel),
      _ => None,
    }
  }

  /// Encode back to the wire payload.
  pub fn encode(&self) -> String {
    match self {
      Self::Menu => "menu".into(),
      Self::Play => "play".into(),
      Self::Noop => "noop".into(),
      Self::ShowAnswer(id) => format!("ans:{id}"),
      Self::AdminMenu => "adm:menu".into(),
      Self::AddQuestion => "adm:add".into(),
      Self::ListQuestions { page } => format!("adm:list:{page}"),
      Self::OpenQuestion { id, page } => format!("adm:open:{id}:{page}"),
      Self::EditQuestion { id, page } => format!("adm:edit:{id}:{page}"),
      Self::AskDelete { id, page } => format!("adm:delask:{id}:{page}"),
      Self::ConfirmDelete { id, page } => format!("adm:del:{id}:{page}"),
      Self::FormConfirm => "frm:c".into(),
      Self::FormSave => "frm:s".into(),
      Self::FormEdit => "frm:e".into(),
      Self::FormBack => "frm:b".into(),
      Self::FormField(FormField::Question) => "frm:f:q".into(),
      Self::FormField(FormField::Answer) => "frm:f:a".into(),
      Self::FormCancel => "frm:x".into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_action_roundtrips() {
    let actions = [
      Action::Menu,
      Action::Play,
      Action::Noop,
      Action::ShowAnswer(17),
      Action::AdminMenu,
      Action::AddQuestion,
      Action::ListQuestions { page: 3 },
      Action::OpenQuestion { id: 17, page: 2 },
      Action::EditQuestion { id: 17, page: 2 },
      Action::AskDelete { id: 17, page: 2 },
      Action::ConfirmDelete { id: 17, page: 2 },
      Action::FormConfirm,
      Action::FormSave,
      Action::FormEdit,
      Action::FormBack,
      Action::FormField(FormField::Question),
      Action::FormField(FormField::Answer),
      Action::FormCancel,
    ];
    for action in actions {
      assert_eq!(Action::parse(&action.encode()), Some(action));
    }
  }

  #[test]
  fn malformed_payloads_do_not_parse() {
    for bad in [
      "", "frm", "frm:z", "ans:", "ans:abc", "adm:open:1", "adm:open:x:1",
      "adm:list:", "play:1", "menu:extra", "frm:f:x",
    ] {
      assert_eq!(Action::parse(bad), None, "parsed {bad:?}");
    }
  }
}
