//! Async HTTP client for the Telegram Bot API, plus the slice of the update
//! schema the bot actually consumes.
//!
//! Transport only: nothing here knows what a question is. Updates are reduced
//! to [`Event`]s at the edge and everything else is dropped.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  action::Action,
  dispatch::{Command, Event, Input},
  view::Reply,
};

/// Long-poll window. The HTTP timeout is padded past this so the server,
/// not the client, closes the idle poll.
const POLL_TIMEOUT_SECS: u64 = 50;

// ─── Wire types ──────────────────────────────────────────────────────────────

/// Every Bot API response wraps its payload like this.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
  ok:          bool,
  result:      Option<T>,
  description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
  pub update_id:  i64,
  #[serde(default)]
  message:        Option<Message>,
  #[serde(default)]
  callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct Message {
  chat: Chat,
  #[serde(default)]
  from: Option<User>,
  #[serde(default)]
  text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
  id: i64,
}

#[derive(Debug, Deserialize)]
struct User {
  id: i64,
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
  id:      String,
  from:    User,
  #[serde(default)]
  message: Option<Message>,
  #[serde(default)]
  data:    Option<String>,
}

#[derive(Debug, Serialize)]
struct InlineButton {
  text:          String,
  callback_data: String,
}

/// An update reduced to what dispatch needs, plus the callback-query id
/// that must be acknowledged back to the API.
#[derive(Debug)]
pub struct Inbound {
  pub event:       Event,
  pub callback_id: Option<String>,
}

impl Update {
  /// Reduce this update to a routable event, or `None` for anything the bot
  /// does not handle (joins, stickers, unknown commands, unparseable
  /// callback payloads).
  pub fn into_inbound(self) -> Option<Inbound> {
    if let Some(cb) = self.callback_query {
      let chat_id = cb.message.as_ref().map(|m| m.chat.id).unwrap_or(cb.from.id);
      let action = Action::parse(cb.data.as_deref()?)?;
      return Some(Inbound {
        event:       Event {
          user_id: cb.from.id,
          chat_id,
          input: Input::Callback(action),
        },
        callback_id: Some(cb.id),
      });
    }

    let msg = self.message?;
    let user_id = msg.from?.id;
    let text = msg.text?;

    let input = if let Some(cmd) = text.strip_prefix('/') {
      // Commands may arrive as `/menu@botname` in groups.
      match cmd.split('@').next().unwrap_or(cmd) {
        "start" => Input::Command(Command::Start),
        "menu" => Input::Command(Command::Menu),
        _ => return None,
      }
    } else {
      Input::Text(text)
    };

    Some(Inbound {
      event:       Event { user_id, chat_id: msg.chat.id, input },
      callback_id: None,
    })
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Bot API client. Cheap to clone — the inner [`reqwest::Client`] is
/// `Arc`-based.
#[derive(Clone)]
pub struct BotClient {
  client: Client,
  base:   String,
}

impl BotClient {
  pub fn new(token: &str) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      base: format!("https://api.telegram.org/bot{token}"),
    })
  }

  async fn call<T: serde::de::DeserializeOwned>(
    &self,
    method: &str,
    body: serde_json::Value,
  ) -> Result<T> {
    let resp = self
      .client
      .post(format!("{}/{method}", self.base))
      .json(&body)
      .send()
      .await
      .with_context(|| format!("POST {method} failed"))?;

    let envelope: ApiEnvelope<T> = resp
      .json()
      .await
      .with_context(|| format!("deserialising {method} response"))?;

    if !envelope.ok {
      return Err(anyhow!(
        "{method} → {}",
        envelope.description.as_deref().unwrap_or("unknown API error")
      ));
    }
    envelope
      .result
      .ok_or_else(|| anyhow!("{method} → ok but no result"))
  }

  /// `getUpdates` long poll. Returns as soon as anything arrives, or after
  /// the poll window empty-handed.
  pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
    self
      .call(
        "getUpdates",
        json!({
          "offset": offset,
          "timeout": POLL_TIMEOUT_SECS,
          "allowed_updates": ["message", "callback_query"],
        }),
      )
      .await
  }

  /// `sendMessage`, attaching the reply's keyboard when it has one.
  pub async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<()> {
    let mut body = json!({
      "chat_id": chat_id,
      "text": reply.text,
    });

    if !reply.keyboard.is_empty() {
      let rows: Vec<Vec<InlineButton>> = reply
        .keyboard
        .iter()
        .map(|row| {
          row
            .iter()
            .map(|b| InlineButton {
              text:          b.label.clone(),
              callback_data: b.action.encode(),
            })
            .collect()
        })
        .collect();
      body["reply_markup"] = json!({ "inline_keyboard": rows });
    }

    self.call::<serde_json::Value>("sendMessage", body).await?;
    Ok(())
  }

  /// Acknowledge a callback query so the client stops showing a spinner.
  pub async fn answer_callback(&self, callback_id: &str) -> Result<()> {
    self
      .call::<bool>("answerCallbackQuery", json!({ "callback_query_id": callback_id }))
      .await?;
    Ok(())
  }
}
