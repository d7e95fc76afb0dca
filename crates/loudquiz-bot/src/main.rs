//! loudquiz bot binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and long-polls the Telegram Bot API, handling
//! each update on its own task.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use loudquiz_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod access;
mod action;
mod dispatch;
mod telegram;
mod view;

use access::Access;
use dispatch::Dispatcher;
use telegram::BotClient;

#[derive(Parser)]
#[command(author, version, about = "LoudQuiz Telegram bot")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
struct BotConfig {
  /// Telegram Bot API token.
  bot_token:  String,
  /// Path to the SQLite database file.
  store_path: PathBuf,
  /// Comma-separated user ids allowed to author questions.
  #[serde(default)]
  admin_ids:  String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("LOUDQUIZ"))
    .build()
    .context("failed to read config file")?;

  let bot_cfg: BotConfig = settings
    .try_deserialize()
    .context("failed to deserialise BotConfig")?;

  let access = Access::from_csv(&bot_cfg.admin_ids).context("invalid admin_ids")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&bot_cfg.store_path);

  // Open SQLite store.
  let store = Arc::new(
    SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?,
  );

  let dispatcher = Arc::new(Dispatcher::new(store.clone(), store, access));
  let client = BotClient::new(&bot_cfg.bot_token)?;

  tracing::info!("polling for updates");
  run(client, dispatcher).await
}

/// The long-poll loop. One task per update; the offset only advances past
/// updates we have already fanned out, so a crash re-delivers at most one
/// poll batch.
async fn run(
  client: BotClient,
  dispatcher: Arc<Dispatcher<SqliteStore, SqliteStore>>,
) -> anyhow::Result<()> {
  let mut offset = 0i64;

  loop {
    let updates = tokio::select! {
      res = client.get_updates(offset) => match res {
        Ok(updates) => updates,
        Err(err) => {
          tracing::warn!(error = %err, "getUpdates failed, backing off");
          tokio::time::sleep(Duration::from_secs(5)).await;
          continue;
        }
      },
      _ = tokio::signal::ctrl_c() => {
        tracing::info!("shutting down");
        return Ok(());
      }
    };

    for update in updates {
      offset = offset.max(update.update_id + 1);
      let Some(inbound) = update.into_inbound() else { continue };

      let client = client.clone();
      let dispatcher = dispatcher.clone();
      tokio::spawn(async move {
        if let Some(id) = &inbound.callback_id
          && let Err(err) = client.answer_callback(id).await
        {
          tracing::warn!(error = %err, "answerCallbackQuery failed");
        }

        let chat_id = inbound.event.chat_id;
        for reply in dispatcher.handle(inbound.event).await {
          if let Err(err) = client.send_reply(chat_id, &reply).await {
            tracing::warn!(chat_id, error = %err, "sendMessage failed");
          }
        }
      });
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
