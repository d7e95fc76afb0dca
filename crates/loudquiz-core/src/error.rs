//! Error types for `loudquiz-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown question status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown form field: {0:?}")]
  UnknownFormField(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
