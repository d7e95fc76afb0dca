//! Engine error type.

use thiserror::Error;

/// An unexpected failure from one of the underlying stores.
///
/// Engines never swallow store errors and never retry; the boxed source is
/// passed through unmodified for the transport layer to log.
#[derive(Debug, Error)]
pub enum EngineError {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
