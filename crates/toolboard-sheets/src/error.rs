//! Error types for `toolboard-sheets`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Credential resolution failed. Surfaced as a blocking setup message at
  /// startup; the message carries the full setup guidance.
  #[error("{0}")]
  Credentials(String),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("sheet service returned {status}: {message}")]
  Api { status: u16, message: String },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
