//! Error types for `toolboard-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("catalog source unavailable: {0}")]
  SourceUnavailable(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
