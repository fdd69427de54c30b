//! Error types for the reporting transforms.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Why a tracking fragment could not be read. Never shown to users; the
/// extractor falls back to the plain message on any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
  #[error("expected '{{' at offset {0}")]
  ExpectedOpenBrace(usize),

  #[error("object is not closed")]
  Unterminated,

  #[error("object has no fields")]
  Empty,

  #[error("expected a key at offset {0}")]
  MissingKey(usize),

  #[error("expected ':' after key at offset {0}")]
  MissingColon(usize),

  #[error("unexpected {found:?} at offset {at}")]
  Unexpected { found: char, at: usize },

  #[error("invalid quoted value: {0}")]
  BadString(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
