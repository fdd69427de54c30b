//! Error types for `leads-core`.

use thiserror::Error;

use crate::backend::Operation;

#[derive(Debug, Error)]
pub enum Error {
  /// A required payload field is blank.
  #[error("campo obrigatório: {0}")]
  MissingField(&'static str),

  /// The search query contains characters outside the allow-list.
  #[error("Campo inválido")]
  InvalidQuery(String),

  /// Any transport failure or non-success response from the backend.
  ///
  /// Only the generic per-operation message is displayed; `detail` keeps
  /// whatever the transport or the backend body said, for logging.
  #[error("{}", .op.failure_message())]
  Remote {
    op:     Operation,
    status: Option<u16>,
    detail: String,
  },
}

impl Error {
  /// Build an [`Error::Remote`] for `op`.
  pub fn remote(op: Operation, status: Option<u16>, detail: impl Into<String>) -> Self {
    Self::Remote {
      op,
      status,
      detail: detail.into(),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
