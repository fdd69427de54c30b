//! The `LeadBackend` trait: the remote authority over lead records.
//!
//! Implemented by the HTTP client in `leads-cli`. The search engine and the
//! application state depend on this abstraction, not on any transport.

use std::{fmt, future::Future};

use crate::{
  Result,
  lead::{Lead, LeadPayload},
};

// ─── Operation ───────────────────────────────────────────────────────────────

/// Which backend call failed; selects the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  List,
  Search,
  Create,
  Update,
  Delete,
}

impl Operation {
  /// The uniform message shown to the user when this operation fails,
  /// regardless of transport error or response body.
  pub fn failure_message(self) -> &'static str {
    match self {
      Self::List | Self::Search => "Erro ao buscar usuários",
      Self::Create => "Erro ao criar usuário",
      Self::Update => "Erro ao atualizar usuário",
      Self::Delete => "Erro ao deletar usuário",
    }
  }
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::List => "list",
      Self::Search => "search",
      Self::Create => "create",
      Self::Update => "update",
      Self::Delete => "delete",
    };
    f.write_str(s)
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// CRUD + search over the remote lead collection.
///
/// Every failure surfaces as [`crate::Error::Remote`] tagged with the
/// [`Operation`]. Callers are responsible for refetching their cached
/// collection after a successful mutation; the backend never pushes.
pub trait LeadBackend: Send + Sync {
  /// Fetch the full, unfiltered collection.
  fn list(&self) -> impl Future<Output = Result<Vec<Lead>>> + Send + '_;

  /// Server-side search. The query has already passed
  /// [`crate::filter::validate_query`].
  fn search<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<Lead>>> + Send + 'a;

  /// Create a lead; the backend assigns `id` and timestamps.
  fn create<'a>(
    &'a self,
    payload: &'a LeadPayload,
  ) -> impl Future<Output = Result<Lead>> + Send + 'a;

  /// Replace the editable fields of lead `id`; the backend bumps `updatedAt`.
  fn update<'a>(
    &'a self,
    id: u64,
    payload: &'a LeadPayload,
  ) -> impl Future<Output = Result<Lead>> + Send + 'a;

  /// Delete lead `id`.
  fn delete(&self, id: u64) -> impl Future<Output = Result<()>> + Send + '_;
}
