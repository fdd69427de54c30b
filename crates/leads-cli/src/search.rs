//! Server-delegated search with debouncing.
//!
//! Each keystroke calls [`DebouncedSearch::input`]. A valid query (re)arms a
//! 300 ms timer and cancels the previous one, so a burst of edits produces
//! one request carrying the last value. Queries that fail the allow-list
//! never reach the backend.
//!
//! Requests that have already left are not aborted. Instead every scheduled
//! request is numbered, and [`DebouncedSearch::accept`] only hands back the
//! result of the newest one; a slow, older response arriving late is dropped.

use std::{sync::Arc, time::Duration};

use leads_core::{Result, backend::LeadBackend, filter::validate_query, lead::Lead};
use tokio::{sync::mpsc, task::JoinHandle};

/// Quiet period before a search request is sent.
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// A completed search request.
#[derive(Debug)]
pub struct SearchOutcome {
  /// Sequence number assigned when the request was scheduled.
  pub seq:    u64,
  pub query:  String,
  pub result: Result<Vec<Lead>>,
}

/// Debounced, sequence-checked search over a [`LeadBackend`].
pub struct DebouncedSearch<B> {
  backend: Arc<B>,
  delay:   Duration,
  pending: Option<JoinHandle<()>>,
  /// Sequence number of the most recently scheduled request.
  seq:     u64,
  tx:      mpsc::UnboundedSender<SearchOutcome>,
}

impl<B> DebouncedSearch<B>
where
  B: LeadBackend + 'static,
{
  /// Create the engine and the channel its outcomes arrive on.
  pub fn new(backend: Arc<B>, delay: Duration) -> (Self, mpsc::UnboundedReceiver<SearchOutcome>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let engine = Self {
      backend,
      delay,
      pending: None,
      seq: 0,
      tx,
    };
    (engine, rx)
  }

  /// Handle a changed query.
  ///
  /// Any timer that has not fired yet is cancelled first. An invalid query
  /// then returns [`leads_core::Error::InvalidQuery`] and schedules nothing.
  /// A valid one schedules a request after the debounce delay; the empty
  /// query re-fetches the full collection.
  pub fn input(&mut self, query: &str) -> Result<()> {
    self.cancel_pending();
    validate_query(query)?;

    self.seq += 1;
    let seq = self.seq;
    let query = query.to_owned();
    let backend = Arc::clone(&self.backend);
    let tx = self.tx.clone();
    let delay = self.delay;

    self.pending = Some(tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      // Detached: cancelling a later timer must not abort this request.
      tokio::spawn(async move {
        tracing::debug!(seq, query = %query, "search request");
        let result = if query.is_empty() {
          backend.list().await
        } else {
          backend.search(&query).await
        };
        // The receiver may be gone if the UI is shutting down.
        let _ = tx.send(SearchOutcome { seq, query, result });
      });
    }));
    Ok(())
  }

  /// Cancel the not-yet-fired timer, if any.
  pub fn cancel_pending(&mut self) {
    if let Some(handle) = self.pending.take() {
      handle.abort();
    }
  }

  /// Sequence number of the most recently scheduled request.
  pub fn latest(&self) -> u64 { self.seq }

  /// The outcome's result if it belongs to the newest request, else `None`.
  pub fn accept(&self, outcome: SearchOutcome) -> Option<Result<Vec<Lead>>> {
    if outcome.seq == self.seq {
      Some(outcome.result)
    } else {
      tracing::debug!(
        seq = outcome.seq,
        latest = self.seq,
        query = %outcome.query,
        "dropping stale search response"
      );
      None
    }
  }
}

impl<B> Drop for DebouncedSearch<B> {
  fn drop(&mut self) {
    if let Some(handle) = self.pending.take() {
      handle.abort();
    }
  }
}
