//! Reporting transforms over lead collections.
//!
//! Aggregate statistics for the dashboard, CSV / spreadsheet export, and the
//! tracking-fragment extractor used by the detail view. Pure synchronous; no
//! HTTP or terminal dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use leads_report::{ExportFormat, Summary, export};
//!
//! # let leads: Vec<leads_core::lead::Lead> = Vec::new();
//! let summary = Summary::compute(&leads, Some(chrono::Utc::now()));
//! println!("{} leads, {} this week", summary.total, summary.recent);
//!
//! let today = chrono::Utc::now().date_naive();
//! let artifact = export(&leads, ExportFormat::Csv, today).unwrap();
//! std::fs::write(&artifact.file_name, &artifact.bytes).unwrap();
//! ```

pub mod error;
pub mod export;
pub mod stats;
pub mod tracking;

pub use error::{Error, Result, TrackingError};
pub use export::{ExportArtifact, ExportFormat, export};
pub use stats::{PositionShare, Recency, RecentLead, Summary};
pub use tracking::{TrackedMessage, TrackingData, extract};

// ─── Shared test helpers ──────────────────────────────────────────────────────
