//! Writing export artifacts to disk, the terminal stand-in for a browser
//! download.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::NaiveDate;
use leads_core::lead::Lead;
use leads_report::ExportFormat;

/// Export format as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportKind {
  Csv,
  Excel,
}

impl From<ExportKind> for ExportFormat {
  fn from(kind: ExportKind) -> Self {
    match kind {
      ExportKind::Csv => ExportFormat::Csv,
      ExportKind::Excel => ExportFormat::Excel,
    }
  }
}

/// Render the full collection and write it as `dir/leads_<today>.<ext>`.
pub fn write_export(
  leads: &[Lead],
  format: ExportFormat,
  today: NaiveDate,
  dir: &Path,
) -> anyhow::Result<PathBuf> {
  let artifact = leads_report::export(leads, format, today)
    .with_context(|| format!("rendering {} export", format.extension()))?;

  std::fs::create_dir_all(dir)
    .with_context(|| format!("creating export directory {}", dir.display()))?;
  let path = dir.join(&artifact.file_name);
  std::fs::write(&path, &artifact.bytes)
    .with_context(|| format!("writing {}", path.display()))?;

  tracing::info!(
    path = %path.display(),
    media_type = artifact.media_type,
    rows = leads.len(),
    "export written"
  );
  Ok(path)
}
