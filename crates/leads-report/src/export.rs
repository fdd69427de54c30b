//! CSV and spreadsheet export of the full lead collection.
//!
//! Column order and header names are a compatibility contract with whatever
//! spreadsheet consumes the file; do not reorder.

use std::fmt::Write as _;

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use leads_core::lead::{Lead, format_date};

use crate::error::Result;

/// The nine export columns, in order.
pub const COLUMNS: [&str; 9] = [
  "ID",
  "Nome",
  "Email",
  "Telefone",
  "Cargo",
  "Data de Nascimento",
  "Mensagem",
  "Data de Cadastro",
  "Última Atualização",
];

// ─── Format ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
  /// UTF-8 CSV with necessary-only quoting.
  Csv,
  /// Legacy spreadsheet: an HTML `<table>` served with an Excel media type.
  Excel,
}

impl ExportFormat {
  pub fn label(self) -> &'static str {
    match self {
      Self::Csv => "CSV",
      Self::Excel => "Excel",
    }
  }

  pub fn media_type(self) -> &'static str {
    match self {
      Self::Csv => "text/csv;charset=utf-8",
      Self::Excel => "application/vnd.ms-excel;charset=utf-8",
    }
  }

  pub fn extension(self) -> &'static str {
    match self {
      Self::Csv => "csv",
      Self::Excel => "xls",
    }
  }

  /// `leads_<YYYY-MM-DD>.<ext>`
  pub fn file_name(self, today: NaiveDate) -> String {
    format!("leads_{}.{}", today.format("%Y-%m-%d"), self.extension())
  }
}

/// A rendered export, ready to be written wherever the caller downloads to.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
  pub file_name:  String,
  pub media_type: &'static str,
  pub bytes:      Vec<u8>,
}

/// Render `leads` (the full collection, in collection order) as `format`.
pub fn export(leads: &[Lead], format: ExportFormat, today: NaiveDate) -> Result<ExportArtifact> {
  let bytes = match format {
    ExportFormat::Csv => to_csv(leads)?,
    ExportFormat::Excel => to_html_table(leads).into_bytes(),
  };
  Ok(ExportArtifact {
    file_name: format.file_name(today),
    media_type: format.media_type(),
    bytes,
  })
}

// ─── Rows ────────────────────────────────────────────────────────────────────

fn row(lead: &Lead) -> [String; 9] {
  [
    lead.id.to_string(),
    lead.name.clone(),
    lead.email.clone(),
    lead.phone.clone(),
    lead.position.clone(),
    format_date(lead.birth_date),
    lead.message.clone(),
    format_date(lead.created_at.date_naive()),
    format_date(lead.updated_at.date_naive()),
  ]
}

// ─── CSV ─────────────────────────────────────────────────────────────────────

/// Header plus one record per lead. Fields containing a comma, quote or line
/// break are quoted, with inner quotes doubled.
pub fn to_csv(leads: &[Lead]) -> Result<Vec<u8>> {
  let mut writer = WriterBuilder::new()
    .quote_style(QuoteStyle::Necessary)
    .terminator(Terminator::Any(b'\n'))
    .from_writer(Vec::new());

  writer.write_record(COLUMNS)?;
  for lead in leads {
    writer.write_record(row(lead))?;
  }
  writer.into_inner().map_err(|e| e.into_error().into())
}

// ─── HTML table ──────────────────────────────────────────────────────────────

/// The same rows as an HTML table.
///
/// Cell content is written verbatim, with no HTML escaping: markup inside a
/// message ends up as markup in the spreadsheet. Consumers that need a clean
/// file should use CSV.
pub fn to_html_table(leads: &[Lead]) -> String {
  let mut out = String::from("<table>\n<thead>\n<tr>");
  for col in COLUMNS {
    let _ = write!(out, "<th>{col}</th>");
  }
  out.push_str("</tr>\n</thead>\n<tbody>\n");
  for lead in leads {
    out.push_str("<tr>");
    for cell in row(lead) {
      let _ = write!(out, "<td>{cell}</td>");
    }
    out.push_str("</tr>\n");
  }
  out.push_str("</tbody>\n</table>\n");
  out
}
