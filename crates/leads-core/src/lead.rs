//! Lead records, the sole entity managed by the dashboard.
//!
//! A lead is owned by the backend: `id`, `createdAt` and `updatedAt` are
//! assigned there and only ever change by round-tripping a server response.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Lead ────────────────────────────────────────────────────────────────────

/// A contact record submitted through the external intake form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
  /// Server-assigned, unique across the collection, never changes.
  pub id:         u64,
  pub name:       String,
  pub email:      String,
  /// Unformatted digits, e.g. `11987654321`.
  pub phone:      String,
  /// Free-text category label. Grouping treats it as an opaque,
  /// case-sensitive, untrimmed key.
  pub position:   String,
  #[serde(with = "iso_date")]
  pub birth_date: NaiveDate,
  /// Free text; may carry an embedded tracking fragment.
  pub message:    String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// ─── LeadPayload ─────────────────────────────────────────────────────────────

/// Body of a create or update request. Server-assigned fields are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPayload {
  pub name:       String,
  pub email:      String,
  pub phone:      String,
  pub position:   String,
  /// `YYYY-MM-DD`, as typed into the form.
  pub birth_date: String,
  pub message:    String,
}

impl LeadPayload {
  /// Check that every field is present. The backend is the authority on
  /// anything beyond that.
  pub fn validate(&self) -> Result<()> {
    let fields = [
      ("name", &self.name),
      ("email", &self.email),
      ("phone", &self.phone),
      ("position", &self.position),
      ("birthDate", &self.birth_date),
      ("message", &self.message),
    ];
    match fields.iter().find(|(_, v)| v.trim().is_empty()) {
      Some((field, _)) => Err(Error::MissingField(*field)),
      None => Ok(()),
    }
  }
}

impl From<&Lead> for LeadPayload {
  fn from(lead: &Lead) -> Self {
    Self {
      name:       lead.name.clone(),
      email:      lead.email.clone(),
      phone:      lead.phone.clone(),
      position:   lead.position.clone(),
      birth_date: lead.birth_date.format("%Y-%m-%d").to_string(),
      message:    lead.message.clone(),
    }
  }
}

// ─── Display helpers ─────────────────────────────────────────────────────────

static PHONE_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"([0-9]{2})([0-9]{5})([0-9]{4})").expect("phone pattern is valid")
});

/// Render the first run of 11 digits as `(AA) NNNNN-NNNN`. Anything that does
/// not contain such a run is returned unchanged.
pub fn format_phone(phone: &str) -> String {
  PHONE_DIGITS.replacen(phone, 1, "($1) $2-$3").into_owned()
}

/// `DD/MM/YYYY`, the form used in lists, details and exports.
pub fn format_date(date: NaiveDate) -> String { date.format("%d/%m/%Y").to_string() }

// ─── Serde: calendar date from date or date/time ─────────────────────────────

/// The backend may send `birthDate` as `YYYY-MM-DD` or as a full ISO
/// timestamp. Either way only the calendar date (UTC) is kept.
mod iso_date {
  use chrono::{DateTime, NaiveDate, NaiveDateTime};
  use serde::{Deserialize, Deserializer, Serializer, de};

  pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&date.format("%Y-%m-%d"))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(d)?;
    parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw:?}")))
  }

  pub(super) fn parse(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
      return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
      return Some(dt.naive_utc().date());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
      .ok()
      .map(|dt| dt.date())
  }
}
