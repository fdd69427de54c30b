//! Query shaping: the search allow-list and the client-local filter.
//!
//! The allow-list only keeps malformed queries off the wire. It is not a
//! security boundary; the backend validates independently.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, lead::Lead};

// ─── Allow-list ──────────────────────────────────────────────────────────────

/// Letters, digits, underscore (Unicode word characters), whitespace, `@`, `.`.
static QUERY_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[\w\s@.]*$").expect("query pattern is valid"));

/// Reject any query containing characters outside the allow-list.
/// The empty query is valid.
pub fn validate_query(query: &str) -> Result<()> {
  if QUERY_PATTERN.is_match(query) {
    Ok(())
  } else {
    Err(Error::InvalidQuery(query.to_owned()))
  }
}

// ─── Client-local filter ─────────────────────────────────────────────────────

/// A lead field that a filter term can look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
  Name,
  Email,
  Phone,
  Position,
  Message,
}

impl FilterField {
  fn value(self, lead: &Lead) -> &str {
    match self {
      Self::Name => &lead.name,
      Self::Email => &lead.email,
      Self::Phone => &lead.phone,
      Self::Position => &lead.position,
      Self::Message => &lead.message,
    }
  }
}

/// One filter term: matches when any of `fields` contains `needle`,
/// ignoring case.
#[derive(Debug, Clone)]
pub struct FieldFilter {
  pub fields: Vec<FilterField>,
  needle:     String,
}

impl FieldFilter {
  pub fn new(fields: Vec<FilterField>, needle: &str) -> Self {
    Self {
      fields,
      needle: needle.to_lowercase(),
    }
  }

  fn matches(&self, lead: &Lead) -> bool {
    self.needle.is_empty()
      || self
        .fields
        .iter()
        .any(|f| f.value(lead).to_lowercase().contains(&self.needle))
  }
}

/// A conjunction of [`FieldFilter`] terms. The empty filter matches all.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
  pub terms: Vec<FieldFilter>,
}

impl LeadFilter {
  /// The single search box: `text` against name or email.
  pub fn name_or_email(text: &str) -> Self {
    Self {
      terms: vec![FieldFilter::new(vec![FilterField::Name, FilterField::Email], text)],
    }
  }

  /// Add another term; all terms must match.
  pub fn and(mut self, term: FieldFilter) -> Self {
    self.terms.push(term);
    self
  }

  pub fn matches(&self, lead: &Lead) -> bool { self.terms.iter().all(|t| t.matches(lead)) }

  /// The working set: leads from `leads` that match, in their original order.
  pub fn apply<'a>(&self, leads: &'a [Lead]) -> Vec<&'a Lead> {
    leads.iter().filter(|l| self.matches(l)).collect()
  }
}
