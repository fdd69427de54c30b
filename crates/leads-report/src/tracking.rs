//! Tracking-fragment extractor.
//!
//! Intake forms append browsing metadata to the free-text message in a
//! hand-rolled dialect:
//!
//! ```text
//! Quero um orçamento Dados de tracking:{referrer:google,timestamp:2024-06-01T10:00:00Z,sessionId:abc123}
//! ```
//!
//! The object is read with a small recursive-descent parser:
//!
//! ```text
//! object := '{' pair (',' pair)* '}'
//! pair   := key ':' value
//! key    := identifier | quoted
//! value  := quoted | bare          bare runs up to the next ',' or '}'
//! ```
//!
//! Extraction is best-effort and never fails: anything the parser rejects
//! leaves the whole message as plain text.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::Serialize;

use crate::error::TrackingError;

/// Literal that introduces the fragment.
pub const MARKER: &str = "Dados de tracking:";

// ─── Public types ────────────────────────────────────────────────────────────

/// Browsing metadata recovered from a message. Missing fields stay `None`
/// and are simply not displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingData {
  pub referrer:   Option<String>,
  pub timestamp:  Option<String>,
  pub session_id: Option<String>,
  /// Any other keys, kept verbatim.
  pub extra:      BTreeMap<String, String>,
}

impl TrackingData {
  fn from_pairs(mut pairs: BTreeMap<String, String>) -> Self {
    Self {
      referrer:   pairs.remove("referrer"),
      timestamp:  pairs.remove("timestamp"),
      session_id: pairs.remove("sessionId"),
      extra:      pairs,
    }
  }

  /// The timestamp as `DD/MM/YYYY HH:MM:SS` (UTC) when it is ISO-parseable,
  /// otherwise as sent.
  pub fn display_timestamp(&self) -> Option<String> {
    self.timestamp.as_deref().map(|raw| {
      DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.to_utc().format("%d/%m/%Y %H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
    })
  }
}

/// A message split into its human text and its tracking payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedMessage {
  pub text:     String,
  pub tracking: Option<TrackingData>,
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Split `message` into display text and tracking data.
///
/// - No marker: the message unchanged, no tracking.
/// - Marker with a well-formed object: the fragment removed (result
///   trimmed), tracking populated. When the marker occurs more than once,
///   the first occurrence followed by a well-formed object is used.
/// - Anything else: the original message unchanged, no tracking.
pub fn extract(message: &str) -> TrackedMessage {
  for (start, _) in message.match_indices(MARKER) {
    let mut parser = Parser::new(message, start + MARKER.len());
    if let Ok(pairs) = parser.object() {
      let text = format!("{}{}", &message[..start], &message[parser.pos..]);
      return TrackedMessage {
        text:     text.trim().to_string(),
        tracking: Some(TrackingData::from_pairs(pairs)),
      };
    }
  }

  TrackedMessage {
    text:     message.to_string(),
    tracking: None,
  }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

struct Parser<'a> {
  src: &'a str,
  pos: usize,
}

impl<'a> Parser<'a> {
  fn new(src: &'a str, pos: usize) -> Self { Self { src, pos } }

  fn peek(&self) -> Option<char> { self.src[self.pos..].chars().next() }

  fn bump(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.pos += c.len_utf8();
    Some(c)
  }

  fn skip_ws(&mut self) {
    while self.peek().is_some_and(char::is_whitespace) {
      self.bump();
    }
  }

  fn object(&mut self) -> Result<BTreeMap<String, String>, TrackingError> {
    self.skip_ws();
    if self.peek() != Some('{') {
      return Err(TrackingError::ExpectedOpenBrace(self.pos));
    }
    self.bump();

    self.skip_ws();
    match self.peek() {
      None => return Err(TrackingError::Unterminated),
      Some('}') => return Err(TrackingError::Empty),
      Some(_) => {}
    }

    let mut pairs = BTreeMap::new();
    loop {
      let (key, value) = self.pair()?;
      pairs.insert(key, value);

      self.skip_ws();
      let at = self.pos;
      match self.bump() {
        Some(',') => continue,
        Some('}') => return Ok(pairs),
        None => return Err(TrackingError::Unterminated),
        Some(found) => return Err(TrackingError::Unexpected { found, at }),
      }
    }
  }

  fn pair(&mut self) -> Result<(String, String), TrackingError> {
    self.skip_ws();
    let key = self.key()?;
    self.skip_ws();
    match self.peek() {
      Some(':') => {
        self.bump();
      }
      None => return Err(TrackingError::Unterminated),
      Some(_) => return Err(TrackingError::MissingColon(self.pos)),
    }
    self.skip_ws();
    let value = self.value()?;
    Ok((key, value))
  }

  fn key(&mut self) -> Result<String, TrackingError> {
    match self.peek() {
      None => Err(TrackingError::Unterminated),
      Some('"') => self.quoted(),
      Some(_) => {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
          self.bump();
        }
        if self.pos == start {
          Err(TrackingError::MissingKey(start))
        } else {
          Ok(self.src[start..self.pos].to_string())
        }
      }
    }
  }

  fn value(&mut self) -> Result<String, TrackingError> {
    if self.peek() == Some('"') {
      return self.quoted();
    }
    let start = self.pos;
    loop {
      match self.peek() {
        None => return Err(TrackingError::Unterminated),
        Some(',' | '}') => break,
        Some('{') => {
          return Err(TrackingError::Unexpected {
            found: '{',
            at:    self.pos,
          });
        }
        Some(_) => {
          self.bump();
        }
      }
    }
    Ok(self.src[start..self.pos].trim().to_string())
  }

  /// A JSON-style double-quoted string, escapes included.
  fn quoted(&mut self) -> Result<String, TrackingError> {
    let start = self.pos;
    self.bump();
    let mut escaped = false;
    loop {
      match self.bump() {
        None => return Err(TrackingError::Unterminated),
        Some('\\') if !escaped => escaped = true,
        Some('"') if !escaped => break,
        Some(_) => escaped = false,
      }
    }
    let literal = &self.src[start..self.pos];
    serde_json::from_str(literal).map_err(|e| TrackingError::BadString(e.to_string()))
  }
}
