//! Dashboard statistics.
//!
//! Every view here is a pure function of a lead slice and a reference
//! instant. Nothing is updated incrementally: callers recompute the whole
//! [`Summary`] whenever the source collection changes.
//!
//! `now` is an `Option`: `None` means no trustworthy clock is available, and
//! clock-dependent figures degrade to "unknown" (recent count 0) instead of
//! being computed against a stale constant.

use std::{collections::HashMap, fmt};

use chrono::{DateTime, Utc};
use leads_core::lead::Lead;
use serde::Serialize;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// How many groups / entries the dashboard shows.
pub const TOP_N: usize = 5;

/// Leads created within this many days count as recent.
pub const RECENT_WINDOW_DAYS: i64 = 7;

// ─── Summary ─────────────────────────────────────────────────────────────────

/// All dashboard figures derived from one collection snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
  pub total:              usize,
  /// Leads created within the last [`RECENT_WINDOW_DAYS`] days.
  pub recent:             usize,
  /// Number of distinct `position` labels.
  pub distinct_positions: usize,
  pub top_positions:      Vec<PositionShare>,
  pub latest:             Vec<RecentLead>,
}

impl Summary {
  pub fn compute(leads: &[Lead], now: Option<DateTime<Utc>>) -> Self {
    Self {
      total:              leads.len(),
      recent:             recent_count(leads, now),
      distinct_positions: distinct_positions(leads),
      top_positions:      top_positions(leads, TOP_N),
      latest:             most_recent(leads, TOP_N, now),
    }
  }
}

// ─── Recent count ────────────────────────────────────────────────────────────

/// Leads whose age, rounded up to whole days, is at most
/// [`RECENT_WINDOW_DAYS`]. Exactly 7.0 days counts; 7.1 days does not.
///
/// The distance is absolute, so timestamps slightly ahead of `now` (clock
/// skew) also count as recent.
pub fn recent_count(leads: &[Lead], now: Option<DateTime<Utc>>) -> usize {
  let Some(now) = now else {
    return 0;
  };
  leads
    .iter()
    .filter(|l| {
      let ms = (now - l.created_at).num_milliseconds().unsigned_abs();
      ms.div_ceil(DAY_MS as u64) <= RECENT_WINDOW_DAYS as u64
    })
    .count()
}

// ─── Position distribution ───────────────────────────────────────────────────

/// One row of the group-by-position distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionShare {
  pub position:   String,
  pub count:      usize,
  /// `round(count / total * 100)`, half rounding up.
  pub percentage: u32,
}

/// Number of distinct `position` labels (exact, case-sensitive match).
pub fn distinct_positions(leads: &[Lead]) -> usize {
  leads
    .iter()
    .map(|l| l.position.as_str())
    .collect::<std::collections::HashSet<_>>()
    .len()
}

/// Group by exact `position`, sort by count descending and keep the first
/// `n`. Equal counts keep the order in which the groups were first seen.
///
/// An empty collection yields an empty list; no percentage is computed.
pub fn top_positions(leads: &[Lead], n: usize) -> Vec<PositionShare> {
  let total = leads.len();
  if total == 0 {
    return Vec::new();
  }

  let mut index: HashMap<&str, usize> = HashMap::new();
  let mut groups: Vec<(&str, usize)> = Vec::new();
  for lead in leads {
    match index.get(lead.position.as_str()) {
      Some(&i) => groups[i].1 += 1,
      None => {
        index.insert(lead.position.as_str(), groups.len());
        groups.push((lead.position.as_str(), 1));
      }
    }
  }

  // `sort_by` is stable: ties stay in first-seen order.
  groups.sort_by(|a, b| b.1.cmp(&a.1));

  groups
    .into_iter()
    .take(n)
    .map(|(position, count)| PositionShare {
      position: position.to_string(),
      count,
      percentage: percentage(count, total),
    })
    .collect()
}

/// Integer round-half-up of `part / total * 100`. `total` must be non-zero.
///
/// Each share is rounded on its own, so a distribution may sum to slightly
/// more than 100 (3/8, 3/8, 2/8 gives 38, 38, 25).
fn percentage(part: usize, total: usize) -> u32 {
  let scaled = (part as u64 * 200 + total as u64) / (2 * total as u64);
  scaled as u32
}

// ─── Most recent ─────────────────────────────────────────────────────────────

/// How long ago a lead was created, in whole elapsed days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum Recency {
  Today,
  DaysAgo(i64),
}

impl Recency {
  /// `floor((now - created_at) / 1 day)`; zero or less is `Today`.
  pub fn between(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
    let days = (now - created_at).num_milliseconds().div_euclid(DAY_MS);
    if days <= 0 { Self::Today } else { Self::DaysAgo(days) }
  }
}

impl fmt::Display for Recency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Today => f.write_str("today"),
      Self::DaysAgo(1) => f.write_str("1 day ago"),
      Self::DaysAgo(n) => write!(f, "{n} days ago"),
    }
  }
}

/// An entry of the most-recent list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentLead {
  pub lead:    Lead,
  /// `None` when no reliable clock was available.
  pub recency: Option<Recency>,
}

/// The `n` most recently created leads, newest first.
pub fn most_recent(leads: &[Lead], n: usize, now: Option<DateTime<Utc>>) -> Vec<RecentLead> {
  let mut sorted: Vec<&Lead> = leads.iter().collect();
  sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
  sorted
    .into_iter()
    .take(n)
    .map(|lead| RecentLead {
      lead:    lead.clone(),
      recency: now.map(|now| Recency::between(lead.created_at, now)),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;
  use crate::test_helpers::{make_lead, now};

  fn at_days_ago(days: f64) -> DateTime<Utc> {
    now() - Duration::milliseconds((days * DAY_MS as f64) as i64)
  }

  // ─── Recent count ──────────────────────────────────────────────────────

  #[test]
  fn recent_window_boundary() {
    let leads = vec![
      make_lead(1, "Dev", at_days_ago(7.0)),
      make_lead(2, "Dev", at_days_ago(7.1)),
      make_lead(3, "Dev", at_days_ago(0.5)),
    ];
    assert_eq!(recent_count(&leads, Some(now())), 2);
  }

  #[test]
  fn recent_count_without_clock_is_zero() {
    let leads = vec![make_lead(1, "Dev", now())];
    assert_eq!(recent_count(&leads, None), 0);
  }

  // ─── Position distribution ─────────────────────────────────────────────

  #[test]
  fn top_positions_sorted_with_stable_ties_and_truncated() {
    let t = now();
    let positions = [
      "Analista", "Gerente", "Dev", "Dev", "Gerente", "Dev", "CEO", "Estagiário", "Designer",
      "Analista",
    ];
    let leads: Vec<Lead> = positions
      .iter()
      .enumerate()
      .map(|(i, p)| make_lead(i as u64 + 1, p, t))
      .collect();

    let top = top_positions(&leads, TOP_N);
    let names: Vec<&str> = top.iter().map(|p| p.position.as_str()).collect();
    assert_eq!(names, vec!["Dev", "Analista", "Gerente", "CEO", "Estagiário"]);
    assert_eq!(top[0].count, 3);
    assert_eq!(top[0].percentage, 30);
    assert_eq!(top[1].percentage, 20);
    assert_eq!(top[3].percentage, 10);
  }

  #[test]
  fn positions_are_case_and_whitespace_sensitive() {
    let t = now();
    let leads = vec![
      make_lead(1, "Dev", t),
      make_lead(2, "dev", t),
      make_lead(3, "Dev ", t),
    ];
    assert_eq!(distinct_positions(&leads), 3);
    assert!(top_positions(&leads, TOP_N).iter().all(|p| p.count == 1));
  }

  #[test]
  fn percentages_round_half_up_per_group() {
    // 1/8 = 12.5% -> 13, 7/8 = 87.5% -> 88.
    assert_eq!(percentage(1, 8), 13);
    assert_eq!(percentage(7, 8), 88);
    assert_eq!(percentage(1, 3), 33);
  }

  #[test]
  fn rounded_percentages_can_sum_past_100() {
    let t = now();
    let leads: Vec<Lead> = ["A", "A", "A", "B", "B", "B", "C", "C"]
      .iter()
      .enumerate()
      .map(|(i, p)| make_lead(i as u64, p, t))
      .collect();
    let pcts: Vec<u32> = top_positions(&leads, TOP_N).iter().map(|p| p.percentage).collect();
    // 37.5 -> 38, 37.5 -> 38, 25: each share is rounded on its own.
    assert_eq!(pcts, vec![38, 38, 25]);
    assert_eq!(pcts.iter().sum::<u32>(), 101);
  }

  #[test]
  fn summary_is_deterministic() {
    let leads: Vec<Lead> = (0..20)
      .map(|i| make_lead(i, ["A", "B", "C", "D", "E", "F", "G"][i as usize % 7], at_days_ago(i as f64)))
      .collect();
    let first = Summary::compute(&leads, Some(now()));
    let second = Summary::compute(&leads, Some(now()));
    assert_eq!(first, second);
  }

  #[test]
  fn empty_collection_summary() {
    let summary = Summary::compute(&[], Some(now()));
    assert_eq!(summary.total, 0);
    assert_eq!(summary.recent, 0);
    assert_eq!(summary.distinct_positions, 0);
    assert!(summary.top_positions.is_empty());
    assert!(summary.latest.is_empty());
  }

  // ─── Most recent ───────────────────────────────────────────────────────

  #[test]
  fn most_recent_newest_first_with_recency() {
    let leads: Vec<Lead> = [3.0, 0.2, 10.0, 1.5, 6.9, 2.0, 30.0]
      .iter()
      .enumerate()
      .map(|(i, d)| make_lead(i as u64 + 1, "Dev", at_days_ago(*d)))
      .collect();

    let latest = most_recent(&leads, TOP_N, Some(now()));
    let ids: Vec<u64> = latest.iter().map(|r| r.lead.id).collect();
    assert_eq!(ids, vec![2, 4, 6, 1, 5]);
    assert_eq!(latest[0].recency, Some(Recency::Today));
    assert_eq!(latest[1].recency, Some(Recency::DaysAgo(1)));
    assert_eq!(latest[4].recency, Some(Recency::DaysAgo(6)));
  }

  #[test]
  fn recency_display() {
    assert_eq!(Recency::Today.to_string(), "today");
    assert_eq!(Recency::DaysAgo(1).to_string(), "1 day ago");
    assert_eq!(Recency::DaysAgo(4).to_string(), "4 days ago");
  }

  #[test]
  fn most_recent_without_clock_has_no_recency() {
    let leads = vec![make_lead(1, "Dev", now())];
    let latest = most_recent(&leads, TOP_N, None);
    assert_eq!(latest.len(), 1);
    assert!(latest[0].recency.is_none());
  }
}
