//! The client-held lead collection.
//!
//! The cache has no lifecycle of its own beyond "last fetch won": it is only
//! ever replaced wholesale, never patched in place.

use std::collections::HashSet;

use crate::lead::Lead;

/// The last-fetched lead collection, owned by the UI-state layer.
#[derive(Debug, Clone, Default)]
pub struct LeadCache {
  leads: Vec<Lead>,
  stale: bool,
  /// Bumped on every [`LeadCache::replace`]; lets derived views know when to
  /// recompute.
  generation: u64,
}

impl LeadCache {
  pub fn new() -> Self { Self::default() }

  /// The cached collection in fetch order.
  pub fn get(&self) -> &[Lead] { &self.leads }

  /// Replace the whole collection with a fresh fetch result and clear the
  /// stale flag.
  ///
  /// Ids are kept unique: if the backend returns the same id twice, only the
  /// first occurrence survives. Returns the number of duplicates dropped.
  pub fn replace(&mut self, leads: Vec<Lead>) -> usize {
    let before = leads.len();
    let mut seen = HashSet::with_capacity(before);
    self.leads = leads.into_iter().filter(|l| seen.insert(l.id)).collect();
    self.stale = false;
    self.generation += 1;
    before - self.leads.len()
  }

  /// Mark the collection as out of date, e.g. after a successful mutation.
  /// The contents stay readable until the refetch replaces them.
  pub fn invalidate(&mut self) { self.stale = true; }

  pub fn is_stale(&self) -> bool { self.stale }

  pub fn generation(&self) -> u64 { self.generation }

  pub fn find(&self, id: u64) -> Option<&Lead> { self.leads.iter().find(|l| l.id == id) }

  pub fn len(&self) -> usize { self.leads.len() }

  pub fn is_empty(&self) -> bool { self.leads.is_empty() }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, TimeZone, Utc};

  use super::*;

  fn lead(id: u64, name: &str) -> Lead {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    Lead {
      id,
      name: name.into(),
      email: format!("{name}@example.com"),
      phone: "11987654321".into(),
      position: "Dev".into(),
      birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
      message: String::new(),
      created_at: at,
      updated_at: at,
    }
  }

  #[test]
  fn replace_is_wholesale() {
    let mut cache = LeadCache::new();
    cache.replace(vec![lead(1, "a"), lead(2, "b")]);
    cache.replace(vec![lead(3, "c")]);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get()[0].id, 3);
    assert_eq!(cache.generation(), 2);
  }

  #[test]
  fn replace_drops_duplicate_ids() {
    let mut cache = LeadCache::new();
    let dropped = cache.replace(vec![lead(1, "first"), lead(2, "b"), lead(1, "second")]);
    assert_eq!(dropped, 1);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.find(1).unwrap().name, "first");
  }

  #[test]
  fn invalidate_keeps_contents_until_replaced() {
    let mut cache = LeadCache::new();
    cache.replace(vec![lead(1, "a")]);
    cache.invalidate();
    assert!(cache.is_stale());
    assert_eq!(cache.len(), 1);

    cache.replace(vec![]);
    assert!(!cache.is_stale());
    assert!(cache.is_empty());
  }
}
