//! In-memory [`LeadBackend`] shared by the unit tests.

use std::{
  sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use leads_core::{
  Error, Result,
  backend::{LeadBackend, Operation},
  lead::{Lead, LeadPayload},
};

/// Fixed timestamp the fake backend stamps on every write.
pub(crate) fn stamp() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() }

pub(crate) fn make_lead(id: u64, name: &str, email: &str) -> Lead {
  Lead {
    id,
    name: name.to_string(),
    email: email.to_string(),
    phone: "11987654321".to_string(),
    position: "Dev".to_string(),
    birth_date: NaiveDate::from_ymd_opt(1990, 5, 10).unwrap(),
    message: "Olá".to_string(),
    created_at: stamp(),
    updated_at: stamp(),
  }
}

/// Records every call. A search for `"slow"` takes a second to answer.
/// While `fail_list` is set, `list` answers 503.
#[derive(Default)]
pub(crate) struct FakeBackend {
  pub(crate) leads:     Mutex<Vec<Lead>>,
  pub(crate) fail_list: AtomicBool,
  calls:                Mutex<Vec<String>>,
}

impl FakeBackend {
  pub(crate) fn with_leads(leads: Vec<Lead>) -> Self {
    Self {
      leads:     Mutex::new(leads),
      fail_list: AtomicBool::new(false),
      calls:     Mutex::new(Vec::new()),
    }
  }

  pub(crate) fn calls(&self) -> Vec<String> { self.calls.lock().unwrap().clone() }

  fn log(&self, call: String) { self.calls.lock().unwrap().push(call); }

  fn apply(op: Operation, lead: &mut Lead, payload: &LeadPayload) -> Result<()> {
    let birth_date = NaiveDate::parse_from_str(&payload.birth_date, "%Y-%m-%d")
      .map_err(|e| Error::remote(op, Some(400), e.to_string()))?;
    lead.name = payload.name.clone();
    lead.email = payload.email.clone();
    lead.phone = payload.phone.clone();
    lead.position = payload.position.clone();
    lead.birth_date = birth_date;
    lead.message = payload.message.clone();
    lead.updated_at = stamp();
    Ok(())
  }
}

impl LeadBackend for FakeBackend {
  async fn list(&self) -> Result<Vec<Lead>> {
    self.log("list".into());
    if self.fail_list.load(Ordering::SeqCst) {
      return Err(Error::remote(Operation::List, Some(503), "unavailable"));
    }
    Ok(self.leads.lock().unwrap().clone())
  }

  async fn search(&self, query: &str) -> Result<Vec<Lead>> {
    self.log(format!("search:{query}"));
    if query == "slow" {
      tokio::time::sleep(Duration::from_secs(1)).await;
    }
    let needle = query.to_lowercase();
    let hits = self
      .leads
      .lock()
      .unwrap()
      .iter()
      .filter(|l| l.name.to_lowercase().contains(&needle))
      .cloned()
      .collect();
    Ok(hits)
  }

  async fn create(&self, payload: &LeadPayload) -> Result<Lead> {
    self.log("create".into());
    let mut leads = self.leads.lock().unwrap();
    let id = leads.iter().map(|l| l.id).max().unwrap_or(0) + 1;
    let mut lead = make_lead(id, "", "");
    Self::apply(Operation::Create, &mut lead, payload)?;
    leads.push(lead.clone());
    Ok(lead)
  }

  async fn update(&self, id: u64, payload: &LeadPayload) -> Result<Lead> {
    self.log(format!("update:{id}"));
    let mut leads = self.leads.lock().unwrap();
    let lead = leads
      .iter_mut()
      .find(|l| l.id == id)
      .ok_or_else(|| Error::remote(Operation::Update, Some(404), "not found"))?;
    Self::apply(Operation::Update, lead, payload)?;
    Ok(lead.clone())
  }

  async fn delete(&self, id: u64) -> Result<()> {
    self.log(format!("delete:{id}"));
    let mut leads = self.leads.lock().unwrap();
    let before = leads.len();
    leads.retain(|l| l.id != id);
    if leads.len() == before {
      return Err(Error::remote(Operation::Delete, Some(404), "not found"));
    }
    Ok(())
  }
}
