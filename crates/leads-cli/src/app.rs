//! Application state machine and event dispatcher.

use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use leads_core::{
  backend::LeadBackend,
  cache::LeadCache,
  filter::{LeadFilter, validate_query},
  lead::{Lead, LeadPayload},
};
use leads_report::{ExportFormat, Summary};
use tokio::sync::mpsc;

use crate::{
  config::SearchMode,
  export::write_export,
  search::{DEBOUNCE, DebouncedSearch, SearchOutcome},
};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Lead list with the search box.
  LeadList,
  /// Read-only detail of the selected lead.
  LeadDetail,
  /// Aggregate statistics.
  Dashboard,
  /// Export page.
  Reports,
  /// Create or edit form.
  Form,
  /// "Really delete?" prompt for the selected lead.
  ConfirmDelete,
}

// ─── Form ─────────────────────────────────────────────────────────────────────

/// Labels of the form fields, in [`FormState::fields`] order.
pub const FORM_LABELS: [&str; 6] = [
  "Name",
  "Email",
  "Phone",
  "Position",
  "Birth date (YYYY-MM-DD)",
  "Message",
];

/// State of the create / edit form.
#[derive(Debug, Clone, Default)]
pub struct FormState {
  /// `Some(id)` when editing an existing lead.
  pub editing: Option<u64>,
  pub fields:  [String; 6],
  /// Index of the focused field.
  pub focus:   usize,
  /// Validation or backend message shown under the form.
  pub error:   Option<String>,
}

impl FormState {
  fn blank() -> Self { Self::default() }

  fn for_lead(lead: &Lead) -> Self {
    let p = LeadPayload::from(lead);
    Self {
      editing: Some(lead.id),
      fields: [p.name, p.email, p.phone, p.position, p.birth_date, p.message],
      focus: 0,
      error: None,
    }
  }

  pub fn payload(&self) -> LeadPayload {
    let [name, email, phone, position, birth_date, message] = self.fields.clone();
    LeadPayload {
      name,
      email,
      phone,
      position,
      birth_date,
      message,
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<B: LeadBackend + 'static> {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// The full collection as last fetched. Dashboard and exports read this,
  /// never the filtered view.
  pub cache: LeadCache,

  /// Statistics derived from `cache`.
  pub summary: Summary,

  /// Cache generation `summary` was computed from.
  summary_generation: u64,

  /// Server search results for the current non-empty query.
  pub results: Option<Vec<Lead>>,

  pub search_mode: SearchMode,

  /// Current search text.
  pub filter: String,

  /// Whether the user is typing into the search box.
  pub filter_active: bool,

  /// Inline allow-list error for the search box.
  pub search_error: Option<String>,

  /// Cursor position within the visible list.
  pub list_cursor: usize,

  /// Scroll offset of the detail pane.
  pub detail_scroll: usize,

  /// Id of the lead shown in the detail pane / targeted by edit and delete.
  pub selected_id: Option<u64>,

  pub form: FormState,

  /// A request is in flight; the UI shows a spinner line.
  pub loading: bool,

  pub exporting: bool,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub export_dir: PathBuf,

  pub backend: Arc<B>,

  search:    Option<DebouncedSearch<B>>,
  search_rx: Option<mpsc::UnboundedReceiver<SearchOutcome>>,
}

impl<B: LeadBackend + 'static> App<B> {
  /// Create an [`App`] with an empty collection. In server mode this spawns
  /// the debounced search engine, so it must run inside a tokio runtime.
  pub fn new(backend: Arc<B>, search_mode: SearchMode, export_dir: PathBuf) -> Self {
    let (search, search_rx) = match search_mode {
      SearchMode::Server => {
        let (engine, rx) = DebouncedSearch::new(Arc::clone(&backend), DEBOUNCE);
        (Some(engine), Some(rx))
      }
      SearchMode::Local => (None, None),
    };
    Self {
      screen: Screen::LeadList,
      cache: LeadCache::new(),
      summary: Summary::compute(&[], None),
      summary_generation: 0,
      results: None,
      search_mode,
      filter: String::new(),
      filter_active: false,
      search_error: None,
      list_cursor: 0,
      detail_scroll: 0,
      selected_id: None,
      form: FormState::blank(),
      loading: false,
      exporting: false,
      status_msg: String::new(),
      export_dir,
      backend,
      search,
      search_rx,
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the full collection and replace the cache.
  pub async fn load_leads(&mut self) -> anyhow::Result<()> {
    self.loading = true;
    self.status_msg = "Loading leads…".into();
    let result = self.backend.list().await;
    self.loading = false;
    match result {
      Ok(leads) => {
        self.replace_leads(leads);
        self.status_msg.clear();
        Ok(())
      }
      Err(e) => {
        tracing::error!("loading leads: {e}");
        self.status_msg = e.to_string();
        Err(e.into())
      }
    }
  }

  fn replace_leads(&mut self, leads: Vec<Lead>) {
    let dropped = self.cache.replace(leads);
    if dropped > 0 {
      tracing::warn!(dropped, "backend returned duplicate lead ids");
    }
    self.sync_summary();
    self.clamp_cursor();
  }

  /// Recompute `summary` if the cache has been replaced since it was last
  /// computed. Returns whether it was recomputed.
  pub fn sync_summary(&mut self) -> bool {
    let generation = self.cache.generation();
    if generation == self.summary_generation {
      return false;
    }
    self.summary = Summary::compute(self.cache.get(), Some(Utc::now()));
    self.summary_generation = generation;
    true
  }

  /// Refetch after a successful mutation.
  async fn refetch(&mut self) {
    self.cache.invalidate();
    self.results = None;
    if self.load_leads().await.is_ok() && !self.filter.is_empty() {
      // Re-run the active query against the fresh data.
      self.on_filter_changed();
    }
  }

  /// Status line after a successful mutation. A failed refetch leaves the
  /// cache stale, which the list title also shows.
  fn report_mutation(&mut self, done: String) {
    self.status_msg = if self.cache.is_stale() {
      format!("{done}; list not refreshed, press r to retry")
    } else {
      done
    };
  }

  // ── Search ────────────────────────────────────────────────────────────────

  /// The working set: the (possibly filtered) leads shown in the list.
  pub fn visible_leads(&self) -> Vec<&Lead> {
    match self.search_mode {
      SearchMode::Local => LeadFilter::name_or_email(&self.filter).apply(self.cache.get()),
      SearchMode::Server => self
        .results
        .as_deref()
        .unwrap_or(self.cache.get())
        .iter()
        .collect(),
    }
  }

  /// The lead under the list cursor, if any.
  pub fn cursor_lead(&self) -> Option<&Lead> { self.visible_leads().get(self.list_cursor).copied() }

  /// The lead shown in the detail pane.
  pub fn selected_lead(&self) -> Option<&Lead> {
    let id = self.selected_id?;
    self
      .results
      .as_deref()
      .and_then(|r| r.iter().find(|l| l.id == id))
      .or_else(|| self.cache.find(id))
  }

  fn on_filter_changed(&mut self) {
    self.list_cursor = 0;
    match self.search.as_mut() {
      Some(engine) => match engine.input(&self.filter) {
        Ok(()) => {
          self.search_error = None;
          self.loading = true;
        }
        Err(e) => {
          self.search_error = Some(e.to_string());
          self.loading = false;
        }
      },
      None => {
        self.search_error = validate_query(&self.filter).err().map(|e| e.to_string());
      }
    }
  }

  /// Apply any search responses that have arrived. Call once per frame.
  pub fn poll_search(&mut self) {
    let mut arrived = Vec::new();
    if let Some(rx) = self.search_rx.as_mut() {
      while let Ok(outcome) = rx.try_recv() {
        arrived.push(outcome);
      }
    }
    for outcome in arrived {
      self.apply_search(outcome);
    }
  }

  fn apply_search(&mut self, outcome: SearchOutcome) {
    let Some(engine) = self.search.as_ref() else {
      return;
    };
    let query = outcome.query.clone();
    let Some(result) = engine.accept(outcome) else {
      return;
    };
    self.loading = false;
    match result {
      Ok(leads) if query.is_empty() => {
        self.results = None;
        self.replace_leads(leads);
        self.status_msg.clear();
      }
      Ok(leads) => {
        self.results = Some(leads);
        self.status_msg.clear();
      }
      Err(e) => {
        tracing::error!(query = %query, "search failed: {e}");
        self.results = Some(Vec::new());
        self.status_msg = e.to_string();
      }
    }
    self.clamp_cursor();
  }

  fn clamp_cursor(&mut self) {
    let len = self.visible_leads().len();
    if self.list_cursor >= len {
      self.list_cursor = len.saturating_sub(1);
    }
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Validate and submit the form; on success refetch and leave the form.
  pub async fn submit_form(&mut self) {
    let payload = self.form.payload();
    if let Err(e) = payload.validate() {
      self.form.error = Some(e.to_string());
      return;
    }

    self.loading = true;
    let result = match self.form.editing {
      Some(id) => self.backend.update(id, &payload).await,
      None => self.backend.create(&payload).await,
    };
    self.loading = false;

    match result {
      Ok(lead) => {
        tracing::info!(id = lead.id, "lead saved");
        self.selected_id = Some(lead.id);
        self.form = FormState::blank();
        self.screen = Screen::LeadList;
        self.refetch().await;
        self.report_mutation(format!("Saved lead {}", lead.id));
      }
      Err(e) => {
        tracing::error!("saving lead: {e}");
        self.form.error = Some(e.to_string());
      }
    }
  }

  /// Delete the selected lead; on success refetch.
  pub async fn confirm_delete(&mut self) {
    let Some(id) = self.selected_id else {
      self.screen = Screen::LeadList;
      return;
    };

    self.loading = true;
    let result = self.backend.delete(id).await;
    self.loading = false;
    self.screen = Screen::LeadList;

    match result {
      Ok(()) => {
        tracing::info!(id, "lead deleted");
        self.selected_id = None;
        self.refetch().await;
        self.report_mutation(format!("Deleted lead {id}"));
      }
      Err(e) => {
        tracing::error!(id, "deleting lead: {e}");
        self.status_msg = e.to_string();
      }
    }
  }

  // ── Detail ────────────────────────────────────────────────────────────────


  // ── Export ────────────────────────────────────────────────────────────────

  /// Export the full, unfiltered collection into `export_dir`.
  pub fn export(&mut self, format: ExportFormat) {
    if self.exporting || self.cache.is_empty() {
      return;
    }
    self.exporting = true;
    let today = Utc::now().date_naive();
    match write_export(self.cache.get(), format, today, &self.export_dir) {
      Ok(path) => self.status_msg = format!("Exported {}", path.display()),
      Err(e) => {
        tracing::error!("export failed: {e:#}");
        self.status_msg = "Export failed (see log)".into();
      }
    }
    self.exporting = false;
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    match self.screen {
      Screen::LeadList => self.handle_list_key(key).await,
      Screen::LeadDetail => self.handle_detail_key(key),
      Screen::Dashboard => Ok(self.handle_dashboard_key(key)),
      Screen::Reports => Ok(self.handle_reports_key(key)),
      Screen::Form => {
        self.handle_form_key(key).await;
        Ok(true)
      }
      Screen::ConfirmDelete => {
        self.handle_confirm_key(key).await;
        Ok(true)
      }
    }
  }

  /// Screen switching shared by the read-only screens.
  fn switch_screen(&mut self, code: KeyCode) -> bool {
    let target = match code {
      KeyCode::Char('1') => Screen::LeadList,
      KeyCode::Char('2') => Screen::Dashboard,
      KeyCode::Char('3') => Screen::Reports,
      _ => return false,
    };
    self.screen = target;
    true
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        if !self.filter.is_empty() {
          self.filter.clear();
          self.on_filter_changed();
        }
      }
      KeyCode::Enter => {
        self.filter_active = false;
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.on_filter_changed();
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.on_filter_changed();
      }
      _ => {}
    }
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if self.switch_screen(key.code) {
      return Ok(true);
    }
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.visible_leads().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_lead().map(|l| l.id) {
          self.selected_id = Some(id);
          self.detail_scroll = 0;
          self.screen = Screen::LeadDetail;
        }
      }

      KeyCode::Char('/') => {
        self.filter_active = true;
      }

      KeyCode::Char('n') => {
        self.form = FormState::blank();
        self.screen = Screen::Form;
      }
      KeyCode::Char('e') => {
        if let Some(lead) = self.cursor_lead() {
          self.form = FormState::for_lead(lead);
          self.selected_id = self.form.editing;
          self.screen = Screen::Form;
        }
      }
      KeyCode::Char('d') => {
        if let Some(id) = self.cursor_lead().map(|l| l.id) {
          self.selected_id = Some(id);
          self.screen = Screen::ConfirmDelete;
        }
      }

      KeyCode::Char('r') => {
        // Errors are already on the status line.
        let _ = self.load_leads().await;
      }

      _ => {}
    }
    Ok(true)
  }

  fn handle_detail_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if self.switch_screen(key.code) {
      return Ok(true);
    }
    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::LeadList;
      }
      KeyCode::Down | KeyCode::Char('j') => {
        self.detail_scroll = self.detail_scroll.saturating_add(1);
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }
      KeyCode::Char('e') => {
        if let Some(lead) = self.selected_lead() {
          self.form = FormState::for_lead(lead);
          self.screen = Screen::Form;
        }
      }
      KeyCode::Char('d') => {
        if self.selected_id.is_some() {
          self.screen = Screen::ConfirmDelete;
        }
      }
      _ => {}
    }
    Ok(true)
  }

  fn handle_dashboard_key(&mut self, key: KeyEvent) -> bool {
    if self.switch_screen(key.code) {
      return true;
    }
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Esc => self.screen = Screen::LeadList,
      _ => {}
    }
    true
  }

  fn handle_reports_key(&mut self, key: KeyEvent) -> bool {
    if self.switch_screen(key.code) {
      return true;
    }
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Esc => self.screen = Screen::LeadList,
      KeyCode::Char('c') => self.export(ExportFormat::Csv),
      KeyCode::Char('x') => self.export(ExportFormat::Excel),
      _ => {}
    }
    true
  }

  async fn handle_form_key(&mut self, key: KeyEvent) {
    let last = FORM_LABELS.len() - 1;
    match key.code {
      KeyCode::Esc => {
        self.form = FormState::blank();
        self.screen = if self.selected_id.is_some() && self.selected_lead().is_some() {
          Screen::LeadDetail
        } else {
          Screen::LeadList
        };
      }
      KeyCode::Tab | KeyCode::Down => {
        self.form.focus = if self.form.focus == last { 0 } else { self.form.focus + 1 };
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.form.focus = if self.form.focus == 0 { last } else { self.form.focus - 1 };
      }
      KeyCode::Backspace => {
        self.form.fields[self.form.focus].pop();
      }
      KeyCode::Enter => self.submit_form().await,
      KeyCode::Char(c) => {
        self.form.fields[self.form.focus].push(c);
        self.form.error = None;
      }
      _ => {}
    }
  }

  async fn handle_confirm_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm_delete().await,
      KeyCode::Char('n') | KeyCode::Esc => self.screen = Screen::LeadList,
      _ => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{sync::atomic::Ordering, time::Duration};

  use super::*;
  use crate::test_support::{FakeBackend, make_lead};

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  fn seeded() -> Arc<FakeBackend> {
    Arc::new(FakeBackend::with_leads(vec![
      make_lead(1, "Ana Souza", "ana@example.com"),
      make_lead(2, "Bruno Lima", "bruno@analytics.io"),
      make_lead(3, "Carla Dias", "carla@example.com"),
    ]))
  }

  async fn local_app(backend: Arc<FakeBackend>) -> App<FakeBackend> {
    let dir = std::env::temp_dir().join(format!("leads-app-test-{}", std::process::id()));
    let mut app = App::new(backend, SearchMode::Local, dir);
    app.load_leads().await.unwrap();
    app
  }

  async fn type_text(app: &mut App<FakeBackend>, text: &str) {
    for c in text.chars() {
      app.handle_key(key(KeyCode::Char(c))).await.unwrap();
    }
  }

  // ── Loading ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn load_populates_cache_and_summary() {
    let app = local_app(seeded()).await;
    assert_eq!(app.cache.len(), 3);
    assert_eq!(app.summary.total, 3);
    assert_eq!(app.summary.top_positions[0].position, "Dev");
    assert!(!app.loading);
  }

  // ── Local filter ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn local_filter_matches_name_or_email_without_requests() {
    let backend = seeded();
    let mut app = local_app(Arc::clone(&backend)).await;

    app.handle_key(key(KeyCode::Char('/'))).await.unwrap();
    type_text(&mut app, "ANA").await;

    let ids: Vec<u64> = app.visible_leads().iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(backend.calls(), vec!["list"]);

    app.handle_key(key(KeyCode::Esc)).await.unwrap();
    assert_eq!(app.visible_leads().len(), 3);
  }

  #[tokio::test]
  async fn local_filter_flags_disallowed_characters() {
    let mut app = local_app(seeded()).await;
    app.handle_key(key(KeyCode::Char('/'))).await.unwrap();
    type_text(&mut app, "a<").await;
    assert_eq!(app.search_error.as_deref(), Some("Campo inválido"));
  }

  // ── Server search ─────────────────────────────────────────────────────────

  #[tokio::test(start_paused = true)]
  async fn server_search_is_debounced_and_applied() {
    let backend = seeded();
    let mut app = App::new(Arc::clone(&backend), SearchMode::Server, PathBuf::from("."));
    app.load_leads().await.unwrap();

    app.handle_key(key(KeyCode::Char('/'))).await.unwrap();
    type_text(&mut app, "carla").await;
    assert!(app.loading);

    tokio::time::sleep(Duration::from_millis(350)).await;
    app.poll_search();

    assert!(!app.loading);
    let ids: Vec<u64> = app.visible_leads().iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![3]);
    assert_eq!(backend.calls(), vec!["list", "search:carla"]);
    // The dashboard still describes the whole collection.
    assert_eq!(app.summary.total, 3);
  }

  #[tokio::test(start_paused = true)]
  async fn invalid_server_query_never_reaches_backend() {
    let backend = seeded();
    let mut app = App::new(Arc::clone(&backend), SearchMode::Server, PathBuf::from("."));
    app.load_leads().await.unwrap();

    app.handle_key(key(KeyCode::Char('/'))).await.unwrap();
    type_text(&mut app, "ana'").await;
    assert_eq!(app.search_error.as_deref(), Some("Campo inválido"));

    tokio::time::sleep(Duration::from_secs(1)).await;
    app.poll_search();
    assert_eq!(backend.calls(), vec!["list"]);
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_submits_and_refetches() {
    let backend = seeded();
    let mut app = local_app(Arc::clone(&backend)).await;

    app.handle_key(key(KeyCode::Char('n'))).await.unwrap();
    assert_eq!(app.screen, Screen::Form);
    for value in ["Dora", "dora@example.com", "31999998888", "CTO", "1985-12-01", "Oi"] {
      type_text(&mut app, value).await;
      app.handle_key(key(KeyCode::Tab)).await.unwrap();
    }
    app.handle_key(key(KeyCode::Enter)).await.unwrap();

    assert_eq!(app.screen, Screen::LeadList);
    assert_eq!(app.cache.len(), 4);
    assert!(!app.cache.is_stale());
    assert_eq!(app.cache.find(4).unwrap().position, "CTO");
    assert_eq!(backend.calls(), vec!["list", "create", "list"]);
  }

  #[tokio::test]
  async fn blank_field_blocks_submission() {
    let backend = seeded();
    let mut app = local_app(Arc::clone(&backend)).await;

    app.handle_key(key(KeyCode::Char('n'))).await.unwrap();
    type_text(&mut app, "Só o nome").await;
    app.handle_key(key(KeyCode::Enter)).await.unwrap();

    assert_eq!(app.screen, Screen::Form);
    assert!(app.form.error.as_deref().unwrap().contains("email"));
    assert_eq!(backend.calls(), vec!["list"]);
  }

  #[tokio::test]
  async fn backend_rejection_shows_generic_message() {
    let backend = seeded();
    let mut app = local_app(Arc::clone(&backend)).await;

    app.handle_key(key(KeyCode::Char('n'))).await.unwrap();
    for value in ["Eva", "eva@example.com", "1", "Dev", "not-a-date", "Oi"] {
      type_text(&mut app, value).await;
      app.handle_key(key(KeyCode::Tab)).await.unwrap();
    }
    app.handle_key(key(KeyCode::Enter)).await.unwrap();

    assert_eq!(app.screen, Screen::Form);
    assert_eq!(app.form.error.as_deref(), Some("Erro ao criar usuário"));
  }

  #[tokio::test]
  async fn edit_prefills_and_updates() {
    let backend = seeded();
    let mut app = local_app(Arc::clone(&backend)).await;

    app.handle_key(key(KeyCode::Down)).await.unwrap();
    app.handle_key(key(KeyCode::Char('e'))).await.unwrap();
    assert_eq!(app.form.editing, Some(2));
    assert_eq!(app.form.fields[0], "Bruno Lima");

    app.handle_key(key(KeyCode::Char('!'))).await.unwrap();
    app.handle_key(key(KeyCode::Enter)).await.unwrap();

    assert_eq!(app.cache.find(2).unwrap().name, "Bruno Lima!");
    assert_eq!(backend.calls(), vec!["list", "update:2", "list"]);
  }

  #[tokio::test]
  async fn delete_requires_confirmation() {
    let backend = seeded();
    let mut app = local_app(Arc::clone(&backend)).await;

    app.handle_key(key(KeyCode::Char('d'))).await.unwrap();
    assert_eq!(app.screen, Screen::ConfirmDelete);
    app.handle_key(key(KeyCode::Char('n'))).await.unwrap();
    assert_eq!(app.cache.len(), 3);

    app.handle_key(key(KeyCode::Char('d'))).await.unwrap();
    app.handle_key(key(KeyCode::Char('y'))).await.unwrap();
    assert_eq!(app.cache.len(), 2);
    assert!(app.cache.find(1).is_none());
    assert_eq!(backend.calls(), vec!["list", "delete:1", "list"]);
  }

  #[tokio::test]
  async fn failed_refetch_marks_cache_stale_until_reload() {
    let backend = seeded();
    let mut app = local_app(Arc::clone(&backend)).await;

    backend.fail_list.store(true, Ordering::SeqCst);
    app.handle_key(key(KeyCode::Char('d'))).await.unwrap();
    app.handle_key(key(KeyCode::Char('y'))).await.unwrap();

    assert!(app.cache.is_stale());
    // The old contents stay readable.
    assert_eq!(app.cache.len(), 3);
    assert_eq!(app.status_msg, "Deleted lead 1; list not refreshed, press r to retry");

    backend.fail_list.store(false, Ordering::SeqCst);
    app.handle_key(key(KeyCode::Char('r'))).await.unwrap();
    assert!(!app.cache.is_stale());
    assert_eq!(app.cache.len(), 2);
  }

  // ── Summary ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn summary_follows_cache_generation() {
    let backend = seeded();
    let mut app = local_app(Arc::clone(&backend)).await;
    assert!(!app.sync_summary());

    backend.leads.lock().unwrap().pop();
    app.load_leads().await.unwrap();
    assert_eq!(app.summary.total, 2);
    assert!(!app.sync_summary());
  }

  #[tokio::test(start_paused = true)]
  async fn server_results_leave_summary_alone() {
    let backend = seeded();
    let mut app = App::new(Arc::clone(&backend), SearchMode::Server, PathBuf::from("."));
    app.load_leads().await.unwrap();
    let generation = app.cache.generation();

    app.handle_key(key(KeyCode::Char('/'))).await.unwrap();
    type_text(&mut app, "ana").await;
    tokio::time::sleep(Duration::from_millis(350)).await;
    app.poll_search();

    assert_eq!(app.visible_leads().len(), 1);
    assert_eq!(app.cache.generation(), generation);
    assert!(!app.sync_summary());
    assert_eq!(app.summary.total, 3);
  }

  // ── Export ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn export_ignores_active_filter() {
    let mut app = local_app(seeded()).await;
    app.filter = "carla".into();
    assert_eq!(app.visible_leads().len(), 1);

    app.export(ExportFormat::Csv);
    assert!(app.status_msg.starts_with("Exported"));
    let path = app.export_dir.join(ExportFormat::Csv.file_name(Utc::now().date_naive()));
    let written = std::fs::read_to_string(path).unwrap();
    assert_eq!(written.lines().count(), 4);
    assert!(!app.exporting);
  }

  #[tokio::test]
  async fn export_failure_is_logged_not_raised() {
    let mut app = local_app(seeded()).await;
    app.export_dir = PathBuf::from("/proc/leads-nope");
    app.export(ExportFormat::Excel);
    assert_eq!(app.status_msg, "Export failed (see log)");
    assert!(!app.exporting);
  }

  #[tokio::test]
  async fn detail_scroll_saturates() {
    let mut app = local_app(seeded()).await;
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.screen, Screen::LeadDetail);

    app.detail_scroll = usize::MAX;
    app.handle_key(key(KeyCode::Char('j'))).await.unwrap();
    assert_eq!(app.detail_scroll, usize::MAX);
    app.handle_key(key(KeyCode::Char('k'))).await.unwrap();
    assert_eq!(app.detail_scroll, usize::MAX - 1);
  }
}
