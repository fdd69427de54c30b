//! `leads`: terminal dashboard for the leads backend.
//!
//! # Usage
//!
//! ```
//! leads                                  # interactive TUI
//! leads --url http://api.local:3001 --search-mode local
//! leads export csv --out ~/Downloads
//! leads stats --json
//! leads token eyJhbGciOi...
//! ```

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
  time::Duration,
};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use leads_cli::{
  app::App,
  client::{ApiClient, ApiConfig},
  config::{SearchMode, Settings},
  export::{ExportKind, write_export},
  token::TokenStore,
  ui,
};
use leads_core::backend::LeadBackend;
use leads_report::Summary;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "leads", version, about = "Terminal dashboard for the leads backend")]
struct Args {
  /// Path to a TOML config file (default: ~/.config/leads/config.toml).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the backend.
  #[arg(long)]
  url: Option<String>,

  /// File holding the bearer token.
  #[arg(long, value_name = "FILE")]
  token_file: Option<PathBuf>,

  /// Resolve searches on the server or over the fetched collection.
  #[arg(long, value_enum)]
  search_mode: Option<SearchMode>,

  /// Directory exports are written to from the TUI.
  #[arg(long, value_name = "DIR")]
  export_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Export every lead as `leads_<date>.<ext>`.
  Export {
    #[arg(value_enum)]
    format: ExportKind,

    /// Output directory (default: the configured export directory).
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
  },

  /// Print the dashboard summary.
  Stats {
    /// Emit JSON instead of text.
    #[arg(long)]
    json: bool,
  },

  /// Store the bearer token sent with every request.
  Token { value: String },
}

impl Args {
  /// Flags win over everything [`Settings::load`] produced.
  fn apply(&self, settings: &mut Settings) {
    if let Some(url) = &self.url {
      settings.url = url.clone();
    }
    if let Some(path) = &self.token_file {
      settings.token_file = leads_cli::config::expand_tilde(path);
    }
    if let Some(mode) = self.search_mode {
      settings.search_mode = mode;
    }
    if let Some(dir) = &self.export_dir {
      settings.export_dir = leads_cli::config::expand_tilde(dir);
    }
  }
}

// ─── Logging ──────────────────────────────────────────────────────────────────

fn env_filter() -> EnvFilter {
  EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy()
}

/// Subcommands log to stderr.
fn init_stderr_logging() {
  tracing_subscriber::fmt()
    .with_env_filter(env_filter())
    .with_writer(io::stderr)
    .init();
}

/// The TUI owns the terminal, so logs go to `path` instead.
fn init_file_logging(path: &Path) -> Result<()> {
  if let Some(dir) = path.parent() {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("creating log directory {}", dir.display()))?;
  }
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(env_filter())
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let mut settings = Settings::load(args.config.as_deref())?;
  args.apply(&mut settings);

  match &args.command {
    None => init_file_logging(&settings.log_file)?,
    Some(_) => init_stderr_logging(),
  }
  tracing::debug!(?settings, "settings resolved");

  let client = Arc::new(ApiClient::new(ApiConfig {
    base_url:   settings.url.clone(),
    token_path: settings.token_file.clone(),
  })?);

  match args.command {
    None => run_tui(client, &settings).await,
    Some(Command::Export { format, out }) => {
      let dir = out.unwrap_or_else(|| settings.export_dir.clone());
      let leads = client.list().await.context("fetching leads")?;
      let path = write_export(&leads, format.into(), Utc::now().date_naive(), &dir)?;
      println!("{}", path.display());
      Ok(())
    }
    Some(Command::Stats { json }) => {
      let leads = client.list().await.context("fetching leads")?;
      let summary = Summary::compute(&leads, Some(Utc::now()));
      if json {
        let out = serde_json::to_string_pretty(&summary).context("serialising summary")?;
        println!("{out}");
      } else {
        print_summary(&summary);
      }
      Ok(())
    }
    Some(Command::Token { value }) => {
      let store = TokenStore::new(&settings.token_file);
      store
        .save(&value)
        .await
        .with_context(|| format!("writing token to {}", store.path().display()))?;
      tracing::info!(path = %store.path().display(), "token saved");
      Ok(())
    }
  }
}

fn print_summary(summary: &Summary) {
  println!("Total leads:     {}", summary.total);
  println!("Last 7 days:     {}", summary.recent);
  println!("Positions:       {}", summary.distinct_positions);

  if !summary.top_positions.is_empty() {
    println!();
    println!("Top positions:");
    for share in &summary.top_positions {
      println!("  {:<24} {:>4}  {:>3}%", share.position, share.count, share.percentage);
    }
  }

  if !summary.latest.is_empty() {
    println!();
    println!("Latest leads:");
    for entry in &summary.latest {
      let when = entry.recency.map(|r| r.to_string()).unwrap_or_default();
      println!("  {:<24} {:<16} {when}", entry.lead.name, entry.lead.position);
    }
  }
}

// ─── TUI ──────────────────────────────────────────────────────────────────────

async fn run_tui(client: Arc<ApiClient>, settings: &Settings) -> Result<()> {
  let mut app = App::new(client, settings.search_mode, settings.export_dir.clone());

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // A failed initial load is shown on the status line, not fatal.
  let _ = app.load_leads().await;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

async fn run_event_loop<B: LeadBackend + 'static>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<B>,
) -> Result<()> {
  loop {
    app.poll_search();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
