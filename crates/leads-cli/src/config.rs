//! Runtime configuration.
//!
//! Precedence, highest first: CLI flags, `LEADS_*` environment variables,
//! the TOML config file, built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Where search queries are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
  /// Debounced `GET /api/users/search` requests.
  #[default]
  Server,
  /// Substring filter over the already-fetched collection; no requests.
  Local,
}

/// Settings as read from the config file and environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Base URL of the backend, e.g. `http://localhost:3001`.
  pub url:         String,
  /// File holding the bearer token.
  pub token_file:  PathBuf,
  pub search_mode: SearchMode,
  /// Directory exports are written to.
  pub export_dir:  PathBuf,
  /// Log file used while the TUI owns the terminal.
  pub log_file:    PathBuf,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      url:         "http://localhost:3001".to_string(),
      token_file:  PathBuf::from("~/.config/leads/token"),
      search_mode: SearchMode::default(),
      export_dir:  PathBuf::from("."),
      log_file:    PathBuf::from("~/.config/leads/leads.log"),
    }
  }
}

/// Default location of the config file.
pub const DEFAULT_CONFIG: &str = "~/.config/leads/config.toml";

impl Settings {
  /// Read `path` (or [`DEFAULT_CONFIG`] if absent) and overlay `LEADS_*`
  /// environment variables. An explicit path must exist; the default may not.
  pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
    let (file, required) = match path {
      Some(p) => (expand_tilde(p), true),
      None => (expand_tilde(Path::new(DEFAULT_CONFIG)), false),
    };

    let settings = config::Config::builder()
      .add_source(config::File::from(file.as_path()).required(required))
      .add_source(config::Environment::with_prefix("LEADS"))
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?;

    let mut settings: Self = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.expand_paths();
    Ok(settings)
  }

  fn expand_paths(&mut self) {
    self.token_file = expand_tilde(&self.token_file);
    self.export_dir = expand_tilde(&self.export_dir);
    self.log_file = expand_tilde(&self.log_file);
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reads_toml_file_over_defaults() {
    let dir = std::env::temp_dir().join(format!("leads-config-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(
      &path,
      "url = \"https://crm.example.com\"\nsearch_mode = \"local\"\nexport_dir = \"/tmp/exports\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(&path)).unwrap();
    assert_eq!(settings.url, "https://crm.example.com");
    assert_eq!(settings.search_mode, SearchMode::Local);
    assert_eq!(settings.export_dir, PathBuf::from("/tmp/exports"));
    // Untouched keys keep their defaults.
    assert!(settings.token_file.ends_with("token"));
  }

  #[test]
  fn explicit_missing_file_is_an_error() {
    let missing = Path::new("/definitely/not/here/leads.toml");
    assert!(Settings::load(Some(missing)).is_err());
  }

  #[test]
  fn tilde_expansion() {
    let Ok(home) = std::env::var("HOME") else {
      return;
    };
    assert_eq!(expand_tilde(Path::new("~/x/y")), PathBuf::from(home).join("x/y"));
    assert_eq!(expand_tilde(Path::new("/abs")), PathBuf::from("/abs"));
  }
}
