//! Bearer-token persistence.
//!
//! The token lives in a single file on disk. It is read on every request, so
//! `leads token <TOKEN>` takes effect for a running dashboard too. Reads and
//! writes go through `tokio::fs` and never block the runtime.

use std::{
  io,
  path::{Path, PathBuf},
};

use tokio::fs;

#[derive(Debug, Clone)]
pub struct TokenStore {
  path: PathBuf,
}

impl TokenStore {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }

  /// The stored token, or the empty string when none is stored.
  pub async fn load(&self) -> String {
    match fs::read_to_string(&self.path).await {
      Ok(raw) => raw.trim().to_string(),
      Err(e) => {
        if e.kind() != io::ErrorKind::NotFound {
          tracing::warn!(path = %self.path.display(), "reading token file: {e}");
        }
        String::new()
      }
    }
  }

  /// Persist `token`, creating parent directories as needed.
  pub async fn save(&self, token: &str) -> io::Result<()> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent).await?;
    }
    fs::write(&self.path, format!("{}\n", token.trim())).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir()
      .join(format!("leads-token-test-{}", std::process::id()))
      .join(name)
  }

  #[tokio::test]
  async fn missing_file_is_empty_token() {
    let store = TokenStore::new(scratch("does-not-exist"));
    assert_eq!(store.load().await, "");
  }

  #[tokio::test]
  async fn save_then_load_trims() {
    let store = TokenStore::new(scratch("nested/dir/token"));
    store.save("  abc.def.ghi \n").await.unwrap();
    assert_eq!(store.load().await, "abc.def.ghi");
  }

  #[tokio::test]
  async fn overwrite_replaces_previous_token() {
    let store = TokenStore::new(scratch("rotated"));
    store.save("first").await.unwrap();
    store.save("second").await.unwrap();
    assert_eq!(store.load().await, "second");
  }
}
