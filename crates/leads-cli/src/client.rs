//! Async HTTP client wrapping the leads REST API.
//!
//! | Operation | Method | Path |
//! |-----------|--------|------|
//! | list      | `GET`    | `/api/users` |
//! | search    | `GET`    | `/api/users/search?q=<query>` |
//! | create    | `POST`   | `/api/users` |
//! | update    | `PUT`    | `/api/users/{id}` |
//! | delete    | `DELETE` | `/api/users/{id}` |

use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use leads_core::{
  Error, Result,
  backend::{LeadBackend, Operation},
  lead::{Lead, LeadPayload},
};
use reqwest::{
  Client, Method, RequestBuilder, Response,
  header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;

use crate::token::TokenStore;

/// Connection settings for the leads API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:   String,
  pub token_path: PathBuf,
}

/// Async HTTP client for the leads REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
  tokens: TokenStore,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    let tokens = TokenStore::new(config.token_path.clone());
    Ok(Self {
      client,
      config,
      tokens,
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Every request declares JSON and carries the stored bearer token; with
  /// no token stored the header is still sent, with an empty value.
  async fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let token = self.tokens.load().await;
    self
      .client
      .request(method, self.url(path))
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {token}"))
  }

  /// Send `req`, collapsing transport failures and any status >= 400 into
  /// [`Error::Remote`] for `op`. The backend's body is kept for the log only.
  async fn send(&self, op: Operation, req: RequestBuilder) -> Result<Response> {
    let resp = req.send().await.map_err(|e| {
      tracing::warn!(%op, "request failed: {e}");
      Error::remote(op, None, e.to_string())
    })?;

    let status = resp.status();
    if status.as_u16() >= 400 {
      let body = resp.text().await.unwrap_or_default();
      tracing::warn!(%op, status = status.as_u16(), body = %body, "backend rejected request");
      return Err(Error::remote(op, Some(status.as_u16()), body));
    }
    Ok(resp)
  }

  async fn json<T: DeserializeOwned>(op: Operation, resp: Response) -> Result<T> {
    let status = resp.status().as_u16();
    resp.json().await.map_err(|e| {
      tracing::warn!(%op, "deserialising response: {e}");
      Error::remote(op, Some(status), e.to_string())
    })
  }
}

impl LeadBackend for ApiClient {
  /// `GET /api/users`
  async fn list(&self) -> Result<Vec<Lead>> {
    let op = Operation::List;
    let req = self.request(Method::GET, "/api/users").await;
    let resp = self.send(op, req).await?;
    Self::json(op, resp).await
  }

  /// `GET /api/users/search?q=<query>`
  async fn search(&self, query: &str) -> Result<Vec<Lead>> {
    let op = Operation::Search;
    let req = self
      .request(Method::GET, "/api/users/search")
      .await
      .query(&[("q", query)]);
    let resp = self.send(op, req).await?;
    Self::json(op, resp).await
  }

  /// `POST /api/users`
  async fn create(&self, payload: &LeadPayload) -> Result<Lead> {
    let op = Operation::Create;
    let req = self.request(Method::POST, "/api/users").await.json(payload);
    let resp = self.send(op, req).await?;
    Self::json(op, resp).await
  }

  /// `PUT /api/users/{id}`
  async fn update(&self, id: u64, payload: &LeadPayload) -> Result<Lead> {
    let op = Operation::Update;
    let req = self
      .request(Method::PUT, &format!("/api/users/{id}"))
      .await
      .json(payload);
    let resp = self.send(op, req).await?;
    Self::json(op, resp).await
  }

  /// `DELETE /api/users/{id}`; any response body is ignored.
  async fn delete(&self, id: u64) -> Result<()> {
    let op = Operation::Delete;
    let req = self.request(Method::DELETE, &format!("/api/users/{id}")).await;
    self.send(op, req).await?;
    Ok(())
  }
}
