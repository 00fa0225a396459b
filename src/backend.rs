//! The full-text search backend seam.
//!
//! The relevance layer talks to the search engine through the
//! [`SearchBackend`] trait, injected at construction rather than held as a
//! process-wide client, so tests can substitute an in-memory fake.
//! [`ElasticBackend`] is the production implementation: a thin reqwest
//! client over the Elasticsearch HTTP API with basic auth and a bounded
//! per-request timeout.
//!
//! Index administration (`ping`, index creation, `_bulk` upload) is not
//! part of the seam — only `refrain init` / `refrain load` need it, and
//! only against a real cluster — so those live as concrete methods on
//! [`ElasticBackend`].

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::BackendConfig;

/// Environment variable holding the backend basic-auth password.
pub const PASSWORD_ENV: &str = "REFRAIN_ES_PASSWORD";

/// A single hit as returned by the backend: stable document id, composite
/// score (text relevance already combined with the popularity function),
/// and the raw `_source` document.
#[derive(Debug, Clone)]
pub struct RawHit {
    pub id: String,
    pub score: f64,
    pub source: Value,
}

/// Abstract full-text search capability consumed by the scoring policy.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute a search request body against an index and return the hits
    /// in backend rank order (combined score, descending).
    async fn search(&self, index: &str, body: &Value) -> Result<Vec<RawHit>>;
}

// ============ Elasticsearch response shapes ============

#[derive(Debug, Deserialize)]
struct EsResponse {
    hits: EsHitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct EsHitsEnvelope {
    hits: Vec<EsHit>,
}

#[derive(Debug, Deserialize)]
struct EsHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source")]
    source: Value,
}

#[derive(Debug, Deserialize)]
struct EsBulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

// ============ Elasticsearch backend ============

/// Elasticsearch implementation of [`SearchBackend`].
pub struct ElasticBackend {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl ElasticBackend {
    /// Build a client from configuration.
    ///
    /// If `username` is configured, the password must be present in the
    /// `REFRAIN_ES_PASSWORD` environment variable.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let password = match &config.username {
            Some(_) => Some(std::env::var(PASSWORD_ENV).map_err(|_| {
                anyhow::anyhow!("{} not set (required when backend.username is configured)", PASSWORD_ENV)
            })?),
            None => None,
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password,
        })
    }

    fn authed(&self, rb: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.username {
            Some(user) => rb.basic_auth(user, self.password.as_deref()),
            None => rb,
        }
    }

    /// Check that the cluster answers at all.
    pub async fn ping(&self) -> Result<()> {
        let resp = self
            .authed(self.client.get(&self.base_url))
            .send()
            .await
            .with_context(|| format!("Cannot reach backend at {}", self.base_url))?;
        if !resp.status().is_success() {
            bail!("Backend at {} answered {}", self.base_url, resp.status());
        }
        Ok(())
    }

    /// Whether an index already exists.
    pub async fn index_exists(&self, index: &str) -> Result<bool> {
        let url = format!("{}/{}", self.base_url, index);
        let resp = self.authed(self.client.head(&url)).send().await?;
        Ok(resp.status().is_success())
    }

    /// Create an index with the given settings/mappings body.
    pub async fn create_index(&self, index: &str, mapping: &Value) -> Result<()> {
        let url = format!("{}/{}", self.base_url, index);
        let resp = self
            .authed(self.client.put(&url))
            .json(mapping)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Index creation failed ({}): {}", status, body);
        }
        Ok(())
    }

    /// Bulk-index a batch of documents. Returns the number of items the
    /// backend reported errors for.
    pub async fn bulk(&self, index: &str, docs: &[Value]) -> Result<usize> {
        let payload = bulk_body(index, docs);
        let url = format!("{}/_bulk", self.base_url);
        let resp = self
            .authed(self.client.post(&url))
            .header("Content-Type", "application/x-ndjson")
            .body(payload)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Bulk upload failed ({}): {}", status, body);
        }

        let parsed: EsBulkResponse = resp.json().await.context("Malformed bulk response")?;
        if !parsed.errors {
            return Ok(0);
        }
        let failed = parsed
            .items
            .iter()
            .filter(|item| {
                item.get("index")
                    .and_then(|i| i.get("error"))
                    .is_some()
            })
            .count();
        Ok(failed)
    }
}

#[async_trait]
impl SearchBackend for ElasticBackend {
    async fn search(&self, index: &str, body: &Value) -> Result<Vec<RawHit>> {
        let url = format!("{}/{}/_search", self.base_url, index);
        let resp = self
            .authed(self.client.post(&url))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Search request to {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            bail!("Backend search error {}: {}", status, body_text);
        }

        let parsed: EsResponse = resp.json().await.context("Malformed search response")?;
        Ok(parsed
            .hits
            .hits
            .into_iter()
            .map(|h| RawHit {
                id: h.id,
                score: h.score.unwrap_or(0.0),
                source: h.source,
            })
            .collect())
    }
}

/// Serialize documents into the NDJSON `_bulk` payload: an `index` action
/// line followed by the document, one pair per doc, newline-terminated.
fn bulk_body(index: &str, docs: &[Value]) -> String {
    let action = serde_json::json!({ "index": { "_index": index } }).to_string();
    let mut payload = String::new();
    for doc in docs {
        payload.push_str(&action);
        payload.push('\n');
        payload.push_str(&doc.to_string());
        payload.push('\n');
    }
    payload
}
