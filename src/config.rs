use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub search: SearchConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL of the Elasticsearch-compatible backend (e.g. `https://localhost:9200`).
    pub url: String,
    #[serde(default = "default_index")]
    pub index: String,
    /// Basic-auth username. The password is never stored in config;
    /// it is read from the `REFRAIN_ES_PASSWORD` environment variable.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Accept self-signed certificates (local clusters often ship one).
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_index() -> String {
    "songs".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Maximum number of results returned per query.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Token count at or above which a query is classified as a lyric phrase.
    #[serde(default = "default_lyric_token_threshold")]
    pub lyric_token_threshold: usize,
    /// Stopword fraction above which a short query is classified as a lyric phrase.
    #[serde(default = "default_stopword_ratio")]
    pub stopword_ratio: f64,
}

// Hand-tuned on the original corpus; exposed in config rather than
// hard-coded so they can be adjusted without a rebuild.
fn default_max_results() -> usize {
    20
}
fn default_lyric_token_threshold() -> usize {
    4
}
fn default_stopword_ratio() -> f64 {
    0.3
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            lyric_token_threshold: default_lyric_token_threshold(),
            stopword_ratio: default_stopword_ratio(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.backend.url.trim().is_empty() {
        anyhow::bail!("backend.url must not be empty");
    }

    if config.backend.index.trim().is_empty() {
        anyhow::bail!("backend.index must not be empty");
    }

    if config.backend.timeout_secs == 0 {
        anyhow::bail!("backend.timeout_secs must be > 0");
    }

    if config.search.max_results < 1 {
        anyhow::bail!("search.max_results must be >= 1");
    }

    if config.search.lyric_token_threshold < 1 {
        anyhow::bail!("search.lyric_token_threshold must be >= 1");
    }

    if !(0.0..=1.0).contains(&config.search.stopword_ratio) {
        anyhow::bail!("search.stopword_ratio must be in [0.0, 1.0]");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let f = write_config(
            r#"
            [backend]
            url = "http://localhost:9200"

            [server]
            bind = "127.0.0.1:8000"
            "#,
        );
        let cfg = load_config(f.path()).unwrap();
        assert_eq!(cfg.backend.index, "songs");
        assert_eq!(cfg.backend.timeout_secs, 10);
        assert_eq!(cfg.search.max_results, 20);
        assert_eq!(cfg.search.lyric_token_threshold, 4);
        assert!((cfg.search.stopword_ratio - 0.3).abs() < 1e-9);
        assert!(!cfg.backend.accept_invalid_certs);
    }

    #[test]
    fn test_rejects_empty_url() {
        let f = write_config(
            r#"
            [backend]
            url = ""

            [server]
            bind = "127.0.0.1:8000"
            "#,
        );
        assert!(load_config(f.path()).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_stopword_ratio() {
        let f = write_config(
            r#"
            [backend]
            url = "http://localhost:9200"

            [search]
            stopword_ratio = 1.5

            [server]
            bind = "127.0.0.1:8000"
            "#,
        );
        assert!(load_config(f.path()).is_err());
    }

    #[test]
    fn test_overrides_are_honored() {
        let f = write_config(
            r#"
            [backend]
            url = "https://es.internal:9200"
            index = "songs_v2"
            username = "svc_search"
            timeout_secs = 3
            accept_invalid_certs = true

            [search]
            max_results = 10
            lyric_token_threshold = 5
            stopword_ratio = 0.5

            [server]
            bind = "0.0.0.0:8000"
            "#,
        );
        let cfg = load_config(f.path()).unwrap();
        assert_eq!(cfg.backend.index, "songs_v2");
        assert_eq!(cfg.backend.username.as_deref(), Some("svc_search"));
        assert!(cfg.backend.accept_invalid_certs);
        assert_eq!(cfg.search.max_results, 10);
        assert_eq!(cfg.search.lyric_token_threshold, 5);
    }
}
