//! Agent configuration.
//!
//! Non-secret settings live in an optional `agents/config.yaml`; every field
//! has a default so the file may be absent or partial. Secrets are read from
//! the environment only ([`Secrets::from_env`]).

use crate::error::{Result, SeoError};
use crate::{io, paths};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// SiteConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteConfig {
    #[serde(default = "default_site_url")]
    pub url: String,
    #[serde(default = "default_site_name")]
    pub name: String,
}

fn default_site_url() -> String {
    "https://www.makeinvoice.online".to_string()
}

fn default_site_name() -> String {
    "MakeInvoice.online".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: default_site_url(),
            name: default_site_name(),
        }
    }
}

impl SiteConfig {
    /// Site URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Bare host, e.g. `www.makeinvoice.online`.
    pub fn host(&self) -> &str {
        let base = self.base();
        let no_scheme = base.split_once("://").map(|(_, rest)| rest).unwrap_or(base);
        no_scheme.split('/').next().unwrap_or(no_scheme)
    }

    pub fn sitemap_url(&self) -> String {
        format!("{}/sitemap.xml", self.base())
    }

    /// Strip the site prefix for compact display in reports.
    pub fn short_url<'a>(&self, url: &'a str) -> &'a str {
        url.strip_prefix(self.base()).unwrap_or(url)
    }
}

// ---------------------------------------------------------------------------
// ModelConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default = "default_long_form")]
    pub long_form: String,
    #[serde(default = "default_short_form")]
    pub short_form: String,
    #[serde(default = "default_invoice_parser")]
    pub invoice_parser: String,
}

fn default_long_form() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_short_form() -> String {
    "claude-haiku-4-5-20251001".to_string()
}

fn default_invoice_parser() -> String {
    "claude-3-haiku-20240307".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            long_form: default_long_form(),
            short_form: default_short_form(),
            invoice_parser: default_invoice_parser(),
        }
    }
}

// ---------------------------------------------------------------------------
// GscThresholds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GscThresholds {
    #[serde(default = "default_page2_min")]
    pub page2_min: f64,
    #[serde(default = "default_page2_max")]
    pub page2_max: f64,
    #[serde(default = "default_page2_min_impressions")]
    pub page2_min_impressions: u64,
    #[serde(default = "default_low_ctr_min_impressions")]
    pub low_ctr_min_impressions: u64,
    #[serde(default = "default_low_ctr_max_ctr")]
    pub low_ctr_max_ctr: f64,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    #[serde(default = "default_row_limit")]
    pub row_limit: u32,
}

fn default_page2_min() -> f64 {
    11.0
}

fn default_page2_max() -> f64 {
    20.0
}

fn default_page2_min_impressions() -> u64 {
    50
}

fn default_low_ctr_min_impressions() -> u64 {
    200
}

fn default_low_ctr_max_ctr() -> f64 {
    0.03
}

fn default_max_pages() -> usize {
    5
}

fn default_lookback_days() -> i64 {
    90
}

fn default_row_limit() -> u32 {
    500
}

impl Default for GscThresholds {
    fn default() -> Self {
        Self {
            page2_min: default_page2_min(),
            page2_max: default_page2_max(),
            page2_min_impressions: default_page2_min_impressions(),
            low_ctr_min_impressions: default_low_ctr_min_impressions(),
            low_ctr_max_ctr: default_low_ctr_max_ctr(),
            max_pages: default_max_pages(),
            lookback_days: default_lookback_days(),
            row_limit: default_row_limit(),
        }
    }
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Base URLs of every external service. Overridable so a local mock server
/// can stand in for all of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Endpoints {
    #[serde(default = "default_anthropic")]
    pub anthropic: String,
    #[serde(default = "default_telegram")]
    pub telegram: String,
    #[serde(default = "default_indexnow")]
    pub indexnow: String,
    #[serde(default = "default_google_ping")]
    pub google_ping: String,
    #[serde(default = "default_bing_ping")]
    pub bing_ping: String,
    #[serde(default = "default_search_console")]
    pub search_console: String,
    #[serde(default = "default_google_token")]
    pub google_token: String,
    #[serde(default = "default_reddit")]
    pub reddit: String,
}

fn default_anthropic() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_telegram() -> String {
    "https://api.telegram.org".to_string()
}

fn default_indexnow() -> String {
    "https://api.indexnow.org/indexnow".to_string()
}

fn default_google_ping() -> String {
    "https://www.google.com".to_string()
}

fn default_bing_ping() -> String {
    "https://www.bing.com".to_string()
}

fn default_search_console() -> String {
    "https://searchconsole.googleapis.com".to_string()
}

fn default_google_token() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_reddit() -> String {
    "https://www.reddit.com".to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            anthropic: default_anthropic(),
            telegram: default_telegram(),
            indexnow: default_indexnow(),
            google_ping: default_google_ping(),
            bing_ping: default_bing_ping(),
            search_console: default_search_console(),
            google_token: default_google_token(),
            reddit: default_reddit(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub models: ModelConfig,
    #[serde(default)]
    pub gsc: GscThresholds,
    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Config {
    /// Load `agents/config.yaml`, falling back to defaults when absent or empty.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        let Some(content) = io::read_optional(&path)? else {
            return Ok(Self::default());
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| SeoError::InvalidConfig { path, source })
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self).map_err(|source| SeoError::InvalidConfig {
            path: path.clone(),
            source,
        })?;
        io::atomic_write(&path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

pub const DEFAULT_INDEXNOW_KEY: &str = "makeinvoice-indexnow-key";
pub const DEFAULT_GSC_SITE_URL: &str = "sc-domain:makeinvoice.online";

/// Credentials, read from the environment. Empty values count as unset.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub anthropic_api_key: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub indexnow_key: String,
    pub gsc_service_account_json: Option<String>,
    pub gsc_site_url: String,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary key lookup; lets tests avoid mutating the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        Self {
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: get("TELEGRAM_CHAT_ID"),
            indexnow_key: get("INDEXNOW_KEY").unwrap_or_else(|| DEFAULT_INDEXNOW_KEY.to_string()),
            gsc_service_account_json: get("GSC_SERVICE_ACCOUNT_JSON"),
            gsc_site_url: get("GSC_SITE_URL").unwrap_or_else(|| DEFAULT_GSC_SITE_URL.to_string()),
            reddit_client_id: get("REDDIT_CLIENT_ID"),
            reddit_client_secret: get("REDDIT_CLIENT_SECRET"),
        }
    }

    pub fn require_anthropic_key(&self) -> Result<&str> {
        self.anthropic_api_key
            .as_deref()
            .ok_or(SeoError::MissingEnv("ANTHROPIC_API_KEY"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.site.url, "https://www.makeinvoice.online");
        assert_eq!(config.gsc.max_pages, 5);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("agents")).unwrap();
        std::fs::write(
            dir.path().join("agents/config.yaml"),
            "endpoints:\n  anthropic: http://127.0.0.1:4000\ngsc:\n  max_pages: 2\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.endpoints.anthropic, "http://127.0.0.1:4000");
        assert_eq!(config.endpoints.telegram, "https://api.telegram.org");
        assert_eq!(config.gsc.max_pages, 2);
        assert!((config.gsc.low_ctr_max_ctr - 0.03).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_yaml_is_reported_with_path() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("agents")).unwrap();
        std::fs::write(dir.path().join("agents/config.yaml"), "site: [unclosed").unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.site.url = "https://example.test/".into();
        config.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.site.base(), "https://example.test");
    }

    #[test]
    fn site_helpers() {
        let site = SiteConfig::default();
        assert_eq!(site.host(), "www.makeinvoice.online");
        assert_eq!(site.sitemap_url(), "https://www.makeinvoice.online/sitemap.xml");
        assert_eq!(
            site.short_url("https://www.makeinvoice.online/blog/proforma-invoice"),
            "/blog/proforma-invoice"
        );
        assert_eq!(site.short_url("https://other.test/x"), "https://other.test/x");
    }

    #[test]
    fn secrets_defaults_and_blank_values() {
        let env: HashMap<&str, &str> = [("ANTHROPIC_API_KEY", "  "), ("TELEGRAM_CHAT_ID", "42")]
            .into_iter()
            .collect();
        let secrets = Secrets::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert!(secrets.anthropic_api_key.is_none());
        assert!(secrets.require_anthropic_key().is_err());
        assert_eq!(secrets.telegram_chat_id.as_deref(), Some("42"));
        assert_eq!(secrets.indexnow_key, DEFAULT_INDEXNOW_KEY);
        assert_eq!(secrets.gsc_site_url, DEFAULT_GSC_SITE_URL);
    }
}
