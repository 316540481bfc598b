//! Sitemap reading, search-engine pings and IndexNow submission.

use crate::config::{Endpoints, SiteConfig};
use crate::error::{Result, SeoError};
use regex::Regex;
use serde::Serialize;
use serde_json::json;
use std::sync::OnceLock;
use std::time::Duration;

/// IndexNow accepts at most this many URLs per request.
pub const INDEXNOW_BATCH: usize = 100;
const INDEX_TIMEOUT: Duration = Duration::from_secs(30);
/// New URLs listed in the notification before "...and N more".
const REPORT_URLS: usize = 5;

fn loc_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<loc>\s*(.*?)\s*</loc>").unwrap())
}

/// Every `<loc>` value, in document order.
pub fn extract_locs(xml: &str) -> Vec<String> {
    loc_re()
        .captures_iter(xml)
        .map(|c| c[1].replace("&amp;", "&"))
        .filter(|u| !u.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    Accepted,
    /// 422: the key file at `keyLocation` is missing or does not match.
    KeyRejected,
    Failed,
}

pub struct IndexClient<'a> {
    http: reqwest::Client,
    site: &'a SiteConfig,
    endpoints: &'a Endpoints,
    key: &'a str,
}

impl<'a> IndexClient<'a> {
    pub fn new(site: &'a SiteConfig, endpoints: &'a Endpoints, key: &'a str) -> Self {
        Self {
            http: reqwest::Client::new(),
            site,
            endpoints,
            key,
        }
    }

    pub async fn fetch_sitemap(&self) -> Result<Vec<String>> {
        let resp = self
            .http
            .get(self.site.sitemap_url())
            .timeout(INDEX_TIMEOUT)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SeoError::UpstreamStatus {
                service: "sitemap",
                status: status.as_u16(),
                body: String::new(),
            });
        }
        Ok(extract_locs(&resp.text().await?))
    }

    /// `GET {base}/ping?sitemap=...`; only a 200 counts.
    pub async fn ping(&self, engine: &str, base: &str) -> bool {
        let url = format!("{}/ping", base.trim_end_matches('/'));
        let result = self
            .http
            .get(&url)
            .query(&[("sitemap", self.site.sitemap_url())])
            .timeout(INDEX_TIMEOUT)
            .send()
            .await;
        match result {
            Ok(r) if r.status() == reqwest::StatusCode::OK => {
                tracing::info!(engine, "sitemap ping accepted");
                true
            }
            Ok(r) => {
                tracing::warn!(engine, status = r.status().as_u16(), "sitemap ping rejected");
                false
            }
            Err(e) => {
                tracing::warn!(engine, error = %e, "sitemap ping failed");
                false
            }
        }
    }

    pub async fn ping_google(&self) -> bool {
        self.ping("google", &self.endpoints.google_ping).await
    }

    pub async fn ping_bing(&self) -> bool {
        self.ping("bing", &self.endpoints.bing_ping).await
    }

    async fn submit_batch(&self, urls: &[String]) -> SubmitOutcome {
        let body = json!({
            "host": self.site.host(),
            "key": self.key,
            "keyLocation": format!("{}/{}.txt", self.site.base(), self.key),
            "urlList": urls,
        });
        let result = self
            .http
            .post(&self.endpoints.indexnow)
            .json(&body)
            .timeout(INDEX_TIMEOUT)
            .send()
            .await;
        match result {
            Ok(r) => match r.status().as_u16() {
                200 | 202 => SubmitOutcome::Accepted,
                422 => {
                    tracing::warn!("IndexNow key validation failed; publish the key file at keyLocation");
                    SubmitOutcome::KeyRejected
                }
                status => {
                    let text = r.text().await.unwrap_or_default();
                    tracing::warn!(status, body = %text, "IndexNow rejected submission");
                    SubmitOutcome::Failed
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "IndexNow submission failed");
                SubmitOutcome::Failed
            }
        }
    }

    /// Submit `urls` in batches of [`INDEXNOW_BATCH`]. Returns the first
    /// non-accepted outcome, or `Accepted` when every batch went through.
    pub async fn submit(&self, urls: &[String]) -> SubmitOutcome {
        let mut outcome = SubmitOutcome::Accepted;
        for batch in urls.chunks(INDEXNOW_BATCH) {
            let r = self.submit_batch(batch).await;
            if r != SubmitOutcome::Accepted && outcome == SubmitOutcome::Accepted {
                outcome = r;
            }
        }
        outcome
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexReport {
    pub total_urls: usize,
    pub new_urls: Vec<String>,
    pub google_ok: bool,
    pub bing_ok: bool,
    /// `None` when there was nothing new to submit.
    pub indexnow: Option<SubmitOutcome>,
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✅"
    } else {
        "❌"
    }
}

impl IndexReport {
    pub fn message(&self, site: &SiteConfig) -> String {
        let mut msg = format!(
            "🔍 *Auto-Index Agent Complete*\n\n📊 Total URLs: {}\n🆕 New URLs: {}\n\n\
             *Search Engine Pings:*\n• Google: {}\n• Bing: {}\n",
            self.total_urls,
            self.new_urls.len(),
            mark(self.google_ok),
            mark(self.bing_ok)
        );
        if let Some(outcome) = self.indexnow {
            msg.push_str(&format!(
                "• IndexNow: {}\n\n*New URLs submitted:*\n",
                mark(outcome == SubmitOutcome::Accepted)
            ));
            for url in self.new_urls.iter().take(REPORT_URLS) {
                msg.push_str(&format!("• {}\n", site.short_url(url)));
            }
            if self.new_urls.len() > REPORT_URLS {
                msg.push_str(&format!(
                    "_...and {} more_",
                    self.new_urls.len() - REPORT_URLS
                ));
            }
        }
        msg
    }
}
