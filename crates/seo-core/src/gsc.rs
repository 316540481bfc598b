//! Google Search Console: service-account auth, page analytics and the
//! selection of pages whose title and description need work.

use crate::config::{GscThresholds, SiteConfig};
use crate::error::{Result, SeoError};
use crate::html::PageMeta;
use crate::llm;
use chrono::NaiveDate;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SCOPE: &str = "https://www.googleapis.com/auth/webmasters.readonly";
pub const TOKEN_AUDIENCE: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
const GSC_TIMEOUT: Duration = Duration::from_secs(30);
pub const IMPROVE_MAX_TOKENS: u32 = 512;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
}

impl ServiceAccount {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SeoError::InvalidServiceAccount(e.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// RS256-signed assertion for the JWT-bearer grant, valid for one hour
/// from `now` (Unix seconds).
pub fn sign_assertion(sa: &ServiceAccount, now: i64) -> Result<String> {
    let claims = Claims {
        iss: sa.client_email.clone(),
        scope: SCOPE.to_string(),
        aud: TOKEN_AUDIENCE.to_string(),
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
    };
    let key = EncodingKey::from_rsa_pem(sa.private_key.as_bytes())?;
    Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRow {
    pub page: String,
    pub clicks: f64,
    pub impressions: f64,
    pub ctr: f64,
    pub position: f64,
}

#[derive(Debug, Deserialize)]
struct AnalyticsResponse {
    #[serde(default)]
    rows: Vec<AnalyticsRow>,
}

#[derive(Debug, Deserialize)]
struct AnalyticsRow {
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    clicks: f64,
    #[serde(default)]
    impressions: f64,
    #[serde(default)]
    ctr: f64,
    #[serde(default)]
    position: f64,
}

pub struct GscClient {
    http: reqwest::Client,
    token_url: String,
    api_base: String,
}

impl GscClient {
    pub fn new(token_url: &str, api_base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: token_url.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Exchange a signed assertion for an OAuth access token.
    pub async fn access_token(&self, sa: &ServiceAccount, now: i64) -> Result<String> {
        let assertion = sign_assertion(sa, now)?;
        let resp = self
            .http
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .timeout(GSC_TIMEOUT)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SeoError::UpstreamStatus {
                service: "google oauth",
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        let token: TokenResponse = resp.json().await?;
        Ok(token.access_token)
    }

    /// Page-level analytics for `start..=end`.
    pub async fn search_analytics(
        &self,
        token: &str,
        site_url: &str,
        start: NaiveDate,
        end: NaiveDate,
        row_limit: u32,
    ) -> Result<Vec<PageRow>> {
        let url = format!(
            "{}/webmasters/v3/sites/{}/searchAnalytics/query",
            self.api_base,
            urlencoding::encode(site_url)
        );
        let body = serde_json::json!({
            "startDate": start.format("%Y-%m-%d").to_string(),
            "endDate": end.format("%Y-%m-%d").to_string(),
            "dimensions": ["page"],
            "rowLimit": row_limit,
        });
        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .timeout(GSC_TIMEOUT)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SeoError::UpstreamStatus {
                service: "search console",
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        let data: AnalyticsResponse = resp.json().await?;
        Ok(data
            .rows
            .into_iter()
            .filter_map(|r| {
                let page = r.keys.into_iter().next()?;
                Some(PageRow {
                    page,
                    clicks: r.clicks,
                    impressions: r.impressions,
                    ctr: r.ctr,
                    position: r.position,
                })
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Page2,
    LowCtr,
    Page2AndLowCtr,
}

impl Reason {
    pub fn label(self) -> &'static str {
        match self {
            Reason::Page2 => "Page 2",
            Reason::LowCtr => "Low CTR",
            Reason::Page2AndLowCtr => "Page 2 + Low CTR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub row: PageRow,
    pub reason: Reason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSet {
    pub page2_count: usize,
    pub low_ctr_count: usize,
    pub selected: Vec<Candidate>,
}

fn is_blog(row: &PageRow) -> bool {
    row.page.contains("/blog/")
}

fn by_impressions_desc(rows: &mut [&PageRow]) {
    rows.sort_by(|a, b| b.impressions.total_cmp(&a.impressions));
}

/// Page-2 pages come first, then low-CTR pages not already listed; a page in
/// both lists is tagged [`Reason::Page2AndLowCtr`]. Capped at `max_pages`.
pub fn find_candidates(rows: &[PageRow], t: &GscThresholds) -> CandidateSet {
    let mut page2: Vec<&PageRow> = rows
        .iter()
        .filter(|r| {
            r.position >= t.page2_min
                && r.position <= t.page2_max
                && r.impressions >= t.page2_min_impressions as f64
                && is_blog(r)
        })
        .collect();
    by_impressions_desc(&mut page2);

    let mut low_ctr: Vec<&PageRow> = rows
        .iter()
        .filter(|r| {
            r.impressions >= t.low_ctr_min_impressions as f64
                && r.ctr < t.low_ctr_max_ctr
                && is_blog(r)
        })
        .collect();
    by_impressions_desc(&mut low_ctr);

    let mut selected: Vec<Candidate> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for r in &page2 {
        if !index.contains_key(r.page.as_str()) {
            index.insert(&r.page, selected.len());
            selected.push(Candidate {
                row: (*r).clone(),
                reason: Reason::Page2,
            });
        }
    }
    for r in &low_ctr {
        match index.get(r.page.as_str()) {
            Some(&i) => selected[i].reason = Reason::Page2AndLowCtr,
            None => {
                index.insert(&r.page, selected.len());
                selected.push(Candidate {
                    row: (*r).clone(),
                    reason: Reason::LowCtr,
                });
            }
        }
    }
    selected.truncate(t.max_pages);

    CandidateSet {
        page2_count: page2.len(),
        low_ctr_count: low_ctr.len(),
        selected,
    }
}

/// Map a page URL to the local file that serves it.
pub fn url_to_filepath(root: &Path, site: &SiteConfig, page_url: &str) -> Option<PathBuf> {
    let path = page_url
        .strip_prefix(site.base())
        .unwrap_or(page_url)
        .trim_start_matches('/');
    if path.is_empty() {
        return Some(root.join("index.html"));
    }
    [
        root.join(format!("{path}.html")),
        root.join(path).join("index.html"),
        root.join(path),
    ]
    .into_iter()
    .find(|p| p.is_file())
}

// ---------------------------------------------------------------------------
// Improvements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaImprovement {
    pub title: String,
    pub description: String,
}

fn reason_text(c: &Candidate) -> String {
    let pos = c.row.position;
    let ctr = c.row.ctr * 100.0;
    match c.reason {
        Reason::Page2 => format!("ranking position {pos:.1} (page 2), needs a content/relevance boost"),
        Reason::LowCtr => format!(
            "only {ctr:.1}% CTR despite {} impressions, title/meta isn't compelling",
            c.row.impressions
        ),
        Reason::Page2AndLowCtr => {
            format!("ranking position {pos:.1} AND only {ctr:.1}% CTR, both issues")
        }
    }
}

pub fn improvement_prompt(c: &Candidate, meta: &PageMeta) -> String {
    format!(
        "You are an SEO expert. Improve the title and meta description for this page.\n\n\
         Page URL: {url}\n\
         Current title: {title}\n\
         Current meta description: {desc}\n\n\
         GSC data: {reason}\n\
         Clicks: {clicks} | Impressions: {impr} | Position: {pos:.1}\n\n\
         Rules:\n\
         - Title: max 60 chars, include primary keyword near the start, make it compelling\n\
         - Meta description: max 155 chars, include a clear benefit + call to action\n\
         - Keep the same topic/keyword focus, do NOT change what the page is about\n\
         - Make it more click-worthy without being clickbait\n\n\
         Return ONLY valid JSON:\n\
         {{\"title\": \"New title here\", \"description\": \"New meta description here\"}}",
        url = c.row.page,
        title = meta.title,
        desc = meta.description,
        reason = reason_text(c),
        clicks = c.row.clicks,
        impr = c.row.impressions,
        pos = c.row.position,
    )
}

/// `None` when the reply has no usable `{title, description}` object.
pub fn parse_improvement(reply: &str) -> Option<MetaImprovement> {
    llm::parse_embedded::<MetaImprovement>(reply)
        .filter(|m| !m.title.trim().is_empty() && !m.description.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaChange {
    pub url: String,
    pub reason: Reason,
    pub position: f64,
    pub ctr: f64,
    pub impressions: f64,
    pub old_title: String,
    pub new_title: String,
    pub old_desc: String,
    pub new_desc: String,
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GscReport {
    pub rows: usize,
    pub page2_count: usize,
    pub low_ctr_count: usize,
    pub candidates: usize,
    pub report_only: bool,
    pub changes: Vec<MetaChange>,
}

pub const NO_CANDIDATES_MESSAGE: &str =
    "📊 *GSC Monitor*: No optimization candidates found this week. All pages look healthy!";

impl GscReport {
    /// `None` when candidates existed but nothing came of them.
    pub fn message(&self, site: &SiteConfig) -> Option<String> {
        if self.candidates == 0 {
            return Some(NO_CANDIDATES_MESSAGE.to_string());
        }
        if self.changes.is_empty() {
            return None;
        }
        let action = if self.report_only {
            "suggested (report only)"
        } else {
            "applied"
        };
        let mut msg = format!(
            "📊 *GSC Performance Monitor*\n\n✏️ {} optimizations {action}:\n\n",
            self.changes.len()
        );
        for c in &self.changes {
            msg.push_str(&format!("*{}*\n", site.short_url(&c.url)));
            msg.push_str(&format!(
                "  Reason: {} | Pos: {:.1} | CTR: {:.1}%\n",
                c.reason.label(),
                c.position,
                c.ctr * 100.0
            ));
            msg.push_str(&format!("  Was: _{}_\n", llm::truncate_chars(&c.old_title, 50)));
            msg.push_str(&format!("  Now: _{}_\n\n", llm::truncate_chars(&c.new_title, 50)));
        }
        Some(msg)
    }
}
