use crate::types::{CompletionRequest, MessagesResponse};
use crate::{ClaudeError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ─── ClaudeClient ─────────────────────────────────────────────────────────

/// Async Messages API client. Cheap to clone; the inner `reqwest::Client`
/// shares its connection pool.
#[derive(Debug, Clone)]
pub struct ClaudeClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl ClaudeClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_http(api_key, base_url, reqwest::Client::new())
    }

    fn with_http(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Send the request and return the full typed response.
    pub async fn send(&self, req: &CompletionRequest) -> Result<MessagesResponse> {
        let url = format!("{}/v1/messages", self.base_url);
        tracing::debug!(model = %req.model, max_tokens = req.max_tokens, "claude request");

        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .timeout(req.timeout)
            .json(&req.to_wire())
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ClaudeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)?;
        if let Some(usage) = parsed.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "claude usage"
            );
        }
        Ok(parsed)
    }

    /// Send the request and return the first text block.
    pub async fn complete(&self, req: CompletionRequest) -> Result<String> {
        let resp = self.send(&req).await?;
        resp.first_text()
            .map(str::to_owned)
            .ok_or(ClaudeError::EmptyResponse)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
