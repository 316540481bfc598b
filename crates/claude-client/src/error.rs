use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaudeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Claude API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse Messages API response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Claude response contained no text block")]
    EmptyResponse,
}
