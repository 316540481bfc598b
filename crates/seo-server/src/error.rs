use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use claude_client::ClaudeError;
use seo_core::invoice::InvoiceReplyError;

pub const MISSING_KEY: &str = "ANTHROPIC_API_KEY not set. Run: export ANTHROPIC_API_KEY=sk-ant-...";
pub const UPSTREAM_FAILED: &str = "Failed to process your request. Please try again.";
pub const CONNECTION_FAILED: &str = "Connection failed. Check your internet and try again.";
pub const EMPTY_REPLY: &str = "Invalid response from AI";

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Rendered as `{"error": message}` with `status`. Messages are shown to
/// the browser user verbatim.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Construct a 500 Internal Server Error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, axum::Json(body)).into_response()
    }
}

impl From<ClaudeError> for AppError {
    fn from(err: ClaudeError) -> Self {
        match &err {
            ClaudeError::EmptyResponse => Self::internal(EMPTY_REPLY),
            ClaudeError::Api { status, body } => {
                tracing::warn!(status, body = %body, "invoice parse rejected upstream");
                Self::internal(UPSTREAM_FAILED)
            }
            ClaudeError::Http(_) | ClaudeError::Parse(_) => {
                tracing::warn!(error = %err, "invoice parse request failed");
                Self::internal(CONNECTION_FAILED)
            }
        }
    }
}

impl From<InvoiceReplyError> for AppError {
    fn from(err: InvoiceReplyError) -> Self {
        match err {
            InvoiceReplyError::Unparseable => Self::internal(err.to_string()),
            InvoiceReplyError::NoItems => Self::bad_request(err.to_string()),
        }
    }
}
