use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use claude_client::CompletionRequest;
use seo_core::invoice::{self, ParsedInvoice};

use crate::error::{AppError, MISSING_KEY};
use crate::state::AppState;

/// POST /api/parse-invoice: turn `{"prompt": "..."}` into structured
/// invoice fields.
///
/// The body is read raw so malformed JSON gets the same `{"error"}` shape
/// as every other failure.
pub async fn parse_invoice(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<ParsedInvoice>, AppError> {
    let data: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| AppError::bad_request("Invalid JSON"))?;
    let prompt = data.get("prompt").and_then(|p| p.as_str()).unwrap_or("");
    let prompt = invoice::sanitize_prompt(prompt).ok_or_else(|| AppError::bad_request("Prompt too short"))?;

    let claude = app.claude.as_ref().ok_or_else(|| AppError::internal(MISSING_KEY))?;
    let request = CompletionRequest::new(app.invoice_model.as_str(), prompt)
        .system(invoice::SYSTEM_PROMPT)
        .max_tokens(invoice::PARSE_MAX_TOKENS);
    let text = claude.complete(request).await?;
    if text.trim().is_empty() {
        return Err(AppError::from(claude_client::ClaudeError::EmptyResponse));
    }

    let parsed = invoice::parse_reply(&text)?;
    tracing::info!(items = parsed.items.len(), "invoice parsed");
    Ok(Json(parsed))
}
