use claude_client::{ClaudeClient, CompletionRequest};
use seo_core::config::ModelConfig;
use std::time::Duration;

const LONG_FORM_TIMEOUT: Duration = Duration::from_secs(120);
const SHORT_FORM_TIMEOUT: Duration = Duration::from_secs(30);

/// The two model tiers the agents use: long-form writing and short
/// structured answers.
pub struct Llm {
    client: ClaudeClient,
    models: ModelConfig,
}

impl Llm {
    pub fn new(client: ClaudeClient, models: ModelConfig) -> Self {
        Self { client, models }
    }

    /// Long-form generation: articles, landing pages, reviews.
    pub async fn write(
        &self,
        system: &str,
        prompt: String,
        max_tokens: u32,
    ) -> claude_client::Result<String> {
        let req = CompletionRequest::new(&self.models.long_form, prompt)
            .system(system)
            .max_tokens(max_tokens)
            .timeout(LONG_FORM_TIMEOUT);
        self.client.complete(req).await
    }

    /// Short structured answers: meta rewrites, FAQs, directory copy.
    pub async fn ask(&self, prompt: String, max_tokens: u32) -> claude_client::Result<String> {
        let req = CompletionRequest::new(&self.models.short_form, prompt)
            .max_tokens(max_tokens)
            .timeout(SHORT_FORM_TIMEOUT);
        self.client.complete(req).await
    }
}

/// Log a failed call and carry on without its text.
pub fn best_effort(result: claude_client::Result<String>, what: &str) -> Option<String> {
    match result {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(error = %e, "{what} failed");
            None
        }
    }
}
