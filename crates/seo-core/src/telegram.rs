//! Chat notifications through the Telegram Bot API.

use crate::llm::truncate_chars;
use serde_json::json;
use std::time::Duration;

/// Telegram rejects messages over 4096 characters; leave room for the suffix.
pub const MAX_MESSAGE_CHARS: usize = 4000;
const TELEGRAM_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Notifier {
    http: reqwest::Client,
    base_url: String,
    bot_token: Option<String>,
    chat_id: Option<String>,
}

/// Cut to [`MAX_MESSAGE_CHARS`] and mark the cut with `...`.
pub fn clip_message(text: &str) -> String {
    if text.chars().count() > MAX_MESSAGE_CHARS {
        format!("{}...", truncate_chars(text, MAX_MESSAGE_CHARS))
    } else {
        text.to_string()
    }
}

impl Notifier {
    pub fn new(base_url: &str, bot_token: Option<String>, chat_id: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
        }
    }

    /// Post `text` as Markdown. Unconfigured notifiers log the text instead.
    /// Delivery failures are logged and never returned.
    pub async fn send(&self, text: &str) {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            tracing::info!("telegram not configured, message:\n{text}");
            return;
        };
        let url = format!("{}/bot{token}/sendMessage", self.base_url);
        let body = json!({
            "chat_id": chat_id,
            "text": clip_message(text),
            "parse_mode": "Markdown",
        });
        match self
            .http
            .post(&url)
            .json(&body)
            .timeout(TELEGRAM_TIMEOUT)
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => tracing::debug!("telegram message sent"),
            Ok(r) => tracing::warn!(status = r.status().as_u16(), "telegram rejected message"),
            Err(e) => tracing::warn!(error = %e, "failed to send telegram message"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn clip_long_messages() {
        let long = "é".repeat(4500);
        let clipped = clip_message(&long);
        assert_eq!(clipped.chars().count(), 4003);
        assert!(clipped.ends_with("..."));
        assert_eq!(clip_message("short"), "short");
        assert_eq!(clip_message(&"a".repeat(4000)).len(), 4000);
    }

    #[tokio::test]
    async fn sends_markdown_message() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/botTOKEN/sendMessage")
            .match_body(Matcher::Json(json!({
                "chat_id": "42",
                "text": "*hello*",
                "parse_mode": "Markdown"
            })))
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;
        let n = Notifier::new(&server.url(), Some("TOKEN".into()), Some("42".into()));
        n.send("*hello*").await;
        m.assert_async().await;
    }

    #[tokio::test]
    async fn failure_is_swallowed() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/botT/sendMessage")
            .with_status(400)
            .create_async()
            .await;
        let n = Notifier::new(&server.url(), Some("T".into()), Some("1".into()));
        n.send("x").await;
        m.assert_async().await;
    }

    #[tokio::test]
    async fn unconfigured_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let n = Notifier::new(&server.url(), Some("T".into()), None);
        n.send("x").await;
        m.assert_async().await;
    }
}
