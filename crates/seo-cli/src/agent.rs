use crate::llm::Llm;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use claude_client::ClaudeClient;
use seo_core::config::{Config, Secrets};
use seo_core::telegram::Notifier;
use std::path::{Path, PathBuf};

/// Everything a single agent run needs: where the site lives, its settings,
/// credentials and the chat channel.
pub struct Agent {
    pub root: PathBuf,
    pub config: Config,
    pub secrets: Secrets,
    notifier: Notifier,
}

impl Agent {
    pub fn load(root: &Path) -> Result<Self> {
        let config = Config::load(root).context("failed to load agents/config.yaml")?;
        let secrets = Secrets::from_env();
        let notifier = Notifier::new(
            &config.endpoints.telegram,
            secrets.telegram_bot_token.clone(),
            secrets.telegram_chat_id.clone(),
        );
        Ok(Self {
            root: root.to_path_buf(),
            config,
            secrets,
            notifier,
        })
    }

    pub async fn notify(&self, text: &str) {
        self.notifier.send(text).await;
    }

    /// Model access, when `ANTHROPIC_API_KEY` is set.
    pub fn llm(&self) -> Option<Llm> {
        let key = self.secrets.anthropic_api_key.as_deref()?;
        let client = ClaudeClient::new(key, self.config.endpoints.anthropic.as_str());
        Some(Llm::new(client, self.config.models.clone()))
    }

    /// Model access for agents that cannot run without it.
    pub fn require_llm(&self) -> Result<Llm> {
        self.secrets.require_anthropic_key()?;
        self.llm().context("ANTHROPIC_API_KEY not set")
    }

    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
