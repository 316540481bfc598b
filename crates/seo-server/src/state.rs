use claude_client::ClaudeClient;
use seo_core::config::Config;
use std::path::PathBuf;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Directory served as static files.
    pub root: PathBuf,
    /// `None` when `ANTHROPIC_API_KEY` is unset; the parse endpoint then
    /// answers with a setup hint instead of calling the API.
    pub claude: Option<ClaudeClient>,
    pub invoice_model: String,
}

impl AppState {
    pub fn new(root: PathBuf, config: &Config, api_key: Option<String>) -> Self {
        let claude = api_key.map(|key| ClaudeClient::new(key, config.endpoints.anthropic.as_str()));
        Self {
            root,
            claude,
            invoice_model: config.models.invoice_parser.clone(),
        }
    }

    /// Read `agents/config.yaml` under `root` for the model and API base.
    pub fn load(root: PathBuf, api_key: Option<String>) -> seo_core::Result<Self> {
        let config = Config::load(&root)?;
        Ok(Self::new(root, &config, api_key))
    }
}
