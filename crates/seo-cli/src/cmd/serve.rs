use anyhow::{Context, Result};
use seo_core::config::Secrets;
use seo_server::state::AppState;
use std::path::Path;

pub fn run(root: &Path, port: u16, open: bool) -> Result<()> {
    let secrets = Secrets::from_env();
    let state = AppState::load(root.to_path_buf(), secrets.anthropic_api_key)
        .context("failed to load agents/config.yaml")?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        tokio::select! {
            result = seo_server::serve(state, port, open) => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
