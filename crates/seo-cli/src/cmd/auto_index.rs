use crate::agent::Agent;
use crate::output::print_report;
use anyhow::{Context, Result};
use seo_core::indexnow::{IndexClient, IndexReport};
use seo_core::tracking::IndexedUrls;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> Result<()> {
    let agent = Agent::load(root)?;
    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(index(&agent))?;
    let message = report.message(&agent.config.site);
    rt.block_on(agent.notify(&message));
    print_report(json, &report, &message)
}

async fn index(agent: &Agent) -> Result<IndexReport> {
    let site = &agent.config.site;
    let client = IndexClient::new(site, &agent.config.endpoints, &agent.secrets.indexnow_key);

    let urls = match client.fetch_sitemap().await {
        Ok(urls) => urls,
        Err(e) => {
            tracing::warn!(error = %e, sitemap = %site.sitemap_url(), "could not fetch sitemap");
            Vec::new()
        }
    };
    tracing::info!(count = urls.len(), "sitemap URLs found");

    let mut indexed = IndexedUrls::load(&agent.root).context("failed to load indexed URLs")?;
    let new_urls: Vec<String> = indexed.unseen(&urls).into_iter().map(String::from).collect();
    tracing::info!(count = new_urls.len(), "new URLs to submit");

    let google_ok = client.ping_google().await;
    let bing_ok = client.ping_bing().await;

    let indexnow = if new_urls.is_empty() {
        None
    } else {
        let outcome = client.submit(&new_urls).await;
        indexed.merge(new_urls.iter().cloned());
        indexed
            .save(&agent.root)
            .context("failed to save indexed URLs")?;
        Some(outcome)
    };

    Ok(IndexReport {
        total_urls: urls.len(),
        new_urls,
        google_ok,
        bing_ok,
        indexnow,
    })
}
