use crate::agent::Agent;
use crate::llm::{best_effort, Llm};
use crate::output::print_report;
use anyhow::{Context, Result};
use chrono::Duration;
use seo_core::error::SeoError;
use seo_core::gsc::{self, Candidate, GscClient, GscReport, MetaChange, ServiceAccount};
use seo_core::html::{apply_meta_updates, extract_meta};
use seo_core::io::atomic_write;
use std::path::Path;

pub fn run(root: &Path, report_only: bool, json: bool) -> Result<()> {
    let agent = Agent::load(root)?;
    let raw = agent
        .secrets
        .gsc_service_account_json
        .as_deref()
        .ok_or(SeoError::MissingEnv("GSC_SERVICE_ACCOUNT_JSON"))?;
    let account = ServiceAccount::from_json(raw)?;

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(monitor(&agent, &account, report_only))?;
    let message = report.message(&agent.config.site);
    match &message {
        Some(m) => rt.block_on(agent.notify(m)),
        None => tracing::info!("no changes to report"),
    }
    print_report(json, &report, message.as_deref().unwrap_or("No changes made."))
}

async fn monitor(agent: &Agent, account: &ServiceAccount, report_only: bool) -> Result<GscReport> {
    let endpoints = &agent.config.endpoints;
    let thresholds = &agent.config.gsc;
    let client = GscClient::new(&endpoints.google_token, &endpoints.search_console);

    let token = client
        .access_token(account, chrono::Utc::now().timestamp())
        .await
        .context("search console authentication failed")?;
    let end = agent.today();
    let start = end - Duration::days(thresholds.lookback_days);
    let rows = client
        .search_analytics(&token, &agent.secrets.gsc_site_url, start, end, thresholds.row_limit)
        .await
        .context("search console query failed")?;
    tracing::info!(pages = rows.len(), "search analytics fetched");

    let set = gsc::find_candidates(&rows, thresholds);
    tracing::info!(
        page2 = set.page2_count,
        low_ctr = set.low_ctr_count,
        selected = set.selected.len(),
        "optimisation candidates"
    );

    let mut report = GscReport {
        rows: rows.len(),
        page2_count: set.page2_count,
        low_ctr_count: set.low_ctr_count,
        candidates: set.selected.len(),
        report_only,
        changes: Vec::new(),
    };
    if set.selected.is_empty() {
        return Ok(report);
    }
    let Some(llm) = agent.llm() else {
        tracing::warn!("ANTHROPIC_API_KEY not set, cannot suggest improvements");
        return Ok(report);
    };

    for candidate in &set.selected {
        if let Some(change) = improve(agent, &llm, candidate, report_only).await? {
            report.changes.push(change);
        }
    }
    Ok(report)
}

/// Ask for a better title and description for one page and, unless
/// `report_only`, write them into the page.
async fn improve(
    agent: &Agent,
    llm: &Llm,
    candidate: &Candidate,
    report_only: bool,
) -> Result<Option<MetaChange>> {
    let url = &candidate.row.page;
    let Some(path) = gsc::url_to_filepath(&agent.root, &agent.config.site, url) else {
        tracing::warn!(url = %url, "no local file for page, skipping");
        return Ok(None);
    };
    let html = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let meta = extract_meta(&html);

    let reply = best_effort(
        llm.ask(gsc::improvement_prompt(candidate, &meta), gsc::IMPROVE_MAX_TOKENS)
            .await,
        "meta improvement",
    );
    let Some(better) = reply.as_deref().and_then(gsc::parse_improvement) else {
        tracing::warn!(url = %url, "no improvement generated, skipping");
        return Ok(None);
    };

    if report_only {
        tracing::info!(url = %url, title = %better.title, "suggested (report only)");
    } else {
        let updated = apply_meta_updates(&html, &better.title, &better.description);
        atomic_write(&path, updated.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(url = %url, title = %better.title, "applied");
    }

    Ok(Some(MetaChange {
        url: url.clone(),
        reason: candidate.reason,
        position: candidate.row.position,
        ctr: candidate.row.ctr,
        impressions: candidate.row.impressions,
        old_title: meta.title,
        new_title: better.title,
        old_desc: meta.description,
        new_desc: better.description,
        applied: !report_only,
    }))
}
