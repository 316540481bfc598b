use crate::agent::Agent;
use crate::llm::{best_effort, Llm};
use crate::output::print_report;
use anyhow::{Context, Result};
use seo_core::error::SeoError;
use seo_core::faq::{self, Faq, SchemaChange, SchemaSummary};
use seo_core::html::PageMeta;
use seo_core::io::atomic_write;
use seo_core::paths;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct PageResult {
    file: String,
    changes: Vec<SchemaChange>,
}

#[derive(Serialize)]
struct SchemaReport {
    #[serde(flatten)]
    summary: SchemaSummary,
    pages: Vec<PageResult>,
}

pub fn run(root: &Path, file: Option<&Path>, json: bool) -> Result<()> {
    let agent = Agent::load(root)?;
    let targets = targets(root, file)?;
    tracing::info!(count = targets.len(), "processing files");

    let llm = agent.llm();
    if llm.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY not set, FAQ generation disabled");
    }

    let rt = tokio::runtime::Runtime::new()?;
    let mut report = SchemaReport {
        summary: SchemaSummary::default(),
        pages: Vec::new(),
    };
    for path in &targets {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let page = rt.block_on(faq::process_page(&html, |meta| {
            generate_faqs(llm.as_ref(), meta)
        }));
        if page.modified {
            atomic_write(path, page.html.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        for change in &page.changes {
            tracing::info!(file = %name, "{change}");
        }
        report.summary.record(&page);
        report.pages.push(PageResult {
            file: name,
            changes: page.changes,
        });
    }

    let message = report.summary.message();
    rt.block_on(agent.notify(&message));
    print_report(json, &report, &message)
}

/// The requested file, or every blog page except the index, sorted.
fn targets(root: &Path, file: Option<&Path>) -> Result<Vec<PathBuf>> {
    if let Some(file) = file {
        let path = if file.is_absolute() {
            file.to_path_buf()
        } else {
            root.join(file)
        };
        if !path.exists() {
            return Err(SeoError::FileNotFound(path).into());
        }
        return Ok(vec![path]);
    }

    let dir = paths::blog_dir(root);
    let mut files = Vec::new();
    if dir.is_dir() {
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("failed to read {}", dir.display()))?
        {
            let path = entry?.path();
            let is_page = path.extension().is_some_and(|e| e == "html")
                && path.file_name().is_some_and(|n| n != "index.html");
            if is_page && path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

async fn generate_faqs(llm: Option<&Llm>, meta: PageMeta) -> Vec<Faq> {
    let Some(llm) = llm else {
        return Vec::new();
    };
    let reply = best_effort(
        llm.ask(
            faq::faq_prompt(&meta.title, &meta.description),
            faq::GENERATE_MAX_TOKENS,
        )
        .await,
        "FAQ generation",
    );
    reply.as_deref().map(faq::parse_generated).unwrap_or_default()
}
