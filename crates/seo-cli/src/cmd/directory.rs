use crate::agent::Agent;
use crate::llm::best_effort;
use crate::output::{print_json, print_table};
use anyhow::{Context, Result};
use clap::Subcommand;
use seo_core::directory::{self, DIRECTORIES, PRODUCT};
use seo_core::error::SeoError;
use seo_core::io::atomic_write;
use seo_core::paths;
use seo_core::tracking::{DirectoryTracking, SubmissionStatus};
use serde::Serialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand definition
// ---------------------------------------------------------------------------

#[derive(Subcommand, Debug)]
pub enum DirectorySubcommand {
    /// Generate the submission kit and start tracking every directory
    Kit,
    /// Show every directory with its submission status
    List,
    /// Update the submission status of one directory
    Mark {
        /// Directory name (case-insensitive)
        name: String,
        /// pending, submitted, approved or rejected
        #[arg(long)]
        status: SubmissionStatus,
        /// Where the backlink lives once approved
        #[arg(long)]
        backlink: Option<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcommand: DirectorySubcommand, json: bool) -> Result<()> {
    match subcommand {
        DirectorySubcommand::Kit => kit(root, json),
        DirectorySubcommand::List => list(root, json),
        DirectorySubcommand::Mark {
            name,
            status,
            backlink,
            notes,
        } => mark(root, &name, status, backlink, notes, json),
    }
}

fn load_tracking(root: &Path) -> Result<DirectoryTracking> {
    DirectoryTracking::load(root).context("failed to load directory tracking")
}

// ---------------------------------------------------------------------------
// kit
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct KitReport {
    kit: String,
    tagline: String,
    tracked_added: usize,
    directories: usize,
}

fn kit(root: &Path, json: bool) -> Result<()> {
    let agent = Agent::load(root)?;
    let reply = match agent.llm() {
        Some(llm) => {
            let rt = tokio::runtime::Runtime::new()?;
            best_effort(
                rt.block_on(llm.ask(directory::copy_prompt(&PRODUCT), directory::COPY_MAX_TOKENS)),
                "directory copy generation",
            )
        }
        None => {
            tracing::warn!("ANTHROPIC_API_KEY not set, using placeholder copy");
            None
        }
    };
    let content = directory::parse_copy(reply.as_deref());

    let kit_path = paths::directory_kit_path(root);
    let markdown = directory::render_kit(&content, &PRODUCT, agent.today());
    atomic_write(&kit_path, markdown.as_bytes())
        .with_context(|| format!("failed to write {}", kit_path.display()))?;

    let mut tracking = load_tracking(root)?;
    let added = tracking.init(directory::directory_names());
    tracking
        .save(root)
        .context("failed to save directory tracking")?;

    let report = KitReport {
        kit: paths::DIRECTORY_KIT_FILE.to_string(),
        tagline: content.tagline,
        tracked_added: added,
        directories: DIRECTORIES.len(),
    };
    if json {
        return print_json(&report);
    }

    println!("Kit saved to {}", report.kit);
    println!("Tagline: \"{}\"", report.tagline);
    println!();
    println!("{} directories ready:", report.directories);
    for d in &DIRECTORIES {
        println!(
            "  {} {} (DA {}, {})",
            directory::tier_icon(d.tier),
            d.name,
            d.da,
            d.link_type.as_str()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(root: &Path, json: bool) -> Result<()> {
    let tracking = load_tracking(root)?;
    let rows = directory::status_rows(&tracking);
    if json {
        return print_json(&rows);
    }

    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                format!("{} {}", directory::tier_icon(r.tier), r.name),
                r.da.to_string(),
                r.link_type.as_str().to_string(),
                r.status.to_string(),
                r.submitted_date.map(|d| d.to_string()).unwrap_or_default(),
                r.backlink_url.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(
        &["DIRECTORY", "DA", "LINK", "STATUS", "SUBMITTED", "BACKLINK"],
        table,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// mark
// ---------------------------------------------------------------------------

fn mark(
    root: &Path,
    name: &str,
    status: SubmissionStatus,
    backlink: Option<String>,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    let dir = directory::find_directory(name)
        .ok_or_else(|| SeoError::UnknownDirectory(name.to_string()))?;
    let mut tracking = load_tracking(root)?;
    tracking.init(directory::directory_names());
    let today = chrono::Local::now().date_naive();
    let entry = tracking
        .mark(dir.name, status, backlink, notes, today)?
        .clone();
    tracking
        .save(root)
        .context("failed to save directory tracking")?;

    if json {
        print_json(&serde_json::json!({ "name": dir.name, "submission": entry }))
    } else {
        println!("{}: {}", dir.name, entry.status);
        Ok(())
    }
}
