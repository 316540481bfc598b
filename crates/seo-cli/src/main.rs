mod agent;
mod cmd;
mod llm;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::directory::DirectorySubcommand;
use seo_core::content::ContentMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "seo-agents",
    about = "Marketing-automation agents for MakeInvoice.online: content, indexing, search-console tuning, schema and directories",
    version,
    propagate_version = true
)]
struct Cli {
    /// Site root (default: auto-detect from agents/ or .git/)
    #[arg(long, global = true, env = "SEO_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit new sitemap URLs to search engines
    AutoIndex,

    /// Generate blog articles and landing pages
    Content {
        /// keywords, landing, evergreen, questions or mixed
        #[arg(default_value = "keywords")]
        mode: ContentMode,
    },

    /// Turn forum questions into draft articles
    Questions,

    /// Rewrite titles and descriptions of underperforming pages
    Gsc {
        /// Suggest changes without writing them
        #[arg(long)]
        report: bool,
    },

    /// Add FAQPage structured data to blog pages
    Schema {
        /// A single page to process (default: every blog/*.html)
        file: Option<PathBuf>,
    },

    /// Directory submission kit and tracking
    Directory {
        #[command(subcommand)]
        subcommand: DirectorySubcommand,
    },

    /// Serve the site locally with the invoice-parsing endpoint
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Open the browser once listening
        #[arg(long)]
        open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Directory {
            subcommand: DirectorySubcommand::List | DirectorySubcommand::Mark { .. },
        } => tracing::Level::WARN,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::AutoIndex => cmd::auto_index::run(&root, cli.json),
        Commands::Content { mode } => cmd::content::run(&root, mode, cli.json),
        Commands::Questions => cmd::questions::run(&root, cli.json),
        Commands::Gsc { report } => cmd::gsc::run(&root, report, cli.json),
        Commands::Schema { file } => cmd::schema::run(&root, file.as_deref(), cli.json),
        Commands::Directory { subcommand } => cmd::directory::run(&root, subcommand, cli.json),
        Commands::Serve { port, open } => cmd::serve::run(&root, port, open),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
