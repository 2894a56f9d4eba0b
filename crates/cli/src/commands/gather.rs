//! `ctxpack gather`: assemble and print a context window.

use super::load_config;
use clap::Args;
use ctxpack_config::EngineConfig;
use ctxpack_core::request::{ContextRequest, Depth};
use ctxpack_engine::{Collaborators, ContextEngine};
use ctxpack_sources::{
    FsFileReader, GitCliStatus, RegexSymbolExtractor, WalkSearchProvider, WalkTreeBuilder,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Args)]
pub struct GatherArgs {
    /// What the model is being asked about
    #[arg(short, long, default_value = "")]
    query: String,

    /// Project root
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// File currently open in the editor (relative to the root)
    #[arg(short, long)]
    file: Option<String>,

    /// Currently selected text
    #[arg(short, long)]
    selection: Option<String>,

    /// Recently touched files, most recent first (repeatable)
    #[arg(long = "recent")]
    recent: Vec<String>,

    /// Token budget for the window (defaults to the configured value)
    #[arg(short = 't', long)]
    max_tokens: Option<usize>,

    /// Search depth: shallow, medium or deep
    #[arg(short, long, default_value = "medium")]
    depth: Depth,

    /// Skip git status
    #[arg(long)]
    no_git: bool,

    /// Skip the project tree
    #[arg(long)]
    no_tree: bool,

    /// Print the window as JSON instead of the formatted context
    #[arg(long)]
    json: bool,

    /// Config file to use instead of ~/.ctxpack/config.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

pub async fn run(args: GatherArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_deref())?;
    let root = tokio::fs::canonicalize(&args.root)
        .await
        .map_err(|e| format!("Cannot open project root {}: {e}", args.root.display()))?;

    let engine = ContextEngine::new(local_collaborators(&root, &config), config)?;
    let max_tokens = args.max_tokens.unwrap_or(engine.config().default_max_tokens);

    let mut request = ContextRequest::new(args.query, root)
        .with_recent_files(args.recent)
        .with_max_tokens(max_tokens)
        .with_depth(args.depth)
        .with_git(!args.no_git)
        .with_tree(!args.no_tree);
    if let Some(file) = args.file {
        request = request.with_current_file(file);
    }
    if let Some(selection) = args.selection {
        request = request.with_selection(selection);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling gather");
            on_interrupt.cancel();
        }
    });

    let window = engine.gather_with_cancel(&request, &cancel).await?;
    info!(
        items = window.items.len(),
        total_tokens = window.total_tokens,
        utilization = window.utilization,
        "Gather complete"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&window)?);
    } else {
        println!("{}", engine.format(&window));
    }
    Ok(())
}

/// The filesystem-backed collaborators for a project rooted at `root`.
fn local_collaborators(root: &Path, config: &EngineConfig) -> Collaborators {
    Collaborators {
        files: Arc::new(FsFileReader::new(root)),
        search: Arc::new(
            WalkSearchProvider::new(config.gather.context_lines)
                .with_min_term_fraction(config.gather.search_term_fraction),
        ),
        symbols: Arc::new(RegexSymbolExtractor::new(root)),
        tree: Arc::new(WalkTreeBuilder::default()),
        git: Arc::new(GitCliStatus::default()),
    }
}
