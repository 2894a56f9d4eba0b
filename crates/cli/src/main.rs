//! ctxpack CLI: the main entry point.
//!
//! Commands:
//! - `gather`  Assemble a context window for a query and print it
//! - `config`  Show, validate or locate the configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "ctxpack",
    about = "ctxpack: token-budgeted code context for LLM requests",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Gather, rank and pack context for a request
    Gather(commands::gather::GatherArgs),

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: Option<commands::config_cmd::ConfigAction>,

        /// Config file to use instead of ~/.ctxpack/config.toml
        #[arg(long, global = true)]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the context.
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Gather(args) => commands::gather::run(args).await?,
        Commands::Config { action, config } => {
            commands::config_cmd::run(action.unwrap_or_default(), config.as_deref())?
        }
    }

    Ok(())
}
