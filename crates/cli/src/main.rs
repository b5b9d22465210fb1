//! Chimera CLI — the main entry point.
//!
//! Commands:
//! - `merge`   — Merge source profiles into one output profile
//! - `list`    — List the source profiles available for merging
//! - `batch`   — Run every merge job from the config file
//! - `config`  — Show, locate, or validate the configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "chimera",
    about = "Chimera — merge persona profiles into one composite character",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ~/.chimera/config.toml)
    #[arg(short, long, global = true, env = "CHIMERA_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge source profiles into one output profile
    Merge {
        /// Source profile identifiers, highest priority first (default: all)
        sources: Vec<String>,

        /// Output profile name
        #[arg(short, long)]
        output: Option<String>,

        /// Print the merged profile instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// List the source profiles available for merging
    List,

    /// Run every merge job from the config file
    Batch,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
    /// Validate the configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Merge {
            sources,
            output,
            dry_run,
        } => commands::merge::run(config_path, sources, output, dry_run).await?,
        Commands::List => commands::list::run(config_path).await?,
        Commands::Batch => commands::batch::run(config_path).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config_path).await?,
            ConfigAction::Path => commands::config_cmd::path(config_path).await?,
            ConfigAction::Validate => commands::config_cmd::validate(config_path).await?,
        },
    }

    Ok(())
}
