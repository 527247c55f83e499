//! chesync CLI - Command line interface for chesync
//!
//! Keeps the projects of a Che workspace and the git checkouts under the
//! projects root in sync.

mod commands;

use std::path::PathBuf;

use chesync_core::{CliOverrides, Config};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{BranchArgs, CloneArgs, SyncArgs};

/// chesync: sync Che workspace projects with local git repositories
#[derive(Parser, Debug)]
#[command(name = "chesync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the projects (overrides config and env)
    #[arg(long, global = true, env = "CHE_PROJECTS_ROOT")]
    projects_root: Option<PathBuf>,

    /// Che API base URL (overrides config and env)
    #[arg(long, global = true, env = "CHE_API_INTERNAL")]
    api_url: Option<String>,

    /// Path to git executable (overrides config and env)
    #[arg(long, global = true, env = "CHESYNC_GIT_PATH")]
    git_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Clone missing projects, then keep the workspace in sync until interrupted
    #[command(visible_alias = "s")]
    Sync(SyncArgs),

    /// Clone missing projects and exit
    Clone(CloneArgs),

    /// Show the checked-out branch and upstream of a repository
    Branch(BranchArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Load configuration with overrides
    let config = Config::load_with_overrides(CliOverrides {
        projects_root: cli.projects_root.clone(),
        api_url: cli.api_url.clone(),
        git_path: cli.git_path.clone(),
    })?;

    tracing::debug!(
        projects_root = %config.projects.root.display(),
        api_url = ?config.api.url,
        workspace_id = ?config.api.workspace_id,
        "Configuration loaded"
    );

    match cli.command {
        Some(Commands::Version) => {
            println!("chesync {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Sync(args)) => {
            args.execute(config).await?;
        }
        Some(Commands::Clone(args)) => {
            args.execute(config).await?;
        }
        Some(Commands::Branch(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => {
            println!("chesync Configuration");
            println!("=====================");
            println!();
            println!("Projects:");
            println!("  root: {}", config.projects.root.display());
            println!();
            println!("Che API:");
            println!("  url: {}", config.api.url.as_deref().unwrap_or("(not set)"));
            println!(
                "  token: {}",
                if config.api.token.is_some() { "(set)" } else { "(not set)" }
            );
            println!(
                "  workspace_id: {}",
                config.api.workspace_id.as_deref().unwrap_or("(not set)")
            );
            println!();
            println!("Git:");
            println!("  path: {}", config.git.path);
            println!();
            println!("Watch:");
            println!("  pattern: {}", config.watch.pattern);
            println!("  poll_interval: {:?}", config.watch.poll_interval);
            println!("  max_depth: {}", config.watch.max_depth);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("chesync - Che workspace project synchronization");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
