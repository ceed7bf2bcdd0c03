//! fraudhound CLI — the main entry point.
//!
//! Commands:
//! - `serve`    — Start the HTTP gateway
//! - `analyze`  — Run one investigation over files on disk
//! - `tools`    — List the registered investigation tools

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "fraudhound",
    about = "fraudhound — document fraud investigation engine",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a config file (defaults + env vars are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Analyze a directory of document text files
    Analyze {
        /// Directory containing the document files
        #[arg(short, long)]
        dir: PathBuf,

        /// Override the iteration budget
        #[arg(long)]
        max_iterations: Option<u32>,
    },

    /// List the registered investigation tools
    Tools,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<fraudhound_config::AppConfig> {
    match path {
        Some(path) => Ok(fraudhound_config::AppConfig::load(path)?),
        None => Ok(fraudhound_config::AppConfig::from_env()?),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        config.log_level.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(config, port).await?,
        Commands::Analyze {
            dir,
            max_iterations,
        } => commands::analyze::run(config, &dir, max_iterations).await?,
        Commands::Tools => commands::tools::run(),
    }

    Ok(())
}
