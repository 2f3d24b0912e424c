//! CLI - Command Line Interface
//!
//! Available Commands:
//! - memdict random-graph --setting-file <path>  - Generate random graphs
//! - memdict embed --setting-file <path>         - Embed graphs and evaluate reconstruction

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use memdict_core::{load_settings, EmbedSettings, RandomGraphSettings};

/// CLI Errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CliError {
    #[error("Settings error: {0}")]
    SettingsError(String),

    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

/// memdict CLI
#[derive(Parser, Debug)]
#[command(name = "memdict")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate random graphs and save their adjacency matrices
    RandomGraph(SettingArgs),

    /// Embed graphs into a memory dictionary and evaluate the reconstruction
    Embed(SettingArgs),
}

#[derive(Args, Debug)]
pub struct SettingArgs {
    /// Settings file (JSON, or YAML by extension)
    #[arg(short = 'f', long)]
    pub setting_file: PathBuf,
}

/// Parse CLI arguments and execute commands
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    execute(cli).await
}

/// `--verbose` selects DEBUG, otherwise INFO; `RUST_LOG` takes precedence
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // already installed when called twice in one process
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Execute a parsed command
pub async fn execute(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::RandomGraph(args) => cmd_random_graph(args).await,
        Commands::Embed(args) => cmd_embed(args).await,
    }
}

async fn cmd_random_graph(args: SettingArgs) -> Result<(), CliError> {
    let settings: RandomGraphSettings = load_settings(&args.setting_file)
        .map_err(|e| CliError::SettingsError(e.to_string()))?;
    settings
        .validate()
        .map_err(|e| CliError::SettingsError(e.to_string()))?;

    let outputs = crate::random_graph::generate_graphs(&settings)
        .await
        .map_err(|e| CliError::PipelineError(format!("{:#}", e)))?;

    for output in &outputs {
        println!("{}  ({} edges)", output.dir.display(), output.num_edges);
    }
    info!("Generated {} graphs", outputs.len());
    Ok(())
}

async fn cmd_embed(args: SettingArgs) -> Result<(), CliError> {
    let settings: EmbedSettings = load_settings(&args.setting_file)
        .map_err(|e| CliError::SettingsError(e.to_string()))?;
    settings
        .validate()
        .map_err(|e| CliError::SettingsError(e.to_string()))?;

    let summary = crate::embed::embed_graphs(&settings)
        .await
        .map_err(|e| CliError::PipelineError(format!("{:#}", e)))?;

    for record in &summary.records {
        println!("{}: {}", record.save_dir.display(), record.metrics);
    }
    info!("Run {} finished: {} results", summary.run_id, summary.records.len());
    Ok(())
}
