//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the coindex aggregator.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::application::pipeline::{Pipeline, RunOptions};
use crate::config::loader::load_or_default;

/// coindex - Coin and token support metadata aggregator
#[derive(Parser, Debug)]
#[command(
    name = "coindex",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Coin and token support metadata aggregator",
    long_about = "Merges curated coin definitions, ERC20 token lists, NEM mosaics and \
                  firmware support manifests with live market caps into a single \
                  reviewable JSON document."
)]
pub struct CliApp {
    /// The command to execute; defaults to a full aggregation run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rebuild the details document from all sources
    Run(RunCmd),

    /// Validate the details document without touching it
    Check(CheckCmd),

    /// Print the records matching a keyword
    Show(ShowCmd),
}

/// Rebuild the details document
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Compute and print everything, but do not write the document
    #[arg(long)]
    pub dry_run: bool,

    /// Leave market caps untouched (no provider traffic)
    #[arg(long)]
    pub skip_marketcap: bool,
}

impl Default for RunCmd {
    fn default() -> Self {
        Self {
            config: PathBuf::from("config.toml"),
            dry_run: false,
            skip_marketcap: false,
        }
    }
}

/// Validate the details document
#[derive(Parser, Debug)]
pub struct CheckCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,
}

/// Print matching records
#[derive(Parser, Debug)]
pub struct ShowCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Keywords matched against record keys, names and shortcuts;
    /// no keyword prints every record
    #[arg(value_name = "KEYWORD")]
    pub keywords: Vec<String>,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    init_logging(app.verbose, app.debug)?;

    match app.command.unwrap_or_else(|| Command::Run(RunCmd::default())) {
        Command::Run(cmd) => run_command(cmd).await,
        Command::Check(cmd) => check_command(cmd).await,
        Command::Show(cmd) => show_command(cmd).await,
    }
}

/// Initialize logging system
fn init_logging(verbose: bool, debug: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    Ok(())
}

/// Handle run command
async fn run_command(cmd: RunCmd) -> Result<()> {
    let config = load_or_default(&cmd.config).context("Failed to load configuration")?;
    let pipeline = Pipeline::new(config);

    let options = RunOptions {
        dry_run: cmd.dry_run,
        skip_marketcap: cmd.skip_marketcap,
    };
    pipeline
        .run(&options)
        .await
        .context("Aggregation run failed")
}

/// Handle check command
async fn check_command(cmd: CheckCmd) -> Result<()> {
    let config = load_or_default(&cmd.config).context("Failed to load configuration")?;
    let pipeline = Pipeline::new(config);

    let findings = pipeline.check().context("Validation failed")?;
    for (key, issues) in &findings {
        for issue in issues {
            println!("{}: {}", key, issue);
        }
    }

    if !findings.is_empty() {
        anyhow::bail!("{} records with incomplete details", findings.len());
    }
    println!("Details are OK");
    Ok(())
}

/// Handle show command
async fn show_command(cmd: ShowCmd) -> Result<()> {
    let config = load_or_default(&cmd.config).context("Failed to load configuration")?;
    let pipeline = Pipeline::new(config);

    let rendered = pipeline.show(&cmd.keywords).context("Lookup failed")?;
    if rendered.is_empty() {
        println!("No matching records");
    } else {
        println!("{}", rendered);
    }
    Ok(())
}
