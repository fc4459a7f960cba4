use clap::Parser;
use colored::*;
use eyre::{Context, Result, bail};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod cli;
mod config;

use cli::Cli;
use config::Config;

use sweepr::git::GitRepo;
use sweepr::github::{self, GhPrLookup};
use sweepr::sweep::{SweepConfig, Sweeper};
use sweepr::ui::{CliConfirm, ConsoleReporter};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sweepr")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("sweepr.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let dir = cli.dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let dir = dir
        .canonicalize()
        .context(format!("Invalid directory: {}", dir.display()))?;

    let repo = GitRepo::new(&dir, Duration::from_millis(config.timeouts.command_ms));
    if !repo.is_work_tree().await {
        bail!("not a git repository: {}", dir.display());
    }

    // Untracked and count modes never touch GitHub
    if !cli.untracked && !cli.count {
        github::ensure_gh_ready(&dir, cli.is_verbose()).await?;
    }

    let lookup = Arc::new(GhPrLookup::new(
        &dir,
        Duration::from_millis(config.timeouts.pr_query_ms),
    ));
    let sweeper = Sweeper::new(
        repo,
        lookup,
        Arc::new(ConsoleReporter::new(cli.is_verbose())),
        Arc::new(CliConfirm),
        SweepConfig {
            check_concurrency: config.concurrency.check,
            delete_concurrency: config.concurrency.delete,
            protected: config.git.protected.clone(),
            dry_run: cli.dry_run,
            ..SweepConfig::default()
        },
    );

    if cli.count {
        sweeper.print_counts().await?;
    } else if cli.untracked {
        sweeper.sweep_untracked().await?;
    } else {
        sweeper.sweep_merged().await?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await?;

    Ok(())
}
