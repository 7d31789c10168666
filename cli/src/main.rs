use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leaderboard_kernel::adapters::memory::{InMemoryMetadataStore, InMemoryScoreStore};
use leaderboard_kernel::config::{Environment, LeaderboardConfig};
use leaderboard_kernel::ranking::Leaderboard;
use leaderboard_kernel::script::{run_script, Operation, StepResult};

/// Leaderboard CLI
#[derive(Parser, Debug)]
#[command(name = "leaderboard")]
#[command(about = "Run leaderboard operations against an in-memory board", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to leaderboard config JSON
    #[arg(long)]
    config: Option<String>,

    /// Path to operations JSON
    #[arg(long)]
    ops: String,

    /// Page size override (10, 25, 50 or 100)
    #[arg(long)]
    page_size: Option<u64>,

    /// Environment override (development, staging, production)
    #[arg(long, env = "LEADERBOARD_ENV")]
    environment: Option<Environment>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Wrapper for JSON output
#[derive(Debug, Serialize)]
struct CliOutput {
    leaderboard: String,
    page_size: u64,
    steps: Vec<StepResult>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the report, logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // ----------------------------
    // Load config
    // ----------------------------
    let mut config = if let Some(path) = &cli.config {
        let data = fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
        LeaderboardConfig::from_json_str(&data)?
    } else {
        LeaderboardConfig::default_config()
    };

    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    if let Some(environment) = cli.environment {
        config.environment = environment;
    }

    // ----------------------------
    // Load operations
    // ----------------------------
    let ops_data =
        fs::read_to_string(&cli.ops).with_context(|| format!("reading operations {}", cli.ops))?;
    let ops: Vec<Operation> = serde_json::from_str(&ops_data)?;

    // ----------------------------
    // Run
    // ----------------------------
    let leaderboard = Leaderboard::from_config(
        InMemoryScoreStore::new(),
        InMemoryMetadataStore::new(),
        &config,
    )?;
    info!(
        board = leaderboard.board_key(),
        operations = ops.len(),
        "running operations"
    );

    let steps = run_script(&leaderboard, ops)?;

    // ----------------------------
    // Output
    // ----------------------------
    let output = CliOutput {
        leaderboard: leaderboard.board_key().to_string(),
        page_size: leaderboard.page_size().get(),
        steps,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
