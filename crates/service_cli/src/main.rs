//! dealval - Command Line Operations for M&A Valuation
//!
//! This is the operational entry point for the dealval valuation engine.
//!
//! # Commands
//!
//! - `dealval value --input <deal.json>` - DCF, LBO and IPO per company
//! - `dealval sweep --input <deal.json> --model lbo --symbol <SYM>` - Sensitivity grid
//! - `dealval rank --input <deal.json>` - Target ranking and recommendation
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate loads the deal file and
//! engine configuration, runs the valuation crates and renders the
//! results as Markdown, JSON or CSV.

use clap::{Parser, Subcommand};
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod render;

pub use error::{CliError, Result};

use commands::sweep::SweepModel;
use config::EngineConfig;
use render::OutputFormat;

/// dealval M&A valuation CLI
#[derive(Parser)]
#[command(name = "dealval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "dealval.toml")]
    config: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Value every company with DCF, LBO and IPO models
    Value {
        /// Path to deal file (JSON)
        #[arg(short, long)]
        input: String,
    },

    /// Sweep model assumptions for one company
    Sweep {
        /// Path to deal file (JSON)
        #[arg(short, long)]
        input: String,

        /// Model to sweep
        #[arg(short, long, value_enum)]
        model: SweepModel,

        /// Company symbol
        #[arg(short, long)]
        symbol: String,
    },

    /// Rank companies as acquisition targets
    Rank {
        /// Path to deal file (JSON)
        #[arg(short, long)]
        input: String,
    },
}

fn init_tracing(config: &EngineConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { config.log_level.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = EngineConfig::load_with_env_and_validate(Path::new(&cli.config))?;
    init_tracing(&config, cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }
    debug!(
        config = %cli.config,
        threads = config.parallel.effective_threads(),
        "configuration loaded"
    );

    let output = match &cli.command {
        Commands::Value { input } => commands::value::run(input, &config, cli.format),
        Commands::Sweep {
            input,
            model,
            symbol,
        } => commands::sweep::run(input, *model, symbol, &config, cli.format),
        Commands::Rank { input } => commands::rank::run(input, &config, cli.format),
    }?;

    println!("{}", output);
    Ok(())
}
