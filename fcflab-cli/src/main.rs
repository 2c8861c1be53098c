//! fcflab CLI — build the quarterly FCF dataset and inspect the dataset cache.
//!
//! Commands:
//! - `build` — download (or reuse cached) SimFin tables and write the CSV
//! - `cache status` — report which datasets are cached, their age and hash

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fcflab_core::data::{DatasetCache, DatasetProvider, SimFinProvider};
use fcflab_core::OutputSchema;
use fcflab_runner::{
    api_key_from_env, run_pipeline, write_dataset, write_report, LoadOptions, PipelineConfig,
};

#[derive(Parser)]
#[command(
    name = "fcflab",
    about = "fcflab — quarterly free-cash-flow dataset builder"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the FCF dataset and write it as CSV.
    Build {
        /// Path to a TOML config file overriding the defaults.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output layout: basic or extended.
        #[arg(long)]
        schema: Option<OutputSchema>,

        /// Output CSV path. Overrides the config file.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Offline mode: use cached datasets only.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Force re-download even if cached copies are fresh.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Dataset cache commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cached datasets, their age and content hash.
    Status {
        /// Path to a TOML config file (for data_dir and market).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            config,
            schema,
            output,
            offline,
            force,
        } => run_build(config.as_deref(), schema, output, offline, force),
        Commands::Cache { action } => match action {
            CacheAction::Status { config } => run_cache_status(config.as_deref()),
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn run_build(
    config_path: Option<&Path>,
    schema: Option<OutputSchema>,
    output: Option<PathBuf>,
    offline: bool,
    force: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(schema) = schema {
        config.schema = schema;
    }
    if let Some(output) = output {
        config.output = output;
    }

    info!(
        market = %config.market,
        schema = %config.schema,
        data_dir = %config.data_dir.display(),
        offline,
        "building dataset"
    );

    let cache = DatasetCache::new(&config.data_dir);
    let provider = if offline {
        None
    } else {
        let provider_config = config.provider_config(api_key_from_env());
        Some(SimFinProvider::new(provider_config).context("failed to create SimFin client")?)
    };

    let opts = LoadOptions {
        refresh_days: config.refresh_days,
        offline,
        force,
    };

    let out = run_pipeline(
        &config,
        &cache,
        provider.as_ref().map(|p| p as &dyn DatasetProvider),
        &opts,
    )?;
    let summary = write_dataset(&out.rows, out.schema, &config.output)?;
    let report_path = write_report(&out.report, &config.output)?;

    println!("Rows: {}", summary.rows);
    println!(
        "Dropped without price: {} of {}",
        out.report.dropped_without_price, out.report.fundamentals
    );
    println!("Tickers: {}", out.report.tickers);
    println!("Saved → {}", summary.path.display());
    println!("Digest: {}", summary.digest);
    println!("Report: {}", report_path.display());
    Ok(())
}

fn run_cache_status(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let cache = DatasetCache::new(&config.data_dir);
    let now = Utc::now().naive_utc();

    println!("Cache directory: {}", cache.cache_dir().display());
    for status in cache.status(&config.dataset_requests()) {
        match (status.cached, status.fetched_at) {
            (true, Some(at)) => {
                let age_days = (now - at).num_days();
                let hash = status.data_hash.as_deref().unwrap_or("-");
                let short = hash.get(..12).unwrap_or(hash);
                println!(
                    "  {:<28} {:>4}d old  {:>12} bytes  {}",
                    status.dataset,
                    age_days,
                    status.byte_len.unwrap_or(0),
                    short
                );
            }
            (true, None) => println!("  {:<28} cached (age unknown)", status.dataset),
            _ => println!("  {:<28} not cached", status.dataset),
        }
    }
    Ok(())
}
