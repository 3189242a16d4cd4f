//! analysis-worker: batch event detection and response scoring.
//!
//! Reads a JSON array of configuration records, analyzes every
//! configuration on a rayon pool and writes the batch report as JSON.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use airshed_compute::analyze_batch;
use airshed_core::config::load_dotenv;
use airshed_core::{ConfigurationRecord, EngineConfig};
use airshed_params::{load_params, AnalysisParams};

// ── CLI ─────────────────────────────────────────────────────────────

/// Detect pollution events and score indoor response for a batch of configurations.
#[derive(Parser, Debug)]
#[command(name = "analysis-worker", version, about)]
struct Cli {
    /// Path to the YAML parameter bundle. Defaults apply when absent.
    #[arg(long, env = "AIRSHED_PARAMS")]
    params: Option<PathBuf>,

    /// Path to a JSON array of configuration records.
    #[arg(long)]
    input: PathBuf,

    /// Where to write the JSON report. Stdout when absent.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Worker threads (0 = available parallelism).
    #[arg(long, env = "AIRSHED_WORKER_THREADS")]
    threads: Option<usize>,

    /// Pretty-print the report.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    let mut config = EngineConfig::from_env();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    let cli = Cli::parse();
    if let Some(threads) = cli.threads {
        config.worker_threads = threads;
    }
    if cli.params.is_some() {
        config.params_path = cli.params.clone();
    }
    config.log_summary();

    let params = match &config.params_path {
        Some(path) => load_params(path)
            .with_context(|| format!("failed to load parameters from {}", path.display()))?,
        None => {
            info!("no parameter bundle configured, using defaults");
            AnalysisParams::default()
        }
    };
    let resolved = params.resolve();

    let raw = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let records: Vec<ConfigurationRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse records from {}", cli.input.display()))?;
    info!(path = %cli.input.display(), records = records.len(), "input loaded");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.resolved_worker_threads())
        .thread_name(|i| format!("analysis-{i}"))
        .build()
        .context("failed to build worker pool")?;
    let report = pool.install(|| analyze_batch(records, &resolved));

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), run_id = %report.run_id, "report written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
