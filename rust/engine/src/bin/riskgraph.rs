// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: Score threat-tree diagrams stored as DXF drawings
//!
//! Prints one JSON report per input file to stdout. Logs go to stderr.
//!
//! Usage:
//!   riskgraph <file.dxf>... [options]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use riskgraph_engine::report::{build_reports, exit_code, render, EXIT_ENGINE_FAILED};
use riskgraph_engine::{Config, Engine};

#[derive(Parser)]
#[command(name = "riskgraph")]
#[command(about = "Reconstruct and score threat-tree diagrams from DXF drawings", long_about = None)]
#[command(version)]
struct Cli {
    /// DXF files to assess
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Palette JSON file (overrides RISKGRAPH_PALETTE)
    #[arg(long)]
    palette: Option<PathBuf>,

    /// Maximum input size in MB (overrides RISKGRAPH_MAX_FILE_SIZE_MB)
    #[arg(long)]
    max_file_size_mb: Option<usize>,

    /// Worker threads (overrides RISKGRAPH_WORKER_THREADS)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Only print the counters and risk score
    #[arg(long)]
    summary: bool,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(palette) = cli.palette.clone() {
        config.palette_path = Some(palette);
    }
    if let Some(max_mb) = cli.max_file_size_mb {
        config.max_file_size_mb = max_mb;
    }
    if let Some(threads) = cli.threads.filter(|&n| n > 0) {
        config.worker_threads = threads;
    }

    init_logging(&config.log_filter, cli.json_logs);

    match run(&cli, config) {
        Ok(all_ok) => ExitCode::from(exit_code(all_ok)),
        Err(e) => {
            tracing::error!("riskgraph failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_ENGINE_FAILED)
        }
    }
}

fn init_logging(filter: &str, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Returns `Ok(false)` when at least one file could not be assessed.
fn run(cli: &Cli, config: Config) -> anyhow::Result<bool> {
    let engine = Engine::new(config).context("Failed to initialise engine")?;
    let results = engine.assess_batch(&cli.files);

    let (reports, all_ok) = build_reports(&cli.files, results, cli.summary);
    let output = render(&reports, cli.compact).context("Failed to serialize report")?;

    println!("{}", output);
    Ok(all_ok)
}
