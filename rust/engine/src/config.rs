// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

/// Default cap on input file size.
pub const DEFAULT_MAX_FILE_SIZE_MB: usize = 50;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON palette file replacing the built-in CSS3 colors.
    pub palette_path: Option<PathBuf>,
    /// Maximum file size in MB.
    pub max_file_size_mb: usize,
    /// Number of worker threads for batch processing.
    pub worker_threads: usize,
    /// `tracing` filter directive for the CLI.
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            palette_path: std::env::var_os("RISKGRAPH_PALETTE")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            max_file_size_mb: parse_or(
                std::env::var("RISKGRAPH_MAX_FILE_SIZE_MB").ok(),
                DEFAULT_MAX_FILE_SIZE_MB,
            ),
            worker_threads: parse_worker_threads(std::env::var("RISKGRAPH_WORKER_THREADS").ok()),
            log_filter: std::env::var("RISKGRAPH_LOG")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".into()),
        }
    }

    /// Maximum file size in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        (self.max_file_size_mb as u64).saturating_mul(1024 * 1024)
    }
}

/// Parse an optional setting, falling back to `default` when unset or invalid.
fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Worker count; zero or invalid means one thread per CPU.
fn parse_worker_threads(value: Option<String>) -> usize {
    match parse_or(value, 0) {
        0 => num_cpus::get(),
        threads => threads,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
