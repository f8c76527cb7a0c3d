// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # RiskGraph Engine
//!
//! One entry point over the DXF reader and the core pipeline: bytes, text or
//! files in, [`RiskAssessment`] out.
//!
//! ```rust,ignore
//! use riskgraph_engine::{Config, Engine};
//!
//! let engine = Engine::new(Config::from_env())?;
//! let assessment = engine.assess_file("diagram.dxf")?;
//! println!("risk = {}", assessment.risk);
//! ```

pub mod config;
pub mod error;
pub mod report;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use riskgraph_core::{analyze, default_index, ColorIndex, Palette, RawEntity};

pub use config::Config;
pub use error::{Error, Result};
pub use riskgraph_core::{RiskAssessment, RiskGraph};

/// Risk engine bound to one color palette and worker pool.
///
/// The built-in palette is borrowed from the process-wide index; only a
/// custom palette is owned.
pub struct Engine {
    config: Config,
    index: Cow<'static, ColorIndex>,
    pool: rayon::ThreadPool,
}

impl Engine {
    /// Build an engine, loading the configured palette if any.
    pub fn new(config: Config) -> Result<Self> {
        let index = match &config.palette_path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
                let palette = Palette::from_json(&json)?;
                tracing::info!(
                    path = %path.display(),
                    colors = palette.len(),
                    "Loaded custom palette"
                );
                Cow::Owned(ColorIndex::build(&palette))
            }
            None => Cow::Borrowed(default_index()),
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("riskgraph-worker-{}", i))
            .build()?;

        tracing::debug!(
            max_file_size_mb = config.max_file_size_mb,
            worker_threads = config.worker_threads,
            palette_colors = index.len(),
            "Engine ready"
        );

        Ok(Self {
            config,
            index,
            pool,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn color_index(&self) -> &ColorIndex {
        &self.index
    }

    /// Score entities that were already read by some parser.
    pub fn assess_entities(&self, entities: &[RawEntity]) -> RiskAssessment {
        analyze(entities, &self.index)
    }

    /// Read and score DXF text.
    pub fn assess_str(&self, content: &str) -> Result<RiskAssessment> {
        self.check_size(content.len() as u64)?;
        let entities = riskgraph_dxf::read_entities(content)?;
        self.log_entity_types(&entities);
        Ok(self.assess_entities(&entities))
    }

    /// Read and score DXF file bytes.
    pub fn assess_bytes(&self, bytes: &[u8]) -> Result<RiskAssessment> {
        self.check_size(bytes.len() as u64)?;
        let entities = riskgraph_dxf::read_entities_from_bytes(bytes)?;
        self.log_entity_types(&entities);
        Ok(self.assess_entities(&entities))
    }

    /// Read and score a DXF file.
    pub fn assess_file(&self, path: impl AsRef<Path>) -> Result<RiskAssessment> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| Error::io(path, e))?;
        self.check_size(metadata.len())?;

        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        tracing::info!(path = %path.display(), size = bytes.len(), "Assessing file");
        self.assess_bytes(&bytes)
    }

    /// Score many files in parallel. Results keep the input order.
    pub fn assess_batch(&self, paths: &[PathBuf]) -> Vec<Result<RiskAssessment>> {
        tracing::info!(
            files = paths.len(),
            workers = self.pool.current_num_threads(),
            "Assessing batch"
        );
        self.pool
            .install(|| paths.par_iter().map(|path| self.assess_file(path)).collect())
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.config.max_file_size_bytes() {
            return Err(Error::FileTooLarge {
                max_mb: self.config.max_file_size_mb,
            });
        }
        Ok(())
    }

    fn log_entity_types(&self, entities: &[RawEntity]) {
        if tracing::enabled!(tracing::Level::DEBUG) {
            let counts = riskgraph_dxf::count_by_type(entities);
            for (type_name, count) in &counts {
                tracing::debug!(type_name = %type_name, count, "Entity type");
            }
        }
    }
}
