// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON reports printed by the `riskgraph` CLI.

use std::path::PathBuf;

use serde::Serialize;

use crate::{Result, RiskAssessment, RiskGraph};

/// Every file was assessed.
pub const EXIT_OK: u8 = 0;
/// At least one file failed; the others were still reported.
pub const EXIT_FILE_FAILED: u8 = 1;
/// The engine could not start or the report could not be written.
pub const EXIT_ENGINE_FAILED: u8 = 2;

/// Per-file output record.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Full(RiskAssessment),
    Summary { graph: RiskGraph, risk: u64 },
    Failed { error: String },
}

/// Pair batch results with their paths. The flag is `false` if any file failed.
pub fn build_reports(
    paths: &[PathBuf],
    results: Vec<Result<RiskAssessment>>,
    summary: bool,
) -> (Vec<FileReport>, bool) {
    let mut all_ok = true;
    let reports = paths
        .iter()
        .zip(results)
        .map(|(path, result)| {
            let outcome = match result {
                Ok(assessment) if summary => Outcome::Summary {
                    graph: assessment.graph,
                    risk: assessment.risk,
                },
                Ok(assessment) => Outcome::Full(assessment),
                Err(e) => {
                    all_ok = false;
                    tracing::warn!(path = %path.display(), error = %e, "Assessment failed");
                    Outcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            FileReport {
                file: path.display().to_string(),
                outcome,
            }
        })
        .collect();
    (reports, all_ok)
}

/// A single report renders as an object, several as an array.
pub fn render(reports: &[FileReport], compact: bool) -> serde_json::Result<String> {
    match (reports, compact) {
        ([single], false) => serde_json::to_string_pretty(single),
        ([single], true) => serde_json::to_string(single),
        (_, false) => serde_json::to_string_pretty(reports),
        (_, true) => serde_json::to_string(reports),
    }
}

pub fn exit_code(all_ok: bool) -> u8 {
    if all_ok {
        EXIT_OK
    } else {
        EXIT_FILE_FAILED
    }
}
