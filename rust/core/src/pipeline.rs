// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalize → group → aggregate in one call.

use serde::Serialize;

use crate::aggregate::{risk, score, RiskGraph};
use crate::color::ColorIndex;
use crate::entity::RawEntity;
use crate::error::MalformedEntityError;
use crate::grouping::{GroupBuilder, ShapeGroup};
use crate::normalize::normalize;

/// Result of analysing one diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub graph: RiskGraph,
    pub risk: u64,
    pub groups: Vec<ShapeGroup>,
    /// Attribute entities that were dropped as malformed.
    pub diagnostics: Vec<MalformedEntityError>,
    /// Attribute values replaced by a later fill or label on the same group.
    pub overwritten_attributes: usize,
    /// Fills and labels that appeared before any outline.
    pub orphan_attributes: usize,
}

/// Run the full reconstruction over one document's entities.
pub fn analyze(raw: &[RawEntity], index: &ColorIndex) -> RiskAssessment {
    let stream = normalize(raw, index);

    let mut builder = GroupBuilder::new();
    for entity in &stream.entities {
        builder.push(entity);
    }
    let overwritten_attributes = builder.overwrites();
    let orphan_attributes = builder.dropped();
    let groups = builder.finish();

    let graph = score(&groups);
    let risk = risk(&graph);

    tracing::info!(
        entities = raw.len(),
        groups = groups.len(),
        red = graph.red_nodes,
        yellow = graph.yellow_nodes,
        green = graph.green_nodes,
        edges = graph.edges,
        assets = graph.assets,
        risk,
        "Diagram analysed"
    );

    RiskAssessment {
        graph,
        risk,
        groups,
        diagnostics: stream.diagnostics,
        overwritten_attributes,
        orphan_attributes,
    }
}
