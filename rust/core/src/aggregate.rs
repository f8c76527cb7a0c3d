// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Group classification and risk scoring.

use serde::{Deserialize, Serialize};

use crate::grouping::{ShapeGroup, ShapeKind};

/// Weight of a red (critical) node.
pub const RED_WEIGHT: u64 = 3;
/// Weight of a yellow (elevated) node.
pub const YELLOW_WEIGHT: u64 = 2;
/// Weight of a green (low) node.
pub const GREEN_WEIGHT: u64 = 1;
/// Weight of a labeled connector.
pub const EDGE_WEIGHT: u64 = 1;

const RED_COLORS: &[&str] = &["darkred", "red"];
const YELLOW_COLORS: &[&str] = &["yellow"];
const GREEN_COLORS: &[&str] = &["yellowgreen", "springgreen"];

/// Category a group counts towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupCategory {
    RedNode,
    YellowNode,
    GreenNode,
    Edge,
    Asset,
}

/// Category counts of one diagram.
///
/// Edges are counted, not connected: no adjacency between nodes is
/// reconstructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RiskGraph {
    pub red_nodes: u32,
    pub yellow_nodes: u32,
    pub green_nodes: u32,
    pub edges: u32,
    pub assets: u32,
}

impl RiskGraph {
    /// Add one group of `category`.
    pub fn record(&mut self, category: GroupCategory) {
        let counter = match category {
            GroupCategory::RedNode => &mut self.red_nodes,
            GroupCategory::YellowNode => &mut self.yellow_nodes,
            GroupCategory::GreenNode => &mut self.green_nodes,
            GroupCategory::Edge => &mut self.edges,
            GroupCategory::Asset => &mut self.assets,
        };
        *counter += 1;
    }

    /// Weighted risk score, see [`risk`].
    pub fn risk(&self) -> u64 {
        risk(self)
    }
}

/// Category of a group, or `None` if it counts nowhere (unknown shapes,
/// unlabeled lines and rectangles, circles outside the severity colors).
pub fn classify(group: &ShapeGroup) -> Option<GroupCategory> {
    match group.shape {
        ShapeKind::Circle => {
            let color = group.color_name.as_deref()?;
            if RED_COLORS.contains(&color) {
                Some(GroupCategory::RedNode)
            } else if YELLOW_COLORS.contains(&color) {
                Some(GroupCategory::YellowNode)
            } else if GREEN_COLORS.contains(&color) {
                Some(GroupCategory::GreenNode)
            } else {
                None
            }
        }
        ShapeKind::Line => group.label.as_ref().map(|_| GroupCategory::Edge),
        ShapeKind::Rectangle => group.label.as_ref().map(|_| GroupCategory::Asset),
        ShapeKind::Unknown => None,
    }
}

/// Count classified groups.
pub fn score<'a, I>(groups: I) -> RiskGraph
where
    I: IntoIterator<Item = &'a ShapeGroup>,
{
    let mut graph = RiskGraph::default();
    for category in groups.into_iter().filter_map(classify) {
        graph.record(category);
    }
    graph
}

/// `3 * red + 2 * yellow + green + edges`. Assets are informational only.
pub fn risk(graph: &RiskGraph) -> u64 {
    RED_WEIGHT * u64::from(graph.red_nodes)
        + YELLOW_WEIGHT * u64::from(graph.yellow_nodes)
        + GREEN_WEIGHT * u64::from(graph.green_nodes)
        + EDGE_WEIGHT * u64::from(graph.edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(color: &str) -> ShapeGroup {
        ShapeGroup::new(ShapeKind::Circle).with_color(color)
    }

    #[test]
    fn test_classify_nodes() {
        assert_eq!(classify(&circle("darkred")), Some(GroupCategory::RedNode));
        assert_eq!(classify(&circle("red")), Some(GroupCategory::RedNode));
        assert_eq!(classify(&circle("yellow")), Some(GroupCategory::YellowNode));
        assert_eq!(classify(&circle("yellowgreen")), Some(GroupCategory::GreenNode));
        assert_eq!(classify(&circle("springgreen")), Some(GroupCategory::GreenNode));
        assert_eq!(classify(&circle("navy")), None);
        assert_eq!(classify(&ShapeGroup::new(ShapeKind::Circle)), None);
    }

    #[test]
    fn test_classify_edges_and_assets() {
        let edge = ShapeGroup::new(ShapeKind::Line).with_label("exploits");
        let asset = ShapeGroup::new(ShapeKind::Rectangle).with_label("Server");
        assert_eq!(classify(&edge), Some(GroupCategory::Edge));
        assert_eq!(classify(&asset), Some(GroupCategory::Asset));
        assert_eq!(classify(&ShapeGroup::new(ShapeKind::Line)), None);
        assert_eq!(classify(&ShapeGroup::new(ShapeKind::Rectangle)), None);
    }

    #[test]
    fn test_unknown_shapes_never_count() {
        let group = ShapeGroup::new(ShapeKind::Unknown)
            .with_color("red")
            .with_label("x");
        assert_eq!(classify(&group), None);
    }

    #[test]
    fn test_colored_line_needs_label() {
        let group = ShapeGroup::new(ShapeKind::Line).with_color("red");
        assert_eq!(classify(&group), None);
    }

    #[test]
    fn test_empty_input() {
        let graph = score(&Vec::<ShapeGroup>::new());
        assert_eq!(graph, RiskGraph::default());
        assert_eq!(risk(&graph), 0);
    }

    #[test]
    fn test_score_and_risk() {
        let groups = vec![
            circle("darkred"),
            circle("red"),
            circle("yellow"),
            circle("springgreen"),
            ShapeGroup::new(ShapeKind::Line).with_label("a"),
            ShapeGroup::new(ShapeKind::Line),
            ShapeGroup::new(ShapeKind::Rectangle).with_label("Server"),
        ];
        let graph = score(&groups);
        assert_eq!(
            graph,
            RiskGraph {
                red_nodes: 2,
                yellow_nodes: 1,
                green_nodes: 1,
                edges: 1,
                assets: 1,
            }
        );
        assert_eq!(graph.risk(), 3 * 2 + 2 + 1 + 1);
    }

    #[test]
    fn test_assets_do_not_change_risk() {
        let graph = RiskGraph {
            assets: 10,
            ..Default::default()
        };
        assert_eq!(risk(&graph), 0);
    }

    #[test]
    fn test_score_is_idempotent() {
        let groups = vec![circle("red"), ShapeGroup::new(ShapeKind::Line).with_label("x")];
        let first = score(&groups);
        let second = score(&groups);
        assert_eq!(first, second);
        assert_eq!(risk(&first), risk(&second));
    }
}
