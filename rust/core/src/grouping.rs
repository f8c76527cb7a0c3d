// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Group reconstruction
//!
//! A diagram exporter writes each shape as its outline, then its fill, then
//! its text. Boundary entities (polylines and splines) therefore delimit
//! groups, and every fill or label that follows belongs to the most recently
//! opened group.
//!
//! [`GroupBuilder`] is a two-state machine with a single active-group slot:
//!
//! ```text
//! NoActiveGroup --boundary--> ActiveGroup
//! ActiveGroup   --boundary--> ActiveGroup   (emits the previous group)
//! ActiveGroup   --hatch/text-> ActiveGroup  (sets color / label)
//! NoActiveGroup --hatch/text-> NoActiveGroup (attribute dropped)
//! ```

use serde::Serialize;

use crate::entity::GeometricEntity;

/// Shape of a group, fixed by the boundary entity that opened it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Line,
    Unknown,
}

impl ShapeKind {
    /// Classify a boundary entity. Attribute entities have no shape.
    pub fn of_boundary(entity: &GeometricEntity) -> Option<Self> {
        match entity {
            GeometricEntity::Polyline { vertex_count } => Some(match vertex_count {
                Some(2) => Self::Circle,
                Some(4) => Self::Rectangle,
                _ => Self::Unknown,
            }),
            GeometricEntity::Spline => Some(Self::Line),
            GeometricEntity::Hatch { .. } | GeometricEntity::TextLabel { .. } => None,
        }
    }
}

/// A reconstructed node, asset or edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeGroup {
    pub shape: ShapeKind,
    pub color_name: Option<String>,
    pub label: Option<String>,
}

impl ShapeGroup {
    pub fn new(shape: ShapeKind) -> Self {
        Self {
            shape,
            color_name: None,
            label: None,
        }
    }

    pub fn with_color(mut self, color_name: impl Into<String>) -> Self {
        self.color_name = Some(color_name.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// State of the grouping machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GroupState {
    #[default]
    NoActiveGroup,
    ActiveGroup(ShapeGroup),
}

/// Incremental grouping state machine.
#[derive(Debug, Default)]
pub struct GroupBuilder {
    state: GroupState,
    groups: Vec<ShapeGroup>,
    dropped: usize,
    overwrites: usize,
}

impl GroupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GroupState {
        &self.state
    }

    /// Attribute entities seen while no group was active.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Attributes that replaced an earlier value on the same group.
    ///
    /// Assignment is last-write-wins, so a shape with two fills keeps the
    /// later one. A non-zero count usually means overlapping shapes.
    pub fn overwrites(&self) -> usize {
        self.overwrites
    }

    /// Feed the next entity in document order.
    pub fn push(&mut self, entity: &GeometricEntity) {
        if let Some(shape) = ShapeKind::of_boundary(entity) {
            let previous = std::mem::replace(
                &mut self.state,
                GroupState::ActiveGroup(ShapeGroup::new(shape)),
            );
            if let GroupState::ActiveGroup(group) = previous {
                self.emit(group);
            }
            return;
        }

        let GroupState::ActiveGroup(group) = &mut self.state else {
            self.dropped += 1;
            tracing::debug!(kind = ?entity.kind(), "Attribute entity before any boundary, dropped");
            return;
        };

        let (slot, value, attribute) = match entity {
            GeometricEntity::Hatch { color_name, .. } => (&mut group.color_name, color_name, "color"),
            GeometricEntity::TextLabel { label } => (&mut group.label, label, "label"),
            GeometricEntity::Polyline { .. } | GeometricEntity::Spline => return,
        };

        if let Some(old) = slot.replace(value.clone()) {
            self.overwrites += 1;
            tracing::debug!(attribute, old = %old, new = %value, "Overwriting group attribute");
        }
    }

    /// Flush the trailing group and return all groups in order.
    pub fn finish(mut self) -> Vec<ShapeGroup> {
        if let GroupState::ActiveGroup(group) = std::mem::take(&mut self.state) {
            self.emit(group);
        }
        self.groups
    }

    fn emit(&mut self, group: ShapeGroup) {
        tracing::trace!(
            shape = ?group.shape,
            color = ?group.color_name,
            label = ?group.label,
            "Group closed"
        );
        self.groups.push(group);
    }
}

/// Reconstruct groups from a normalized entity stream.
pub fn build_groups<'a, I>(entities: I) -> Vec<ShapeGroup>
where
    I: IntoIterator<Item = &'a GeometricEntity>,
{
    let mut builder = GroupBuilder::new();
    for entity in entities {
        builder.push(entity);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use proptest::prelude::*;

    fn polyline(vertex_count: u32) -> GeometricEntity {
        GeometricEntity::Polyline {
            vertex_count: Some(vertex_count),
        }
    }

    fn hatch(color_name: &str) -> GeometricEntity {
        GeometricEntity::Hatch {
            sample: Rgb::new(0, 0, 0),
            color_name: color_name.into(),
        }
    }

    fn text(label: &str) -> GeometricEntity {
        GeometricEntity::TextLabel {
            label: label.into(),
        }
    }

    #[test]
    fn test_shape_classification() {
        assert_eq!(ShapeKind::of_boundary(&polyline(2)), Some(ShapeKind::Circle));
        assert_eq!(ShapeKind::of_boundary(&polyline(4)), Some(ShapeKind::Rectangle));
        assert_eq!(ShapeKind::of_boundary(&polyline(3)), Some(ShapeKind::Unknown));
        assert_eq!(
            ShapeKind::of_boundary(&GeometricEntity::Polyline { vertex_count: None }),
            Some(ShapeKind::Unknown)
        );
        assert_eq!(ShapeKind::of_boundary(&GeometricEntity::Spline), Some(ShapeKind::Line));
        assert_eq!(ShapeKind::of_boundary(&hatch("red")), None);
    }

    #[test]
    fn test_empty_stream() {
        assert!(build_groups(&Vec::<GeometricEntity>::new()).is_empty());
    }

    #[test]
    fn test_attributes_follow_boundary() {
        let entities = vec![
            polyline(2),
            hatch("darkred"),
            polyline(2),
            hatch("yellow"),
            GeometricEntity::Spline,
            text("desc"),
        ];
        let groups = build_groups(&entities);
        assert_eq!(
            groups,
            vec![
                ShapeGroup::new(ShapeKind::Circle).with_color("darkred"),
                ShapeGroup::new(ShapeKind::Circle).with_color("yellow"),
                ShapeGroup::new(ShapeKind::Line).with_label("desc"),
            ]
        );
    }

    #[test]
    fn test_leading_attributes_dropped() {
        let entities = vec![hatch("red"), text("orphan"), polyline(4), text("Server")];
        let mut builder = GroupBuilder::new();
        for entity in &entities {
            builder.push(entity);
        }
        assert_eq!(builder.dropped(), 2);
        let groups = builder.finish();
        assert_eq!(groups, vec![ShapeGroup::new(ShapeKind::Rectangle).with_label("Server")]);
    }

    #[test]
    fn test_consecutive_boundaries() {
        let entities = vec![GeometricEntity::Spline, GeometricEntity::Spline, polyline(4)];
        let groups = build_groups(&entities);
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.color_name.is_none() && g.label.is_none()));
    }

    #[test]
    fn test_last_write_wins() {
        let entities = vec![polyline(2), hatch("yellow"), hatch("red"), text("a"), text("b")];
        let mut builder = GroupBuilder::new();
        for entity in &entities {
            builder.push(entity);
        }
        assert_eq!(builder.overwrites(), 2);
        let groups = builder.finish();
        assert_eq!(
            groups,
            vec![ShapeGroup::new(ShapeKind::Circle).with_color("red").with_label("b")]
        );
    }

    #[test]
    fn test_state_transitions() {
        let mut builder = GroupBuilder::new();
        assert_eq!(builder.state(), &GroupState::NoActiveGroup);

        builder.push(&text("ignored"));
        assert_eq!(builder.state(), &GroupState::NoActiveGroup);

        builder.push(&polyline(4));
        assert_eq!(
            builder.state(),
            &GroupState::ActiveGroup(ShapeGroup::new(ShapeKind::Rectangle))
        );

        builder.push(&text("Server"));
        builder.push(&GeometricEntity::Spline);
        assert_eq!(
            builder.state(),
            &GroupState::ActiveGroup(ShapeGroup::new(ShapeKind::Line))
        );
        assert_eq!(builder.finish().len(), 2);
    }

    fn entity_strategy() -> impl Strategy<Value = GeometricEntity> {
        prop_oneof![
            prop::option::of(0u32..8).prop_map(|vertex_count| GeometricEntity::Polyline { vertex_count }),
            Just(GeometricEntity::Spline),
            "[a-z]{1,8}".prop_map(|name| hatch(&name)),
            "[A-Za-z ]{1,12}".prop_map(|label| text(&label)),
        ]
    }

    proptest! {
        #[test]
        fn prop_one_group_per_boundary(entities in prop::collection::vec(entity_strategy(), 0..64)) {
            let boundaries = entities.iter().filter(|e| e.is_boundary()).count();
            let groups = build_groups(&entities);
            prop_assert_eq!(groups.len(), boundaries);
        }

        #[test]
        fn prop_shapes_follow_boundaries(entities in prop::collection::vec(entity_strategy(), 0..64)) {
            let expected: Vec<ShapeKind> = entities.iter().filter_map(ShapeKind::of_boundary).collect();
            let shapes: Vec<ShapeKind> = build_groups(&entities).iter().map(|g| g.shape).collect();
            prop_assert_eq!(shapes, expected);
        }
    }
}
