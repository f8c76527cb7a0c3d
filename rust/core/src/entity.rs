// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity records at the boundary between a CAD parser and the core.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// One drawing primitive as delivered by a CAD parser, in document order.
///
/// Only the fields the core looks at are carried. Anything a parser cannot
/// fill in stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntity {
    /// DXF entity type tag, e.g. `LWPOLYLINE` or `HATCH`.
    pub type_name: String,
    /// Entity handle (group code 5), used in diagnostics.
    pub handle: Option<String>,
    /// Number of vertices for polylines.
    pub vertex_count: Option<u32>,
    /// AutoCAD Color Index (group code 62).
    pub color_code: Option<i32>,
    /// 24-bit `0xRRGGBB` true color (group code 420).
    pub true_color: Option<u32>,
    /// Raw text content, MTEXT formatting codes included.
    pub text: Option<String>,
}

impl RawEntity {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    pub fn with_vertex_count(mut self, count: u32) -> Self {
        self.vertex_count = Some(count);
        self
    }

    pub fn with_color_code(mut self, code: i32) -> Self {
        self.color_code = Some(code);
        self
    }

    pub fn with_true_color(mut self, color: u32) -> Self {
        self.true_color = Some(color);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Kind used by grouping, or `None` for entity types the core ignores.
    pub fn kind(&self) -> Option<EntityKind> {
        EntityKind::from_type_name(&self.type_name)
    }
}

/// Entity kinds that take part in group reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Polyline,
    Spline,
    Hatch,
    TextLabel,
}

impl EntityKind {
    /// Map a DXF type tag (case-insensitive) to a kind.
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        let tag = type_name.trim();
        if tag.eq_ignore_ascii_case("LWPOLYLINE") || tag.eq_ignore_ascii_case("POLYLINE") {
            Some(Self::Polyline)
        } else if tag.eq_ignore_ascii_case("SPLINE") {
            Some(Self::Spline)
        } else if tag.eq_ignore_ascii_case("HATCH") {
            Some(Self::Hatch)
        } else if tag.eq_ignore_ascii_case("MTEXT") || tag.eq_ignore_ascii_case("TEXT") {
            Some(Self::TextLabel)
        } else {
            None
        }
    }

    /// Polylines and splines open a new group.
    pub fn is_boundary(self) -> bool {
        matches!(self, Self::Polyline | Self::Spline)
    }
}

/// A normalized entity, ready for the grouping state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometricEntity {
    Polyline { vertex_count: Option<u32> },
    Spline,
    Hatch { sample: Rgb, color_name: String },
    TextLabel { label: String },
}

impl GeometricEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Polyline { .. } => EntityKind::Polyline,
            Self::Spline => EntityKind::Spline,
            Self::Hatch { .. } => EntityKind::Hatch,
            Self::TextLabel { .. } => EntityKind::TextLabel,
        }
    }

    pub fn is_boundary(&self) -> bool {
        self.kind().is_boundary()
    }
}
