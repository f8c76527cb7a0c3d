// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # RiskGraph Core
//!
//! Reconstructs a threat-tree diagram from a flat stream of CAD drawing
//! primitives and scores it.
//!
//! ## Overview
//!
//! - **Color classification**: fill colors are mapped to the nearest named
//!   color with a static k-d tree ([`ColorIndex`])
//! - **Normalization**: parser records become typed [`GeometricEntity`]
//!   values ([`normalize`])
//! - **Grouping**: an explicit state machine attaches fills and labels to the
//!   outline that precedes them ([`GroupBuilder`])
//! - **Aggregation**: groups are classified and counted into a [`RiskGraph`]
//!   ([`score`], [`risk`])
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use riskgraph_core::{analyze, default_index, RawEntity};
//!
//! let entities = vec![
//!     RawEntity::new("LWPOLYLINE").with_vertex_count(2),
//!     RawEntity::new("HATCH").with_color_code(1),
//! ];
//! let assessment = analyze(&entities, default_index());
//! assert_eq!(assessment.graph.red_nodes, 1);
//! assert_eq!(assessment.risk, 3);
//! ```
//!
//! Everything here is synchronous and pure apart from the lazily built
//! default color index, which is immutable once built and safe to share
//! across threads.

pub mod aci;
pub mod aggregate;
pub mod color;
mod css3;
pub mod entity;
pub mod error;
pub mod grouping;
pub mod normalize;
pub mod pipeline;

pub use aci::aci_to_rgb;
pub use aggregate::{classify, risk, score, GroupCategory, RiskGraph};
pub use color::{default_index, nearest_color_name, ColorIndex, NamedColor, Palette, Rgb};
pub use entity::{EntityKind, GeometricEntity, RawEntity};
pub use error::{MalformedEntityError, PaletteError};
pub use grouping::{build_groups, GroupBuilder, GroupState, ShapeGroup, ShapeKind};
pub use normalize::{extract_label, normalize, normalize_entity, NormalizedStream};
pub use pipeline::{analyze, RiskAssessment};
