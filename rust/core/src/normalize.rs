// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity stream normalization
//!
//! Turns raw parser records into [`GeometricEntity`] values: drops entity
//! types that play no part in grouping, resolves hatch fill colors to palette
//! names and extracts the semantic part of text labels.

use crate::aci::aci_to_rgb;
use crate::color::{ColorIndex, Rgb};
use crate::entity::{EntityKind, GeometricEntity, RawEntity};
use crate::error::MalformedEntityError;

/// MTEXT paragraph break.
const LINE_BREAK_ESCAPE: &str = "\\P";

/// Output of [`normalize`]: entities in input order plus the attribute
/// entities that were dropped as malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedStream {
    pub entities: Vec<GeometricEntity>,
    pub diagnostics: Vec<MalformedEntityError>,
}

/// Normalize a whole entity stream, preserving order.
///
/// Malformed hatch and text entities never abort the stream. They are left
/// out of `entities`, so they contribute no attribute to any group, and are
/// reported in `diagnostics` instead.
pub fn normalize(raw: &[RawEntity], index: &ColorIndex) -> NormalizedStream {
    let mut stream = NormalizedStream {
        entities: Vec::with_capacity(raw.len()),
        diagnostics: Vec::new(),
    };

    for entity in raw {
        match normalize_entity(entity, index) {
            Ok(Some(normalized)) => stream.entities.push(normalized),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "Dropping malformed entity");
                stream.diagnostics.push(err);
            }
        }
    }

    tracing::debug!(
        raw = raw.len(),
        kept = stream.entities.len(),
        malformed = stream.diagnostics.len(),
        "Normalized entity stream"
    );

    stream
}

/// Normalize one entity. `Ok(None)` means the type is irrelevant to grouping.
pub fn normalize_entity(
    raw: &RawEntity,
    index: &ColorIndex,
) -> Result<Option<GeometricEntity>, MalformedEntityError> {
    let Some(kind) = raw.kind() else {
        return Ok(None);
    };

    let entity = match kind {
        EntityKind::Polyline => GeometricEntity::Polyline {
            vertex_count: raw.vertex_count,
        },
        EntityKind::Spline => GeometricEntity::Spline,
        EntityKind::Hatch => {
            let sample = fill_color(raw)?;
            let color_name = index
                .nearest(sample)
                .map(|color| color.name.clone())
                .ok_or_else(|| MalformedEntityError::MissingColor {
                    handle: raw.handle.clone(),
                })?;
            GeometricEntity::Hatch { sample, color_name }
        }
        EntityKind::TextLabel => {
            let label = raw
                .text
                .as_deref()
                .and_then(extract_label)
                .ok_or_else(|| MalformedEntityError::MissingText {
                    handle: raw.handle.clone(),
                })?;
            GeometricEntity::TextLabel { label }
        }
    };

    Ok(Some(entity))
}

/// Resolve a hatch fill to RGB.
///
/// The ACI code is authoritative; the true color is only used when the code
/// is absent or does not name a color (BYBLOCK, BYLAYER).
fn fill_color(raw: &RawEntity) -> Result<Rgb, MalformedEntityError> {
    if let Some(rgb) = raw.color_code.and_then(aci_to_rgb) {
        return Ok(rgb);
    }
    if let Some(packed) = raw.true_color {
        return Ok(Rgb::from_packed(packed));
    }
    match raw.color_code {
        Some(code) => Err(MalformedEntityError::UnresolvableColor {
            handle: raw.handle.clone(),
            code,
        }),
        None => Err(MalformedEntityError::MissingColor {
            handle: raw.handle.clone(),
        }),
    }
}

/// Semantic label of a text entity: the last `;`-separated segment, with
/// paragraph breaks removed. Inline formatting such as `\A1;` or
/// `\fArial|b0;` precedes the visible text, so the last segment is the text.
pub fn extract_label(text: &str) -> Option<String> {
    let cleaned = text.replace(LINE_BREAK_ESCAPE, "");
    let label = cleaned.rsplit(';').next().unwrap_or_default().trim();
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::default_index;

    #[test]
    fn test_extract_label() {
        assert_eq!(extract_label("A;desc"), Some("desc".into()));
        assert_eq!(extract_label("\\A1;Web server"), Some("Web server".into()));
        assert_eq!(extract_label("Server"), Some("Server".into()));
        assert_eq!(extract_label("\\A1;SQL\\Pinjection"), Some("SQLinjection".into()));
        assert_eq!(extract_label("a;b;c"), Some("c".into()));
        assert_eq!(extract_label("  Database  "), Some("Database".into()));
    }

    #[test]
    fn test_extract_label_empty() {
        assert_eq!(extract_label(""), None);
        assert_eq!(extract_label("\\A1;"), None);
        assert_eq!(extract_label("\\P"), None);
        // The visible text is the last segment, so a trailing `;` leaves none.
        assert_eq!(extract_label("desc;"), None);
    }

    #[test]
    fn test_normalize_drops_irrelevant_kinds() {
        let raw = vec![
            RawEntity::new("LINE"),
            RawEntity::new("LWPOLYLINE").with_vertex_count(4),
            RawEntity::new("INSERT"),
            RawEntity::new("SPLINE"),
        ];
        let stream = normalize(&raw, default_index());
        assert_eq!(
            stream.entities,
            vec![
                GeometricEntity::Polyline {
                    vertex_count: Some(4)
                },
                GeometricEntity::Spline,
            ]
        );
        assert!(stream.diagnostics.is_empty());
    }

    #[test]
    fn test_hatch_color_from_aci() {
        let raw = RawEntity::new("HATCH").with_color_code(2);
        let entity = normalize_entity(&raw, default_index()).unwrap().unwrap();
        assert_eq!(
            entity,
            GeometricEntity::Hatch {
                sample: Rgb::new(255, 255, 0),
                color_name: "yellow".into(),
            }
        );
    }

    #[test]
    fn test_hatch_aci_wins_over_true_color() {
        let raw = RawEntity::new("HATCH")
            .with_color_code(1)
            .with_true_color(0x9ACD32);
        match normalize_entity(&raw, default_index()).unwrap() {
            Some(GeometricEntity::Hatch { color_name, .. }) => assert_eq!(color_name, "red"),
            other => panic!("Expected hatch, got {:?}", other),
        }
    }

    #[test]
    fn test_hatch_bylayer_falls_back_to_true_color() {
        let raw = RawEntity::new("HATCH")
            .with_color_code(256)
            .with_true_color(0x8B0000);
        match normalize_entity(&raw, default_index()).unwrap() {
            Some(GeometricEntity::Hatch { color_name, .. }) => assert_eq!(color_name, "darkred"),
            other => panic!("Expected hatch, got {:?}", other),
        }
    }

    #[test]
    fn test_hatch_errors() {
        let missing = RawEntity::new("HATCH").with_handle("3C");
        assert_eq!(
            normalize_entity(&missing, default_index()),
            Err(MalformedEntityError::MissingColor {
                handle: Some("3C".into())
            })
        );

        let bylayer = RawEntity::new("HATCH").with_color_code(256);
        assert_eq!(
            normalize_entity(&bylayer, default_index()),
            Err(MalformedEntityError::UnresolvableColor {
                handle: None,
                code: 256
            })
        );
    }

    #[test]
    fn test_text_errors() {
        let missing = RawEntity::new("MTEXT");
        assert_eq!(
            normalize_entity(&missing, default_index()),
            Err(MalformedEntityError::MissingText { handle: None })
        );
    }

    #[test]
    fn test_malformed_entities_become_diagnostics() {
        let raw = vec![
            RawEntity::new("LWPOLYLINE").with_vertex_count(2),
            RawEntity::new("HATCH"),
            RawEntity::new("TEXT"),
            RawEntity::new("TEXT").with_text("label"),
        ];
        let stream = normalize(&raw, default_index());
        assert_eq!(stream.entities.len(), 2);
        assert_eq!(stream.diagnostics.len(), 2);
        assert_eq!(
            stream.entities[1],
            GeometricEntity::TextLabel {
                label: "label".into()
            }
        );
    }
}
