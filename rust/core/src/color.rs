// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Nearest named-color classification.
//!
//! A [`ColorIndex`] is a static 3-d tree over the RGB triples of a
//! [`Palette`]. Queries return the palette entry with the smallest Euclidean
//! distance to the sample; equal distances resolve to the entry that comes
//! first in palette order.
//!
//! The default CSS3 index is built once per process on first use and shared
//! by reference afterwards (see [`default_index`]).

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::css3::CSS3_HEX_TO_NAMES;
use crate::error::{PaletteError, Result};

/// An sRGB color sample, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb` (case-insensitive).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Unpack a 24-bit `0xRRGGBB` value (DXF true color). Upper bits are ignored.
    pub const fn from_packed(value: u32) -> Self {
        Self::new((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    #[inline]
    pub fn channel(&self, axis: usize) -> i32 {
        match axis {
            0 => self.r as i32,
            1 => self.g as i32,
            _ => self.b as i32,
        }
    }

    /// Squared Euclidean distance in RGB space.
    #[inline]
    pub fn distance_squared(&self, other: &Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// A palette entry: canonical color name and its RGB coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedColor {
    pub name: String,
    pub rgb: Rgb,
}

/// Ordered, non-empty list of named colors.
///
/// Order matters: it is the tie-break order of nearest-neighbor queries.
#[derive(Debug, Clone)]
pub struct Palette {
    entries: Vec<NamedColor>,
}

#[derive(Deserialize)]
struct PaletteFileEntry {
    hex: String,
    name: String,
}

impl Palette {
    /// CSS3 extended color keywords, one canonical name per hex value.
    pub fn css3() -> Self {
        // The built-in table is checked by tests; an entry that fails to parse
        // is simply skipped.
        let entries = CSS3_HEX_TO_NAMES
            .iter()
            .filter_map(|(hex, name)| {
                Rgb::from_hex(hex).map(|rgb| NamedColor {
                    name: (*name).to_string(),
                    rgb,
                })
            })
            .collect();
        Self { entries }
    }

    /// Build a palette from `(hex, name)` pairs, preserving their order.
    pub fn from_hex_pairs<I, H, N>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (H, N)>,
        H: AsRef<str>,
        N: Into<String>,
    {
        let mut entries = Vec::new();
        for (hex, name) in pairs {
            let name = name.into();
            let rgb = Rgb::from_hex(hex.as_ref()).ok_or_else(|| PaletteError::InvalidHex {
                hex: hex.as_ref().to_string(),
                name: name.clone(),
            })?;
            entries.push(NamedColor { name, rgb });
        }
        if entries.is_empty() {
            return Err(PaletteError::Empty);
        }
        Ok(Self { entries })
    }

    /// Parse a JSON array of `{ "hex": "#rrggbb", "name": "..." }` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<PaletteFileEntry> = serde_json::from_str(json)?;
        Self::from_hex_pairs(raw.into_iter().map(|e| (e.hex, e.name)))
    }

    pub fn entries(&self) -> &[NamedColor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tree node. `entry` indexes into the palette.
#[derive(Debug, Clone)]
struct KdNode {
    entry: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// Static k-d tree over palette RGB triples.
#[derive(Debug, Clone)]
pub struct ColorIndex {
    colors: Vec<NamedColor>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

impl ColorIndex {
    /// Build the index in O(P log P).
    pub fn build(palette: &Palette) -> Self {
        let colors = palette.entries.clone();
        let mut nodes = Vec::with_capacity(colors.len());
        let mut order: Vec<usize> = (0..colors.len()).collect();
        let root = build_subtree(&colors, &mut order, 0, &mut nodes);

        tracing::debug!(palette_size = colors.len(), "Built color index");

        Self {
            colors,
            nodes,
            root,
        }
    }

    /// Nearest palette entry under Euclidean RGB distance.
    ///
    /// Returns `None` only for an empty index, which [`Palette`] constructors
    /// never produce.
    pub fn nearest(&self, sample: Rgb) -> Option<&NamedColor> {
        let root = self.root?;
        // (entry, squared distance)
        let mut best: Option<(usize, u32)> = None;
        // (node, squared distance from sample to the node's half-space)
        let mut stack: SmallVec<[(usize, u32); 32]> = SmallVec::new();
        stack.push((root, 0));

        while let Some((node_idx, bound)) = stack.pop() {
            if let Some((_, best_dist)) = best {
                // Equal bound can still hide an earlier palette entry.
                if bound > best_dist {
                    continue;
                }
            }

            let node = &self.nodes[node_idx];
            let point = self.colors[node.entry].rgb;
            let dist = sample.distance_squared(&point);
            best = match best {
                Some((entry, best_dist))
                    if best_dist < dist || (best_dist == dist && entry < node.entry) =>
                {
                    Some((entry, best_dist))
                }
                _ => Some((node.entry, dist)),
            };

            let diff = sample.channel(node.axis) - point.channel(node.axis);
            let (near, far) = if diff < 0 {
                (node.left, node.right)
            } else {
                (node.right, node.left)
            };
            let plane_dist = (diff * diff) as u32;

            // Push the far side first so the near side is explored first.
            if let Some(far) = far {
                stack.push((far, plane_dist));
            }
            if let Some(near) = near {
                stack.push((near, 0));
            }
        }

        best.map(|(entry, _)| &self.colors[entry])
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

fn build_subtree(
    colors: &[NamedColor],
    order: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> Option<usize> {
    if order.is_empty() {
        return None;
    }

    let axis = depth % 3;
    order.sort_unstable_by_key(|&i| (colors[i].rgb.channel(axis), i));
    let median = order.len() / 2;
    let entry = order[median];

    let slot = nodes.len();
    nodes.push(KdNode {
        entry,
        axis,
        left: None,
        right: None,
    });

    let (lower, rest) = order.split_at_mut(median);
    let upper = &mut rest[1..];
    let left = build_subtree(colors, lower, depth + 1, nodes);
    let right = build_subtree(colors, upper, depth + 1, nodes);
    nodes[slot].left = left;
    nodes[slot].right = right;

    Some(slot)
}

static DEFAULT_INDEX: OnceLock<ColorIndex> = OnceLock::new();

/// Process-wide CSS3 color index, built on first call.
pub fn default_index() -> &'static ColorIndex {
    DEFAULT_INDEX.get_or_init(|| ColorIndex::build(&Palette::css3()))
}

/// Name of the CSS3 color closest to `sample`.
pub fn nearest_color_name(sample: Rgb) -> &'static str {
    default_index()
        .nearest(sample)
        .map(|color| color.name.as_str())
        .unwrap_or("black")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force<'a>(palette: &'a Palette, sample: Rgb) -> &'a NamedColor {
        let mut best = &palette.entries()[0];
        for color in palette.entries() {
            if sample.distance_squared(&color.rgb) < sample.distance_squared(&best.rgb) {
                best = color;
            }
        }
        best
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgb::from_hex("#8b0000"), Some(Rgb::new(139, 0, 0)));
        assert_eq!(Rgb::from_hex("9ACD32"), Some(Rgb::new(154, 205, 50)));
        assert_eq!(Rgb::from_hex("#fff"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
    }

    #[test]
    fn test_from_packed() {
        assert_eq!(Rgb::from_packed(0x8B0000), Rgb::new(139, 0, 0));
        assert_eq!(Rgb::from_packed(0xFF00FF7F), Rgb::new(0, 255, 127));
    }

    #[test]
    fn test_css3_palette_is_complete() {
        let palette = Palette::css3();
        assert_eq!(palette.len(), CSS3_HEX_TO_NAMES.len());
        assert_eq!(palette.len(), 138);
    }

    #[test]
    fn test_exact_palette_hits() {
        assert_eq!(nearest_color_name(Rgb::new(255, 0, 0)), "red");
        assert_eq!(nearest_color_name(Rgb::new(139, 0, 0)), "darkred");
        assert_eq!(nearest_color_name(Rgb::new(255, 255, 0)), "yellow");
        assert_eq!(nearest_color_name(Rgb::new(154, 205, 50)), "yellowgreen");
        assert_eq!(nearest_color_name(Rgb::new(0, 255, 127)), "springgreen");
        assert_eq!(nearest_color_name(Rgb::new(0, 255, 255)), "cyan");
        assert_eq!(nearest_color_name(Rgb::new(128, 128, 128)), "gray");
    }

    #[test]
    fn test_nearest_red_minimizes_distance() {
        let palette = Palette::css3();
        let index = ColorIndex::build(&palette);
        let sample = Rgb::new(255, 0, 0);
        let found = index.nearest(sample).unwrap();
        for color in palette.entries() {
            assert!(sample.distance_squared(&found.rgb) <= sample.distance_squared(&color.rgb));
        }
    }

    #[test]
    fn test_matches_brute_force_on_grid() {
        let palette = Palette::css3();
        let index = ColorIndex::build(&palette);
        for r in (0..=255u16).step_by(17) {
            for g in (0..=255u16).step_by(17) {
                for b in (0..=255u16).step_by(51) {
                    let sample = Rgb::new(r as u8, g as u8, b as u8);
                    let expected = brute_force(&palette, sample);
                    let found = index.nearest(sample).unwrap();
                    assert_eq!(found.name, expected.name, "sample {:?}", sample);
                }
            }
        }
    }

    #[test]
    fn test_ties_resolve_to_first_entry() {
        let palette = Palette::from_hex_pairs([
            ("#000000", "first"),
            ("#0a0000", "second"),
            ("#000000", "duplicate"),
        ])
        .unwrap();
        let index = ColorIndex::build(&palette);

        assert_eq!(index.nearest(Rgb::new(0, 0, 0)).unwrap().name, "first");
        // Equidistant from "first" and "second".
        assert_eq!(index.nearest(Rgb::new(5, 0, 0)).unwrap().name, "first");
        assert_eq!(index.nearest(Rgb::new(6, 0, 0)).unwrap().name, "second");
    }

    #[test]
    fn test_palette_from_json_preserves_order() {
        let json = r##"[
            {"hex": "#ff0000", "name": "alarm"},
            {"hex": "#00ff00", "name": "ok"}
        ]"##;
        let palette = Palette::from_json(json).unwrap();
        assert_eq!(palette.entries()[0].name, "alarm");
        assert_eq!(palette.entries()[1].rgb, Rgb::new(0, 255, 0));
    }

    #[test]
    fn test_palette_errors() {
        assert!(matches!(
            Palette::from_json("[]"),
            Err(PaletteError::Empty)
        ));
        assert!(matches!(
            Palette::from_json(r#"[{"hex": "red", "name": "red"}]"#),
            Err(PaletteError::InvalidHex { .. })
        ));
        assert!(matches!(
            Palette::from_json("{"),
            Err(PaletteError::Json(_))
        ));
    }

    #[test]
    fn test_default_index_is_shared() {
        let a = default_index() as *const ColorIndex;
        let b = default_index() as *const ColorIndex;
        assert_eq!(a, b);
    }
}
