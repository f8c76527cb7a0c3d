// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for palette loading and entity normalization.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for palette operations.
pub type Result<T> = std::result::Result<T, PaletteError>;

/// An attribute entity that could not contribute to its group.
///
/// These never abort a document. The normalizer drops the entity and keeps
/// the error as a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MalformedEntityError {
    /// HATCH without any fill color code.
    #[error("hatch {} has no fill color", handle_or_unknown(.handle))]
    MissingColor { handle: Option<String> },

    /// HATCH whose color code is BYBLOCK, BYLAYER or out of range, with no
    /// true color to fall back on.
    #[error("hatch {} has unresolvable color code {code}", handle_or_unknown(.handle))]
    UnresolvableColor { handle: Option<String>, code: i32 },

    /// TEXT/MTEXT without text content.
    #[error("text label {} has no text content", handle_or_unknown(.handle))]
    MissingText { handle: Option<String> },
}

impl MalformedEntityError {
    /// Handle of the offending entity, when the document carried one.
    pub fn handle(&self) -> Option<&str> {
        match self {
            Self::MissingColor { handle }
            | Self::UnresolvableColor { handle, .. }
            | Self::MissingText { handle } => handle.as_deref(),
        }
    }
}

fn handle_or_unknown(handle: &Option<String>) -> &str {
    handle.as_deref().unwrap_or("<no handle>")
}

/// Errors raised while loading a named-color palette.
#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("Invalid hex color {hex:?} for palette entry {name:?}")]
    InvalidHex { hex: String, name: String },

    #[error("Palette has no entries")]
    Empty,

    #[error("Palette JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
