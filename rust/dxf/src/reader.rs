// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ENTITIES section reader
//!
//! Walks the section structure of an ASCII DXF document and turns every
//! model-space entity into a [`RawEntity`], in document order. Other sections
//! (HEADER, TABLES, BLOCKS, OBJECTS, ...) are skipped.

use riskgraph_core::RawEntity;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::parser::{GroupPair, GroupScanner};

/// Sentinel that opens a binary DXF file.
const BINARY_SENTINEL: &[u8] = b"AutoCAD Binary DXF";

const CODE_TYPE: i32 = 0;
const CODE_TEXT: i32 = 1;
const CODE_SECTION_NAME: i32 = 2;
const CODE_TEXT_CHUNK: i32 = 3;
const CODE_HANDLE: i32 = 5;
const CODE_X: i32 = 10;
const CODE_COLOR: i32 = 62;
const CODE_VERTEX_COUNT: i32 = 90;
const CODE_TRUE_COLOR: i32 = 420;

/// Read model-space entities from DXF text.
pub fn read_entities(content: &str) -> Result<Vec<RawEntity>> {
    let mut reader = DxfReader::new(content);
    reader.read()
}

/// Read model-space entities from raw file bytes.
///
/// The bytes must be UTF-8 (a leading byte-order mark is skipped).
pub fn read_entities_from_bytes(bytes: &[u8]) -> Result<Vec<RawEntity>> {
    if bytes.starts_with(BINARY_SENTINEL) {
        return Err(Error::BinaryDxf);
    }
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let content = std::str::from_utf8(bytes)?;
    read_entities(content)
}

/// Count entities by type tag
pub fn count_by_type(entities: &[RawEntity]) -> FxHashMap<String, usize> {
    let mut counts = FxHashMap::default();
    for entity in entities {
        *counts.entry(entity.type_name.clone()).or_insert(0) += 1;
    }
    counts
}

/// Section-aware DXF reader.
pub struct DxfReader<'a> {
    scanner: GroupScanner<'a>,
    /// Pair read ahead while looking for the end of an entity.
    lookahead: Option<GroupPair<'a>>,
}

impl<'a> DxfReader<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            scanner: GroupScanner::new(content),
            lookahead: None,
        }
    }

    fn next_pair(&mut self) -> Result<Option<GroupPair<'a>>> {
        if let Some(pair) = self.lookahead.take() {
            return Ok(Some(pair));
        }
        self.scanner.next().transpose()
    }

    /// Read all ENTITIES sections of the document.
    pub fn read(&mut self) -> Result<Vec<RawEntity>> {
        let mut entities = Vec::new();

        while let Some(pair) = self.next_pair()? {
            if pair.is_marker("EOF") {
                break;
            }
            if !pair.is_marker("SECTION") {
                continue;
            }

            let name = match self.next_pair()? {
                Some(name) if name.code == CODE_SECTION_NAME => name.value.trim(),
                _ => return Err(Error::UnnamedSection { line: pair.line }),
            };

            if name == "ENTITIES" {
                self.read_entities_section(&mut entities)?;
            } else {
                self.skip_section(name)?;
            }
        }

        tracing::debug!(count = entities.len(), "Read DXF entities");
        Ok(entities)
    }

    fn skip_section(&mut self, name: &str) -> Result<()> {
        while let Some(pair) = self.next_pair()? {
            if pair.is_marker("ENDSEC") {
                return Ok(());
            }
        }
        Err(Error::UnterminatedSection {
            name: name.to_string(),
        })
    }

    fn read_entities_section(&mut self, out: &mut Vec<RawEntity>) -> Result<()> {
        // Legacy POLYLINE waiting for its VERTEX records and SEQEND.
        let mut open_polyline: Option<RawEntity> = None;

        loop {
            let Some(pair) = self.next_pair()? else {
                return Err(Error::UnterminatedSection {
                    name: "ENTITIES".into(),
                });
            };

            if pair.code != CODE_TYPE {
                // Stray pair before the first entity.
                continue;
            }

            let type_name = pair.value.trim();
            if type_name == "ENDSEC" {
                out.extend(open_polyline.take());
                return Ok(());
            }

            let entity = self.read_entity(type_name)?;

            match type_name {
                "VERTEX" => {
                    if let Some(polyline) = open_polyline.as_mut() {
                        polyline.vertex_count = Some(polyline.vertex_count.unwrap_or(0) + 1);
                    }
                }
                "SEQEND" => out.extend(open_polyline.take()),
                "POLYLINE" => {
                    out.extend(open_polyline.take());
                    open_polyline = Some(RawEntity {
                        vertex_count: Some(0),
                        ..entity
                    });
                }
                _ => {
                    out.extend(open_polyline.take());
                    out.push(entity);
                }
            }
        }
    }

    /// Collect the pairs of one entity, up to (not including) the next `0`.
    fn read_entity(&mut self, type_name: &str) -> Result<RawEntity> {
        let mut entity = RawEntity::new(type_name);
        let mut declared_vertices: Option<u32> = None;
        let mut points: u32 = 0;
        let mut chunks = String::new();
        let mut text: Option<&str> = None;

        while let Some(pair) = self.next_pair()? {
            match pair.code {
                CODE_TYPE => {
                    self.lookahead = Some(pair);
                    break;
                }
                CODE_HANDLE => entity.handle = Some(pair.value.trim().to_string()),
                CODE_COLOR => entity.color_code = pair.as_i32(),
                CODE_TRUE_COLOR => entity.true_color = pair.as_u32(),
                CODE_TEXT => text = Some(pair.value),
                CODE_TEXT_CHUNK if type_name == "MTEXT" => chunks.push_str(pair.value),
                CODE_VERTEX_COUNT if type_name == "LWPOLYLINE" && declared_vertices.is_none() => {
                    declared_vertices = pair.as_u32();
                }
                CODE_X => points += 1,
                _ => {}
            }
        }

        if type_name == "LWPOLYLINE" {
            entity.vertex_count = declared_vertices.or((points > 0).then_some(points));
        }

        if let Some(text) = text {
            chunks.push_str(text);
        }
        if !chunks.is_empty() {
            entity.text = Some(chunks);
        }

        Ok(entity)
    }
}
