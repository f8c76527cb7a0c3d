// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # RiskGraph DXF
//!
//! Reads the ENTITIES section of an ASCII DXF document into
//! [`riskgraph_core::RawEntity`] records.
//!
//! Only the group codes the risk pipeline looks at are interpreted: entity
//! type, handle, color (ACI and true color), LWPOLYLINE vertex count and
//! text. Geometry coordinates are skipped.
//!
//! ```rust,ignore
//! use riskgraph_dxf::read_entities;
//!
//! let content = std::fs::read_to_string("diagram.dxf")?;
//! for entity in read_entities(&content)? {
//!     println!("{} {:?}", entity.type_name, entity.handle);
//! }
//! ```

pub mod error;
pub mod parser;
pub mod reader;

pub use error::{Error, Result};
pub use parser::{parse_group_code, GroupPair, GroupScanner};
pub use reader::{count_by_type, read_entities, read_entities_from_bytes, DxfReader};
