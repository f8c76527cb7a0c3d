// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for DXF reading
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that make a DXF document unreadable
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid UTF-8 in DXF content: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Binary DXF is not supported")]
    BinaryDxf,

    #[error("Invalid group code {text:?} at line {line}")]
    InvalidGroupCode { line: usize, text: String },

    #[error("Group code {code} at line {line} has no value line")]
    DanglingGroupCode { line: usize, code: i32 },

    #[error("SECTION at line {line} has no name")]
    UnnamedSection { line: usize },

    #[error("Section {name} is not terminated by ENDSEC")]
    UnterminatedSection { name: String },
}
