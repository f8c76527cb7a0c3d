// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! DXF group-pair tokenizer
//!
//! ASCII DXF is a flat sequence of two-line pairs: an integer group code,
//! then its value. Lines end in `\n` or `\r\n`. Values are borrowed from the
//! input without copying.

use nom::{
    character::complete::{char, digit1, space0},
    combinator::{all_consuming, map_res, opt, recognize},
    sequence::{delimited, pair},
    IResult,
};

use crate::error::{Error, Result};

/// One group code / value pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPair<'a> {
    pub code: i32,
    pub value: &'a str,
    /// 1-based line number of the group code.
    pub line: usize,
}

impl<'a> GroupPair<'a> {
    /// `true` for the `0` pair that starts an entity or structure marker.
    #[inline]
    pub fn is_marker(&self, name: &str) -> bool {
        self.code == 0 && self.value.trim() == name
    }

    /// Value as an integer (codes 60-99, 170-179, 270-289, 420-429, ...).
    pub fn as_i64(&self) -> Option<i64> {
        lexical_core::parse::<i64>(self.value.trim().as_bytes()).ok()
    }

    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|v| i32::try_from(v).ok())
    }

    pub fn as_u32(&self) -> Option<u32> {
        self.as_i64().and_then(|v| u32::try_from(v).ok())
    }
}

/// Parse a group code line: optional sign and digits, surrounded by blanks.
fn group_code(input: &str) -> IResult<&str, i32> {
    all_consuming(delimited(
        space0,
        map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
            lexical_core::parse::<i32>(s.as_bytes())
        }),
        space0,
    ))(input)
}

/// Parse a group code line, reporting `line` on failure.
pub fn parse_group_code(text: &str, line: usize) -> Result<i32> {
    group_code(text)
        .map(|(_, code)| code)
        .map_err(|_| Error::InvalidGroupCode {
            line,
            text: text.to_string(),
        })
}

/// Streaming scanner over group pairs.
pub struct GroupScanner<'a> {
    content: &'a str,
    position: usize,
    line: usize,
}

impl<'a> GroupScanner<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            position: 0,
            line: 0,
        }
    }

    /// Next line without its terminator, or `None` at end of input.
    fn next_line(&mut self) -> Option<&'a str> {
        if self.position >= self.content.len() {
            return None;
        }

        let remaining = &self.content[self.position..];
        let (raw, advance) = match memchr::memchr(b'\n', remaining.as_bytes()) {
            Some(offset) => (&remaining[..offset], offset + 1),
            None => (remaining, remaining.len()),
        };

        self.position += advance;
        self.line += 1;
        Some(raw.strip_suffix('\r').unwrap_or(raw))
    }
}

impl<'a> Iterator for GroupScanner<'a> {
    type Item = Result<GroupPair<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let code_text = self.next_line()?;
        let line = self.line;

        // Blank trailing lines after the last pair are tolerated.
        if code_text.trim().is_empty() && self.content[self.position..].trim().is_empty() {
            self.position = self.content.len();
            return None;
        }

        let code = match parse_group_code(code_text, line) {
            Ok(code) => code,
            Err(e) => return Some(Err(e)),
        };

        match self.next_line() {
            Some(value) => Some(Ok(GroupPair { code, value, line })),
            None => Some(Err(Error::DanglingGroupCode { line, code })),
        }
    }
}
