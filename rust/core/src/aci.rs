// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! AutoCAD Color Index (ACI) decoding.
//!
//! DXF stores entity colors as palette indices (group code 62). The default
//! palette is laid out as:
//!
//! - `1..=9`: the standard colors (red, yellow, green, cyan, blue, magenta,
//!   white, dark gray, gray)
//! - `10..=249`: a hue wheel of 24 hues in 15° steps; each hue has 5 value
//!   levels, and each level a saturated and a pale variant
//! - `250..=255`: a gray ramp
//!
//! `0` is BYBLOCK and `256` is BYLAYER. Neither names a color on its own.

use crate::color::Rgb;

/// ACI code meaning "inherit from the enclosing block".
pub const BYBLOCK: i32 = 0;
/// ACI code meaning "inherit from the entity's layer".
pub const BYLAYER: i32 = 256;

const STANDARD: [Rgb; 9] = [
    Rgb::new(255, 0, 0),
    Rgb::new(255, 255, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(0, 255, 255),
    Rgb::new(0, 0, 255),
    Rgb::new(255, 0, 255),
    Rgb::new(255, 255, 255),
    Rgb::new(65, 65, 65),
    Rgb::new(128, 128, 128),
];

const GRAYS: [u8; 6] = [51, 80, 105, 130, 190, 255];

/// Value levels of the hue wheel, brightest first.
const LEVELS: [u32; 5] = [255, 189, 129, 104, 79];

/// Decode an ACI code to RGB. Returns `None` for BYBLOCK, BYLAYER and codes
/// outside `1..=255`.
pub fn aci_to_rgb(code: i32) -> Option<Rgb> {
    match code {
        1..=9 => Some(STANDARD[(code - 1) as usize]),
        10..=249 => Some(hue_wheel((code - 10) as u32)),
        250..=255 => {
            let v = GRAYS[(code - 250) as usize];
            Some(Rgb::new(v, v, v))
        }
        _ => None,
    }
}

fn hue_wheel(offset: u32) -> Rgb {
    let hue = (offset / 10) * 15;
    let shade = offset % 10;
    let value = LEVELS[(shade / 2) as usize];
    let pale = shade % 2 == 1;

    let [r, g, b] = full_hue(hue).map(|c| {
        let scaled = c * value / 255;
        if pale {
            scaled + (value - scaled) * 2 / 3
        } else {
            scaled
        }
    });

    Rgb::new(r as u8, g as u8, b as u8)
}

/// Fully saturated color at value 255 for a hue in degrees (`0..360`).
fn full_hue(hue: u32) -> [u32; 3] {
    let rem = hue % 60;
    let rising = rem * 255 / 60;
    let falling = (60 - rem) * 255 / 60;

    match hue / 60 {
        0 => [255, rising, 0],
        1 => [falling, 255, 0],
        2 => [0, 255, rising],
        3 => [0, falling, 255],
        4 => [rising, 0, 255],
        _ => [255, 0, falling],
    }
}
