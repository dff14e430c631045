//! Field colors.
//!
//! Fields store their color as the string the user picked (so a round-trip
//! through storage is lossless); this module validates and normalizes those
//! strings before they reach the PDF backend.

use serde::{Deserialize, Serialize};

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Named colors accepted by the text tool's color picker.
const NAMED: &[(&str, Color)] = &[
    ("black", Color::rgba(0.0, 0.0, 0.0, 1.0)),
    ("white", Color::rgba(1.0, 1.0, 1.0, 1.0)),
    ("red", Color::rgba(1.0, 0.0, 0.0, 1.0)),
    ("green", Color::rgba(0.0, 1.0, 0.0, 1.0)),
    ("blue", Color::rgba(0.0, 0.0, 1.0, 1.0)),
];

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// One channel from a single nibble (`#RGB` form: `f` → `ff`).
fn short_channel(c: u8) -> Option<f32> {
    Some(f32::from(hex_val(c)? * 17) / 255.0)
}

/// One channel from two nibbles.
fn long_channel(hi: u8, lo: u8) -> Option<f32> {
    Some(f32::from(hex_val(hi)? << 4 | hex_val(lo)?) / 255.0)
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 | 4 => {
                let a = match bytes.get(3) {
                    Some(&c) => short_channel(c)?,
                    None => 1.0,
                };
                Some(Self::rgba(
                    short_channel(bytes[0])?,
                    short_channel(bytes[1])?,
                    short_channel(bytes[2])?,
                    a,
                ))
            }
            6 | 8 => {
                let a = if bytes.len() == 8 {
                    long_channel(bytes[6], bytes[7])?
                } else {
                    1.0
                };
                Some(Self::rgba(
                    long_channel(bytes[0], bytes[1])?,
                    long_channel(bytes[2], bytes[3])?,
                    long_channel(bytes[4], bytes[5])?,
                    a,
                ))
            }
            _ => None,
        }
    }

    /// Parse either a named color (case-insensitive) or a hex string.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        NAMED
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
            .map(|(_, c)| *c)
            .or_else(|| Self::from_hex(trimmed))
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (byte(self.r), byte(self.g), byte(self.b), byte(self.a));
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}
