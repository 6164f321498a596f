//! RGB color values
//!
//! Colors cross the wire as CSS-style `#rrggbb` strings, so the serde
//! implementations here serialize through that form.

use core::fmt;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Linear RGB color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Pack into `0xRRGGBB`.
    pub fn to_hex(&self) -> u32 {
        let r = (self.r.clamp(0.0, 1.0) * 255.0).round() as u32;
        let g = (self.g.clamp(0.0, 1.0) * 255.0).round() as u32;
        let b = (self.b.clamp(0.0, 1.0) * 255.0).round() as u32;
        (r << 16) | (g << 8) | b
    }

    /// Parse a `#rrggbb` string.
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Self::from_hex)
    }

    /// Format as a `#rrggbb` string.
    pub fn to_css(&self) -> String {
        format!("#{:06x}", self.to_hex())
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

struct ColorVisitor;

impl Visitor<'_> for ColorVisitor {
    type Value = Color;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a #rrggbb color string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Color, E> {
        Color::parse(v).ok_or_else(|| E::custom(format!("invalid color string: {}", v)))
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        deserializer.deserialize_str(ColorVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let c = Color::from_hex(0x336699);
        assert_eq!(c.to_hex(), 0x336699);
        assert_eq!(c.to_css(), "#336699");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Color::parse("#336699"), Some(Color::from_hex(0x336699)));
        assert_eq!(Color::parse("336699"), None);
        assert_eq!(Color::parse("#33669"), None);
        assert_eq!(Color::parse("#zzzzzz"), None);
    }

    #[test]
    fn test_serde_as_css_string() {
        let json = serde_json::to_string(&Color::from_hex(0xff8000)).unwrap();
        assert_eq!(json, "\"#ff8000\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_hex(), 0xff8000);
    }
}
