//! Visual attributes carried by nodes: branch colors and caption fonts

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `#rrggbb` color
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(format!("#{:02x}{:02x}{:02x}", r, g, b))
    }

    /// Parse a `#rrggbb` string (case-insensitive)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(format!("#{}", digits.to_ascii_lowercase())))
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// Random saturated color, used for branches growing out of the root
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        // Keep one channel dark so the color reads against a white canvas
        let mut channels = [
            rng.gen_range(0..=255u8),
            rng.gen_range(0..=255u8),
            rng.gen_range(0..=110u8),
        ];
        let dark = rng.gen_range(0..3);
        channels.swap(2, dark);
        Self::rgb(channels[0], channels[1], channels[2])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color: {}", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// Caption font of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub line_through: bool,
    pub color: Color,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            size: 15,
            bold: false,
            italic: false,
            underline: false,
            line_through: false,
            color: Color::black(),
        }
    }
}
