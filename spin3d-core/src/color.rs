/// CSS-style colors for materials, lights and the parameter panel
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use crate::error::ColorError;

/// Linear-ish RGB in `[0, 1]`. Stored as parsed, no gamma handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

const NAMED: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("orange", [255, 165, 0]),
    ("skyblue", [135, 206, 235]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("purple", [128, 0, 128]),
    ("hotpink", [255, 105, 180]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
];

/// Colors offered when stepping a color parameter without a picker.
pub const PALETTE: &[&str] = &[
    "orange", "red", "hotpink", "purple", "blue", "skyblue", "cyan", "green", "yellow", "white",
];

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const ORANGE: Color = Color::rgb(1.0, 165.0 / 255.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn scale(self, k: f32) -> Self {
        Self::rgb(self.r * k, self.g * k, self.b * k)
    }

    /// Component-wise product, used for light * albedo
    pub fn modulate(self, other: Color) -> Self {
        Self::rgb(self.r * other.r, self.g * other.g, self.b * other.b)
    }

    pub fn clamped(self) -> Self {
        Self::rgb(self.r.clamp(0.0, 1.0), self.g.clamp(0.0, 1.0), self.b.clamp(0.0, 1.0))
    }

    /// Perceived brightness in `[0, 1]`
    pub fn luminance(self) -> f32 {
        let c = self.clamped();
        0.2126 * c.r + 0.7152 * c.g + 0.0722 * c.b
    }

    /// Palette entry after (or before) this color. Unknown colors
    /// start from the first entry.
    pub fn cycle(self, forward: bool) -> Color {
        let parsed: Vec<Color> = PALETTE.iter().filter_map(|n| n.parse().ok()).collect();
        let n = parsed.len();
        let next = match parsed.iter().position(|c| c.to_bytes() == self.to_bytes()) {
            Some(i) if forward => (i + 1) % n,
            Some(i) => (i + n - 1) % n,
            None => 0,
        };
        parsed[next]
    }
}

fn parse_hex(digits: &str) -> Option<Color> {
    let expand = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, ch) in digits.chars().enumerate() {
                let v = ch.to_digit(16)? as u8;
                out[i] = v * 17;
            }
            Some(Color::from_bytes(out[0], out[1], out[2]))
        }
        6 => Some(Color::from_bytes(
            expand(&digits[0..2])?,
            expand(&digits[2..4])?,
            expand(&digits[4..6])?,
        )),
        _ => None,
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ColorError::Empty);
        }
        if let Some(digits) = s.strip_prefix('#') {
            if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ColorError::InvalidHex(s.to_string()));
            }
            return parse_hex(digits).ok_or_else(|| ColorError::InvalidHex(s.to_string()));
        }
        let lower = s.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, [r, g, b])| Color::from_bytes(*r, *g, *b))
            .ok_or_else(|| ColorError::UnknownName(s.to_string()))
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, other: Color) -> Color {
        Color::rgb(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_and_hex() {
        assert_eq!("orange".parse::<Color>().unwrap(), Color::ORANGE);
        assert_eq!("#ffffff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("SkyBlue".parse::<Color>().unwrap().to_hex(), "#87ceeb");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Color>(), Err(ColorError::Empty));
        assert!(matches!("#12".parse::<Color>(), Err(ColorError::InvalidHex(_))));
        assert!(matches!("#gggggg".parse::<Color>(), Err(ColorError::InvalidHex(_))));
        assert!(matches!("chartreuse-ish".parse::<Color>(), Err(ColorError::UnknownName(_))));
    }

    #[test]
    fn test_serializes_as_hex() {
        assert_eq!(serde_json::to_string(&Color::WHITE).unwrap(), "\"#ffffff\"");
        let orange = serde_json::to_value(Color::ORANGE).unwrap();
        assert_eq!(orange.as_str().unwrap().parse::<Color>().unwrap(), Color::ORANGE);
    }

    #[test]
    fn test_cycle_wraps() {
        let first: Color = PALETTE[0].parse().unwrap();
        let last: Color = PALETTE[PALETTE.len() - 1].parse().unwrap();
        assert_eq!(last.cycle(true), first);
        assert_eq!(first.cycle(false), last);
        assert_eq!(Color::rgb(0.01, 0.02, 0.03).cycle(true), first);
    }
}
