//! RGB color values, parsing, and tolerance matching.
//!
//! The canonical text form for a color is uppercase `#RRGGBB`. Parsing
//! accepts either case and an optional leading `#`; anything else is a
//! typed parse error, never a clamped or partial value, so a malformed
//! target color cannot be mistaken for a color that simply is not on
//! screen.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error parsing a `#RRGGBB` color string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ColorParseError {
    /// Wrong number of characters after the optional `#`.
    #[error("expected 6 hex digits, got {0}")]
    BadLength(usize),
    /// A character outside `[0-9a-fA-F]`.
    #[error("invalid hex digit {0:?}")]
    BadDigit(char),
}

/// An 8-bit-per-channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel tolerance match.
    ///
    /// True when every channel differs by at most `tolerance`. A tolerance
    /// of 0 is exact equality; 255 matches any color. The comparison is
    /// independent per channel, not a distance in color space.
    pub fn matches(&self, other: Color, tolerance: u8) -> bool {
        channel_close(self.r, other.r, tolerance)
            && channel_close(self.g, other.g, tolerance)
            && channel_close(self.b, other.b, tolerance)
    }
}

fn channel_close(a: u8, b: u8, tolerance: u8) -> bool {
    (i16::from(a) - i16::from(b)).abs() <= i16::from(tolerance)
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.chars().count() != 6 {
            return Err(ColorParseError::BadLength(hex.chars().count()));
        }

        let mut channels = [0u8; 3];
        for (i, c) in hex.chars().enumerate() {
            let digit = c.to_digit(16).ok_or(ColorParseError::BadDigit(c))? as u8;
            channels[i / 2] = channels[i / 2] * 16 + digit;
        }
        Ok(Color::new(channels[0], channels[1], channels[2]))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

// Colors cross the CLI, script files, and JSON output as strings, so serde
// uses the same canonical form as Display/FromStr.
impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A target color plus the per-channel tolerance that counts as a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSpec {
    pub color: Color,
    #[serde(default)]
    pub tolerance: u8,
}

impl ColorSpec {
    pub const fn new(color: Color, tolerance: u8) -> Self {
        Self { color, tolerance }
    }

    pub const fn exact(color: Color) -> Self {
        Self {
            color,
            tolerance: 0,
        }
    }

    /// Whether `candidate` counts as this color.
    pub fn is_match(&self, candidate: Color) -> bool {
        self.color.matches(candidate, self.tolerance)
    }
}

/// A color expected at a fixed offset from a multi-point anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetColor {
    pub dx: i32,
    pub dy: i32,
    #[serde(flatten)]
    pub spec: ColorSpec,
}

/// An anchor color plus offset colors that must all match around it.
///
/// Used to pin down UI features a single pixel cannot identify: the anchor
/// pixel matches, and every offset pixel relative to it matches too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiColorSpec {
    pub anchor: ColorSpec,
    pub offsets: Vec<OffsetColor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_hash() {
        assert_eq!("#FF5500".parse::<Color>().unwrap(), Color::new(255, 85, 0));
        assert_eq!("FF5500".parse::<Color>().unwrap(), Color::new(255, 85, 0));
    }

    #[test]
    fn parses_lowercase() {
        assert_eq!("#ff5500".parse::<Color>().unwrap(), Color::new(255, 85, 0));
        assert_eq!("#aAbBcC".parse::<Color>().unwrap(), Color::new(0xAA, 0xBB, 0xCC));
    }

    #[test]
    fn format_is_canonical_uppercase() {
        let c = Color::new(255, 85, 0);
        assert_eq!(c.to_string(), "#FF5500");
        assert_eq!(Color::new(0, 0, 0).to_string(), "#000000");
        assert_eq!(Color::new(1, 2, 3).to_string(), "#010203");
    }

    #[test]
    fn parse_format_round_trip() {
        for s in ["#abcdef", "ABCDEF", "#012345", "fFfFfF"] {
            let c: Color = s.parse().unwrap();
            let canonical = c.to_string();
            assert_eq!(canonical.parse::<Color>().unwrap(), c);
            assert!(canonical.starts_with('#'));
            assert_eq!(canonical.to_uppercase(), canonical);
        }
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            "12345".parse::<Color>(),
            Err(ColorParseError::BadLength(5))
        );
        assert_eq!(
            "1234567".parse::<Color>(),
            Err(ColorParseError::BadLength(7))
        );
        assert_eq!("".parse::<Color>(), Err(ColorParseError::BadLength(0)));
        assert_eq!("#".parse::<Color>(), Err(ColorParseError::BadLength(0)));
    }

    #[test]
    fn rejects_non_hex_digits() {
        assert_eq!(
            "#GGGGGG".parse::<Color>(),
            Err(ColorParseError::BadDigit('G'))
        );
        assert_eq!(
            "12345z".parse::<Color>(),
            Err(ColorParseError::BadDigit('z'))
        );
    }

    #[test]
    fn only_one_hash_is_stripped() {
        assert_eq!(
            "##FF5500".parse::<Color>(),
            Err(ColorParseError::BadLength(7))
        );
    }

    #[test]
    fn matches_is_reflexive() {
        let c = Color::new(12, 200, 7);
        for tolerance in [0, 1, 10, 255] {
            assert!(c.matches(c, tolerance));
        }
    }

    #[test]
    fn matches_is_symmetric() {
        let a = Color::new(100, 100, 100);
        let b = Color::new(110, 95, 100);
        assert_eq!(a.matches(b, 10), b.matches(a, 10));
        assert_eq!(a.matches(b, 5), b.matches(a, 5));
    }

    #[test]
    fn matches_per_channel_boundary() {
        let a = Color::new(100, 100, 100);
        // One channel off by exactly the tolerance still matches.
        assert!(a.matches(Color::new(110, 100, 100), 10));
        // One past the tolerance fails, even if the others are exact.
        assert!(!a.matches(Color::new(111, 100, 100), 10));
        // Every channel must be within tolerance independently.
        assert!(!a.matches(Color::new(105, 105, 120), 10));
    }

    #[test]
    fn max_tolerance_matches_everything() {
        assert!(Color::new(0, 0, 0).matches(Color::new(255, 255, 255), 255));
    }

    #[test]
    fn serde_uses_canonical_string_form() {
        let c = Color::new(255, 85, 0);
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#FF5500\"");
        let parsed: Color = serde_json::from_str("\"#ff5500\"").unwrap();
        assert_eq!(parsed, c);
        assert!(serde_json::from_str::<Color>("\"nonsense\"").is_err());
    }

    #[test]
    fn color_spec_applies_tolerance() {
        let spec = ColorSpec::new(Color::new(200, 0, 0), 10);
        assert!(spec.is_match(Color::new(195, 5, 9)));
        assert!(!spec.is_match(Color::new(180, 0, 0)));
        assert!(ColorSpec::exact(Color::new(1, 2, 3)).is_match(Color::new(1, 2, 3)));
    }
}
