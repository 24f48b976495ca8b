// src/color.rs

//! Defines the `Rgb` base color type and its packing/parsing helpers.
//!
//! Base colors arrive as 24-bit packed integers (bits 16-23 red, 8-15 green,
//! 0-7 blue) or as their textual spellings (`#RRGGBB`, `0xRRGGBB`, decimal).

use std::fmt;
use std::str::FromStr;

/// Largest value a packed 24-bit color may hold.
pub const MAX_PACKED_RGB: u32 = 0x00FF_FFFF;

/// A 24-bit RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Unpacks a `0xRRGGBB` value. Returns `None` if any bit above bit 23 is set.
    pub fn from_packed(packed: u32) -> Option<Self> {
        if packed > MAX_PACKED_RGB {
            return None;
        }
        Some(Rgb {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        })
    }

    /// Packs the color as `0xRRGGBB`.
    pub const fn to_packed(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Rgb { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Reasons a textual color could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseColorError {
    Empty,
    /// The text is not a valid hex or decimal number.
    InvalidDigits(String),
    /// `#` notation requires exactly six hex digits.
    WrongHexLength(String),
    /// The number does not fit in 24 bits.
    OutOfRange(u64),
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseColorError::Empty => write!(f, "empty color value"),
            ParseColorError::InvalidDigits(text) => write!(f, "invalid color value '{}'", text),
            ParseColorError::WrongHexLength(text) => {
                write!(f, "'{}' must have exactly six hex digits after '#'", text)
            }
            ParseColorError::OutOfRange(value) => write!(
                f,
                "color value {:#X} exceeds 24 bits (max {:#08X})",
                value, MAX_PACKED_RGB
            ),
        }
    }
}

impl std::error::Error for ParseColorError {}

/// Converts a wide integer into a color, rejecting anything above 24 bits.
pub fn rgb_from_u64(value: u64) -> Result<Rgb, ParseColorError> {
    u32::try_from(value)
        .ok()
        .and_then(Rgb::from_packed)
        .ok_or(ParseColorError::OutOfRange(value))
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Accepts `#RRGGBB`, `0xRRGGBB` (any digit count up to 24 bits) or a
    /// decimal packed value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(ParseColorError::Empty);
        }

        let invalid = || ParseColorError::InvalidDigits(text.to_string());

        // `from_str_radix` tolerates a leading sign, so check the digits first.
        let (digits, radix) = if let Some(hex) = text.strip_prefix('#') {
            if hex.len() != 6 {
                return Err(ParseColorError::WrongHexLength(text.to_string()));
            }
            (hex, 16)
        } else if let Some(hex) = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
        {
            (hex, 16)
        } else {
            (text, 10)
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(invalid());
        }

        let value = u64::from_str_radix(digits, radix).map_err(|_| invalid())?;

        rgb_from_u64(value)
    }
}
