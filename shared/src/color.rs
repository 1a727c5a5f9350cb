//! Colour strings as accepted on the control surface
//!
//! Two forms are valid: `#RRGGBB` and `#RRGGBB(WW)` where `WW` is the white
//! channel of RGBW strips. Hex digits are case-insensitive.

use std::fmt;
use std::str::FromStr;

use crate::frame::ValidationError;

const SHORT_FORM_LEN: usize = 7;
const WHITE_FORM_LEN: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

impl Color {
    pub const fn rgbw(r: u8, g: u8, b: u8, w: u8) -> Self {
        Self { r, g, b, w }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, w: 0 }
    }

    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidColor(text.to_string());
        let bytes = text.as_bytes();

        if bytes.first() != Some(&b'#') {
            return Err(invalid());
        }

        let w = match bytes.len() {
            SHORT_FORM_LEN => 0,
            WHITE_FORM_LEN => {
                if bytes[7] != b'(' || bytes[10] != b')' {
                    return Err(invalid());
                }
                hex_pair(&bytes[8..10]).ok_or_else(invalid)?
            }
            _ => return Err(invalid()),
        };

        Ok(Self {
            r: hex_pair(&bytes[1..3]).ok_or_else(invalid)?,
            g: hex_pair(&bytes[3..5]).ok_or_else(invalid)?,
            b: hex_pair(&bytes[5..7]).ok_or_else(invalid)?,
            w,
        })
    }
}

impl FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.w != 0 {
            write!(f, "({:02x})", self.w)?;
        }
        Ok(())
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn hex_pair(pair: &[u8]) -> Option<u8> {
    Some(hex_digit(pair[0])? << 4 | hex_digit(pair[1])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb() {
        assert_eq!(Color::parse("#ff8000"), Ok(Color::rgb(0xff, 0x80, 0x00)));
        assert_eq!(Color::parse("#FF8000"), Ok(Color::rgb(0xff, 0x80, 0x00)));
    }

    #[test]
    fn test_parse_rgbw() {
        assert_eq!(
            Color::parse("#102030(40)"),
            Ok(Color::rgbw(0x10, 0x20, 0x30, 0x40))
        );
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in [
            "red", "#ABC", "#ABCDEF0", "#ABCDEFGH", "", "#", "ff8000", "x102030(40)",
            "#102030[40]", "#10203g", "#102030(4z)", "#1020304050",
        ] {
            assert!(
                matches!(Color::parse(bad), Err(ValidationError::InvalidColor(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Color::rgb(1, 2, 3).to_string(), "#010203");
        assert_eq!(Color::rgbw(1, 2, 3, 4).to_string(), "#010203(04)");
    }
}
