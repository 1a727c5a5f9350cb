//! 64-bit radio device addresses

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of hex digits in the text form of an address
pub const ADDRESS_TEXT_LEN: usize = 12;

/// Address of the gateway or of one enrolled peer.
///
/// Only the low 48 bits are used on air; the text form is always twelve
/// lower-case hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DeviceAddress(u64);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("device address must be {ADDRESS_TEXT_LEN} hex digits, got {0:?}")]
    InvalidLength(String),

    #[error("device address is not hex: {0:?}")]
    InvalidHex(String),
}

impl DeviceAddress {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    pub fn from_le_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_le_bytes(bytes))
    }
}

impl From<u64> for DeviceAddress {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:012x}", self.0)
    }
}

impl FromStr for DeviceAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_TEXT_LEN {
            return Err(AddressError::InvalidLength(s.to_string()));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidHex(s.to_string()));
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| AddressError::InvalidHex(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_twelve_hex_digits() {
        let addr = DeviceAddress::new(0x0000_8365_1a2b);
        assert_eq!(addr.to_string(), "000083651a2b");
        assert_eq!(DeviceAddress::new(1).to_string(), "000000000001");
    }

    #[test]
    fn test_parse() {
        let addr: DeviceAddress = "836d19821abc".parse().expect("valid address");
        assert_eq!(addr.raw(), 0x836d_1982_1abc);
        assert_eq!(addr.to_string(), "836d19821abc");

        let upper: DeviceAddress = "836D19821ABC".parse().expect("valid address");
        assert_eq!(upper, addr);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            "836d1982".parse::<DeviceAddress>(),
            Err(AddressError::InvalidLength(_))
        ));
        assert!(matches!(
            "836d19821abz".parse::<DeviceAddress>(),
            Err(AddressError::InvalidHex(_))
        ));
        assert!(matches!(
            "+36d19821abc".parse::<DeviceAddress>(),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_le_bytes() {
        let addr = DeviceAddress::new(0x0102_0304_0506);
        assert_eq!(addr.to_le_bytes(), [6, 5, 4, 3, 2, 1, 0, 0]);
        assert_eq!(DeviceAddress::from_le_bytes(addr.to_le_bytes()), addr);
    }
}
