//! Hardware (MAC) addresses

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Hardware address must contain exactly 12 hex digits, found {0}")]
    WrongLength(usize),
    #[error("Invalid hex digit '{0}' in hardware address")]
    InvalidDigit(char),
    #[error("Hardware address must be six two-digit groups separated by ':' or '-'")]
    NotGrouped,
}

/// 6-byte hardware address of a network interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HardwareAddress([u8; 6]);

impl HardwareAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Parse any text holding exactly 12 hex digits once `:` and `-` are removed.
    ///
    /// Separators may appear anywhere and case is ignored, so `ac5af0-e58c25`
    /// and `AC:5A:F0:E5:8C:25` decode to the same address.
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        let digits: String = text.chars().filter(|c| *c != ':' && *c != '-').collect();
        if let Some(c) = digits.chars().find(|c| !c.is_ascii()) {
            return Err(AddressError::InvalidDigit(c));
        }
        if digits.len() != 12 {
            return Err(AddressError::WrongLength(digits.len()));
        }

        let mut octets = [0u8; 6];
        hex::decode_to_slice(&digits, &mut octets).map_err(|e| match e {
            hex::FromHexError::InvalidHexCharacter { c, .. } => AddressError::InvalidDigit(c),
            _ => AddressError::WrongLength(digits.len()),
        })?;
        Ok(Self(octets))
    }

    /// Parse the canonical `XX:XX:XX:XX:XX:XX` (or hyphenated) form only.
    pub fn parse_grouped(text: &str) -> Result<Self, AddressError> {
        let groups: Vec<&str> = text.split([':', '-']).collect();
        if groups.len() != 6 || groups.iter().any(|g| g.len() != 2) {
            return Err(AddressError::NotGrouped);
        }
        Self::parse(text)
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for HardwareAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HardwareAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HardwareAddress> for String {
    fn from(value: HardwareAddress) -> Self {
        value.to_string()
    }
}
