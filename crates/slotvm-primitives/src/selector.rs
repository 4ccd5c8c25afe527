//! Handler selector (4-byte input prefix)

use std::fmt;
use thiserror::Error;

/// Selector parsing error
#[derive(Debug, Error)]
pub enum SelectorError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid selector length: expected 4 bytes, got {0}")]
    InvalidLength(usize),
}

/// First four bytes of call input, read big-endian.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selector([u8; 4]);

impl Selector {
    /// Width of a selector in bytes
    pub const LEN: usize = 4;

    /// Create from bytes
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Selector(bytes)
    }

    /// Create from a slice of exactly four bytes
    pub fn from_slice(slice: &[u8]) -> Result<Self, SelectorError> {
        if slice.len() != Self::LEN {
            return Err(SelectorError::InvalidLength(slice.len()));
        }
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(slice);
        Ok(Selector(bytes))
    }

    /// Parse from hex string (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self, SelectorError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| SelectorError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Numeric value
    pub fn as_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Build call input: selector followed by `args`
    pub fn with_args(&self, args: &[u8]) -> Vec<u8> {
        let mut input = Vec::with_capacity(Self::LEN + args.len());
        input.extend_from_slice(&self.0);
        input.extend_from_slice(args);
        input
    }
}

impl From<u32> for Selector {
    fn from(value: u32) -> Self {
        Selector(value.to_be_bytes())
    }
}

impl From<[u8; 4]> for Selector {
    fn from(bytes: [u8; 4]) -> Self {
        Selector(bytes)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({})", self)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.as_u32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_from_u32() {
        let sel = Selector::from(0xa9059cbb);
        assert_eq!(sel.as_bytes(), &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(sel.to_string(), "0xa9059cbb");
    }

    #[test]
    fn test_selector_from_hex() {
        assert_eq!(
            Selector::from_hex("0x60fe47b1").unwrap(),
            Selector::from(0x60fe47b1)
        );
        assert_eq!(
            Selector::from_hex("60fe47b1").unwrap(),
            Selector::from(0x60fe47b1)
        );
    }

    #[test]
    fn test_selector_leading_zeros_display() {
        assert_eq!(Selector::from(1).to_string(), "0x00000001");
    }

    #[test]
    fn test_selector_invalid_length() {
        assert!(matches!(
            Selector::from_slice(&[1, 2, 3]),
            Err(SelectorError::InvalidLength(3))
        ));
        assert!(matches!(
            Selector::from_hex("0x0102030405"),
            Err(SelectorError::InvalidLength(5))
        ));
    }

    #[test]
    fn test_selector_with_args() {
        let input = Selector::from(0x01020304).with_args(&[9, 9]);
        assert_eq!(input, vec![1, 2, 3, 4, 9, 9]);
    }
}
