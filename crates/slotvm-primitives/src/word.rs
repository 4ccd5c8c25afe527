//! 256-bit word helpers

use crate::error::PrimitiveError;

/// 256-bit unsigned integer, the universal storage and memory unit
pub type Word = primitive_types::U256;

/// Width of a word in bytes
pub const WORD_BYTES: usize = 32;

/// Width of a word in bits
pub const WORD_BITS: u32 = 256;

/// Big-endian bytes of a word
pub fn to_bytes32(word: &Word) -> [u8; 32] {
    let mut out = [0u8; 32];
    word.to_big_endian(&mut out);
    out
}

/// Word from 32 big-endian bytes
pub fn from_bytes32(bytes: &[u8; 32]) -> Word {
    Word::from_big_endian(bytes)
}

/// Mask with the low `width` bits set.
///
/// `width` of 256 or more yields an all-ones word.
pub fn low_mask(width: u32) -> Word {
    if width >= WORD_BITS {
        Word::MAX
    } else if width == 0 {
        Word::zero()
    } else {
        (Word::one() << width as usize) - Word::one()
    }
}

/// Convert to `usize` if the value fits
pub fn word_to_usize(word: &Word) -> Option<usize> {
    if word.bits() > usize::BITS as usize {
        return None;
    }
    usize::try_from(word.low_u128()).ok()
}

/// Whether the word is negative when read as two's complement
pub fn is_negative(word: &Word) -> bool {
    word.bit(255)
}

/// Two's-complement signed less-than
pub fn signed_lt(a: &Word, b: &Word) -> bool {
    match (is_negative(a), is_negative(b)) {
        (true, false) => true,
        (false, true) => false,
        // same sign: unsigned order matches signed order
        _ => a < b,
    }
}

/// Parse a word from `0x`-prefixed hex or from decimal
pub fn parse_word(s: &str) -> Result<Word, PrimitiveError> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.is_empty() || hex.len() > 64 {
            return Err(PrimitiveError::InvalidWord(s.to_string()));
        }
        Word::from_str_radix(hex, 16).map_err(|_| PrimitiveError::InvalidWord(s.to_string()))
    } else {
        Word::from_dec_str(s).map_err(|_| PrimitiveError::InvalidWord(s.to_string()))
    }
}
