//! Hex text form for binary leaf values.
//!
//! The tree-text format carries binary field values as a string of hex
//! digit pairs (`type="binary"` in the XML grammar). Decoded length is
//! half the string length; an odd-length string has no byte form and is
//! rejected before the digits are looked at.

use crate::error::DecodeError;

/// Encodes raw bytes as uppercase hex pairs.
pub fn encode(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Decodes a hex-pair string back into raw bytes.
pub fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    if text.len() % 2 != 0 {
        return Err(DecodeError::OddHexLength { len: text.len() });
    }
    hex::decode(text).map_err(|_| DecodeError::InvalidHexDigit)
}
