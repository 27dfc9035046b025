//! Hex payload representation: `0x` followed by one or more digit pairs,
//! case-insensitive on input, always lower-case on output.

use thiserror::Error;

use crate::format::HEX_PREFIX;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("payload is missing the `0x` prefix")]
    MissingPrefix,
    #[error("payload has no hex digits after the prefix")]
    Empty,
    #[error("payload has an odd number of hex digits ({0}); expected whole bytes")]
    OddLength(usize),
    #[error("invalid hex digit {ch:?} at offset {offset}")]
    InvalidDigit { ch: char, offset: usize },
}

/// Strip the `0x`/`0X` prefix, returning the digit string.
pub fn strip_prefix(payload: &str) -> Result<&str, PayloadError> {
    let prefix_len = HEX_PREFIX.len();
    match payload.get(..prefix_len) {
        Some(p) if p.eq_ignore_ascii_case(HEX_PREFIX) => Ok(&payload[prefix_len..]),
        _ => Err(PayloadError::MissingPrefix),
    }
}

/// Check that `payload` is a well-formed hex payload and return its digits.
///
/// Does not allocate; the parser uses this to classify lines before any
/// bytes are decoded.
pub fn validate(payload: &str) -> Result<&str, PayloadError> {
    let digits = strip_prefix(payload)?;
    if digits.is_empty() {
        return Err(PayloadError::Empty);
    }
    if let Some((offset, ch)) = digits.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(PayloadError::InvalidDigit { ch, offset });
    }
    if digits.len() % 2 != 0 {
        return Err(PayloadError::OddLength(digits.len()));
    }
    Ok(digits)
}

/// Decode a prefixed hex payload into exactly `digits / 2` bytes.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, PayloadError> {
    let digits = validate(payload)?;
    hex::decode(digits).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, index } => {
            PayloadError::InvalidDigit { ch: c, offset: index }
        }
        hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
            PayloadError::OddLength(digits.len())
        }
    })
}

/// Encode bytes as a lower-case `0x`-prefixed payload. Empty input encodes as `0x`.
pub fn encode_payload(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(HEX_PREFIX.len() + bytes.len() * 2);
    out.push_str(HEX_PREFIX);
    out.push_str(&hex::encode(bytes));
    out
}

/// Number of bytes a prefixed payload decodes to, without decoding it.
pub fn payload_len(payload: &str) -> Result<usize, PayloadError> {
    validate(payload).map(|digits| digits.len() / 2)
}
