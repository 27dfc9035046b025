use std::iter::Enumerate;
use std::str::Lines;

use thiserror::Error;

use crate::format::{DEFAULT_PREVIEW_LEN, HEX_PREFIX, NAME_SEPARATOR};
use crate::payload::{self, PayloadError};

/// Why a line could not be read as `Name: 0xHEX`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("missing `:` between name and payload")]
    MissingSeparator,
    #[error("record name is empty")]
    EmptyName,
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("invalid base64 payload: {0}")]
    Base64(String),
}

/// A line that was skipped. `excerpt` is a truncated preview of the line and
/// stands in for the record name wherever one is needed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason} ({excerpt:?})")]
pub struct MalformedRecord {
    pub line: usize,
    pub excerpt: String,
    pub reason: MalformedReason,
}

impl MalformedRecord {
    pub fn new(line: usize, raw: &str, reason: MalformedReason, preview_len: usize) -> Self {
        Self {
            line,
            excerpt: preview(raw, preview_len),
            reason,
        }
    }
}

/// One well-formed line: the trimmed name and the still-encoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedRecord<'a> {
    /// 1-based line number in the source text.
    pub line: usize,
    pub name: &'a str,
    /// Prefixed hex payload, already validated.
    pub payload: &'a str,
}

impl ParsedRecord<'_> {
    /// Decoded payload size in bytes.
    pub fn payload_len(&self) -> usize {
        self.payload.len().saturating_sub(HEX_PREFIX.len()) / 2
    }
}

/// Tokenizer for record text.
///
/// Grammar, one record per line, blank lines ignored:
/// ```text
/// record  := name ':' ws* payload ws*
/// name    := [^:\n]+            (trimmed, must be non-empty)
/// payload := ('0x' | '0X') (hexdigit hexdigit)+
/// ```
pub struct RecordParser<'a> {
    text: &'a str,
    preview_len: usize,
}

impl<'a> RecordParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            preview_len: DEFAULT_PREVIEW_LEN,
        }
    }

    pub fn with_preview_len(mut self, preview_len: usize) -> Self {
        self.preview_len = preview_len;
        self
    }

    /// A fresh pass over the text. Call again (or clone the iterator) to restart.
    pub fn records(&self) -> Records<'a> {
        Records {
            lines: self.text.lines().enumerate(),
            preview_len: self.preview_len,
        }
    }
}

/// Lazy record stream, one item per non-blank line, in input order.
#[derive(Clone)]
pub struct Records<'a> {
    lines: Enumerate<Lines<'a>>,
    preview_len: usize,
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<ParsedRecord<'a>, MalformedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, line) in self.lines.by_ref() {
            if line.trim().is_empty() {
                continue;
            }
            return Some(parse_line(idx + 1, line, self.preview_len));
        }
        None
    }
}

/// Parse a single non-blank line.
pub fn parse_line(line_no: usize, line: &str, preview_len: usize) -> Result<ParsedRecord<'_>, MalformedRecord> {
    let malformed = |reason| MalformedRecord::new(line_no, line, reason, preview_len);

    let (name, rest) = line
        .split_once(NAME_SEPARATOR)
        .ok_or_else(|| malformed(MalformedReason::MissingSeparator))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(malformed(MalformedReason::EmptyName));
    }

    let payload = rest.trim();
    payload::validate(payload).map_err(|e| malformed(e.into()))?;

    Ok(ParsedRecord {
        line: line_no,
        name,
        payload,
    })
}

/// First `max_chars` characters of `line`, with `...` appended when cut.
pub fn preview(line: &str, max_chars: usize) -> String {
    let line = line.trim();
    match line.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("héllo world", 3), "hél...");
        assert_eq!(preview("short", 50), "short");
    }

    #[test]
    fn name_is_trimmed_and_payload_may_trail_whitespace() {
        let rec = parse_line(1, "  Eyes Group :\t0xABcd  \r", 50).unwrap();
        assert_eq!(rec.name, "Eyes Group");
        assert_eq!(rec.payload, "0xABcd");
        assert_eq!(rec.payload_len(), 2);
    }

    #[test]
    fn payload_len_agrees_with_decoded_size() {
        for line in ["A: 0x00", "B: 0XdeadBEEF", "C:0x0102030405060708"] {
            let rec = parse_line(1, line, 50).unwrap();
            assert_eq!(Ok(rec.payload_len()), payload::payload_len(rec.payload));
            assert_eq!(rec.payload_len(), payload::decode_payload(rec.payload).unwrap().len());
        }
    }

    #[test]
    fn only_the_first_colon_separates() {
        let err = parse_line(4, "a: b: 0x00", 50).unwrap_err();
        assert_eq!(err.line, 4);
        assert!(matches!(
            err.reason,
            MalformedReason::Payload(PayloadError::MissingPrefix)
        ));
    }
}
