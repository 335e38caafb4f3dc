//! Self-describing fragment header.
//!
//! Every embedded fragment starts with an ASCII header of the form
//! `STEG|IIII|TTTT|LLLLLLLL|` followed by `LLLLLLLL` raw payload bytes.
//!
//! ```rust
//! use stegashard_core::header::Header;
//!
//! let header = Header::new(1, 3, 4);
//! let bytes = header.encode().unwrap();
//! assert_eq!(bytes, b"STEG|0001|0003|00000004|");
//! assert_eq!(Header::decode(&bytes), Some((header, 24)));
//! ```

use crate::error::ShardError;
use crate::result::Result;

/// marks the beginning of a header, the trailing `|` is part of it
pub const MAGIC: &[u8] = b"STEG|";
pub const FIELD_SEPARATOR: u8 = b'|';
pub const INDEX_DIGITS: usize = 4;
pub const TOTAL_DIGITS: usize = 4;
pub const LENGTH_DIGITS: usize = 8;
/// byte length of a header whose fields fit their digit widths
pub const NOMINAL_HEADER_LEN: usize = MAGIC.len() + INDEX_DIGITS + 1 + TOTAL_DIGITS + 1 + LENGTH_DIGITS + 1;
/// how many bytes the extractor reads first when looking for a header
pub const DEFAULT_PROBE_BYTES: usize = 512;

const MAX_INDEX: u64 = 9_999;
const MAX_TOTAL: u64 = 9_999;
const MAX_LENGTH: u64 = 99_999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub index: u32,
    pub total: u32,
    pub length: u64,
}

/// outcome of looking at a byte prefix that might start with a header
#[derive(Debug, PartialEq, Eq)]
pub enum Decoded {
    /// the prefix does not start with [`MAGIC`]
    NoMagic,
    /// magic found, but not all field separators are within the prefix
    Truncated,
    /// all separators found, but the fields are no valid numbers
    Invalid,
    /// a header plus its exact byte length
    Header(Header, usize),
}

impl Header {
    pub fn new(index: u32, total: u32, length: u64) -> Self {
        Self {
            index,
            total,
            length,
        }
    }

    /// Formats the header into its wire representation.
    ///
    /// Fails with [`ShardError::HeaderFieldOverflow`] if a field does not fit into its digit budget,
    /// the field is never widened.
    pub fn encode(&self) -> Result<Vec<u8>> {
        check_width("index", self.index as u64, MAX_INDEX, INDEX_DIGITS)?;
        check_width("total", self.total as u64, MAX_TOTAL, TOTAL_DIGITS)?;
        check_width("length", self.length, MAX_LENGTH, LENGTH_DIGITS)?;

        let mut buf = Vec::with_capacity(NOMINAL_HEADER_LEN);
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(
            format!(
                "{:0iw$}|{:0tw$}|{:0lw$}|",
                self.index,
                self.total,
                self.length,
                iw = INDEX_DIGITS,
                tw = TOTAL_DIGITS,
                lw = LENGTH_DIGITS
            )
            .as_bytes(),
        );

        Ok(buf)
    }

    /// Parses a header from the start of `prefix`.
    ///
    /// The returned length is measured by re-encoding the parsed fields,
    /// not taken from the position of the last separator.
    pub fn parse(prefix: &[u8]) -> Decoded {
        if !prefix.starts_with(MAGIC) {
            return Decoded::NoMagic;
        }

        let segments: Vec<&[u8]> = prefix.split(|b| *b == FIELD_SEPARATOR).collect();
        if segments.len() < 5 {
            return Decoded::Truncated;
        }

        let (Some(index), Some(total), Some(length)) = (
            parse_digits(segments[1]),
            parse_digits(segments[2]),
            parse_digits(segments[3]),
        ) else {
            return Decoded::Invalid;
        };
        let (Ok(index), Ok(total)) = (u32::try_from(index), u32::try_from(total)) else {
            return Decoded::Invalid;
        };

        let header = Header::new(index, total, length);
        match header.encode() {
            Ok(encoded) => Decoded::Header(header, encoded.len()),
            Err(_) => Decoded::Invalid,
        }
    }

    /// Convenience over [`Header::parse`] for callers that only care about a complete header.
    pub fn decode(prefix: &[u8]) -> Option<(Header, usize)> {
        match Self::parse(prefix) {
            Decoded::Header(header, len) => Some((header, len)),
            _ => None,
        }
    }
}

fn check_width(field: &'static str, value: u64, max: u64, width: usize) -> Result<()> {
    if value > max {
        return Err(ShardError::HeaderFieldOverflow {
            field,
            value,
            width,
        });
    }
    Ok(())
}

fn parse_digits(field: &[u8]) -> Option<u64> {
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(field).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_encode_zero_padded_fields() {
        let bytes = Header::new(2, 3, 4).encode().unwrap();
        assert_eq!(bytes, b"STEG|0002|0003|00000004|".to_vec());
        assert_eq!(bytes.len(), NOMINAL_HEADER_LEN);
    }

    #[test]
    fn should_reject_fields_beyond_their_digit_budget() {
        match Header::new(10_000, 3, 4).encode() {
            Err(ShardError::HeaderFieldOverflow { field: "index", .. }) => (),
            other => panic!("unexpected {other:?}"),
        }
        match Header::new(1, 10_000, 4).encode() {
            Err(ShardError::HeaderFieldOverflow { field: "total", .. }) => (),
            other => panic!("unexpected {other:?}"),
        }
        match Header::new(1, 3, 100_000_000).encode() {
            Err(ShardError::HeaderFieldOverflow { field: "length", .. }) => (),
            other => panic!("unexpected {other:?}"),
        }
        assert!(Header::new(9_999, 9_999, 99_999_999).encode().is_ok());
    }

    #[test]
    fn should_decode_header_followed_by_payload() {
        let mut buf = Header::new(3, 3, 4).encode().unwrap();
        buf.extend_from_slice(b"rld!");
        buf.extend_from_slice(&[0xff, 0x00, b'|', 0x12]);

        assert_eq!(Header::decode(&buf), Some((Header::new(3, 3, 4), 24)));
    }

    #[test]
    fn should_report_missing_magic() {
        assert_eq!(Header::parse(b"PNG|0001|0003|00000004|"), Decoded::NoMagic);
        assert_eq!(Header::parse(&[0u8; 64]), Decoded::NoMagic);
    }

    #[test]
    fn should_report_truncated_header() {
        assert_eq!(Header::parse(b"STEG|0001|0003|0000"), Decoded::Truncated);
    }

    #[test]
    fn should_report_invalid_fields() {
        assert_eq!(Header::parse(b"STEG|00x1|0003|00000004|"), Decoded::Invalid);
        assert_eq!(Header::parse(b"STEG|+001|0003|00000004|"), Decoded::Invalid);
        assert_eq!(Header::parse(b"STEG||0003|00000004|"), Decoded::Invalid);
    }

    #[test]
    fn should_measure_length_by_re_encoding() {
        // a short index field still counts as the nominal width
        assert_eq!(
            Header::decode(b"STEG|1|0003|00000004|Hell"),
            Some((Header::new(1, 3, 4), NOMINAL_HEADER_LEN))
        );
    }

    #[test]
    fn should_treat_overflowing_decoded_fields_as_invalid() {
        assert_eq!(Header::parse(b"STEG|12345|0003|00000004|"), Decoded::Invalid);
    }
}
