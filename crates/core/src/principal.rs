//! Canister principal identifiers and their textual codec.
//!
//! A principal is an opaque blob of at most 29 bytes. Its textual form is
//! the lowercase base32 encoding (no padding) of a big-endian CRC-32 of the
//! blob followed by the blob itself, split into dash-separated groups of
//! five characters, e.g. `rdmx6-jaaaa-aaaaa-aaadq-cai`.
//!
//! Parsing is strict: the text must round-trip byte-for-byte through
//! re-encoding, so checksums, grouping, and case are all enforced.

use std::fmt;
use std::str::FromStr;

/// Maximum number of blob bytes in a principal.
const MAX_LEN: usize = 29;

/// Length of the CRC-32 prefix in the decoded text.
const CRC_LEN: usize = 4;

/// Characters per dash-separated group in the textual form.
const GROUP_LEN: usize = 5;

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

const fn crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

const CRC32_TABLE: [u32; 256] = crc32_table();

fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}

fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(5) * 8);
    let mut acc: u32 = 0;
    let mut acc_bits: u32 = 0;
    for &byte in data {
        acc = (acc << 8) | u32::from(byte);
        acc_bits += 8;
        while acc_bits >= 5 {
            acc_bits -= 5;
            out.push(BASE32_ALPHABET[((acc >> acc_bits) & 0x1F) as usize] as char);
        }
    }
    if acc_bits > 0 {
        out.push(BASE32_ALPHABET[((acc << (5 - acc_bits)) & 0x1F) as usize] as char);
    }
    out
}

/// Decode lowercase unpadded base32. Trailing bits that do not fill a whole
/// byte are dropped; the caller's canonical re-encode check rejects text
/// that hid garbage in them.
fn base32_decode(text: &str) -> Result<Vec<u8>, PrincipalError> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut acc: u32 = 0;
    let mut acc_bits: u32 = 0;
    for ch in text.chars() {
        let value = match ch {
            'a'..='z' => ch as u32 - 'a' as u32,
            '2'..='7' => ch as u32 - '2' as u32 + 26,
            _ => return Err(PrincipalError::InvalidCharacter(ch)),
        };
        acc = (acc << 5) | value;
        acc_bits += 5;
        if acc_bits >= 8 {
            acc_bits -= 8;
            out.push(((acc >> acc_bits) & 0xFF) as u8);
        }
    }
    Ok(out)
}

/// Principal parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrincipalError {
    #[error("invalid character {0:?} in principal text")]
    InvalidCharacter(char),

    #[error("principal text too short to contain a checksum")]
    TooShort,

    #[error("principal payload exceeds {MAX_LEN} bytes")]
    TooLong,

    #[error("principal checksum mismatch")]
    ChecksumMismatch,

    #[error("principal text is not in canonical form")]
    NotCanonical,
}

/// A validated canister principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    bytes: Vec<u8>,
}

impl Principal {
    /// Construct a principal from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PrincipalError> {
        if bytes.len() > MAX_LEN {
            return Err(PrincipalError::TooLong);
        }
        Ok(Self { bytes: bytes.to_vec() })
    }

    /// Parse the textual form.
    ///
    /// Dashes are positional separators only; after decoding, the text is
    /// re-encoded and compared to the input, so wrong grouping, uppercase,
    /// or a stale checksum all fail.
    pub fn from_text(text: &str) -> Result<Self, PrincipalError> {
        let compact: String = text.chars().filter(|c| *c != '-').collect();
        let decoded = base32_decode(&compact)?;
        if decoded.len() < CRC_LEN {
            return Err(PrincipalError::TooShort);
        }
        let payload = &decoded[CRC_LEN..];
        if payload.len() > MAX_LEN {
            return Err(PrincipalError::TooLong);
        }
        let expected = u32::from_be_bytes([decoded[0], decoded[1], decoded[2], decoded[3]]);
        if crc32(payload) != expected {
            return Err(PrincipalError::ChecksumMismatch);
        }

        let principal = Self { bytes: payload.to_vec() };
        if principal.to_text() != text {
            return Err(PrincipalError::NotCanonical);
        }
        Ok(principal)
    }

    /// Render the canonical textual form.
    pub fn to_text(&self) -> String {
        let mut data = Vec::with_capacity(CRC_LEN + self.bytes.len());
        data.extend_from_slice(&crc32(&self.bytes).to_be_bytes());
        data.extend_from_slice(&self.bytes);

        let encoded = base32_encode(&data);
        let mut out = String::with_capacity(encoded.len() + encoded.len() / GROUP_LEN);
        for (i, ch) in encoded.chars().enumerate() {
            if i > 0 && i % GROUP_LEN == 0 {
                out.push('-');
            }
            out.push(ch);
        }
        out
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_check_value() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(b""), 0);
    }

    #[test]
    fn test_management_canister_is_empty_payload() {
        let principal = Principal::from_text("aaaaa-aa").unwrap();
        assert!(principal.as_slice().is_empty());
        assert_eq!(principal.to_text(), "aaaaa-aa");
    }

    #[test]
    fn test_anonymous_principal() {
        let principal = Principal::from_text("2vxsx-fae").unwrap();
        assert_eq!(principal.as_slice(), &[0x04]);
        assert_eq!(principal.to_text(), "2vxsx-fae");
    }

    #[test]
    fn test_known_canister_ids_round_trip() {
        for text in ["rdmx6-jaaaa-aaaaa-aaadq-cai", "qoctq-giaaa-aaaaa-aaaea-cai", "ryjl3-tyaaa-aaaaa-aaaba-cai"] {
            let principal = Principal::from_text(text).unwrap();
            assert_eq!(principal.to_text(), text);
            assert_eq!(text.parse::<Principal>().unwrap(), principal);
        }
    }

    #[test]
    fn test_rejects_invalid_characters() {
        assert_eq!(Principal::from_text("aaaa?-aa"), Err(PrincipalError::InvalidCharacter('?')));
        assert_eq!(Principal::from_text("aaaa1-aa"), Err(PrincipalError::InvalidCharacter('1')));
        assert!(matches!(
            Principal::from_text("RDMX6-JAAAA-AAAAA-AAADQ-CAI"),
            Err(PrincipalError::InvalidCharacter('R'))
        ));
    }

    #[test]
    fn test_rejects_too_short() {
        assert_eq!(Principal::from_text(""), Err(PrincipalError::TooShort));
        assert_eq!(Principal::from_text("aaa"), Err(PrincipalError::TooShort));
    }

    #[test]
    fn test_rejects_checksum_mismatch() {
        // base32([0, 0, 0, 1, 0x04]): payload of the anonymous principal with a
        // checksum of 1 instead of its real CRC.
        assert_eq!(Principal::from_text("aaaaa-aie"), Err(PrincipalError::ChecksumMismatch));
    }

    #[test]
    fn test_rejects_non_canonical_grouping() {
        assert_eq!(Principal::from_text("aaaaaaa"), Err(PrincipalError::NotCanonical));
        assert_eq!(Principal::from_text("aa-aaa-aa"), Err(PrincipalError::NotCanonical));
    }

    #[test]
    fn test_from_slice_bounds() {
        assert!(Principal::from_slice(&[0u8; 29]).is_ok());
        assert_eq!(Principal::from_slice(&[0u8; 30]), Err(PrincipalError::TooLong));
    }

    #[test]
    fn test_from_slice_round_trips_through_text() {
        let principal = Principal::from_slice(&[1, 2, 3, 4, 5]).unwrap();
        let text = principal.to_text();
        assert_eq!(Principal::from_text(&text).unwrap(), principal);
    }
}
