//! Base64 and column-wrapping helpers for the text parts of the format.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};

use crate::types::Error;

/// RFC 4648 base64 without `=` padding, as used in headers.
pub fn b64_unpadded(bytes: &[u8]) -> String {
    STANDARD_NO_PAD.encode(bytes)
}

pub fn b64_unpadded_decode(s: &str) -> Result<Vec<u8>, Error> {
    Ok(STANDARD_NO_PAD.decode(s.as_bytes())?)
}

pub fn b64_padded(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn b64_padded_decode(s: &str) -> Result<Vec<u8>, Error> {
    Ok(STANDARD.decode(s.as_bytes())?)
}

/// Split `s` into lines of `width` characters; the last line may be shorter.
/// An empty input yields no lines.
pub fn wrap_columns(s: &str, width: usize) -> Vec<&str> {
    // base64 output is ASCII, so byte chunks are char chunks.
    s.as_bytes()
        .chunks(width.max(1))
        .filter_map(|line| std::str::from_utf8(line).ok())
        .collect()
}

pub fn is_base64_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/'
}
