//! The age v1 container: a text header of recipient stanzas closed by an
//! HMAC, followed by the raw binary body.
//!
//! ```text
//! age-encryption.org/v1
//! -> <type> <arg> <arg>
//! <base64 body, 64 columns per line, last line shorter than 64>
//! --- <base64 HMAC-SHA256 over everything up to and including "---">
//! <body>
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::encoding::{b64_unpadded, b64_unpadded_decode, is_base64_char, wrap_columns};
use crate::kdf::header_mac_key;
use crate::types::{Error, FileKey, Wire};

pub const VERSION: &str = "age-encryption.org/v1";
/// Column width of stanza bodies.
pub const COLUMNS: usize = 64;
pub const MAC_LEN: usize = 32;

const STANZA_PREFIX: &[u8] = b"-> ";
const MAC_PREFIX: &[u8] = b"---";

type HmacSha256 = Hmac<Sha256>;

/// One recipient's wrapped key material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stanza {
    pub tag: String,
    pub args: Vec<String>,
    pub body: Vec<u8>,
}

impl Stanza {
    pub fn new(tag: impl Into<String>, args: Vec<String>, body: Vec<u8>) -> Result<Self, Error> {
        let stanza = Stanza {
            tag: tag.into(),
            args,
            body,
        };
        validate_token(&stanza.tag, "stanza type")?;
        for arg in &stanza.args {
            validate_token(arg, "stanza argument")?;
        }
        Ok(stanza)
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(STANZA_PREFIX);
        out.extend_from_slice(self.tag.as_bytes());
        for arg in &self.args {
            out.push(b' ');
            out.extend_from_slice(arg.as_bytes());
        }
        out.push(b'\n');

        let encoded = b64_unpadded(&self.body);
        for line in wrap_columns(&encoded, COLUMNS) {
            out.extend_from_slice(line.as_bytes());
            out.push(b'\n');
        }
        // The body ends at the first short line, so a full last line needs an
        // empty one after it. This also covers the empty body.
        if encoded.len() % COLUMNS == 0 {
            out.push(b'\n');
        }
    }
}

/// Tokens are non-empty runs of printable ASCII other than space.
fn validate_token(token: &str, what: &str) -> Result<(), Error> {
    if token.is_empty() {
        return Err(Error::InvalidEncoding(format!("empty {what}")));
    }
    if let Some(b) = token.bytes().find(|b| !(33..=126).contains(b)) {
        return Err(Error::InvalidEncoding(format!("{what} contains byte 0x{b:02x}")));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub version: String,
    pub stanzas: Vec<Stanza>,
    pub mac: [u8; MAC_LEN],
}

/// A parsed or freshly written container.
///
/// The exact header bytes through `---` are kept alongside the parsed form;
/// they are what the MAC covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    header: Header,
    header_bytes: Vec<u8>,
    body: Vec<u8>,
}

impl Container {
    /// Build a container for `stanzas`, authenticating the header with a key
    /// derived from `file_key`.
    pub fn new(file_key: &FileKey, stanzas: Vec<Stanza>, body: Vec<u8>) -> Result<Self, Error> {
        if stanzas.is_empty() {
            return Err(Error::InvalidParams("a container needs at least one stanza".into()));
        }

        let mut header_bytes = Vec::new();
        header_bytes.extend_from_slice(VERSION.as_bytes());
        header_bytes.push(b'\n');
        for stanza in &stanzas {
            stanza.write_to(&mut header_bytes);
        }
        header_bytes.extend_from_slice(MAC_PREFIX);

        let mac = header_mac(file_key, &header_bytes)?
            .finalize()
            .into_bytes()
            .into();
        Ok(Container {
            header: Header {
                version: VERSION.to_string(),
                stanzas,
                mac,
            },
            header_bytes,
            body,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn stanzas(&self) -> &[Stanza] {
        &self.header.stanzas
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Header bytes covered by the MAC.
    pub fn header_bytes(&self) -> &[u8] {
        &self.header_bytes
    }

    /// Check the header MAC in constant time.
    pub fn verify_mac(&self, file_key: &FileKey) -> Result<(), Error> {
        header_mac(file_key, &self.header_bytes)?
            .verify_slice(&self.header.mac)
            .map_err(|_| Error::IntegrityFailure("header MAC mismatch"))
    }
}

fn header_mac(file_key: &FileKey, header_bytes: &[u8]) -> Result<HmacSha256, Error> {
    let key = header_mac_key(file_key)?;
    let mut mac = HmacSha256::new_from_slice(&key[..])
        .map_err(|_| Error::InvalidParams("hmac key length".into()))?;
    mac.update(header_bytes);
    Ok(mac)
}

impl Wire for Container {
    fn encode(&self) -> Vec<u8> {
        let mac = b64_unpadded(&self.header.mac);
        let mut out = Vec::with_capacity(self.header_bytes.len() + mac.len() + 2 + self.body.len());
        out.extend_from_slice(&self.header_bytes);
        out.push(b' ');
        out.extend_from_slice(mac.as_bytes());
        out.push(b'\n');
        out.extend_from_slice(&self.body);
        out
    }

    fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let mut lines = Lines { bytes, pos: 0 };

        let version = lines.next_line()?;
        if version != VERSION.as_bytes() {
            return Err(Error::UnsupportedVersion(
                String::from_utf8_lossy(version).into_owned(),
            ));
        }

        let mut stanzas = Vec::new();
        let mac_line_start = loop {
            let start = lines.pos;
            let line = lines.next_line()?;
            if let Some(rest) = line.strip_prefix(STANZA_PREFIX) {
                stanzas.push(parse_stanza(rest, &mut lines)?);
            } else if line.starts_with(MAC_PREFIX) {
                break start;
            } else {
                return Err(Error::InvalidEncoding("expected a stanza or the MAC line".into()));
            }
        };
        if stanzas.is_empty() {
            return Err(Error::InvalidEncoding("header has no stanzas".into()));
        }

        let header_end = mac_line_start + MAC_PREFIX.len();
        let mac_line = &bytes[mac_line_start..lines.pos - 1];
        let mac_b64 = mac_line[MAC_PREFIX.len()..]
            .strip_prefix(b" ")
            .ok_or_else(|| Error::InvalidEncoding("malformed MAC line".into()))?;
        let mac = decode_b64_line(mac_b64)?;
        let mac: [u8; MAC_LEN] = mac
            .try_into()
            .map_err(|_| Error::InvalidEncoding(format!("MAC must be {MAC_LEN} bytes")))?;

        tracing::debug!(stanzas = stanzas.len(), body_len = bytes.len() - lines.pos, "parsed container");
        Ok(Container {
            header: Header {
                version: VERSION.to_string(),
                stanzas,
                mac,
            },
            header_bytes: bytes[..header_end].to_vec(),
            body: bytes[lines.pos..].to_vec(),
        })
    }
}

fn parse_stanza(line: &[u8], lines: &mut Lines<'_>) -> Result<Stanza, Error> {
    let line = std::str::from_utf8(line)
        .map_err(|_| Error::InvalidEncoding("stanza line is not ASCII".into()))?;
    let mut tokens = line.split(' ');
    let tag = tokens.next().unwrap_or_default().to_string();
    let args = tokens.map(str::to_string).collect();

    let mut encoded = Vec::new();
    loop {
        let body_line = lines.next_line()?;
        if body_line.len() > COLUMNS {
            return Err(Error::InvalidEncoding(format!("stanza body line longer than {COLUMNS}")));
        }
        encoded.extend_from_slice(body_line);
        if body_line.len() < COLUMNS {
            break;
        }
    }

    Stanza::new(tag, args, decode_b64_line(&encoded)?)
}

fn decode_b64_line(line: &[u8]) -> Result<Vec<u8>, Error> {
    if !line.iter().copied().all(is_base64_char) {
        return Err(Error::InvalidEncoding("unexpected character in base64 data".into()));
    }
    // Only base64 characters remain, so this is valid UTF-8.
    let s = std::str::from_utf8(line)
        .map_err(|_| Error::InvalidEncoding("base64 data is not ASCII".into()))?;
    b64_unpadded_decode(s)
}

/// Newline-terminated line reader over the header. The body is never read
/// through this, so line breaks inside it are left untouched.
struct Lines<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lines<'a> {
    fn next_line(&mut self) -> Result<&'a [u8], Error> {
        let bytes = self.bytes;
        let rest = &bytes[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| Error::InvalidEncoding("header ended before the MAC line".into()))?;
        self.pos += len + 1;
        Ok(&rest[..len])
    }
}
