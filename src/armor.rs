//! PEM-style ASCII armor around a binary container.

use serde::{Deserialize, Serialize};

use crate::encoding::{b64_padded, b64_padded_decode, wrap_columns};
use crate::types::Error;

pub const ARMOR_HEADER: &str = "-----BEGIN AGE ENCRYPTED FILE-----";
pub const ARMOR_FOOTER: &str = "-----END AGE ENCRYPTED FILE-----";
pub const DEFAULT_WRAP_WIDTH: usize = 64;

// More trailing whitespace than this is treated as an attack on the decoder.
const MAX_TRAILING_WHITESPACE: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorConfig {
    pub wrap_width: usize,
}

impl Default for ArmorConfig {
    fn default() -> Self {
        ArmorConfig {
            wrap_width: DEFAULT_WRAP_WIDTH,
        }
    }
}

impl ArmorConfig {
    fn validate(&self) -> Result<(), Error> {
        if self.wrap_width == 0 {
            return Err(Error::InvalidParams("armor wrap width must be positive".into()));
        }
        Ok(())
    }
}

pub fn encode(payload: &[u8], cfg: &ArmorConfig) -> Result<String, Error> {
    cfg.validate()?;
    let encoded = b64_padded(payload);
    let lines = wrap_columns(&encoded, cfg.wrap_width);

    let mut out = String::with_capacity(encoded.len() + lines.len() + ARMOR_HEADER.len() + ARMOR_FOOTER.len() + 4);
    out.push_str(ARMOR_HEADER);
    out.push('\n');
    out.push_str(&lines.join("\n"));
    out.push('\n');
    if lines.last().is_some_and(|l| l.len() == cfg.wrap_width) {
        out.push('\n');
    }
    out.push_str(ARMOR_FOOTER);
    out.push('\n');
    Ok(out)
}

pub fn decode(armored: &str, cfg: &ArmorConfig) -> Result<Vec<u8>, Error> {
    cfg.validate()?;

    let leading_trimmed = armored.trim_start();
    let trimmed = leading_trimmed.trim_end();
    let trailing = leading_trimmed[trimmed.len()..].chars().count();
    if trailing > MAX_TRAILING_WHITESPACE {
        return Err(Error::InvalidEncoding(format!(
            "armor followed by {trailing} whitespace characters"
        )));
    }

    let inner = trimmed
        .strip_prefix(ARMOR_HEADER)
        .ok_or_else(|| Error::InvalidEncoding("missing armor header".into()))?
        .strip_suffix(ARMOR_FOOTER)
        .ok_or_else(|| Error::InvalidEncoding("missing armor footer".into()))?;
    let inner = inner
        .strip_prefix('\n')
        .ok_or_else(|| Error::InvalidEncoding("armor header must end its line".into()))?;
    let inner = inner
        .strip_suffix('\n')
        .ok_or_else(|| Error::InvalidEncoding("armor footer must start its line".into()))?;

    let lines: Vec<&str> = inner.split('\n').collect();
    if lines.iter().any(|l| l.len() > cfg.wrap_width) {
        return Err(Error::InvalidEncoding(format!(
            "armor line longer than {} columns",
            cfg.wrap_width
        )));
    }
    if lines.last().is_some_and(|l| l.len() >= cfg.wrap_width) {
        return Err(Error::InvalidEncoding("armor ends with a full line".into()));
    }

    b64_padded_decode(&lines.concat())
}

/// True if `input` looks like armored text rather than a binary container.
pub fn is_armored(input: &[u8]) -> bool {
    input.trim_ascii_start().starts_with(ARMOR_HEADER.as_bytes())
}
