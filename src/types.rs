//! Common types and error handling.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length in bytes of the symmetric file key.
pub const FILE_KEY_LEN: usize = 16;

pub trait Wire: Sized {
    // Canonical byte encoding used inside stanzas and containers.
    fn encode(&self) -> Vec<u8>;
    fn decode(bytes: &[u8]) -> Result<Self, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("integrity check failed: {0}")]
    IntegrityFailure(&'static str),

    #[error("unsupported version {0:?}")]
    UnsupportedVersion(String),

    #[error("unsupported scheme {0:?}: only unchained drand schemes can be used for timelock")]
    UnsupportedScheme(String),

    #[error("no {0:?} stanza in header")]
    MissingStanza(&'static str),

    #[error("ciphertext is bound to chain {found}, expected {expected}")]
    ChainMismatch { expected: String, found: String },

    #[error("too early to decrypt: round {round} is only available at {available_at} (unix seconds)")]
    TooEarly { round: u64, available_at: u64 },

    #[error("resource exhausted: {0}")]
    ResourceExhausted(&'static str),

    #[error("stream already processed its final chunk")]
    StreamFinished,

    #[error("beacon provider: {0}")]
    Beacon(String),
}

impl From<hkdf::InvalidLength> for Error {
    fn from(_: hkdf::InvalidLength) -> Self {
        Error::InvalidParams("hkdf output length".into())
    }
}

impl From<chacha20poly1305::aead::Error> for Error {
    fn from(_: chacha20poly1305::aead::Error) -> Self {
        Error::IntegrityFailure("payload chunk failed authentication")
    }
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Error::InvalidEncoding(format!("hex: {e}"))
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::InvalidEncoding(format!("base64: {e}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::InvalidEncoding(format!("json: {e}"))
    }
}

/// Random per-file secret protecting the payload. Wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FileKey([u8; FILE_KEY_LEN]);

impl FileKey {
    pub fn generate<R: rand_core::RngCore + rand_core::CryptoRng>(rng: &mut R) -> Self {
        let mut key = FileKey([0u8; FILE_KEY_LEN]);
        rng.fill_bytes(&mut key.0);
        key
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let key: [u8; FILE_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| Error::InvalidEncoding(format!("file key must be {FILE_KEY_LEN} bytes")))?;
        Ok(FileKey(key))
    }

    pub fn expose(&self) -> &[u8; FILE_KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FileKey(..)")
    }
}
