//! Hybrid envelope: a fresh file key encrypts the body, and recipients wrap
//! that key into header stanzas.

use rand_core::{CryptoRng, RngCore};

use crate::container::{Container, Stanza};
use crate::kdf::payload_key;
use crate::stream;
use crate::types::{Error, FileKey};

pub const BODY_NONCE_LEN: usize = 16;

pub trait Recipient {
    // Wrap the file key into one or more stanzas for this recipient.
    fn wrap_file_key<R: RngCore + CryptoRng>(
        &self,
        file_key: &FileKey,
        rng: &mut R,
    ) -> Result<Vec<Stanza>, Error>;
}

pub trait Identity {
    // Recover the file key from the header stanzas, ignoring stanzas that are
    // not addressed to this identity.
    fn unwrap_stanzas(&self, stanzas: &[Stanza]) -> Result<FileKey, Error>;
}

/// Encrypt `plaintext` to `recipient`.
pub fn seal<T: Recipient, R: RngCore + CryptoRng>(
    plaintext: &[u8],
    recipient: &T,
    rng: &mut R,
) -> Result<Container, Error> {
    let file_key = FileKey::generate(rng);
    let stanzas = recipient.wrap_file_key(&file_key, rng)?;

    let mut nonce = [0u8; BODY_NONCE_LEN];
    rng.fill_bytes(&mut nonce);
    let key = payload_key(&file_key, &nonce)?;
    let payload = stream::seal(&key, plaintext)?;

    let mut body = Vec::with_capacity(BODY_NONCE_LEN + payload.len());
    body.extend_from_slice(&nonce);
    body.extend_from_slice(&payload);
    Container::new(&file_key, stanzas, body)
}

/// Decrypt `container` with `identity`. The header MAC is checked before any
/// of the body is opened.
pub fn open<I: Identity>(container: &Container, identity: &I) -> Result<Vec<u8>, Error> {
    let file_key = identity.unwrap_stanzas(container.stanzas())?;
    container.verify_mac(&file_key)?;

    let body = container.body();
    if body.len() < BODY_NONCE_LEN {
        return Err(Error::InvalidEncoding("body shorter than its nonce".into()));
    }
    let (nonce, payload) = body.split_at(BODY_NONCE_LEN);
    let key = payload_key(&file_key, nonce)?;
    stream::open(&key, payload)
}
