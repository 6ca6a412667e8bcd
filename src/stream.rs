//! STREAM chunked authenticated encryption over ChaCha20-Poly1305.
//!
//! The payload is cut into 64 KiB chunks, each sealed under the nonce
//! `u88_be(counter) ‖ last_flag`. The final chunk carries flag `0x01`, so
//! truncating or extending a stream breaks authentication. A payload that is
//! empty or an exact multiple of the chunk size ends with an empty final
//! chunk.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use zeroize::{Zeroize, Zeroizing};

use crate::kdf::KEY_LEN;
use crate::types::Error;

pub const CHUNK_SIZE: usize = 64 * 1024;
pub const TAG_SIZE: usize = 16;
pub const ENCRYPTED_CHUNK_SIZE: usize = CHUNK_SIZE + TAG_SIZE;

const NONCE_LEN: usize = 12;
const LAST_CHUNK_FLAG: u8 = 0x01;

/// Encrypt `plaintext` as a complete STREAM.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
    let mut stream = Stream::new(key);
    let full_chunks = plaintext.len() / CHUNK_SIZE;
    let mut out = Vec::with_capacity(plaintext.len() + (full_chunks + 1) * TAG_SIZE);

    let mut chunks = plaintext.chunks_exact(CHUNK_SIZE);
    for chunk in &mut chunks {
        out.extend_from_slice(&stream.seal_chunk(chunk, false)?);
    }
    out.extend_from_slice(&stream.seal_chunk(chunks.remainder(), true)?);

    tracing::trace!(chunks = full_chunks + 1, "sealed payload");
    Ok(out)
}

/// Decrypt a complete STREAM. Nothing is returned unless every chunk,
/// including the final one, authenticates.
pub fn open(key: &[u8; KEY_LEN], ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
    if ciphertext.is_empty() {
        return Err(Error::InvalidEncoding("payload has no chunks".into()));
    }

    let mut stream = Stream::new(key);
    let mut plaintext = Zeroizing::new(Vec::with_capacity(ciphertext.len()));
    let mut rest = ciphertext;
    while rest.len() > ENCRYPTED_CHUNK_SIZE {
        let (chunk, tail) = rest.split_at(ENCRYPTED_CHUNK_SIZE);
        plaintext.extend_from_slice(&stream.open_chunk(chunk, false)?);
        rest = tail;
    }
    plaintext.extend_from_slice(&stream.open_chunk(rest, true)?);

    Ok(std::mem::take(&mut *plaintext))
}

/// Per-message STREAM state for one direction of one message. Chunk nonces
/// are rebuilt from the counter and wiped after each chunk.
pub(crate) struct Stream {
    cipher: ChaCha20Poly1305,
    counter: u32,
    finished: bool,
}

impl Stream {
    pub(crate) fn new(key: &[u8; KEY_LEN]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key)),
            counter: 0,
            finished: false,
        }
    }

    pub(crate) fn seal_chunk(&mut self, chunk: &[u8], last: bool) -> Result<Vec<u8>, Error> {
        if self.finished {
            return Err(Error::StreamFinished);
        }
        if chunk.len() > CHUNK_SIZE {
            return Err(Error::InvalidParams(format!("chunk exceeds {CHUNK_SIZE} bytes")));
        }
        let mut nonce = self.nonce(last);
        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), chunk)
            .map_err(|_| Error::InvalidParams("chunk could not be sealed".into()));
        nonce.zeroize();
        let sealed = sealed?;
        self.advance(last)?;
        Ok(sealed)
    }

    pub(crate) fn open_chunk(&mut self, chunk: &[u8], last: bool) -> Result<Zeroizing<Vec<u8>>, Error> {
        if self.finished {
            return Err(Error::StreamFinished);
        }
        if chunk.len() < TAG_SIZE || chunk.len() > ENCRYPTED_CHUNK_SIZE {
            return Err(Error::InvalidEncoding(format!(
                "sealed chunk of {} bytes is outside [{TAG_SIZE}, {ENCRYPTED_CHUNK_SIZE}]",
                chunk.len()
            )));
        }
        let mut nonce = self.nonce(last);
        let opened = self.cipher.decrypt(Nonce::from_slice(&nonce), chunk);
        nonce.zeroize();
        let opened = Zeroizing::new(opened?);
        self.advance(last)?;
        Ok(opened)
    }

    fn nonce(&self, last: bool) -> [u8; NONCE_LEN] {
        let mut nonce = [0u8; NONCE_LEN];
        nonce[7..11].copy_from_slice(&self.counter.to_be_bytes());
        if last {
            nonce[11] = LAST_CHUNK_FLAG;
        }
        nonce
    }

    fn advance(&mut self, last: bool) -> Result<(), Error> {
        if last {
            self.finished = true;
            return Ok(());
        }
        // Wrapping would reuse a nonce.
        self.counter = self
            .counter
            .checked_add(1)
            .ok_or(Error::ResourceExhausted("STREAM chunk counter reached 2^32 - 1"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_LEN] = [7u8; KEY_LEN];

    #[test]
    fn nonce_layout_is_counter_then_flag() {
        let mut stream = Stream::new(&KEY);
        stream.counter = 0x0102_0304;
        assert_eq!(stream.nonce(false), [0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 0]);
        assert_eq!(stream.nonce(true), [0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 1]);
    }

    #[test]
    fn chunks_after_final_are_rejected() {
        let mut stream = Stream::new(&KEY);
        stream.seal_chunk(b"last", true).expect("seal final");
        assert!(matches!(stream.seal_chunk(b"more", false), Err(Error::StreamFinished)));
        assert!(matches!(stream.seal_chunk(b"more", true), Err(Error::StreamFinished)));
    }

    #[test]
    fn opening_after_final_is_rejected() {
        let sealed = seal(&KEY, b"x").expect("seal");
        let mut stream = Stream::new(&KEY);
        stream.open_chunk(&sealed, true).expect("open final");
        assert!(matches!(stream.open_chunk(&sealed, true), Err(Error::StreamFinished)));
    }

    #[test]
    fn counter_overflow_is_fatal() {
        let mut stream = Stream::new(&KEY);
        stream.counter = u32::MAX;
        let res = stream.seal_chunk(b"chunk", false);
        assert!(matches!(res, Err(Error::ResourceExhausted(_))));
    }

    #[test]
    fn final_chunk_at_max_counter_is_allowed() {
        let mut stream = Stream::new(&KEY);
        stream.counter = u32::MAX;
        assert!(stream.seal_chunk(b"chunk", true).is_ok());
    }
}
