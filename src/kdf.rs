use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::types::{Error, FileKey};

pub const KEY_LEN: usize = 32;

const HEADER_INFO: &[u8] = b"header";
const PAYLOAD_INFO: &[u8] = b"payload";

pub fn hkdf_extract(salt: &[u8], ikm: &[u8]) -> Hkdf<Sha256> {
    Hkdf::<Sha256>::new(Some(salt), ikm)
}

pub fn hkdf_expand_key(prk: &Hkdf<Sha256>, info: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, Error> {
    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    prk.expand(info, &mut okm[..])?;
    Ok(okm)
}

/// HMAC key authenticating the container header. The salt is empty.
pub fn header_mac_key(file_key: &FileKey) -> Result<Zeroizing<[u8; KEY_LEN]>, Error> {
    hkdf_expand_key(&hkdf_extract(&[], file_key.expose()), HEADER_INFO)
}

/// STREAM key for the body, salted with the random body nonce.
pub fn payload_key(file_key: &FileKey, nonce: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, Error> {
    hkdf_expand_key(&hkdf_extract(nonce, file_key.expose()), PAYLOAD_INFO)
}
