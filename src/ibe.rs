//! Boneh-Franklin identity-based encryption with the Fujisaki-Okamoto
//! transform, as used by tlock.
//!
//! Encrypting `m` to identity `id` under master key `P_pub`:
//! 1. `Gid = e(P_pub, H1(id))`
//! 2. random `sigma`, `|sigma| = |m|`
//! 3. `r = H3(sigma, m)`, `U = r·P`
//! 4. `V = sigma ⊕ H2(Gid^r)`, `W = m ⊕ H4(sigma)`
//!
//! Decryption with the identity key `s·H1(id)` (a beacon signature) recovers
//! `sigma` from `e(U, s·H1(id)) = Gid^r`, then `m`, and re-derives `r` to check
//! `U == r·P`.

use std::marker::PhantomData;

use blstrs::Scalar;
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use crate::bls::{GT_BYTES_LEN, Target, write_gt_bytes};
use crate::scheme::GroupPlacement;
use crate::types::{Error, Wire};

/// Messages are masked with truncated SHA-256 outputs.
pub const MAX_MESSAGE_LEN: usize = 32;

const H2_TAG: &[u8] = b"IBE-H2";
const H3_TAG: &[u8] = b"IBE-H3";
const H4_TAG: &[u8] = b"IBE-H4";
const H3_MAX_ATTEMPTS: u16 = u16::MAX;

#[derive(Clone, Debug, PartialEq)]
pub struct IbeCiphertext<P: GroupPlacement> {
    pub u: P::Public,
    pub v: Vec<u8>,
    pub w: Vec<u8>,
    _placement: PhantomData<P>,
}

impl<P: GroupPlacement> IbeCiphertext<P> {
    pub fn new(u: P::Public, v: Vec<u8>, w: Vec<u8>) -> Self {
        Self {
            u,
            v,
            w,
            _placement: PhantomData,
        }
    }

    pub fn message_len(&self) -> usize {
        self.w.len()
    }
}

impl<P: GroupPlacement> Wire for IbeCiphertext<P> {
    // U (compressed) ‖ V ‖ W
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(P::PUBLIC_LEN + self.v.len() + self.w.len());
        out.extend_from_slice(&P::public_to_bytes(&self.u));
        out.extend_from_slice(&self.v);
        out.extend_from_slice(&self.w);
        out
    }

    fn decode(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < P::PUBLIC_LEN {
            return Err(Error::InvalidEncoding(format!(
                "IBE ciphertext shorter than its {}-byte point",
                P::PUBLIC_LEN
            )));
        }
        let (u_raw, rest) = bytes.split_at(P::PUBLIC_LEN);
        if rest.len() % 2 != 0 || rest.len() / 2 > MAX_MESSAGE_LEN {
            return Err(Error::InvalidEncoding(
                "IBE ciphertext V and W must have equal length of at most 32 bytes".into(),
            ));
        }
        let u = P::public_from_bytes(u_raw)?;
        let (v, w) = rest.split_at(rest.len() / 2);
        Ok(IbeCiphertext::new(u, v.to_vec(), w.to_vec()))
    }
}

pub fn encrypt<P: GroupPlacement, R: RngCore + CryptoRng>(
    master: &P::Public,
    identity: &[u8],
    dst: &[u8],
    message: &[u8],
    rng: &mut R,
) -> Result<IbeCiphertext<P>, Error> {
    if message.len() > MAX_MESSAGE_LEN {
        return Err(Error::InvalidParams(format!(
            "IBE message is {} bytes, at most {MAX_MESSAGE_LEN} supported",
            message.len()
        )));
    }

    let q_id = P::hash_to_signature_group(identity, dst);
    let gid = P::pair(master, &q_id);

    let mut sigma = Zeroizing::new(vec![0u8; message.len()]);
    rng.fill_bytes(&mut sigma);

    let r = h3(&sigma, message)?;
    let u = P::mul_public(&P::public_generator(), &r);
    let v = xor(&sigma, &h2(&(gid * r), message.len()));
    let w = xor(message, &h4(&sigma, message.len()));

    Ok(IbeCiphertext::new(u, v, w))
}

/// Recover the message from `ct` using the identity key for its round.
///
/// Fails with `IntegrityFailure` when the key does not match the identity
/// the ciphertext was produced for, or when the ciphertext was altered.
pub fn decrypt<P: GroupPlacement>(
    identity_key: &P::Signature,
    ct: &IbeCiphertext<P>,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let len = ct.message_len();
    if ct.v.len() != len || len > MAX_MESSAGE_LEN {
        return Err(Error::InvalidEncoding("IBE ciphertext V/W length mismatch".into()));
    }

    let gidt = P::pair(&ct.u, identity_key);
    let sigma = Zeroizing::new(xor(&ct.v, &h2(&gidt, len)));
    let message = Zeroizing::new(xor(&ct.w, &h4(&sigma, len)));

    let r = h3(&sigma, &message)?;
    if P::mul_public(&P::public_generator(), &r) != ct.u {
        return Err(Error::IntegrityFailure("invalid proof: rP check failed"));
    }
    Ok(message)
}

fn h2(t: &Target, len: usize) -> Zeroizing<Vec<u8>> {
    let mut gt = Zeroizing::new([0u8; GT_BYTES_LEN]);
    write_gt_bytes(t, &mut gt);
    let digest = Sha256::new().chain_update(H2_TAG).chain_update(&gt[..]).finalize();
    truncate_wiped(digest.into(), len)
}

/// Derive the encryption scalar by rehashing `H("IBE-H3" ‖ sigma ‖ m)` with
/// a little-endian u16 counter until the (shifted) digest is below the group
/// order.
fn h3(sigma: &[u8], message: &[u8]) -> Result<Scalar, Error> {
    let seed: Zeroizing<[u8; 32]> = Zeroizing::new(
        Sha256::new()
            .chain_update(H3_TAG)
            .chain_update(sigma)
            .chain_update(message)
            .finalize()
            .into(),
    );

    for i in 1..H3_MAX_ATTEMPTS {
        let mut data: Zeroizing<[u8; 32]> = Zeroizing::new(
            Sha256::new()
                .chain_update(i.to_le_bytes())
                .chain_update(&seed[..])
                .finalize()
                .into(),
        );
        data[0] >>= 1;
        if let Some(r) = Option::<Scalar>::from(Scalar::from_bytes_be(&data)) {
            return Ok(r);
        }
    }
    Err(Error::ResourceExhausted("IBE H3 found no scalar below the group order"))
}

fn h4(sigma: &[u8], len: usize) -> Zeroizing<Vec<u8>> {
    let digest = Sha256::new().chain_update(H4_TAG).chain_update(sigma).finalize();
    truncate_wiped(digest.into(), len)
}

fn truncate_wiped(mut digest: [u8; 32], len: usize) -> Zeroizing<Vec<u8>> {
    let out = Zeroizing::new(digest[..len].to_vec());
    digest.zeroize();
    out
}

fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}
