//! Glue over `blstrs`: point codecs, hash-to-curve, pairing and the byte
//! encoding of target-group elements used by the IBE hashes.

use blstrs::{Fp12, G1Affine, G1Projective, G2Affine, G2Projective, Gt};
use group::Curve;
use sha2::{Digest, Sha256};

use crate::types::Error;

pub type G1 = G1Projective;
pub type G2 = G2Projective;
pub type Target = Gt;

pub const G1_COMPRESSED_LEN: usize = 48;
pub const G2_COMPRESSED_LEN: usize = 96;

const FP_LEN: usize = 48;
/// Twelve base-field coefficients.
pub const GT_BYTES_LEN: usize = 12 * FP_LEN;

pub fn hash_to_g1(msg: &[u8], dst: &[u8]) -> G1 {
    G1Projective::hash_to_curve(msg, dst, &[])
}

pub fn hash_to_g2(msg: &[u8], dst: &[u8]) -> G2 {
    G2Projective::hash_to_curve(msg, dst, &[])
}

pub fn pairing(g1: &G1, g2: &G2) -> Target {
    blstrs::pairing(&g1.to_affine(), &g2.to_affine())
}

/// Identity bytes for a beacon round: `SHA256(u64_be(round))`. This is also
/// the message drand signs for unchained schemes.
pub fn round_identity(round: u64) -> [u8; 32] {
    Sha256::digest(round.to_be_bytes()).into()
}

pub fn g1_to_bytes(p: &G1) -> [u8; G1_COMPRESSED_LEN] {
    p.to_affine().to_compressed()
}

pub fn g1_from_bytes(bytes: &[u8]) -> Result<G1, Error> {
    let raw: [u8; G1_COMPRESSED_LEN] = bytes.try_into().map_err(|_| {
        Error::InvalidEncoding(format!("G1 point must be {G1_COMPRESSED_LEN} bytes, got {}", bytes.len()))
    })?;
    let affine = Option::<G1Affine>::from(G1Affine::from_compressed(&raw))
        .ok_or_else(|| Error::InvalidEncoding("not a valid G1 point".into()))?;
    Ok(affine.into())
}

pub fn g2_to_bytes(p: &G2) -> [u8; G2_COMPRESSED_LEN] {
    p.to_affine().to_compressed()
}

pub fn g2_from_bytes(bytes: &[u8]) -> Result<G2, Error> {
    let raw: [u8; G2_COMPRESSED_LEN] = bytes.try_into().map_err(|_| {
        Error::InvalidEncoding(format!("G2 point must be {G2_COMPRESSED_LEN} bytes, got {}", bytes.len()))
    })?;
    let affine = Option::<G2Affine>::from(G2Affine::from_compressed(&raw))
        .ok_or_else(|| Error::InvalidEncoding("not a valid G2 point".into()))?;
    Ok(affine.into())
}

/// Serialize a target-group element the way the deployed tlock
/// implementations hash it.
///
/// Every tier of the tower is written highest coefficient first, each base
/// field element as 48 big-endian bytes:
///
/// ```text
/// Fp12 = c1 ‖ c0        (Fp6 halves)
/// Fp6  = c2 ‖ c1 ‖ c0   (Fp2 thirds)
/// Fp2  = c1 ‖ c0        (Fp)
/// ```
pub fn gt_to_bytes(t: &Target) -> [u8; GT_BYTES_LEN] {
    let mut out = [0u8; GT_BYTES_LEN];
    write_gt_bytes(t, &mut out);
    out
}

/// [`gt_to_bytes`] into a caller-owned buffer, so secret elements can be
/// written straight into wiped memory.
pub fn write_gt_bytes(t: &Target, out: &mut [u8; GT_BYTES_LEN]) {
    let fp12 = Fp12::from(*t);
    let mut offset = 0;
    for fp6 in [fp12.c1(), fp12.c0()] {
        for fp2 in [fp6.c2(), fp6.c1(), fp6.c0()] {
            for fp in [fp2.c1(), fp2.c0()] {
                out[offset..offset + FP_LEN].copy_from_slice(&fp.to_bytes_be());
                offset += FP_LEN;
            }
        }
    }
}
