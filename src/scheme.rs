//! Scheme identifiers and the group placement they select.

use std::fmt::Debug;
use std::str::FromStr;

use blstrs::{G1Projective, G2Projective, Scalar};
use group::Group;

use crate::bls::{
    G1, G1_COMPRESSED_LEN, G2, G2_COMPRESSED_LEN, Target, g1_from_bytes, g1_to_bytes,
    g2_from_bytes, g2_to_bytes, hash_to_g1, hash_to_g2, pairing,
};
use crate::types::Error;

pub const DST_G1: &[u8] = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_NUL_";
pub const DST_G2: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_NUL_";

/// drand signature schemes that can be used as a timelock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Public key on G1, signatures on G2.
    PedersenBlsUnchained,
    /// Public key on G2, signatures on G1, hashed with the G2 DST.
    BlsUnchainedOnG1,
    /// Public key on G2, signatures on G1, RFC 9380 G1 DST.
    BlsUnchainedG1Rfc9380,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    PublicKeyOnG1,
    PublicKeyOnG2,
}

impl Scheme {
    pub const ALL: [Scheme; 3] = [
        Scheme::PedersenBlsUnchained,
        Scheme::BlsUnchainedOnG1,
        Scheme::BlsUnchainedG1Rfc9380,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Scheme::PedersenBlsUnchained => "pedersen-bls-unchained",
            Scheme::BlsUnchainedOnG1 => "bls-unchained-on-g1",
            Scheme::BlsUnchainedG1Rfc9380 => "bls-unchained-g1-rfc9380",
        }
    }

    pub fn placement(&self) -> Placement {
        match self {
            Scheme::PedersenBlsUnchained => Placement::PublicKeyOnG1,
            Scheme::BlsUnchainedOnG1 | Scheme::BlsUnchainedG1Rfc9380 => Placement::PublicKeyOnG2,
        }
    }

    /// Domain separation tag used to hash round identities onto the
    /// signature group.
    pub fn dst(&self) -> &'static [u8] {
        match self {
            // bls-unchained-on-g1 shipped with the G2 tag; deployed beacons depend on it.
            Scheme::PedersenBlsUnchained | Scheme::BlsUnchainedOnG1 => DST_G2,
            Scheme::BlsUnchainedG1Rfc9380 => DST_G1,
        }
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scheme::ALL
            .into_iter()
            .find(|scheme| scheme.id() == s)
            .ok_or_else(|| Error::UnsupportedScheme(s.to_string()))
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

pub trait GroupPlacement: Copy + Debug + PartialEq {
    // Group of the master public key and of the ciphertext point U.
    type Public: Copy + Debug + PartialEq;
    // Complementary group: hashed identities and beacon signatures.
    type Signature: Copy + Debug;

    const PUBLIC_LEN: usize;
    const SIGNATURE_LEN: usize;

    fn public_generator() -> Self::Public;

    fn mul_public(p: &Self::Public, s: &Scalar) -> Self::Public;

    fn hash_to_signature_group(msg: &[u8], dst: &[u8]) -> Self::Signature;

    // Always evaluated as e(G1 element, G2 element).
    fn pair(public: &Self::Public, signature: &Self::Signature) -> Target;

    fn public_to_bytes(p: &Self::Public) -> Vec<u8>;
    fn public_from_bytes(bytes: &[u8]) -> Result<Self::Public, Error>;
    fn signature_from_bytes(bytes: &[u8]) -> Result<Self::Signature, Error>;
}

/// Master key and ciphertext point on G1; identities on G2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OnG1;

/// Master key and ciphertext point on G2; identities on G1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OnG2;

impl GroupPlacement for OnG1 {
    type Public = G1;
    type Signature = G2;

    const PUBLIC_LEN: usize = G1_COMPRESSED_LEN;
    const SIGNATURE_LEN: usize = G2_COMPRESSED_LEN;

    fn public_generator() -> G1 {
        G1Projective::generator()
    }

    fn mul_public(p: &G1, s: &Scalar) -> G1 {
        p * s
    }

    fn hash_to_signature_group(msg: &[u8], dst: &[u8]) -> G2 {
        hash_to_g2(msg, dst)
    }

    fn pair(public: &G1, signature: &G2) -> Target {
        pairing(public, signature)
    }

    fn public_to_bytes(p: &G1) -> Vec<u8> {
        g1_to_bytes(p).to_vec()
    }

    fn public_from_bytes(bytes: &[u8]) -> Result<G1, Error> {
        g1_from_bytes(bytes)
    }

    fn signature_from_bytes(bytes: &[u8]) -> Result<G2, Error> {
        g2_from_bytes(bytes)
    }
}

impl GroupPlacement for OnG2 {
    type Public = G2;
    type Signature = G1;

    const PUBLIC_LEN: usize = G2_COMPRESSED_LEN;
    const SIGNATURE_LEN: usize = G1_COMPRESSED_LEN;

    fn public_generator() -> G2 {
        G2Projective::generator()
    }

    fn mul_public(p: &G2, s: &Scalar) -> G2 {
        p * s
    }

    fn hash_to_signature_group(msg: &[u8], dst: &[u8]) -> G1 {
        hash_to_g1(msg, dst)
    }

    fn pair(public: &G2, signature: &G1) -> Target {
        pairing(signature, public)
    }

    fn public_to_bytes(p: &G2) -> Vec<u8> {
        g2_to_bytes(p).to_vec()
    }

    fn public_from_bytes(bytes: &[u8]) -> Result<G2, Error> {
        g2_from_bytes(bytes)
    }

    fn signature_from_bytes(bytes: &[u8]) -> Result<G1, Error> {
        g1_from_bytes(bytes)
    }
}
