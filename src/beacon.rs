//! Beacon retrieval interface and beacon verification.

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::bls::round_identity;
use crate::chain::ChainInfo;
use crate::scheme::{GroupPlacement, OnG1, OnG2, Placement};
use crate::types::Error;

/// A drand beacon as served by `/public/<round>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beacon {
    pub round: u64,
    /// Hex `SHA256(signature)`; may be omitted.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub randomness: String,
    /// Hex compressed BLS signature over the round identity.
    pub signature: String,
}

impl Beacon {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn signature_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(hex::decode(&self.signature)?)
    }
}

/// Source of chain parameters and verified beacons.
///
/// Implementations must only hand out beacons that passed [`verify_beacon`]
/// against the chain they serve.
pub trait BeaconProvider {
    /// Parameters of the chain this provider serves.
    fn chain_info(&self) -> impl Future<Output = Result<ChainInfo, Error>> + Send;

    /// Verified beacon for `round`.
    fn beacon(&self, round: u64) -> impl Future<Output = Result<Beacon, Error>> + Send;
}

/// Check that `beacon` is the chain's signature for its round, and that its
/// randomness (when present) is derived from that signature.
pub fn verify_beacon(chain: &ChainInfo, beacon: &Beacon) -> Result<(), Error> {
    if beacon.round == 0 {
        return Err(Error::Beacon("round 0 has no signature".into()));
    }
    let scheme = chain.scheme()?;
    let public_key = chain.public_key_bytes()?;
    let signature = beacon.signature_bytes()?;

    let valid = match scheme.placement() {
        Placement::PublicKeyOnG1 => {
            signature_valid::<OnG1>(&public_key, &signature, beacon.round, scheme.dst())?
        }
        Placement::PublicKeyOnG2 => {
            signature_valid::<OnG2>(&public_key, &signature, beacon.round, scheme.dst())?
        }
    };
    if !valid {
        tracing::warn!(round = beacon.round, scheme = %scheme, "rejected beacon signature");
        return Err(Error::Beacon(format!("invalid signature for round {}", beacon.round)));
    }

    if !beacon.randomness.is_empty() {
        let randomness = hex::decode(&beacon.randomness)?;
        if randomness[..] != Sha256::digest(&signature)[..] {
            tracing::warn!(round = beacon.round, "rejected beacon randomness");
            return Err(Error::Beacon(format!(
                "randomness for round {} does not match its signature",
                beacon.round
            )));
        }
    }
    Ok(())
}

// e(g, sig) == e(pk, H(m)), with both sides written as e(G1, G2).
fn signature_valid<P: GroupPlacement>(
    public_key: &[u8],
    signature: &[u8],
    round: u64,
    dst: &[u8],
) -> Result<bool, Error> {
    let public_key = P::public_from_bytes(public_key)?;
    let signature = P::signature_from_bytes(signature)?;
    let message = P::hash_to_signature_group(&round_identity(round), dst);
    Ok(P::pair(&P::public_generator(), &signature) == P::pair(&public_key, &message))
}

/// Provider backed by a fixed set of beacons, for offline use and tests.
#[derive(Clone, Debug)]
pub struct InMemoryBeacons {
    chain: ChainInfo,
    beacons: HashMap<u64, Beacon>,
}

impl InMemoryBeacons {
    pub fn new(chain: ChainInfo) -> Self {
        Self {
            chain,
            beacons: HashMap::new(),
        }
    }

    /// Add a beacon after verifying it against the chain.
    pub fn insert(&mut self, beacon: Beacon) -> Result<(), Error> {
        verify_beacon(&self.chain, &beacon)?;
        self.beacons.insert(beacon.round, beacon);
        Ok(())
    }

    pub fn with_beacon(mut self, beacon: Beacon) -> Result<Self, Error> {
        self.insert(beacon)?;
        Ok(self)
    }
}

impl BeaconProvider for InMemoryBeacons {
    async fn chain_info(&self) -> Result<ChainInfo, Error> {
        Ok(self.chain.clone())
    }

    async fn beacon(&self, round: u64) -> Result<Beacon, Error> {
        tracing::debug!(round, "looking up beacon");
        self.beacons
            .get(&round)
            .cloned()
            .ok_or_else(|| Error::Beacon(format!("no beacon for round {round}")))
    }
}
