//! Timelock encryption to a future drand round.
//!
//! The file key is IBE-encrypted to the round identity under the chain's
//! public key and stored in a single `tlock` stanza:
//!
//! ```text
//! -> tlock <round> <chain hash>
//! <U ‖ V ‖ W>
//! ```
//!
//! Once the round's beacon is published, its signature is the IBE identity
//! key that opens the stanza.

use std::time::{SystemTime, UNIX_EPOCH};

use rand_core::{CryptoRng, RngCore};
use tracing::Instrument;

use crate::armor::{self, ArmorConfig};
use crate::beacon::{Beacon, BeaconProvider};
use crate::bls::round_identity;
use crate::chain::ChainInfo;
use crate::container::{Container, Stanza};
use crate::envelope::{self, Identity, Recipient};
use crate::ibe::{self, IbeCiphertext};
use crate::scheme::{GroupPlacement, OnG1, OnG2, Placement, Scheme};
use crate::types::{Error, FILE_KEY_LEN, FileKey, Wire};

pub const STANZA_TYPE: &str = "tlock";

/// Encrypts file keys to one round of one chain.
#[derive(Clone, Debug)]
pub struct TlockRecipient<'a> {
    chain: &'a ChainInfo,
    scheme: Scheme,
    round: u64,
}

impl<'a> TlockRecipient<'a> {
    pub fn new(chain: &'a ChainInfo, round: u64) -> Result<Self, Error> {
        if round < 1 {
            return Err(Error::InvalidParams("round must be at least 1".into()));
        }
        Ok(Self {
            chain,
            scheme: chain.scheme()?,
            round,
        })
    }
}

impl Recipient for TlockRecipient<'_> {
    fn wrap_file_key<R: RngCore + CryptoRng>(
        &self,
        file_key: &FileKey,
        rng: &mut R,
    ) -> Result<Vec<Stanza>, Error> {
        let identity = round_identity(self.round);
        let public_key = self.chain.public_key_bytes()?;
        let dst = self.scheme.dst();
        let body = match self.scheme.placement() {
            Placement::PublicKeyOnG1 => {
                let master = OnG1::public_from_bytes(&public_key)?;
                ibe::encrypt::<OnG1, _>(&master, &identity, dst, file_key.expose(), rng)?.encode()
            }
            Placement::PublicKeyOnG2 => {
                let master = OnG2::public_from_bytes(&public_key)?;
                ibe::encrypt::<OnG2, _>(&master, &identity, dst, file_key.expose(), rng)?.encode()
            }
        };
        tracing::debug!(round = self.round, scheme = %self.scheme, "wrapped file key");

        let stanza = Stanza::new(
            STANZA_TYPE,
            vec![self.round.to_string(), self.chain.hash.clone()],
            body,
        )?;
        Ok(vec![stanza])
    }
}

/// Opens `tlock` stanzas with a verified beacon.
#[derive(Clone, Debug)]
pub struct TlockIdentity<'a> {
    chain: &'a ChainInfo,
    beacon: &'a Beacon,
}

impl<'a> TlockIdentity<'a> {
    /// `beacon` must already be verified against `chain`.
    pub fn new(chain: &'a ChainInfo, beacon: &'a Beacon) -> Self {
        Self { chain, beacon }
    }
}

impl Identity for TlockIdentity<'_> {
    fn unwrap_stanzas(&self, stanzas: &[Stanza]) -> Result<FileKey, Error> {
        let stanza = find_tlock_stanza(stanzas)?;
        let target = TlockTarget::parse(stanza)?;
        if target.round != self.beacon.round {
            return Err(Error::Beacon(format!(
                "beacon for round {} cannot open round {}",
                self.beacon.round, target.round
            )));
        }

        let signature = self.beacon.signature_bytes()?;
        let file_key = match self.chain.scheme()?.placement() {
            Placement::PublicKeyOnG1 => unwrap_with::<OnG1>(&signature, &stanza.body)?,
            Placement::PublicKeyOnG2 => unwrap_with::<OnG2>(&signature, &stanza.body)?,
        };
        FileKey::from_slice(&file_key)
    }
}

fn unwrap_with<P: GroupPlacement>(
    signature: &[u8],
    body: &[u8],
) -> Result<zeroize::Zeroizing<Vec<u8>>, Error> {
    let identity_key = P::signature_from_bytes(signature)?;
    if body.len() != P::PUBLIC_LEN + 2 * FILE_KEY_LEN {
        return Err(Error::InvalidEncoding(format!(
            "tlock stanza body is {} bytes, expected {}",
            body.len(),
            P::PUBLIC_LEN + 2 * FILE_KEY_LEN
        )));
    }
    // The body is well formed, so a U that does not decode was altered.
    let ct = IbeCiphertext::<P>::decode(body)
        .map_err(|_| Error::IntegrityFailure("tlock stanza point is not a valid group element"))?;
    ibe::decrypt(&identity_key, &ct)
}

/// Round and chain named by a `tlock` stanza.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlockTarget {
    pub round: u64,
    pub chain_hash: String,
}

impl TlockTarget {
    pub fn parse(stanza: &Stanza) -> Result<Self, Error> {
        let [round, chain_hash] = stanza.args.as_slice() else {
            return Err(Error::InvalidEncoding(format!(
                "tlock stanza needs 2 arguments, has {}",
                stanza.args.len()
            )));
        };
        if !round.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidEncoding(format!("round {round:?} is not a decimal number")));
        }
        let round: u64 = round
            .parse()
            .map_err(|_| Error::InvalidEncoding(format!("round {round:?} out of range")))?;
        if round == 0 {
            return Err(Error::InvalidEncoding("round must be positive".into()));
        }
        if hex::decode(chain_hash)?.is_empty() {
            return Err(Error::InvalidEncoding("empty chain hash".into()));
        }
        Ok(Self {
            round,
            chain_hash: chain_hash.clone(),
        })
    }
}

/// The single `tlock` stanza. Other stanza types are ignored.
pub fn find_tlock_stanza(stanzas: &[Stanza]) -> Result<&Stanza, Error> {
    let mut matching = stanzas.iter().filter(|s| s.tag == STANZA_TYPE);
    let stanza = matching.next().ok_or(Error::MissingStanza(STANZA_TYPE))?;
    if matching.next().is_some() {
        return Err(Error::InvalidEncoding("more than one tlock stanza".into()));
    }
    Ok(stanza)
}

/// Encrypt `plaintext` to `round` and return it armored.
pub fn encrypt<R: RngCore + CryptoRng>(
    chain: &ChainInfo,
    round: u64,
    plaintext: &[u8],
    rng: &mut R,
) -> Result<String, Error> {
    armor::encode(&encrypt_binary(chain, round, plaintext, rng)?, &ArmorConfig::default())
}

/// Encrypt `plaintext` to `round` as a binary container.
pub fn encrypt_binary<R: RngCore + CryptoRng>(
    chain: &ChainInfo,
    round: u64,
    plaintext: &[u8],
    rng: &mut R,
) -> Result<Vec<u8>, Error> {
    let _span = tracing::info_span!("tlock::encrypt", round).entered();
    let recipient = TlockRecipient::new(chain, round)?;
    let container = envelope::seal(plaintext, &recipient, rng)?;
    tracing::debug!(plaintext_len = plaintext.len(), "sealed container");
    Ok(container.encode())
}

/// Decrypt armored or binary `input`, fetching the beacon from `provider`.
pub async fn decrypt<B: BeaconProvider>(
    chain: &ChainInfo,
    provider: &B,
    input: &[u8],
) -> Result<Vec<u8>, Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| Error::InvalidParams("system clock is before the unix epoch".into()))?
        .as_secs();
    decrypt_at(chain, provider, input, now).await
}

/// [`decrypt`] with an explicit current time in unix seconds.
pub async fn decrypt_at<B: BeaconProvider>(
    chain: &ChainInfo,
    provider: &B,
    input: &[u8],
    now: u64,
) -> Result<Vec<u8>, Error> {
    async move {
        let container = parse_input(input)?;
        let target = TlockTarget::parse(find_tlock_stanza(container.stanzas())?)?;
        if !chain.hash_matches(&target.chain_hash) {
            return Err(Error::ChainMismatch {
                expected: chain.hash.clone(),
                found: target.chain_hash,
            });
        }
        let scheme = chain.scheme()?;
        tracing::debug!(round = target.round, scheme = %scheme, "selected tlock stanza");

        let available_at = chain.round_time(target.round);
        if available_at > now {
            return Err(Error::TooEarly {
                round: target.round,
                available_at,
            });
        }

        let beacon = provider.beacon(target.round).await?;
        if beacon.round != target.round {
            return Err(Error::Beacon(format!(
                "asked for round {}, provider returned round {}",
                target.round, beacon.round
            )));
        }
        envelope::open(&container, &TlockIdentity::new(chain, &beacon))
    }
    .instrument(tracing::info_span!("tlock::decrypt"))
    .await
}

fn parse_input(input: &[u8]) -> Result<Container, Error> {
    if armor::is_armored(input) {
        let text = std::str::from_utf8(input)
            .map_err(|_| Error::InvalidEncoding("armored input is not UTF-8".into()))?;
        Container::decode(&armor::decode(text, &ArmorConfig::default())?)
    } else {
        Container::decode(input)
    }
}
