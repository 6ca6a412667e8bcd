//! drand chain parameters, as served by a network's `/info` endpoint.

use serde::{Deserialize, Serialize};

use crate::scheme::Scheme;
use crate::types::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    /// Hex encoded compressed master public key.
    pub public_key: String,
    /// Seconds between rounds.
    pub period: u64,
    /// Unix seconds of round 0.
    pub genesis_time: u64,
    /// Hex chain hash, recorded in every stanza.
    pub hash: String,
    #[serde(rename = "groupHash", default, skip_serializing_if = "Option::is_none")]
    pub group_hash: Option<String>,
    #[serde(rename = "schemeID")]
    pub scheme_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ChainMetadata>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainMetadata {
    #[serde(rename = "beaconID")]
    pub beacon_id: String,
}

impl ChainInfo {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let info: ChainInfo = serde_json::from_str(json)?;
        info.validate()?;
        Ok(info)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.period == 0 {
            return Err(Error::InvalidParams("chain period must be positive".into()));
        }
        if hex::decode(&self.hash)?.is_empty() {
            return Err(Error::InvalidEncoding("empty chain hash".into()));
        }
        hex::decode(&self.public_key)?;
        Ok(())
    }

    pub fn scheme(&self) -> Result<Scheme, Error> {
        self.scheme_id.parse()
    }

    pub fn public_key_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(hex::decode(&self.public_key)?)
    }

    pub fn hash_matches(&self, other: &str) -> bool {
        self.hash.eq_ignore_ascii_case(other)
    }

    /// Unix seconds at which `round` is published. Saturates instead of
    /// overflowing, so absurd rounds simply never become available.
    pub fn round_time(&self, round: u64) -> u64 {
        self.genesis_time.saturating_add(round.saturating_mul(self.period))
    }

    /// First round published at or after `unix_ms`.
    pub fn round_at(&self, unix_ms: u64) -> Result<u64, Error> {
        if self.period == 0 {
            return Err(Error::InvalidParams("chain period must be positive".into()));
        }
        let genesis_ms = self.genesis_time.saturating_mul(1000);
        if unix_ms <= genesis_ms {
            return Err(Error::InvalidParams(format!(
                "time {unix_ms}ms is not after chain genesis {genesis_ms}ms"
            )));
        }
        let period_ms = self.period.saturating_mul(1000);
        Ok((unix_ms - genesis_ms).div_ceil(period_ms))
    }
}
