#![allow(dead_code)]

use blstrs::Scalar;
use tlock_age::bls::{g1_to_bytes, g2_to_bytes, round_identity};
use tlock_age::scheme::{GroupPlacement, OnG1, OnG2, Placement};
use tlock_age::{Beacon, BeaconProvider, ChainInfo, Error, InMemoryBeacons, Scheme};

pub const TESTNET_JSON: &str = r#"{
    "public_key": "8200fc249deb0148eb918d6e213980c5d01acd7fc251900d9260136da3b54836ce125172399ddc69c4e3e11429b62c11",
    "period": 3,
    "genesis_time": 1651677099,
    "hash": "7672797f548f3f4748ac4bf3352fc6c6b6468c9ad40ad456a397545c6e2df5bf",
    "groupHash": "65083634d852ae169e21b6ce5f0410be9ed4cc679b9970236f7875cff667e13d",
    "schemeID": "pedersen-bls-unchained",
    "metadata": { "beaconID": "testnet-unchained-3s" }
}"#;

pub const FASTNET_JSON: &str = r#"{
    "public_key": "a0b862a7527fee3a731bcb59280ab6abd62d5c0b6ea03dc4ddf6612fdfc9d01f01c31542541771903475eb1ec6615f8d0df0b8b6dce385811d6dcf8cbefb8759e5e616a3dfd054c928940766d9a5b9db91e3b697e5d70a975181e007f87fca5e",
    "period": 3,
    "genesis_time": 1677685200,
    "hash": "dbd506d6ef76e5f386f41c651dcb808c5bcbd75471cc4eafa3f4df7ad4e4c493",
    "groupHash": "a81e9d63f614ccdb144b8ff79fbd4d5a2d22055c0bfe4ee9a8092003dab1c6c0",
    "schemeID": "bls-unchained-on-g1",
    "metadata": { "beaconID": "fastnet" }
}"#;

pub const QUICKNET_JSON: &str = r#"{
    "public_key": "83cf0f2896adee7eb8b5f01fcad3912212c437e0073e911fb90022d3e760183c8c4b450b6a0a6c3ac6a5776a2d1064510d1fec758c921cc22b0e17e63aaf4bcb5ed66304de9cf809bd274ca73bab4af5a6e9c76a4bc09e76eae8991ef5ece45a",
    "period": 3,
    "genesis_time": 1692803367,
    "hash": "52db9ba70e0cc0f6eaf7803dd07447a1f5477735fd3f661792ba94600c84e971",
    "groupHash": "f477d5c89f21a17c863a7f937c6a6d15859414d2be09cd448d4279af331c5d3e",
    "schemeID": "bls-unchained-g1-rfc9380",
    "metadata": { "beaconID": "quicknet" }
}"#;

pub fn testnet() -> ChainInfo {
    ChainInfo::from_json(TESTNET_JSON).expect("testnet info")
}

pub fn fastnet() -> ChainInfo {
    ChainInfo::from_json(FASTNET_JSON).expect("fastnet info")
}

pub fn quicknet() -> ChainInfo {
    ChainInfo::from_json(QUICKNET_JSON).expect("quicknet info")
}

/// testnet round 1.
pub fn testnet_round_1() -> Beacon {
    Beacon {
        round: 1,
        randomness: "8430af445106a217c174b6265093d386bd3631ccb3dae833b5e645abbb281323".into(),
        signature: "86ecea71376e78abd19aaf0ad52f462a6483626563b1023bd04815a7b953da888c74f5bf6ee672a5688603ab310026230522898f33f23a7de363c66f90ffd49ec77ebf7f6c1478a9ecd6e714b4d532ab43d044da0a16fed13b4791d7fc999e2b".into(),
    }
}

/// fastnet round 2.
pub fn fastnet_round_2() -> Beacon {
    Beacon {
        round: 2,
        randomness: "08eb40c1dff4076da53d222b2076f06c144391445cfac750815d5cacf51bf7c2".into(),
        signature: "a050676d1a1b6ceedb5fb3281cdfe88695199971426ff003c0862460b3a72811328a07ecd53b7d57fc82bb67f35efaf1".into(),
    }
}

/// Unix seconds comfortably after every round used in these tests.
pub const FAR_FUTURE: u64 = 4_000_000_000;

/// A chain whose secret key is known, so beacons can be minted for any
/// round.
pub struct SyntheticChain {
    pub info: ChainInfo,
    secret: Scalar,
}

impl SyntheticChain {
    pub fn new(scheme: Scheme) -> Self {
        let secret = Scalar::from(0x7e57_c4a1_u64);
        let public_key = match scheme.placement() {
            Placement::PublicKeyOnG1 => {
                hex::encode(g1_to_bytes(&OnG1::mul_public(&OnG1::public_generator(), &secret)))
            }
            Placement::PublicKeyOnG2 => {
                hex::encode(g2_to_bytes(&OnG2::mul_public(&OnG2::public_generator(), &secret)))
            }
        };
        let info = ChainInfo {
            public_key,
            period: 3,
            genesis_time: 1_700_000_000,
            hash: hex::encode([0xab; 32]),
            group_hash: None,
            scheme_id: scheme.id().to_string(),
            metadata: None,
        };
        Self { info, secret }
    }

    pub fn beacon(&self, round: u64) -> Beacon {
        let scheme = self.info.scheme().expect("scheme");
        let message = round_identity(round);
        let signature = match scheme.placement() {
            Placement::PublicKeyOnG1 => {
                g2_to_bytes(&(OnG1::hash_to_signature_group(&message, scheme.dst()) * self.secret)).to_vec()
            }
            Placement::PublicKeyOnG2 => {
                g1_to_bytes(&(OnG2::hash_to_signature_group(&message, scheme.dst()) * self.secret)).to_vec()
            }
        };
        Beacon {
            round,
            randomness: String::new(),
            signature: hex::encode(signature),
        }
    }

    pub fn provider(&self, rounds: &[u64]) -> InMemoryBeacons {
        let mut provider = InMemoryBeacons::new(self.info.clone());
        for &round in rounds {
            provider.insert(self.beacon(round)).expect("synthetic beacon verifies");
        }
        provider
    }

    /// Time at which `round` has just been published.
    pub fn published(&self, round: u64) -> u64 {
        self.info.round_time(round)
    }
}

/// Hands out a fixed beacon for every round without checking it.
pub struct UncheckedBeacon {
    pub chain: ChainInfo,
    pub beacon: Beacon,
}

impl BeaconProvider for UncheckedBeacon {
    async fn chain_info(&self) -> Result<ChainInfo, Error> {
        Ok(self.chain.clone())
    }

    async fn beacon(&self, _round: u64) -> Result<Beacon, Error> {
        Ok(self.beacon.clone())
    }
}

/// Panics if the provider is ever asked for a beacon.
pub struct NoBeacons;

impl BeaconProvider for NoBeacons {
    async fn chain_info(&self) -> Result<ChainInfo, Error> {
        Err(Error::Beacon("no chain".into()))
    }

    async fn beacon(&self, round: u64) -> Result<Beacon, Error> {
        panic!("beacon for round {round} should not have been requested")
    }
}
