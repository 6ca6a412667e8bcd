#![forbid(unsafe_code)]

pub mod armor;
pub mod beacon;
pub mod bls;
pub mod chain;
pub mod container;
pub mod encoding;
pub mod envelope;
pub mod ibe;
pub mod kdf;
pub mod logging;
pub mod scheme;
pub mod stream;
pub mod timelock;
pub mod types;

pub use crate::beacon::{Beacon, BeaconProvider, InMemoryBeacons};
pub use crate::chain::ChainInfo;
pub use crate::scheme::Scheme;
pub use crate::timelock::{decrypt, decrypt_at, encrypt, encrypt_binary};
pub use crate::types::{Error, FileKey, Wire};
