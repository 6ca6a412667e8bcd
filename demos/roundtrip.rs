//! Encrypt a message to a future round of a locally simulated chain, show
//! that it cannot be opened early, then open it with the round's beacon.
//!
//! The chain's secret key is known here so the beacon can be minted on the
//! spot; against a real drand network the beacon would be fetched once the
//! round is published.

use blstrs::Scalar;
use rand_core::OsRng;
use tlock_age::bls::{g1_to_bytes, g2_to_bytes, round_identity};
use tlock_age::scheme::{GroupPlacement, OnG2};
use tlock_age::{Beacon, ChainInfo, Error, InMemoryBeacons, Scheme, decrypt_at, encrypt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    tlock_age::logging::init_tracing(None);

    let scheme = Scheme::BlsUnchainedG1Rfc9380;
    let secret = Scalar::from(0xd3_4d_u64);
    let chain = ChainInfo {
        public_key: hex::encode(g2_to_bytes(&OnG2::mul_public(&OnG2::public_generator(), &secret))),
        period: 3,
        genesis_time: 1_700_000_000,
        hash: hex::encode([0x11; 32]),
        group_hash: None,
        scheme_id: scheme.id().to_string(),
        metadata: None,
    };

    let round = chain.round_at((chain.genesis_time + 60) * 1000)?;
    let armored = encrypt(&chain, round, b"see you in a minute", &mut OsRng)?;
    println!("{armored}");

    let signature = OnG2::hash_to_signature_group(&round_identity(round), scheme.dst()) * secret;
    let beacon = Beacon {
        round,
        randomness: String::new(),
        signature: hex::encode(g1_to_bytes(&signature)),
    };
    let provider = InMemoryBeacons::new(chain.clone()).with_beacon(beacon)?;

    match decrypt_at(&chain, &provider, armored.as_bytes(), chain.genesis_time).await {
        Err(Error::TooEarly { round, available_at }) => {
            println!("round {round} not yet available (opens at {available_at})");
        }
        other => println!("unexpected: {other:?}"),
    }

    let plaintext = decrypt_at(&chain, &provider, armored.as_bytes(), chain.round_time(round)).await?;
    println!("decrypted: {}", String::from_utf8_lossy(&plaintext));
    Ok(())
}
