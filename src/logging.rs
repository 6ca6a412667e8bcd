//! Diagnostics for the `tlock` CLI and the demo.
//!
//! `tlock` streams ciphertext or plaintext over stdout, so every event is
//! written to stderr. Per-call spans such as `tlock::decrypt` are recorded
//! by whatever subscriber the embedding application installs; this module
//! only supplies one for the binaries that ship with the crate.

use tracing_subscriber::{EnvFilter, fmt};

/// Install the stderr subscriber.
///
/// `filter` is the value of `tlock --log`. Without it `RUST_LOG` applies,
/// and `info` when that is unset or unparsable. Returns `false` if a global
/// subscriber was already installed, in which case that one stays.
pub fn init_tracing(filter: Option<&str>) -> bool {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).is_ok()
}
