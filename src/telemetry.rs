//! Tracing bootstrap for binaries and examples embedding the crate.
//!
//! The library itself only emits `tracing` events; installing a
//! subscriber is the embedding application's decision, so this helper
//! is opt-in and idempotent.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber honoring `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
