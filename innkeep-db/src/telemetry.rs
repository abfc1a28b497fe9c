//! Tracing initialization for embedding binaries.
//!
//! The subsystem itself only emits `tracing` events; installing a subscriber
//! is the embedding server's job, done once at startup through this helper.

use tracing_subscriber::EnvFilter;

/// Install an env-filtered fmt subscriber.
///
/// Honors `RUST_LOG`; defaults to `info` when unset. Calling twice is a
/// no-op so tests can initialize freely.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
