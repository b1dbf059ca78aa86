//! Tracing subscriber setup shared by the binaries.
//!
//! The library only emits events; installing a subscriber is left to
//! whoever embeds it.

use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`, falling
/// back to `default_directive` when the variable is unset or invalid.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
