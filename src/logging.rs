//! Diagnostic logging setup.
//!
//! Everything in the crate logs through `tracing`; the filter comes from
//! `RUST_LOG` and defaults to info for this crate only.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "murmur_client=info";

/// Install the global fmt subscriber. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
