//! Tracing subscriber setup for applications embedding the cart store.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! the embedding application's call. This helper installs the usual one.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "gomarketplace_cart=info";

/// Install a global subscriber with an `EnvFilter` and the given format.
///
/// Returns `false` if a global subscriber was already installed, which makes
/// this safe to call from every test.
pub fn init(format: LogFormat) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .is_ok(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .is_ok(),
    }
}
