//! Structured logging setup.
//!
//! A library, not a service: there's no OTLP collector to export to, so
//! this is just an `EnvFilter`-driven `tracing` subscriber callers may
//! opt into. The core itself only ever emits `tracing` events/spans; it
//! never installs a subscriber on its own.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a JSON-formatted `tracing` subscriber honoring `RUST_LOG`,
/// falling back to `default_log_level` when the environment variable is
/// unset or unparsable.
///
/// Intended for binaries embedding this crate; library consumers that
/// already run their own subscriber should not call this.
pub fn init_tracing(default_log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
