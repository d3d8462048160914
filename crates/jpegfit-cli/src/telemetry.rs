//! Logging setup for the jpegfit binary.
//!
//! The core library only emits `tracing` events; this is where they get a
//! destination. Events go to stderr so `--json` output on stdout stays clean.

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `log_level` is used, or `debug` when
/// `verbose` is on.
pub fn init(log_level: &str, verbose: bool) -> anyhow::Result<()> {
    let fallback = if verbose { "debug" } else { log_level };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback)
            .with_context(|| format!("Invalid log level '{fallback}'"))?,
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact(),
    );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Logging initialized");
    Ok(())
}
