//! Diagnostic output of the tool itself
//!
//! Internal events (retries, rollovers, echo failures) go through `tracing` to stderr,
//! never into the log files the tool writes.

use anyhow::{anyhow, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when `RUST_LOG` is unset
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "rollog=debug"
    } else {
        "rollog=warn"
    }
}

/// Initialize stderr diagnostics
///
/// `RUST_LOG` takes precedence over `verbose`.
pub fn init_diagnostics(verbose: bool) -> Result<()> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(verbose).into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize diagnostics: {}", e))
}
