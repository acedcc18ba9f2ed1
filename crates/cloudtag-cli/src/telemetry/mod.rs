//! Telemetry and tracing configuration.

mod tracing;

use anyhow::Context;

/// Initializes the tracing subscriber.
pub(crate) fn init_tracing() -> anyhow::Result<()> {
    tracing::init_tracing().context("Failed to initialize tracing")
}
