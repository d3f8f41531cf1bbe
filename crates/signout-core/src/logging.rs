//! Tracing subscriber setup for binaries embedding the engine.

use crate::{Error, Result};

/// Initialize tracing subscriber for logging
///
/// Configures the tracing subscriber with:
/// - Environment filter (`RUST_LOG`, defaults to INFO level)
/// - Stderr output, so element content written to stdout stays clean
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::unknown(format!("Failed to initialize tracing subscriber: {e}")))
}
