//! # Logging Module
//!
//! Installs the global `tracing` subscriber for the binary. The filter comes from
//! `RUST_LOG` and defaults to `info`.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::nutrition_config::LogFormat;

const DEFAULT_LOG_FILTER: &str = "info";

/// Initialize the global subscriber in the requested format
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(format: LogFormat) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Logs go to stderr so stdout stays machine-readable
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Plain => builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?,
        LogFormat::Json => builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?,
    }

    Ok(())
}
