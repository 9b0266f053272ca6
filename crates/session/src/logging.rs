//! Logging setup and configuration

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Invalid log filter directive.
#[derive(Debug, Error)]
#[error("invalid log filter: {0}")]
pub struct InvalidFilter(String);

/// Setup tracing subscriber for the application
pub fn setup_logging(default_level: &str) -> Result<(), InvalidFilter> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| InvalidFilter(e.to_string()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    Ok(())
}
