//! Tracing setup shared by both binaries.
//!
//! Diagnostics always go to stderr; stdout carries only program output.

use clap::ValueEnum;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{AppError, Result};

/// Log output format selected with `--log-format`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines. Default.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `default_directive`.
///
/// # Errors
///
/// Returns `AppError::Config` if the directive is invalid or a subscriber
/// is already installed.
pub fn init_tracing(log_format: LogFormat, default_directive: &str) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|err| AppError::Config(format!("invalid log filter: {err}")))?,
    };
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
