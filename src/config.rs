//! Configuration parsing and validation.
//!
//! Both binaries run without a config file. When one is given, it is TOML;
//! every key is optional and falls back to the compiled-in default.

use std::fs;
use std::path::Path;
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

use crate::address::BusAddress;
use crate::{AppError, Result};

/// Which message bus to connect to when no explicit address is given.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusKind {
    /// Per-login session bus. Default.
    #[default]
    Session,
    /// System-wide bus.
    System,
}

/// Retry policy for acquiring the requester's well-known name.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct NameRetryConfig {
    /// Total number of `RequestName` attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Pause between attempts while the name is queued.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_max_attempts() -> u32 {
    10
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_reply_timeout_seconds() -> u64 {
    25
}

impl Default for NameRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl NameRetryConfig {
    /// Poll interval as a `Duration`.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Top-level configuration shared by `firstchar-server` and `firstchar-ctl`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Bus to connect to when `bus_address` is unset.
    #[serde(default)]
    pub bus: BusKind,
    /// Explicit D-Bus address, e.g. `unix:path=/run/user/1000/bus`.
    #[serde(default)]
    pub bus_address: Option<String>,
    /// How long the requester waits for a reply.
    #[serde(default = "default_reply_timeout_seconds")]
    pub reply_timeout_seconds: u64,
    /// Client name acquisition policy.
    #[serde(default)]
    pub name_retry: NameRetryConfig,
    /// Bus names, paths, and members.
    #[serde(default)]
    pub address: BusAddress,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus: BusKind::default(),
            bus_address: None,
            reply_timeout_seconds: default_reply_timeout_seconds(),
            name_retry: NameRetryConfig::default(),
            address: BusAddress::default(),
        }
    }
}

impl Config {
    /// Load from `path` when given, otherwise return the defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or fails
    /// validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reply timeout as a `Duration`.
    #[must_use]
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_seconds)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.reply_timeout_seconds == 0 {
            return Err(AppError::Config(
                "reply_timeout_seconds must be greater than zero".into(),
            ));
        }

        if self.name_retry.max_attempts == 0 {
            return Err(AppError::Config(
                "name_retry.max_attempts must be greater than zero".into(),
            ));
        }

        if let Some(address) = &self.bus_address {
            if address.trim().is_empty() {
                return Err(AppError::Config("bus_address must not be empty".into()));
            }
        }

        self.address.validate()
    }
}
