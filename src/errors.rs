//! Error types shared across the requester and responder.

use std::fmt::{Display, Formatter};

use crate::address::ERROR_FAILED;

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all failure modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Bus connection, send, release, or disconnect failure.
    Bus(String),
    /// A well-known name could not be acquired.
    NameUnavailable(String),
    /// Message or argument shape did not match the expected signature.
    Protocol(String),
    /// The peer answered with an error reply.
    Remote {
        /// D-Bus error name, e.g. `org.freedesktop.DBus.Error.Failed`.
        name: String,
        /// Human-readable text carried in the error body.
        message: String,
    },
    /// Nothing remained after stripping the trailing line break.
    EmptyInput,
    /// No reply arrived within the configured timeout.
    Timeout(String),
    /// Standard stream I/O failure.
    Io(String),
}

impl AppError {
    /// Whether the error is the server rejecting one line of input.
    ///
    /// The requester reports these and keeps reading; every other error
    /// ends the input loop.
    #[must_use]
    pub fn is_input_rejection(&self) -> bool {
        match self {
            Self::EmptyInput => true,
            Self::Remote { name, .. } => name == ERROR_FAILED,
            _ => false,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Bus(msg) => write!(f, "bus: {msg}"),
            Self::NameUnavailable(msg) => write!(f, "name unavailable: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol: {msg}"),
            Self::Remote { name, message } => write!(f, "remote error {name}: {message}"),
            Self::EmptyInput => write!(f, "empty input"),
            Self::Timeout(msg) => write!(f, "timeout: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<zbus::Error> for AppError {
    fn from(err: zbus::Error) -> Self {
        match err {
            zbus::Error::MethodError(name, message, _) => Self::Remote {
                name: name.to_string(),
                message: message.unwrap_or_default(),
            },
            zbus::Error::Variant(inner) => Self::Protocol(inner.to_string()),
            zbus::Error::InvalidReply => Self::Protocol("invalid reply".into()),
            zbus::Error::NameTaken => Self::NameUnavailable("name already taken on the bus".into()),
            other => Self::Bus(other.to_string()),
        }
    }
}
