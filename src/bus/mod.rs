//! Message-bus abstraction.
//!
//! The [`BusTransport`] trait is the only surface the requester and the
//! responder's startup path use to talk to the bus. [`ZbusTransport`]
//! implements it over a `zbus` connection; tests substitute an in-memory
//! implementation.

pub mod connection;

use std::future::Future;
use std::pin::Pin;

use crate::address::BusAddress;
use crate::Result;

pub use connection::{connect, ZbusTransport};

/// Boxed future returned by [`BusTransport`] methods.
pub type BusFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Whether a name request may wait in the bus's owner queue.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NameQueueing {
    /// Join the queue if the name is taken.
    Queue,
    /// Fail immediately if the name is taken.
    DoNotQueue,
}

/// Outcome of a `RequestName` call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NameReply {
    /// We now own the name.
    PrimaryOwner,
    /// Someone else owns it; we are queued behind them.
    InQueue,
    /// Someone else owns it and we asked not to queue.
    Exists,
    /// We already owned it.
    AlreadyOwner,
}

impl NameReply {
    /// Whether the caller holds the name after this reply.
    #[must_use]
    pub fn is_owner(self) -> bool {
        matches!(self, Self::PrimaryOwner | Self::AlreadyOwner)
    }
}

impl From<zbus::fdo::RequestNameReply> for NameReply {
    fn from(reply: zbus::fdo::RequestNameReply) -> Self {
        use zbus::fdo::RequestNameReply;
        match reply {
            RequestNameReply::PrimaryOwner => Self::PrimaryOwner,
            RequestNameReply::InQueue => Self::InQueue,
            RequestNameReply::Exists => Self::Exists,
            RequestNameReply::AlreadyOwner => Self::AlreadyOwner,
        }
    }
}

/// Operations the application needs from the bus.
pub trait BusTransport: Send + Sync {
    /// Ask the bus daemon for ownership of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Bus`](crate::AppError::Bus) if the request
    /// cannot be delivered.
    fn request_name(&self, name: &str, queueing: NameQueueing) -> BusFuture<'_, NameReply>;

    /// Give up ownership of `name`, or leave its queue.
    ///
    /// Resolves to `false` when we neither owned nor waited for the name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Bus`](crate::AppError::Bus) if the request
    /// cannot be delivered.
    fn release_name(&self, name: &str) -> BusFuture<'_, bool>;

    /// Invoke `address.method` on the responder with one string argument
    /// and resolve to the string in its reply.
    ///
    /// No timeout is applied here; callers bound the wait.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Remote`](crate::AppError::Remote) for an error
    /// reply, [`AppError::Protocol`](crate::AppError::Protocol) when the
    /// reply body is not a single string, and
    /// [`AppError::Bus`](crate::AppError::Bus) for transport failures.
    fn call(&self, address: &BusAddress, argument: &str) -> BusFuture<'_, String>;
}
