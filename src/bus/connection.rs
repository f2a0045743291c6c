//! `zbus` implementation of [`BusTransport`].

use enumflags2::BitFlags;
use tracing::{debug, info};
use zbus::fdo::{RequestNameFlags, RequestNameReply};
use zbus::Connection;

use crate::address::BusAddress;
use crate::bus::{BusFuture, BusTransport, NameQueueing, NameReply};
use crate::config::{BusKind, Config};
use crate::{AppError, Result};

/// Open a connection to the bus selected by `config`.
///
/// An explicit `bus_address` wins over `bus`.
///
/// # Errors
///
/// Returns `AppError::Bus` if the address is malformed or the bus is
/// unreachable.
pub async fn connect(config: &Config) -> Result<Connection> {
    let builder = match (&config.bus_address, config.bus) {
        (Some(address), _) => zbus::connection::Builder::address(address.as_str()),
        (None, BusKind::Session) => zbus::connection::Builder::session(),
        (None, BusKind::System) => zbus::connection::Builder::system(),
    }
    .map_err(|err| AppError::Bus(format!("invalid bus address: {err}")))?;

    let conn = builder
        .build()
        .await
        .map_err(|err| AppError::Bus(format!("failed to connect to the bus: {err}")))?;

    info!(
        bus = ?config.bus,
        unique_name = ?conn.unique_name().map(ToString::to_string),
        "connected to the bus"
    );
    Ok(conn)
}

/// [`BusTransport`] over a live `zbus` connection.
#[derive(Debug, Clone)]
pub struct ZbusTransport {
    conn: Connection,
}

impl ZbusTransport {
    /// Wrap an open connection.
    #[must_use]
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl BusTransport for ZbusTransport {
    fn request_name(&self, name: &str, queueing: NameQueueing) -> BusFuture<'_, NameReply> {
        let name = name.to_owned();
        Box::pin(async move {
            let flags: BitFlags<RequestNameFlags> = match queueing {
                NameQueueing::Queue => BitFlags::empty(),
                NameQueueing::DoNotQueue => RequestNameFlags::DoNotQueue.into(),
            };
            let result = self.conn.request_name_with_flags(name.as_str(), flags).await;
            let reply = name_reply(&name, result)?;
            debug!(%name, ?reply, "request_name");
            Ok(reply)
        })
    }

    fn release_name(&self, name: &str) -> BusFuture<'_, bool> {
        let name = name.to_owned();
        Box::pin(async move {
            let released = self
                .conn
                .release_name(name.as_str())
                .await
                .map_err(|err| AppError::Bus(format!("release_name '{name}' failed: {err}")))?;
            debug!(%name, released, "release_name");
            Ok(released)
        })
    }

    fn call(&self, address: &BusAddress, argument: &str) -> BusFuture<'_, String> {
        let address = address.clone();
        let argument = argument.to_owned();
        Box::pin(async move {
            let reply = self
                .conn
                .call_method(
                    Some(address.server_name.as_str()),
                    address.server_object_path.as_str(),
                    Some(address.interface.as_str()),
                    address.method.as_str(),
                    &argument,
                )
                .await?;

            reply
                .body()
                .deserialize::<String>()
                .map_err(|err| AppError::Protocol(format!("did not get a string in reply: {err}")))
        })
    }
}

/// zbus reports a `DoNotQueue` conflict as `Error::NameTaken` rather than an
/// `Exists` reply.
fn name_reply(name: &str, result: zbus::Result<RequestNameReply>) -> Result<NameReply> {
    match result {
        Ok(reply) => Ok(NameReply::from(reply)),
        Err(zbus::Error::NameTaken) => Ok(NameReply::Exists),
        Err(err) => Err(AppError::Bus(format!("request_name '{name}' failed: {err}"))),
    }
}
