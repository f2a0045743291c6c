//! Server side of the `first_char` exchange.
//!
//! [`Responder::handle`] decides what to do with one inbound message;
//! [`server::serve`] owns the bus loop and carries the decision out.
//! Every matching method call gets exactly one reply, success or error.

pub mod server;

use std::io::Write;

use tracing::{debug, warn};

use crate::address::{BusAddress, ERROR_FAILED, ERROR_UNKNOWN_METHOD, INPUT_ERROR_TEXT};
use crate::bus::{BusTransport, NameQueueing};
use crate::first_char::compose_reply;
use crate::{AppError, Result};

pub use server::serve;

/// Method call fields the responder looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    /// Object path the call was sent to.
    pub path: Option<String>,
    /// Interface named in the call.
    pub interface: Option<String>,
    /// Member (method) named in the call.
    pub member: Option<String>,
    /// Body decoded as a single string.
    pub argument: Result<String>,
}

/// One message popped from the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A method call.
    MethodCall(MethodCall),
    /// Signals, replies, and errors. Never answered.
    Other,
}

impl Inbound {
    /// Extract the fields of a `zbus` message.
    #[must_use]
    pub fn from_message(message: &zbus::Message) -> Self {
        if message.message_type() != zbus::message::Type::MethodCall {
            return Self::Other;
        }

        let header = message.header();
        Self::MethodCall(MethodCall {
            path: header.path().map(ToString::to_string),
            interface: header.interface().map(ToString::to_string),
            member: header.member().map(ToString::to_string),
            argument: message
                .body()
                .deserialize::<String>()
                .map_err(|err| AppError::Protocol(err.to_string())),
        })
    }
}

/// What to send back for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Send nothing.
    Ignore,
    /// Method return carrying one string.
    Return(String),
    /// Error reply.
    Error {
        /// D-Bus error name.
        name: &'static str,
        /// Error text.
        message: String,
    },
}

/// Per-message decision logic for the `first_char` service.
#[derive(Debug, Clone)]
pub struct Responder {
    address: BusAddress,
}

impl Responder {
    /// Create a responder answering on `address`.
    #[must_use]
    pub fn new(address: BusAddress) -> Self {
        Self { address }
    }

    /// Decide the reply for `inbound`.
    ///
    /// The raw argument of an accepted call is written to `echo`.
    pub fn handle<W: Write>(&self, inbound: &Inbound, echo: &mut W) -> Disposition {
        let Inbound::MethodCall(call) = inbound else {
            return Disposition::Ignore;
        };

        if !self
            .address
            .is_first_char_call(call.interface.as_deref(), call.member.as_deref())
        {
            return self.misaddressed(call);
        }

        let argument = match &call.argument {
            Ok(argument) => argument,
            Err(err) => {
                warn!(%err, "error getting message argument");
                return reject(err);
            }
        };

        if let Err(err) = write!(echo, "{argument}").and_then(|()| echo.flush()) {
            warn!(%err, "failed to echo received argument");
        }

        match compose_reply(argument) {
            Ok(reply) => {
                debug!(%reply, "answering");
                Disposition::Return(reply)
            }
            Err(err) => {
                warn!(%err, "rejecting request");
                reject(&err)
            }
        }
    }

    fn misaddressed(&self, call: &MethodCall) -> Disposition {
        if call.path.as_deref() != Some(self.address.server_object_path.as_str()) {
            return Disposition::Ignore;
        }

        let interface = call.interface.as_deref().unwrap_or("<none>");
        let member = call.member.as_deref().unwrap_or("<none>");
        debug!(interface, member, "unknown method");
        Disposition::Error {
            name: ERROR_UNKNOWN_METHOD,
            message: format!(
                "no method {interface}.{member} at {}",
                self.address.server_object_path
            ),
        }
    }
}

fn reject(err: &AppError) -> Disposition {
    Disposition::Error {
        name: ERROR_FAILED,
        message: format!("{INPUT_ERROR_TEXT}: {err}"),
    }
}

/// Claim the server well-known name without queueing.
///
/// # Errors
///
/// Returns `AppError::NameUnavailable` when another process owns the name,
/// or `AppError::Bus` if the request cannot be made.
pub async fn claim_service_name(transport: &dyn BusTransport, address: &BusAddress) -> Result<()> {
    let name = address.server_name.as_str();
    let reply = transport.request_name(name, NameQueueing::DoNotQueue).await?;
    if reply.is_owner() {
        Ok(())
    } else {
        Err(AppError::NameUnavailable(format!(
            "{name}: not primary owner ({reply:?}); is another server running?"
        )))
    }
}
