//! Bus addressing shared by the requester and the responder.
//!
//! Both sides must agree on every value bit-for-bit. The compiled-in
//! defaults are the constants below; a config file may replace the whole
//! table, in which case both binaries must read the same file.

use serde::Deserialize;
use zbus::names::{InterfaceName, MemberName, WellKnownName};
use zbus::zvariant::ObjectPath;

use crate::{AppError, Result};

/// Interface that carries the `first_char` method.
pub const INTERFACE_NAME: &str = "alex.dbus";
/// Well-known name claimed by the responder.
pub const SERVER_BUS_NAME: &str = "alex.server";
/// Well-known name claimed by the requester for the duration of a call.
pub const CLIENT_BUS_NAME: &str = "alex.client";
/// Object path the responder answers on.
pub const SERVER_OBJECT_PATH: &str = "/in/alex/fc";
/// Object path reserved for the requester. Nothing is served on it.
pub const CLIENT_OBJECT_PATH: &str = "/in/alex/client";
/// Method invoked by the requester.
pub const METHOD_NAME: &str = "first_char";

/// Generic failure error name sent when a request is rejected.
pub const ERROR_FAILED: &str = "org.freedesktop.DBus.Error.Failed";
/// Error name sent for calls on our path that name another method.
pub const ERROR_UNKNOWN_METHOD: &str = "org.freedesktop.DBus.Error.UnknownMethod";
/// Leading text of every rejection message.
pub const INPUT_ERROR_TEXT: &str = "Error in input";

/// Full addressing tuple for one requester/responder deployment.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct BusAddress {
    /// Interface name of the method.
    pub interface: String,
    /// Responder well-known name.
    pub server_name: String,
    /// Requester well-known name.
    pub client_name: String,
    /// Responder object path.
    pub server_object_path: String,
    /// Requester object path.
    pub client_object_path: String,
    /// Method (member) name.
    pub method: String,
}

impl Default for BusAddress {
    fn default() -> Self {
        Self {
            interface: INTERFACE_NAME.into(),
            server_name: SERVER_BUS_NAME.into(),
            client_name: CLIENT_BUS_NAME.into(),
            server_object_path: SERVER_OBJECT_PATH.into(),
            client_object_path: CLIENT_OBJECT_PATH.into(),
            method: METHOD_NAME.into(),
        }
    }
}

impl BusAddress {
    /// Whether an inbound call names our interface and method.
    #[must_use]
    pub fn is_first_char_call(&self, interface: Option<&str>, member: Option<&str>) -> bool {
        interface == Some(self.interface.as_str()) && member == Some(self.method.as_str())
    }

    /// Check every field against the D-Bus naming rules.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` naming the first invalid field, or when
    /// the server and client names collide.
    pub fn validate(&self) -> Result<()> {
        InterfaceName::try_from(self.interface.as_str())
            .map_err(|err| invalid("interface", &self.interface, &err))?;
        WellKnownName::try_from(self.server_name.as_str())
            .map_err(|err| invalid("server_name", &self.server_name, &err))?;
        WellKnownName::try_from(self.client_name.as_str())
            .map_err(|err| invalid("client_name", &self.client_name, &err))?;
        ObjectPath::try_from(self.server_object_path.as_str())
            .map_err(|err| invalid("server_object_path", &self.server_object_path, &err))?;
        ObjectPath::try_from(self.client_object_path.as_str())
            .map_err(|err| invalid("client_object_path", &self.client_object_path, &err))?;
        MemberName::try_from(self.method.as_str())
            .map_err(|err| invalid("method", &self.method, &err))?;

        if self.server_name == self.client_name {
            return Err(AppError::Config(
                "server_name and client_name must differ".into(),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, value: &str, err: &dyn std::fmt::Display) -> AppError {
    AppError::Config(format!("address.{field} '{value}' is invalid: {err}"))
}
