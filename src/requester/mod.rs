//! Client side of the `first_char` exchange.
//!
//! Each call registers the client well-known name, performs one blocking
//! round-trip to the responder, and releases the name again. The name is
//! never held across calls.

pub mod input;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info_span, warn, Instrument};

use crate::address::BusAddress;
use crate::bus::{BusTransport, NameQueueing, NameReply};
use crate::config::{Config, NameRetryConfig};
use crate::{AppError, Result};

pub use input::{run_input_loop, LoopSummary, PROMPT};

/// Sends `first_char` requests through a [`BusTransport`].
pub struct Requester {
    transport: Arc<dyn BusTransport>,
    address: BusAddress,
    retry: NameRetryConfig,
    reply_timeout: Duration,
}

impl Requester {
    /// Create a requester with explicit settings.
    #[must_use]
    pub fn new(
        transport: Arc<dyn BusTransport>,
        address: BusAddress,
        retry: NameRetryConfig,
        reply_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            address,
            retry,
            reply_timeout,
        }
    }

    /// Create a requester from loaded configuration.
    #[must_use]
    pub fn from_config(transport: Arc<dyn BusTransport>, config: &Config) -> Self {
        Self::new(
            transport,
            config.address.clone(),
            config.name_retry.clone(),
            config.reply_timeout(),
        )
    }

    /// Ask the responder for the first character of `line`.
    ///
    /// `line` is sent as given, trailing line break included.
    ///
    /// # Errors
    ///
    /// - `AppError::EmptyInput` if `line` is empty; nothing is sent.
    /// - `AppError::NameUnavailable` if the client name stays queued past
    ///   the retry budget or is refused.
    /// - `AppError::Timeout` if no reply arrives in time.
    /// - `AppError::Remote` for an error reply.
    /// - `AppError::Protocol` if the reply is not a single string.
    /// - `AppError::Bus` for transport failures, including a failed release.
    pub async fn send_first_char_request(&self, line: &str) -> Result<String> {
        if line.is_empty() {
            return Err(AppError::EmptyInput);
        }

        let span = info_span!("first_char_request", client = %self.address.client_name);
        async move {
            self.acquire_client_name().await?;

            let outcome = self.exchange(line).await;
            let released = self.transport.release_name(&self.address.client_name).await;

            match (outcome, released) {
                (Ok(reply), Ok(_)) => Ok(reply),
                (Err(err), Ok(_)) | (Ok(_), Err(err)) => Err(err),
                (Err(err), Err(release_err)) => {
                    warn!(%release_err, "failed to release client name after error");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn acquire_client_name(&self) -> Result<()> {
        let name = self.address.client_name.as_str();
        let max_attempts = self.retry.max_attempts;

        for attempt in 1..=max_attempts {
            let reply = self.transport.request_name(name, NameQueueing::Queue).await?;
            if reply.is_owner() {
                return Ok(());
            }
            if reply != NameReply::InQueue {
                return Err(AppError::NameUnavailable(format!(
                    "{name} refused by the bus ({reply:?})"
                )));
            }

            if attempt < max_attempts {
                warn!(attempt, max_attempts, "waiting for the bus");
                tokio::time::sleep(self.retry.interval()).await;
            }
        }

        // Leave the owner queue so a later call starts fresh.
        if let Err(err) = self.transport.release_name(name).await {
            warn!(%err, "failed to leave the name queue");
        }

        Err(AppError::NameUnavailable(format!(
            "{name} still queued after {max_attempts} attempts"
        )))
    }

    async fn exchange(&self, line: &str) -> Result<String> {
        match tokio::time::timeout(self.reply_timeout, self.transport.call(&self.address, line)).await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(format!(
                "no reply from {} within {}ms",
                self.address.server_name,
                self.reply_timeout.as_millis()
            ))),
        }
    }
}
