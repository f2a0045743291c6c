//! Bus dispatch loop for `firstchar-server`.
//!
//! Claims the server name, then pops messages one at a time and answers
//! each before reading the next. Ordering is bus delivery order.

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};
use zbus::{Connection, Message, MessageStream};

use crate::address::BusAddress;
use crate::bus::{BusTransport, ZbusTransport};
use crate::responder::{claim_service_name, Disposition, Inbound, Responder};
use crate::{AppError, Result};

/// Serve `first_char` on `conn` until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::NameUnavailable` if the server name is taken, and
/// `AppError::Bus` if the connection drops or a reply cannot be sent.
pub async fn serve(conn: &Connection, address: &BusAddress, ct: CancellationToken) -> Result<()> {
    // Subscribe before claiming the name so no call slips past.
    let mut stream = MessageStream::from(conn);
    let transport = ZbusTransport::new(conn.clone());
    claim_service_name(&transport, address).await?;

    info!(
        name = %address.server_name,
        path = %address.server_object_path,
        interface = %address.interface,
        method = %address.method,
        "responder ready"
    );

    let responder = Responder::new(address.clone());
    let span = info_span!("responder", name = %address.server_name);
    let outcome = async {
        let mut stdout = std::io::stdout();
        loop {
            tokio::select! {
                () = ct.cancelled() => {
                    info!("responder shutting down");
                    break Ok(());
                }
                next = stream.next() => {
                    let Some(next) = next else {
                        break Err(AppError::Bus("not connected now".into()));
                    };
                    let message = match next {
                        Ok(message) => message,
                        Err(err) => {
                            warn!(%err, "did not get message");
                            continue;
                        }
                    };

                    let inbound = Inbound::from_message(&message);
                    let disposition = responder.handle(&inbound, &mut stdout);
                    if let Err(err) = send_disposition(conn, &message, disposition).await {
                        break Err(err);
                    }
                }
            }
        }
    }
    .instrument(span)
    .await;

    match transport.release_name(&address.server_name).await {
        Ok(_) => {}
        Err(err) if outcome.is_ok() => return Err(err),
        Err(err) => error!(%err, "failed to release server name"),
    }

    outcome
}

async fn send_disposition(conn: &Connection, call: &Message, disposition: Disposition) -> Result<()> {
    match disposition {
        Disposition::Ignore => Ok(()),
        Disposition::Return(body) => conn
            .reply(call, &body)
            .await
            .map(|_| ())
            .map_err(|err| AppError::Bus(format!("failed to send reply: {err}"))),
        Disposition::Error { name, message } => conn
            .reply_error(call, name, &message)
            .await
            .map(|_| ())
            .map_err(|err| AppError::Bus(format!("failed to send error reply: {err}"))),
    }
}
