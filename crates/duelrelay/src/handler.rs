//! Per-connection handler: feeds inbound payloads to the hub and writes
//! the hub's deliveries back out.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register with the hub, handing it this connection's outbound queue
//!   2. Spawn a writer task that drains the queue into the socket
//!   3. Loop: receive payloads → forward to the hub
//!   4. On close, error, or idle timeout: stop, and the hub is told

use std::sync::Arc;
use std::time::Duration;

use duelrelay_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::DuelrelayError;
use crate::hub::HubHandle;

/// Drop guard that reports the disconnect to the hub when the handler
/// exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async send.
struct DisconnectGuard {
    conn_id: ConnectionId,
    hub: HubHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let hub = self.hub.clone();
        tokio::spawn(async move {
            let _ = hub.disconnect(conn_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    hub: HubHandle,
    idle_timeout: Option<Duration>,
) -> Result<(), DuelrelayError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    hub.connect(conn_id, outbound_tx).await?;
    let _guard = DisconnectGuard {
        conn_id,
        hub: hub.clone(),
    };

    let writer = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move {
            // Ends when the hub drops our queue or the socket breaks.
            while let Some(bytes) = outbound_rx.recv().await {
                if let Err(e) = conn.send(&bytes).await {
                    tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
                    break;
                }
            }
        })
    };

    loop {
        let received = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, conn.recv()).await {
                Ok(received) => received,
                Err(_) => {
                    tracing::info!(%conn_id, "connection idle, closing");
                    let _ = conn.close().await;
                    break;
                }
            },
            None => conn.recv().await,
        };

        match received {
            Ok(Some(data)) => hub.message(conn_id, data).await?,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "connection error");
                break;
            }
        }
    }

    writer.abort();
    // _guard drops here → hub runs disconnect cleanup.
    Ok(())
}
