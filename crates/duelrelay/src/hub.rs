//! Hub actor: the single serialization point for all room state.
//!
//! Every connection handler talks to one hub task through an mpsc channel.
//! The hub owns the [`Router`] and the outbound queue of every live
//! connection, so room updates never race each other.

use std::collections::HashMap;

use duelrelay_protocol::Codec;
use duelrelay_room::RegistryConfig;
use duelrelay_transport::ConnectionId;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::router::{Delivery, Router};
use crate::DuelrelayError;

/// Queue of encoded payloads waiting to be written to one connection.
///
/// Unbounded so the hub never waits on a slow peer; the connection's
/// writer task drains it.
pub type OutboundSender = mpsc::UnboundedSender<Vec<u8>>;

/// Commands sent to the hub through its channel.
enum HubCommand {
    /// A connection opened.
    Connect {
        id: ConnectionId,
        outbound: OutboundSender,
    },

    /// A connection sent a payload.
    Message { id: ConnectionId, data: Vec<u8> },

    /// A connection ended.
    Disconnect { id: ConnectionId },

    /// Request a snapshot of the hub's counters.
    Stats { reply: oneshot::Sender<HubStats> },
}

/// Counters describing the hub at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HubStats {
    /// Connections registered with the hub.
    pub connections: usize,
    /// Live rooms.
    pub rooms: usize,
    /// Connections sitting in a room.
    pub seated: usize,
}

/// Handle to the running hub. Cheap to clone; one per connection task.
#[derive(Clone)]
pub struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Registers a new connection and the queue to deliver to it.
    pub async fn connect(
        &self,
        id: ConnectionId,
        outbound: OutboundSender,
    ) -> Result<(), DuelrelayError> {
        self.send(HubCommand::Connect { id, outbound }).await
    }

    /// Hands an inbound payload to the hub (fire-and-forget).
    pub async fn message(
        &self,
        id: ConnectionId,
        data: Vec<u8>,
    ) -> Result<(), DuelrelayError> {
        self.send(HubCommand::Message { id, data }).await
    }

    /// Reports that a connection has ended.
    pub async fn disconnect(&self, id: ConnectionId) -> Result<(), DuelrelayError> {
        self.send(HubCommand::Disconnect { id }).await
    }

    /// Requests the current counters.
    pub async fn stats(&self) -> Result<HubStats, DuelrelayError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(HubCommand::Stats { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| DuelrelayError::HubUnavailable)
    }

    async fn send(&self, cmd: HubCommand) -> Result<(), DuelrelayError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| DuelrelayError::HubUnavailable)
    }
}

/// The internal hub state. Runs inside a Tokio task.
struct HubActor<C: Codec> {
    router: Router<C>,
    connections: HashMap<ConnectionId, OutboundSender>,
    receiver: mpsc::Receiver<HubCommand>,
}

impl<C: Codec> HubActor<C> {
    /// Runs the actor loop until every [`HubHandle`] is dropped.
    async fn run(mut self) {
        tracing::debug!("relay hub started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                HubCommand::Connect { id, outbound } => {
                    self.connections.insert(id, outbound);
                    tracing::info!(conn = %id, "client connected");
                }
                HubCommand::Message { id, data } => {
                    let deliveries = self.router.handle_message(id, data);
                    self.deliver(deliveries);
                }
                HubCommand::Disconnect { id } => {
                    // Forget the handle first so nothing is queued to a dead peer.
                    if self.connections.remove(&id).is_some() {
                        tracing::info!(conn = %id, "client disconnected");
                    }
                    let deliveries = self.router.disconnect(id);
                    self.deliver(deliveries);
                }
                HubCommand::Stats { reply } => {
                    let _ = reply.send(self.stats());
                }
            }
        }

        tracing::debug!("relay hub stopped");
    }

    /// Queues each delivery on its connection. Deliveries to connections
    /// that are gone are silently dropped.
    fn deliver(&self, deliveries: Vec<Delivery>) {
        for Delivery { to, payload } in deliveries {
            let Some(outbound) = self.connections.get(&to) else {
                tracing::trace!(conn = %to, "dropping delivery to closed connection");
                continue;
            };
            match payload.into_bytes(self.router.codec()) {
                Ok(bytes) => {
                    let _ = outbound.send(bytes);
                }
                Err(e) => {
                    tracing::error!(conn = %to, error = %e, "failed to encode message");
                }
            }
        }
    }

    fn stats(&self) -> HubStats {
        HubStats {
            connections: self.connections.len(),
            rooms: self.router.registry().len(),
            seated: self.router.sessions().len(),
        }
    }
}

/// Spawns the hub task and returns a handle to it.
///
/// `channel_size` bounds the command queue: when it is full, connection
/// readers wait for the hub to catch up.
pub fn spawn_hub<C: Codec>(
    codec: C,
    config: RegistryConfig,
    channel_size: usize,
) -> HubHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));

    let actor = HubActor {
        router: Router::new(codec, config),
        connections: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    HubHandle { sender: tx }
}
