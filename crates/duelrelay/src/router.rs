//! Message dispatch: control messages mutate rooms, relay messages are
//! forwarded to the other occupant.
//!
//! The router is synchronous and does no I/O. Each call takes one inbound
//! event and returns the deliveries it produced; the hub performs them.
//! Because the hub calls the router from a single task, every handler runs
//! to completion before the next one starts.

use duelrelay_protocol::{
    Codec, ControlMessage, Inbound, ProtocolError, RelayKind, RoomCode,
    ServerMessage,
};
use duelrelay_room::{RegistryConfig, RoomError, RoomRegistry};
use duelrelay_session::SessionIndex;
use duelrelay_transport::ConnectionId;

use crate::DuelrelayError;

/// What to send to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    /// A message originated by the relay.
    System(ServerMessage),
    /// Another peer's message, exactly as it arrived.
    Relay(Vec<u8>),
}

impl Outgoing {
    /// Encodes the payload for the wire. Relayed bytes are passed through.
    pub fn into_bytes(self, codec: &impl Codec) -> Result<Vec<u8>, ProtocolError> {
        match self {
            Outgoing::System(msg) => codec.encode(&msg),
            Outgoing::Relay(bytes) => Ok(bytes),
        }
    }
}

/// One message addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: ConnectionId,
    pub payload: Outgoing,
}

impl Delivery {
    fn system(to: ConnectionId, msg: ServerMessage) -> Self {
        Self {
            to,
            payload: Outgoing::System(msg),
        }
    }
}

/// Owns the room registry and session index and applies inbound events to
/// them.
pub struct Router<C: Codec> {
    registry: RoomRegistry,
    sessions: SessionIndex,
    codec: C,
}

impl<C: Codec> Router<C> {
    pub fn new(codec: C, config: RegistryConfig) -> Self {
        Self {
            registry: RoomRegistry::new(config),
            sessions: SessionIndex::new(),
            codec,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &SessionIndex {
        &self.sessions
    }

    /// Handles one inbound payload from `from`.
    ///
    /// A failed message produces exactly one delivery, an `error` reply to
    /// the sender, and leaves all state as it was.
    pub fn handle_message(&mut self, from: ConnectionId, data: Vec<u8>) -> Vec<Delivery> {
        match self.dispatch(from, data) {
            Ok(deliveries) => deliveries,
            Err(e) => {
                tracing::debug!(%from, error = %e, "message rejected");
                vec![Delivery::system(from, ServerMessage::error(e.client_message()))]
            }
        }
    }

    /// Handles the end of a connection: vacates its seat, if any.
    pub fn disconnect(&mut self, conn: ConnectionId) -> Vec<Delivery> {
        self.vacate(conn)
    }

    fn dispatch(
        &mut self,
        from: ConnectionId,
        data: Vec<u8>,
    ) -> Result<Vec<Delivery>, DuelrelayError> {
        let inbound = Inbound::decode(&self.codec, &data)?;
        match inbound {
            Inbound::Control(ControlMessage::CreateRoom) => self.create_room(from),
            Inbound::Control(ControlMessage::JoinRoom { code }) => {
                self.join_room(from, code.ok_or(DuelrelayError::InvalidRoomCode)?)
            }
            Inbound::Control(ControlMessage::StartGame) => self.start_game(from),
            Inbound::Control(ControlMessage::LeaveRoom) => Ok(self.vacate(from)),
            Inbound::Relay(kind) => Ok(self.relay(from, kind, data)),
            Inbound::Unknown(kind) => Err(DuelrelayError::UnknownType(kind)),
        }
    }

    fn create_room(&mut self, from: ConnectionId) -> Result<Vec<Delivery>, DuelrelayError> {
        let lone_host = self
            .sessions
            .lookup(from)
            .and_then(|code| self.registry.get(code))
            .is_some_and(|room| room.occupant_count() == 1);

        // A lone host's room dies on vacate, which frees a slot under the
        // room limit. Otherwise pick the code first so exhaustion changes
        // nothing.
        let (mut out, code) = if lone_host {
            let out = self.vacate(from);
            (out, self.registry.generate_code()?)
        } else {
            let code = self.registry.generate_code()?;
            (self.vacate(from), code)
        };
        self.registry.create(code, from)?;
        self.sessions.assign(from, code)?;

        out.push(Delivery::system(from, ServerMessage::RoomCreated { code }));
        Ok(out)
    }

    fn join_room(
        &mut self,
        from: ConnectionId,
        code: RoomCode,
    ) -> Result<Vec<Delivery>, DuelrelayError> {
        self.registry
            .get(code)
            .ok_or(RoomError::NotFound(code))?
            .check_joinable(from)?;

        // `from` is neither host nor client of `code`, so leaving its old
        // room can't affect the target.
        let mut out = self.vacate(from);

        let room = self
            .registry
            .get_mut(code)
            .ok_or(RoomError::NotFound(code))?;
        room.seat_client(from)?;
        let count = room.occupant_count();
        let host = room.host();
        self.sessions.assign(from, code)?;

        tracing::info!(%code, client = %from, "player joined room");

        out.push(Delivery::system(from, ServerMessage::RoomJoined { code }));
        if let Some(host) = host {
            out.push(Delivery::system(host, ServerMessage::PlayerConnected { count }));
        }
        out.push(Delivery::system(from, ServerMessage::PlayerConnected { count }));
        Ok(out)
    }

    fn start_game(&mut self, from: ConnectionId) -> Result<Vec<Delivery>, DuelrelayError> {
        let code = self
            .sessions
            .lookup(from)
            .ok_or(DuelrelayError::NotSeated(from))?;
        let room = self
            .registry
            .get_mut(code)
            .ok_or(DuelrelayError::NotSeated(from))?;

        if room.start(from)? {
            tracing::info!(%code, "game started");
        } else {
            tracing::debug!(%code, "game restarted by host");
        }

        Ok(room
            .occupants()
            .map(|conn| Delivery::system(conn, ServerMessage::GameStart))
            .collect())
    }

    fn relay(&self, from: ConnectionId, kind: RelayKind, data: Vec<u8>) -> Vec<Delivery> {
        let Some(code) = self.sessions.lookup(from) else {
            tracing::debug!(%from, %kind, "relay from unseated connection dropped");
            return Vec::new();
        };
        match self.registry.get(code).and_then(|room| room.other_of(from)) {
            Some(to) => vec![Delivery {
                to,
                payload: Outgoing::Relay(data),
            }],
            None => {
                tracing::trace!(%from, %code, %kind, "no peer to relay to");
                Vec::new()
            }
        }
    }

    /// Removes `conn` from its room, destroying the room if it empties and
    /// otherwise telling the remaining occupant. No-op if `conn` isn't
    /// seated.
    fn vacate(&mut self, conn: ConnectionId) -> Vec<Delivery> {
        let Some(code) = self.sessions.lookup(conn) else {
            return Vec::new();
        };
        let Some(room) = self.registry.get_mut(code) else {
            tracing::warn!(%conn, %code, "session pointed at a missing room");
            self.sessions.clear(conn);
            return Vec::new();
        };

        let other = room.other_of(conn);
        room.remove_occupant(conn);
        let remaining = room.occupant_count();
        self.sessions.clear(conn);

        tracing::info!(%conn, %code, remaining, "player left room");

        if remaining == 0 {
            self.registry.destroy(code);
            return Vec::new();
        }
        other
            .map(|peer| {
                Delivery::system(peer, ServerMessage::PlayerDisconnected { count: remaining })
            })
            .into_iter()
            .collect()
    }
}
