//! Unified error type for the Duelrelay server.

use duelrelay_protocol::ProtocolError;
use duelrelay_room::RoomError;
use duelrelay_session::SessionError;
use duelrelay_transport::{ConnectionId, TransportError};

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum DuelrelayError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The inbound bytes were not a message.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session index rejected an update.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room precondition failed (missing, full, not host, ...).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The `join_room` code was missing or not six digits.
    #[error("join code is missing or malformed")]
    InvalidRoomCode,

    /// `start_game` from a connection that isn't seated anywhere.
    #[error("{0} is not in a room")]
    NotSeated(ConnectionId),

    /// The message's `type` is neither a control nor a relay type.
    #[error("unknown message type {0:?}")]
    UnknownType(String),

    /// The hub task has stopped.
    #[error("relay hub is unavailable")]
    HubUnavailable,
}

impl DuelrelayError {
    /// The text sent back to the peer in an `error` message.
    pub fn client_message(&self) -> String {
        match self {
            DuelrelayError::Protocol(_) => "Invalid JSON".into(),
            DuelrelayError::UnknownType(kind) => format!("Unknown type: {kind}"),
            DuelrelayError::InvalidRoomCode => "Room not found".into(),
            DuelrelayError::NotSeated(_) => "Only host can start".into(),
            DuelrelayError::Room(e) => match e {
                RoomError::NotFound(_) => "Room not found".into(),
                RoomError::RoomFull(_) => "Room is full".into(),
                RoomError::AlreadyInRoom(..) => "Already in room".into(),
                RoomError::NotHost(..) => "Only host can start".into(),
                RoomError::NeedTwoPlayers(_) => "Need 2 players to start".into(),
                RoomError::CodeSpaceExhausted { .. } => "Server full".into(),
                RoomError::CodeTaken(_) => "Internal error".into(),
            },
            DuelrelayError::Session(_)
            | DuelrelayError::Transport(_)
            | DuelrelayError::HubUnavailable => "Internal error".into(),
        }
    }
}
