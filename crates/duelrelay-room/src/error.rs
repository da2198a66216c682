//! Error types for the room layer.

use duelrelay_protocol::RoomCode;
use duelrelay_transport::ConnectionId;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No live room has this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The client seat is already taken.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The connection already hosts this room and can't also be its client.
    #[error("{0} already occupies room {1}")]
    AlreadyInRoom(ConnectionId, RoomCode),

    /// Only the connection in the host seat may start the game.
    #[error("{0} is not the host of room {1}")]
    NotHost(ConnectionId, RoomCode),

    /// The game can't start with an empty client seat.
    #[error("room {0} needs 2 players to start")]
    NeedTwoPlayers(RoomCode),

    /// A room with this code already exists.
    #[error("room code {0} is already in use")]
    CodeTaken(RoomCode),

    /// Every room code is in use, or the configured room cap is reached.
    #[error("no room codes available ({live} rooms live)")]
    CodeSpaceExhausted { live: usize },
}
