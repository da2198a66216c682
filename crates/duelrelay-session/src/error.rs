//! Error types for the session layer.

use duelrelay_protocol::RoomCode;
use duelrelay_transport::ConnectionId;

/// Errors that can occur while updating the session index.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The connection already occupies a room. Callers must clear the old
    /// assignment (leave the old room) before assigning a new one.
    #[error("{conn} is already seated in room {current}")]
    AlreadyAssigned {
        conn: ConnectionId,
        current: RoomCode,
    },
}
