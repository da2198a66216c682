//! # Duelrelay
//!
//! A relay that pairs two game clients into a room and forwards their
//! messages to each other without interpreting them.
//!
//! One client sends `create_room` and gets back a six-digit code; the other
//! sends `join_room` with that code. From then on every relay message
//! (`input`, `snapshot`, `damage`, ...) one of them sends is delivered
//! verbatim to the other. The host alone may `start_game`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use duelrelay::prelude::*;
//!
//! # async fn run() -> Result<(), DuelrelayError> {
//! let server = DuelrelayServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
pub mod hub;
pub mod router;
mod server;

pub use config::ServerConfig;
pub use error::DuelrelayError;
pub use server::{DuelrelayServer, DuelrelayServerBuilder};

/// Everything needed to run or embed a relay.
pub mod prelude {
    pub use crate::hub::{HubHandle, HubStats, spawn_hub};
    pub use crate::router::{Delivery, Outgoing, Router};
    pub use crate::{DuelrelayError, DuelrelayServer, DuelrelayServerBuilder, ServerConfig};
    pub use duelrelay_protocol::{
        Codec, ControlMessage, Inbound, JsonCodec, RelayKind, RoomCode, ServerMessage,
    };
    pub use duelrelay_room::{RegistryConfig, Room, RoomError, RoomRegistry, Seat};
    pub use duelrelay_session::{SessionError, SessionIndex};
    pub use duelrelay_transport::ConnectionId;
}
