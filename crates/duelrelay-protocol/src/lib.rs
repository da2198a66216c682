//! Wire protocol for Duelrelay.
//!
//! This crate defines what clients and the relay say to each other:
//!
//! - **Types** ([`RoomCode`], [`ServerMessage`]): what the relay sends.
//! - **Inbound** ([`Inbound`], [`ControlMessage`], [`RelayKind`]): how a
//!   client message is classified by its `type` discriminator.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about connections or rooms.
//!
//! ```text
//! Transport (bytes) → Protocol (Inbound) → Router (rooms, sessions)
//! ```

mod codec;
mod error;
mod inbound;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use inbound::{ControlMessage, Inbound, RelayKind};
pub use types::{RoomCode, ServerMessage};
