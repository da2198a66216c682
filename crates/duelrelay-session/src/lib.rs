//! Connection session tracking for Duelrelay.
//!
//! The relay never attaches state to a connection object. Instead this
//! crate keeps an explicit [`SessionIndex`] from connection identity to the
//! room that connection occupies, so disconnect cleanup is a single lookup.
//!
//! # How it fits in the stack
//!
//! ```text
//! Router (above)  ← consults the index on every control/relay message
//!     ↕
//! Session Layer (this crate)  ← ConnectionId → RoomCode
//!     ↕
//! Transport + Protocol (below)  ← provide ConnectionId and RoomCode
//! ```

mod error;
mod index;

pub use error::SessionError;
pub use index::SessionIndex;
