//! Core protocol types for Duelrelay's wire format.
//!
//! Every message on the wire is a JSON object with a `type` string
//! discriminator. This module holds the server-originated half of the
//! protocol plus the room code both halves share; client messages are
//! decoded in [`crate::inbound`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// RoomCode
// ---------------------------------------------------------------------------

/// A six-digit room code, `100000..=999999`.
///
/// Codes are generated by the server and shown to players, who type them
/// into the other client. On the wire a code is always a JSON string
/// (`"482913"`), never a number.
///
/// The value is stored as a `u32` so it is `Copy` and cheap to hash, but
/// the only way to build one is through [`RoomCode::from_number`] or
/// [`RoomCode::parse`], which both enforce the six-digit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomCode(u32);

impl RoomCode {
    /// Smallest valid code.
    pub const MIN: u32 = 100_000;
    /// Largest valid code.
    pub const MAX: u32 = 999_999;
    /// Number of distinct codes.
    pub const SPACE: u32 = Self::MAX - Self::MIN + 1;

    /// Builds a code from its numeric value, or `None` if it is not six
    /// digits.
    pub fn from_number(n: u32) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&n).then_some(Self(n))
    }

    /// Parses the textual form. Accepts exactly six ASCII digits with no
    /// leading zero; anything else is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok().and_then(Self::from_number)
    }

    /// Returns the numeric value.
    pub fn as_number(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for RoomCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RoomCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        RoomCode::parse(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid room code: {s:?}"))
        })
    }
}

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// Messages the relay itself originates.
///
/// `#[serde(tag = "type", rename_all = "snake_case")]` gives the flat
/// shape clients expect:
///   `{ "type": "player_connected", "count": 2 }`
/// and a fieldless variant such as `GameStart` becomes
///   `{ "type": "game_start" }`.
///
/// Relayed messages are NOT represented here: they are forwarded as the
/// sender's original bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Reply to `create_room`: the sender now hosts `code`.
    RoomCreated { code: RoomCode },

    /// Reply to `join_room`: the sender is now the client of `code`.
    RoomJoined { code: RoomCode },

    /// Sent to both occupants when the second one arrives.
    PlayerConnected { count: usize },

    /// Sent to the remaining occupant when the other one leaves.
    PlayerDisconnected { count: usize },

    /// Sent to both occupants when the host starts the game.
    GameStart,

    /// A request failed. Only ever sent to the peer whose message failed.
    Error { message: String },
}

impl ServerMessage {
    /// Shorthand for an [`ServerMessage::Error`] reply.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
