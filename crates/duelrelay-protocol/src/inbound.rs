//! Decoding of client-originated messages.
//!
//! The relay only looks at two things in an inbound message: the `type`
//! discriminator and, for `join_room`, the `code`. Everything else is left
//! alone so relay messages can be forwarded byte-for-byte.

use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::{Codec, ProtocolError, RoomCode};

// ---------------------------------------------------------------------------
// RelayKind
// ---------------------------------------------------------------------------

/// Discriminators that are forwarded verbatim to the other occupant.
///
/// The set is fixed by the game client; adding a new relayed event means
/// adding a variant here and a line to [`RelayKind::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayKind {
    GameState,
    Input,
    Snapshot,
    Attack,
    Damage,
    Restart,
    RoundReset,
    RoundWin,
    PowerupSpawn,
    PowerDespawn,
    PowerPicked,
    RoundUpdate,
    MatchEnd,
    SuddenDeath,
}

impl RelayKind {
    /// Every relayed discriminator.
    pub const ALL: [RelayKind; 14] = [
        RelayKind::GameState,
        RelayKind::Input,
        RelayKind::Snapshot,
        RelayKind::Attack,
        RelayKind::Damage,
        RelayKind::Restart,
        RelayKind::RoundReset,
        RelayKind::RoundWin,
        RelayKind::PowerupSpawn,
        RelayKind::PowerDespawn,
        RelayKind::PowerPicked,
        RelayKind::RoundUpdate,
        RelayKind::MatchEnd,
        RelayKind::SuddenDeath,
    ];

    /// The wire name, e.g. `"round_win"`.
    pub fn as_str(self) -> &'static str {
        match self {
            RelayKind::GameState => "game_state",
            RelayKind::Input => "input",
            RelayKind::Snapshot => "snapshot",
            RelayKind::Attack => "attack",
            RelayKind::Damage => "damage",
            RelayKind::Restart => "restart",
            RelayKind::RoundReset => "round_reset",
            RelayKind::RoundWin => "round_win",
            RelayKind::PowerupSpawn => "powerup_spawn",
            RelayKind::PowerDespawn => "power_despawn",
            RelayKind::PowerPicked => "power_picked",
            RelayKind::RoundUpdate => "round_update",
            RelayKind::MatchEnd => "match_end",
            RelayKind::SuddenDeath => "sudden_death",
        }
    }

    /// Looks up a wire name.
    pub fn from_type(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == kind)
    }
}

impl fmt::Display for RelayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ControlMessage / Inbound
// ---------------------------------------------------------------------------

/// Messages that change room state instead of being forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    /// `{ "type": "create_room" }`
    CreateRoom,

    /// `{ "type": "join_room", "code": "482913" }`
    ///
    /// `code` is `None` when the field is missing or can't name any room
    /// (wrong length, not a number, ...). The router reports that the same
    /// way as an unknown code.
    JoinRoom { code: Option<RoomCode> },

    /// `{ "type": "start_game" }`
    StartGame,

    /// `{ "type": "leave_room" }`
    LeaveRoom,
}

/// A decoded inbound message, classified by its discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Control(ControlMessage),
    Relay(RelayKind),
    /// A well-formed message whose `type` the relay doesn't know.
    Unknown(String),
}

/// The minimal view of an inbound message. Unlisted fields are skipped, so
/// relay payloads of any shape pass through.
struct Header {
    kind: String,
    code: Option<RawCode>,
}

/// A `type` value as it appeared on the wire; only the last one counts.
#[derive(Deserialize)]
#[serde(untagged)]
enum TypeField {
    Text(String),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for Header {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(HeaderVisitor)
    }
}

struct HeaderVisitor;

impl<'de> Visitor<'de> for HeaderVisitor {
    type Value = Header;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with a string `type` field")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Header, A::Error> {
        let mut kind = None;
        let mut code = None;

        // A repeated key overwrites the earlier value, as browsers' JSON.parse does.
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "type" => kind = Some(map.next_value::<TypeField>()?),
                "code" => code = Some(map.next_value::<RawCode>()?),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        match kind {
            Some(TypeField::Text(kind)) => Ok(Header { kind, code }),
            Some(TypeField::Other(_)) => Err(de::Error::custom("`type` must be a string")),
            None => Err(de::Error::missing_field("type")),
        }
    }
}

/// Clients send the join code as a string, but engines with loosely typed
/// JSON sometimes emit it as an integer or an integral float. Any other
/// shape is tolerated here and resolves to "no such room".
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Text(String),
    Integer(u64),
    Float(f64),
    Other(IgnoredAny),
}

impl RawCode {
    fn into_room_code(self) -> Option<RoomCode> {
        match self {
            RawCode::Text(s) => RoomCode::parse(&s),
            RawCode::Integer(n) => {
                u32::try_from(n).ok().and_then(RoomCode::from_number)
            }
            RawCode::Float(f) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => {
                RoomCode::from_number(f as u32)
            }
            RawCode::Float(_) | RawCode::Other(_) => None,
        }
    }
}

impl Inbound {
    /// Decodes raw bytes into an [`Inbound`].
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the bytes are not an object with a
    /// string `type` field.
    pub fn decode(codec: &impl Codec, data: &[u8]) -> Result<Self, ProtocolError> {
        let header: Header = codec.decode(data)?;
        Ok(Self::classify(header))
    }

    fn classify(header: Header) -> Self {
        let control = match header.kind.as_str() {
            "create_room" => Some(ControlMessage::CreateRoom),
            "join_room" => Some(ControlMessage::JoinRoom {
                code: header.code.and_then(RawCode::into_room_code),
            }),
            "start_game" => Some(ControlMessage::StartGame),
            "leave_room" => Some(ControlMessage::LeaveRoom),
            _ => None,
        };
        if let Some(control) = control {
            return Inbound::Control(control);
        }
        match RelayKind::from_type(&header.kind) {
            Some(kind) => Inbound::Relay(kind),
            None => Inbound::Unknown(header.kind),
        }
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::JsonCodec;

    fn decode(raw: &str) -> Result<Inbound, ProtocolError> {
        Inbound::decode(&JsonCodec, raw.as_bytes())
    }

    fn code(s: &str) -> Option<RoomCode> {
        RoomCode::parse(s)
    }

    #[test]
    fn test_control_messages_decode() {
        assert_eq!(
            decode(r#"{"type":"create_room"}"#).unwrap(),
            Inbound::Control(ControlMessage::CreateRoom)
        );
        assert_eq!(
            decode(r#"{"type":"start_game"}"#).unwrap(),
            Inbound::Control(ControlMessage::StartGame)
        );
        assert_eq!(
            decode(r#"{"type":"leave_room","extra":true}"#).unwrap(),
            Inbound::Control(ControlMessage::LeaveRoom)
        );
    }

    #[test]
    fn test_join_room_accepts_string_and_number_codes() {
        let expected = Inbound::Control(ControlMessage::JoinRoom {
            code: code("482913"),
        });
        assert_eq!(decode(r#"{"type":"join_room","code":"482913"}"#).unwrap(), expected);
        assert_eq!(decode(r#"{"type":"join_room","code":482913}"#).unwrap(), expected);
        assert_eq!(decode(r#"{"type":"join_room","code":482913.0}"#).unwrap(), expected);
    }

    #[test]
    fn test_join_room_with_unusable_code_still_decodes() {
        // A bad code is a "Room not found", not an "Invalid JSON".
        for raw in [
            r#"{"type":"join_room"}"#,
            r#"{"type":"join_room","code":null}"#,
            r#"{"type":"join_room","code":"12"}"#,
            r#"{"type":"join_room","code":4829.5}"#,
            r#"{"type":"join_room","code":-482913}"#,
            r#"{"type":"join_room","code":{"nested":1}}"#,
            r#"{"type":"join_room","code":[4,8,2]}"#,
            r#"{"type":"join_room","code":true}"#,
        ] {
            assert_eq!(
                decode(raw).unwrap(),
                Inbound::Control(ControlMessage::JoinRoom { code: None }),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_every_relay_kind_round_trips_through_its_name() {
        for kind in RelayKind::ALL {
            let raw = format!(r#"{{"type":"{kind}","payload":[1,2,3]}}"#);
            assert_eq!(decode(&raw).unwrap(), Inbound::Relay(kind));
        }
    }

    #[test]
    fn test_relay_kind_names_are_distinct() {
        let mut names: Vec<_> = RelayKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RelayKind::ALL.len());
    }

    #[test]
    fn test_unknown_type_is_not_an_error() {
        assert_eq!(
            decode(r#"{"type":"fly_to_moon","speed":9000}"#).unwrap(),
            Inbound::Unknown("fly_to_moon".into())
        );
    }

    #[test]
    fn test_repeated_keys_keep_the_last_value() {
        assert_eq!(
            decode(r#"{"type":"create_room","type":"start_game"}"#).unwrap(),
            Inbound::Control(ControlMessage::StartGame)
        );
        assert_eq!(
            decode(r#"{"type":7,"seq":1,"type":"input"}"#).unwrap(),
            Inbound::Relay(RelayKind::Input)
        );
        assert_eq!(
            decode(r#"{"type":"join_room","code":"111111","code":482913}"#).unwrap(),
            Inbound::Control(ControlMessage::JoinRoom {
                code: code("482913")
            })
        );
        assert!(decode(r#"{"type":"input","type":null}"#).is_err());
    }

    #[test]
    fn test_malformed_messages_fail_to_decode() {
        for raw in [
            "not json at all",
            "",
            "42",
            r#""create_room""#,
            r#"["create_room"]"#,
            r#"{"kind":"create_room"}"#,
            r#"{"type":7}"#,
            r#"{"type":null}"#,
            r#"{"type":"create_room""#,
        ] {
            assert!(decode(raw).is_err(), "{raw:?} should not decode");
        }
    }
}
