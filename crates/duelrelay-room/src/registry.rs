//! Room registry: owns every live room, keyed by code.

use std::collections::HashMap;

use duelrelay_protocol::RoomCode;
use duelrelay_transport::ConnectionId;
use rand::Rng;

use crate::{RegistryConfig, Room, RoomError};

/// Owns all live rooms.
///
/// Every room in the registry has at least one occupant. The registry
/// doesn't enforce that on its own (rooms are mutated through
/// [`RoomRegistry::get_mut`]); the router destroys a room in the same step
/// that empties it.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
    config: RegistryConfig,
}

impl RoomRegistry {
    /// Creates an empty registry with the given limits.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
        }
    }

    /// Picks a code that no live room uses.
    ///
    /// The code is not reserved; insert it with [`RoomRegistry::create`]
    /// before anything else can touch the registry.
    ///
    /// # Errors
    /// Returns [`RoomError::CodeSpaceExhausted`] if the room cap is reached.
    pub fn generate_code(&self) -> Result<RoomCode, RoomError> {
        self.generate_code_with(&mut rand::rng())
    }

    /// [`RoomRegistry::generate_code`] with a caller-supplied RNG.
    ///
    /// Draws uniformly from `100000..=999999` up to
    /// `max_random_attempts` times, then walks the code space from a random
    /// offset so the search always terminates.
    pub fn generate_code_with<R: Rng>(
        &self,
        rng: &mut R,
    ) -> Result<RoomCode, RoomError> {
        let live = self.rooms.len();
        if live >= self.config.room_limit() {
            return Err(RoomError::CodeSpaceExhausted { live });
        }

        for _ in 0..self.config.max_random_attempts {
            let n = rng.random_range(RoomCode::MIN..=RoomCode::MAX);
            if let Some(code) = RoomCode::from_number(n) {
                if !self.rooms.contains_key(&code) {
                    return Ok(code);
                }
            }
        }

        tracing::debug!(live, "random code draws collided, scanning");
        let start = rng.random_range(0..RoomCode::SPACE);
        (0..RoomCode::SPACE)
            .map(|step| RoomCode::MIN + (start + step) % RoomCode::SPACE)
            .filter_map(RoomCode::from_number)
            .find(|code| !self.rooms.contains_key(code))
            .ok_or(RoomError::CodeSpaceExhausted { live })
    }

    /// Inserts a new room with `host` in the host seat.
    ///
    /// # Errors
    /// Returns [`RoomError::CodeTaken`] if `code` is already live.
    pub fn create(
        &mut self,
        code: RoomCode,
        host: ConnectionId,
    ) -> Result<&mut Room, RoomError> {
        use std::collections::hash_map::Entry;

        match self.rooms.entry(code) {
            Entry::Occupied(_) => Err(RoomError::CodeTaken(code)),
            Entry::Vacant(slot) => {
                tracing::info!(%code, %host, "room created");
                Ok(slot.insert(Room::new(code, host)))
            }
        }
    }

    pub fn get(&self, code: RoomCode) -> Option<&Room> {
        self.rooms.get(&code)
    }

    pub fn get_mut(&mut self, code: RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(&code)
    }

    /// Removes a room. Called once its last occupant is gone.
    pub fn destroy(&mut self, code: RoomCode) -> Option<Room> {
        let room = self.rooms.remove(&code);
        if room.is_some() {
            tracing::info!(%code, "room destroyed (empty)");
        }
        room
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Iterates over all live rooms in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }
}
