//! Registry configuration.

use duelrelay_protocol::RoomCode;
use serde::{Deserialize, Serialize};

/// Limits applied by the [`RoomRegistry`](crate::RoomRegistry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Random draws tried before falling back to a linear scan for a free
    /// code. Set to 0 to always scan.
    pub max_random_attempts: u32,

    /// Maximum number of live rooms. Values above the code space are
    /// clamped to it.
    pub max_rooms: usize,
}

impl RegistryConfig {
    /// The effective room cap.
    pub fn room_limit(&self) -> usize {
        self.max_rooms.min(RoomCode::SPACE as usize)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_random_attempts: 64,
            max_rooms: RoomCode::SPACE as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_whole_code_space() {
        assert_eq!(RegistryConfig::default().room_limit(), 900_000);
    }

    #[test]
    fn test_room_limit_is_clamped() {
        let config = RegistryConfig {
            max_rooms: usize::MAX,
            ..RegistryConfig::default()
        };
        assert_eq!(config.room_limit(), 900_000);

        let config = RegistryConfig {
            max_rooms: 10,
            ..RegistryConfig::default()
        };
        assert_eq!(config.room_limit(), 10);
    }
}
