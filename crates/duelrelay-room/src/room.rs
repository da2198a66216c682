//! A room: two seats, a code, and a started flag.
//!
//! `Room` only enforces its own invariants. Keeping the registry and the
//! session index in step with it is the router's job.

use duelrelay_protocol::RoomCode;
use duelrelay_transport::ConnectionId;

use crate::RoomError;

/// Which seat a connection occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Host,
    Client,
}

/// A pairing of at most two connections.
///
/// Invariants:
/// - `host` and `client` never hold the same connection.
/// - `started` goes from `false` to `true` at most once, only through
///   [`Room::start`] called by the current host.
///
/// A room with both seats empty is never kept; the registry destroys it as
/// soon as the last occupant is removed.
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    host: Option<ConnectionId>,
    client: Option<ConnectionId>,
    started: bool,
}

impl Room {
    /// Creates a room with `host` in the host seat.
    pub fn new(code: RoomCode, host: ConnectionId) -> Self {
        Self {
            code,
            host: Some(host),
            client: None,
            started: false,
        }
    }

    pub fn code(&self) -> RoomCode {
        self.code
    }

    pub fn host(&self) -> Option<ConnectionId> {
        self.host
    }

    pub fn client(&self) -> Option<ConnectionId> {
        self.client
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Number of occupied seats: 0, 1, or 2.
    pub fn occupant_count(&self) -> usize {
        usize::from(self.host.is_some()) + usize::from(self.client.is_some())
    }

    /// Returns `true` once both seats are empty.
    pub fn is_empty(&self) -> bool {
        self.occupant_count() == 0
    }

    /// Occupants in seat order, host first.
    pub fn occupants(&self) -> impl Iterator<Item = ConnectionId> {
        self.host.into_iter().chain(self.client)
    }

    /// Returns the seat `conn` sits in, if any.
    pub fn seat_of(&self, conn: ConnectionId) -> Option<Seat> {
        if self.host == Some(conn) {
            Some(Seat::Host)
        } else if self.client == Some(conn) {
            Some(Seat::Client)
        } else {
            None
        }
    }

    /// Returns the occupant opposite `conn`.
    ///
    /// `None` if `conn` is not in this room or the other seat is empty.
    pub fn other_of(&self, conn: ConnectionId) -> Option<ConnectionId> {
        match self.seat_of(conn)? {
            Seat::Host => self.client,
            Seat::Client => self.host,
        }
    }

    /// Seats `conn` as the client.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyInRoom`] if `conn` is the host.
    /// - [`RoomError::RoomFull`] if the client seat is taken.
    pub fn seat_client(&mut self, conn: ConnectionId) -> Result<(), RoomError> {
        self.check_joinable(conn)?;
        self.client = Some(conn);
        Ok(())
    }

    /// Checks whether [`Room::seat_client`] would succeed, without
    /// changing anything.
    pub fn check_joinable(&self, conn: ConnectionId) -> Result<(), RoomError> {
        if self.host == Some(conn) {
            return Err(RoomError::AlreadyInRoom(conn, self.code));
        }
        if self.client.is_some() {
            return Err(RoomError::RoomFull(self.code));
        }
        Ok(())
    }

    /// Marks the game as started on behalf of `by`.
    ///
    /// Returns `true` on the first start and `false` on a repeat start;
    /// either way the flag ends up `true`.
    ///
    /// # Errors
    /// - [`RoomError::NotHost`] if `by` isn't in the host seat.
    /// - [`RoomError::NeedTwoPlayers`] if the client seat is empty.
    pub fn start(&mut self, by: ConnectionId) -> Result<bool, RoomError> {
        if self.host != Some(by) {
            return Err(RoomError::NotHost(by, self.code));
        }
        if self.client.is_none() {
            return Err(RoomError::NeedTwoPlayers(self.code));
        }
        let first = !self.started;
        self.started = true;
        Ok(first)
    }

    /// Empties whichever seat holds `conn`. No-op if `conn` isn't seated.
    pub fn remove_occupant(&mut self, conn: ConnectionId) -> Option<Seat> {
        let seat = self.seat_of(conn)?;
        match seat {
            Seat::Host => self.host = None,
            Seat::Client => self.client = None,
        }
        Some(seat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn room() -> Room {
        Room::new(RoomCode::parse("482913").unwrap(), conn(1))
    }

    #[test]
    fn test_new_room_has_only_host() {
        let room = room();
        assert_eq!(room.host(), Some(conn(1)));
        assert_eq!(room.client(), None);
        assert_eq!(room.occupant_count(), 1);
        assert!(!room.is_started());
    }

    #[test]
    fn test_other_of() {
        let mut room = room();
        assert_eq!(room.other_of(conn(1)), None, "client seat empty");

        room.seat_client(conn(2)).unwrap();
        assert_eq!(room.other_of(conn(1)), Some(conn(2)));
        assert_eq!(room.other_of(conn(2)), Some(conn(1)));
        assert_eq!(room.other_of(conn(3)), None, "stranger");
    }

    #[test]
    fn test_seat_client_when_full() {
        let mut room = room();
        room.seat_client(conn(2)).unwrap();

        let err = room.seat_client(conn(3)).unwrap_err();
        assert!(matches!(err, RoomError::RoomFull(_)));
        assert_eq!(room.client(), Some(conn(2)));
    }

    #[test]
    fn test_host_cannot_take_client_seat() {
        let mut room = room();
        let err = room.seat_client(conn(1)).unwrap_err();
        assert!(matches!(err, RoomError::AlreadyInRoom(..)));
        assert_eq!(room.occupant_count(), 1);
    }

    #[test]
    fn test_start_requires_host() {
        let mut room = room();
        room.seat_client(conn(2)).unwrap();

        assert!(matches!(room.start(conn(2)), Err(RoomError::NotHost(..))));
        assert!(!room.is_started());
    }

    #[test]
    fn test_start_requires_client() {
        let mut room = room();
        assert!(matches!(
            room.start(conn(1)),
            Err(RoomError::NeedTwoPlayers(_))
        ));
        assert!(!room.is_started());
    }

    #[test]
    fn test_start_transitions_once() {
        let mut room = room();
        room.seat_client(conn(2)).unwrap();

        assert!(room.start(conn(1)).unwrap());
        assert!(!room.start(conn(1)).unwrap(), "repeat start is not a transition");
        assert!(room.is_started());
    }

    #[test]
    fn test_remove_occupant() {
        let mut room = room();
        room.seat_client(conn(2)).unwrap();

        assert_eq!(room.remove_occupant(conn(3)), None);
        assert_eq!(room.occupant_count(), 2);

        assert_eq!(room.remove_occupant(conn(1)), Some(Seat::Host));
        assert_eq!(room.host(), None);
        assert_eq!(room.client(), Some(conn(2)), "client keeps its seat");

        assert_eq!(room.remove_occupant(conn(2)), Some(Seat::Client));
        assert!(room.is_empty());
    }

    #[test]
    fn test_started_survives_client_leaving() {
        let mut room = room();
        room.seat_client(conn(2)).unwrap();
        room.start(conn(1)).unwrap();
        room.remove_occupant(conn(2));

        assert!(room.is_started());
        room.seat_client(conn(3)).unwrap();
        assert!(room.is_started());
    }

    #[test]
    fn test_occupants_host_first() {
        let mut room = room();
        room.seat_client(conn(2)).unwrap();
        assert_eq!(room.occupants().collect::<Vec<_>>(), vec![conn(1), conn(2)]);
    }
}
