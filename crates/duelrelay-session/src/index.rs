//! The session index: which room each live connection occupies.
//!
//! # Concurrency note
//!
//! `SessionIndex` is a plain `HashMap` and is NOT thread-safe by itself.
//! It is owned by the router, which runs inside the single hub task, so
//! every update happens at one serialization point.

use std::collections::HashMap;

use duelrelay_protocol::RoomCode;
use duelrelay_transport::ConnectionId;

use crate::SessionError;

/// Maps each seated connection to the code of the room it sits in.
///
/// A connection appears here only while it occupies a host or client slot.
/// Lookups on disconnect are O(1); nothing ever scans the room table to
/// find a connection.
#[derive(Debug, Default)]
pub struct SessionIndex {
    seats: HashMap<ConnectionId, RoomCode>,
}

impl SessionIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `conn` now occupies room `code`.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyAssigned`] if `conn` is still seated
    /// somewhere; the existing entry is left untouched.
    pub fn assign(
        &mut self,
        conn: ConnectionId,
        code: RoomCode,
    ) -> Result<(), SessionError> {
        if let Some(&current) = self.seats.get(&conn) {
            return Err(SessionError::AlreadyAssigned { conn, current });
        }
        self.seats.insert(conn, code);
        tracing::trace!(%conn, %code, "seat assigned");
        Ok(())
    }

    /// Returns the room `conn` occupies, if any.
    pub fn lookup(&self, conn: ConnectionId) -> Option<RoomCode> {
        self.seats.get(&conn).copied()
    }

    /// Removes the entry for `conn`, returning the room it occupied.
    pub fn clear(&mut self, conn: ConnectionId) -> Option<RoomCode> {
        let code = self.seats.remove(&conn);
        if let Some(code) = code {
            tracing::trace!(%conn, %code, "seat cleared");
        }
        code
    }

    /// Number of seated connections.
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// Returns `true` if no connection is seated.
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Iterates over every `(connection, room)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, RoomCode)> + '_ {
        self.seats.iter().map(|(&conn, &code)| (conn, code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn code(s: &str) -> RoomCode {
        RoomCode::parse(s).unwrap()
    }

    #[test]
    fn test_assign_then_lookup() {
        let mut index = SessionIndex::new();
        index.assign(conn(1), code("482913")).unwrap();
        assert_eq!(index.lookup(conn(1)), Some(code("482913")));
        assert_eq!(index.lookup(conn(2)), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_assign_twice_is_rejected_and_keeps_original() {
        let mut index = SessionIndex::new();
        index.assign(conn(1), code("482913")).unwrap();

        let err = index.assign(conn(1), code("100000")).unwrap_err();
        assert!(matches!(
            err,
            SessionError::AlreadyAssigned { current, .. } if current == code("482913")
        ));
        assert_eq!(index.lookup(conn(1)), Some(code("482913")));
    }

    #[test]
    fn test_clear_returns_previous_room() {
        let mut index = SessionIndex::new();
        index.assign(conn(1), code("482913")).unwrap();

        assert_eq!(index.clear(conn(1)), Some(code("482913")));
        assert_eq!(index.clear(conn(1)), None);
        assert!(index.is_empty());
    }

    #[test]
    fn test_reassign_after_clear() {
        let mut index = SessionIndex::new();
        index.assign(conn(1), code("482913")).unwrap();
        index.clear(conn(1));
        index.assign(conn(1), code("100000")).unwrap();
        assert_eq!(index.lookup(conn(1)), Some(code("100000")));
    }

    #[test]
    fn test_two_connections_can_share_a_room() {
        let mut index = SessionIndex::new();
        index.assign(conn(1), code("482913")).unwrap();
        index.assign(conn(2), code("482913")).unwrap();

        let mut seats: Vec<_> = index.iter().collect();
        seats.sort();
        assert_eq!(
            seats,
            vec![(conn(1), code("482913")), (conn(2), code("482913"))]
        );
    }
}
