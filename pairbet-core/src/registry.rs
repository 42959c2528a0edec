use crate::error::{ProtocolError, Result};
use crate::room::Room;
use crate::types::{RoomId, Seat, Slot};
use std::collections::BTreeMap;

/// Owns every room, keyed by id.
///
/// Rooms are kept in a `BTreeMap` so that scans run in ascending id order,
/// which is what makes the lowest-numbered waiting room fill first.
#[derive(Debug)]
pub struct RoomRegistry {
    next_id: u64,
    rooms: BTreeMap<RoomId, Room>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            rooms: BTreeMap::new(),
        }
    }

    /// Open a new room with the caller in slot 0.
    pub fn create_room(&mut self, secret: String, address: String) -> Seat {
        let id = RoomId(self.next_id);
        self.next_id += 1;
        self.rooms.insert(id, Room::new(id, secret, address));
        Seat {
            room: id,
            slot: Slot::Creator,
        }
    }

    /// Lowest-numbered room still waiting for its second participant.
    pub fn find_open_room(&self) -> Option<RoomId> {
        self.rooms
            .values()
            .find(|room| room.is_open())
            .map(|room| room.id())
    }

    pub fn get(&self, id: RoomId) -> Result<&Room> {
        self.rooms.get(&id).ok_or(ProtocolError::NotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: RoomId) -> Result<&mut Room> {
        self.rooms.get_mut(&id).ok_or(ProtocolError::NotFound(id))
    }

    /// Drop a room and both participants. Releasing an unknown id is a no-op.
    pub fn release(&mut self, id: RoomId) -> bool {
        self.rooms.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_room_allocates_increasing_ids() {
        let mut registry = RoomRegistry::new();
        let first = registry.create_room("s0".into(), "a0".into());
        let second = registry.create_room("s1".into(), "a1".into());

        assert_eq!(first.room, RoomId(1));
        assert_eq!(first.slot, Slot::Creator);
        assert!(second.room > first.room);
        assert_eq!(registry.get(first.room).unwrap().participants().len(), 1);
        assert_eq!(registry.get(second.room).unwrap().participants().len(), 1);
    }

    #[test]
    fn test_ids_not_reused_after_release() {
        let mut registry = RoomRegistry::new();
        let first = registry.create_room("s".into(), "a".into());
        assert!(registry.release(first.room));

        let second = registry.create_room("s".into(), "a".into());
        assert_eq!(second.room, RoomId(2));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut registry = RoomRegistry::new();
        let seat = registry.create_room("s".into(), "a".into());

        assert!(registry.release(seat.room));
        assert!(!registry.release(seat.room));
        assert!(!registry.release(RoomId(404)));
        assert_eq!(registry.get(seat.room).unwrap_err(), ProtocolError::NotFound(seat.room));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_find_open_room_ascending() {
        let mut registry = RoomRegistry::new();
        assert_eq!(registry.find_open_room(), None);

        let first = registry.create_room("s0".into(), "a0".into());
        let second = registry.create_room("s1".into(), "a1".into());
        assert_eq!(registry.find_open_room(), Some(first.room));

        registry
            .get_mut(first.room)
            .unwrap()
            .seat_joiner("s2".into(), "a2".into());
        assert_eq!(registry.find_open_room(), Some(second.room));
    }
}
