use crate::registry::RoomRegistry;
use crate::types::Seat;

/// Seat an incoming participant.
///
/// Joins the lowest-numbered room waiting for a second participant, or opens a
/// new room when none is waiting. Callers must hold exclusive access to the
/// registry across the whole call so two joiners cannot claim the same room.
pub fn join(registry: &mut RoomRegistry, secret: String, address: String) -> Seat {
    if let Some(id) = registry.find_open_room() {
        if let Ok(room) = registry.get_mut(id) {
            if let Some(slot) = room.seat_joiner(secret.clone(), address.clone()) {
                return Seat { room: id, slot };
            }
        }
    }
    registry.create_room(secret, address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RoomId, Slot};

    #[test]
    fn test_first_join_creates_room() {
        let mut registry = RoomRegistry::new();
        let seat = join(&mut registry, "s0".into(), "a0".into());
        assert_eq!(seat, Seat { room: RoomId(1), slot: Slot::Creator });
    }

    #[test]
    fn test_second_join_pairs() {
        let mut registry = RoomRegistry::new();
        let creator = join(&mut registry, "s0".into(), "a0".into());
        let joiner = join(&mut registry, "s1".into(), "a1".into());

        assert_eq!(joiner.room, creator.room);
        assert_eq!(joiner.slot, Slot::Joiner);
        assert!(registry.get(creator.room).unwrap().is_paired());

        let third = join(&mut registry, "s2".into(), "a2".into());
        assert_eq!(third, Seat { room: RoomId(2), slot: Slot::Creator });
    }

    #[test]
    fn test_joiner_takes_lowest_open_room() {
        let mut registry = RoomRegistry::new();
        let low = registry.create_room("s0".into(), "a0".into());
        let high = registry.create_room("s1".into(), "a1".into());

        let seat = join(&mut registry, "s2".into(), "a2".into());
        assert_eq!(seat.room, low.room);
        assert_eq!(seat.slot, Slot::Joiner);
        assert!(registry.get(high.room).unwrap().is_open());
    }

    #[test]
    fn test_released_room_is_skipped() {
        let mut registry = RoomRegistry::new();
        let low = registry.create_room("s0".into(), "a0".into());
        let high = registry.create_room("s1".into(), "a1".into());
        registry.release(low.room);

        let seat = join(&mut registry, "s2".into(), "a2".into());
        assert_eq!(seat.room, high.room);
    }
}
