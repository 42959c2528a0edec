use crate::types::{FundingRef, Phase, RoomId, RoomStatus, Slot};
use chrono::{DateTime, Utc};

/// Maximum number of participants in a room.
pub const ROOM_CAPACITY: usize = 2;

/// One half of a room.
pub struct Participant {
    pub(crate) slot: Slot,
    pub(crate) secret: String,
    pub(crate) address: String,
    pub(crate) funding: Option<FundingRef>,
    pub(crate) number: Option<i64>,
}

impl Participant {
    pub(crate) fn new(slot: Slot, secret: String, address: String) -> Self {
        Self {
            slot,
            secret,
            address,
            funding: None,
            number: None,
        }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn funding(&self) -> Option<&FundingRef> {
        self.funding.as_ref()
    }

    pub fn has_funded(&self) -> bool {
        self.funding.is_some()
    }

    pub fn has_announced(&self) -> bool {
        self.number.is_some()
    }
}

// Secrets and numbers stay out of debug output so they cannot leak through logs.
impl std::fmt::Debug for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Participant")
            .field("slot", &self.slot)
            .field("address", &self.address)
            .field("has_funded", &self.funding.is_some())
            .field("has_announced", &self.number.is_some())
            .finish()
    }
}

#[derive(Debug)]
pub struct Room {
    pub(crate) id: RoomId,
    pub(crate) participants: Vec<Participant>,
    pub(crate) joint_transaction_hex: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

impl Room {
    pub(crate) fn new(id: RoomId, secret: String, address: String) -> Self {
        Self {
            id,
            participants: vec![Participant::new(Slot::Creator, secret, address)],
            joint_transaction_hex: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_open(&self) -> bool {
        self.participants.len() == 1
    }

    pub fn is_paired(&self) -> bool {
        self.participants.len() == ROOM_CAPACITY
    }

    pub fn funding_count(&self) -> usize {
        self.participants.iter().filter(|p| p.has_funded()).count()
    }

    pub fn announce_count(&self) -> usize {
        self.participants.iter().filter(|p| p.has_announced()).count()
    }

    pub fn joint_transaction_hex(&self) -> Option<&str> {
        self.joint_transaction_hex.as_deref()
    }

    /// Derived lifecycle phase. Every input only grows, so the phase never regresses.
    pub fn phase(&self) -> Phase {
        if !self.is_paired() {
            Phase::Open
        } else if self.funding_count() < ROOM_CAPACITY {
            Phase::Paired
        } else if self.announce_count() < ROOM_CAPACITY {
            Phase::Funded
        } else if self.joint_transaction_hex.is_none() {
            Phase::Announced
        } else {
            Phase::Complete
        }
    }

    pub fn status(&self) -> RoomStatus {
        RoomStatus {
            id: self.id,
            phase: self.phase(),
            participants: self.participants.len(),
            funding_count: self.funding_count(),
            announce_count: self.announce_count(),
            has_signed_transaction: self.joint_transaction_hex.is_some(),
            created_at: self.created_at,
        }
    }

    /// Seat a second participant. Returns `None` if the room is not waiting for one.
    pub(crate) fn seat_joiner(&mut self, secret: String, address: String) -> Option<Slot> {
        if !self.is_open() {
            return None;
        }
        self.participants
            .push(Participant::new(Slot::Joiner, secret, address));
        Some(Slot::Joiner)
    }
}
