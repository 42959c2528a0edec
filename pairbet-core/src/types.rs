use bitcoin::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Room identifier. Allocated from a counter starting at 1 and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a participant within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Creator,
    Joiner,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Creator, Slot::Joiner];

    pub fn index(self) -> usize {
        match self {
            Slot::Creator => 0,
            Slot::Joiner => 1,
        }
    }

    pub fn from_uid(uid: i64) -> Option<Self> {
        match uid {
            0 => Some(Slot::Creator),
            1 => Some(Slot::Joiner),
            _ => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

// Clients address slots by their numeric uid.
impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index() as u8)
    }
}

/// Where a participant landed after matchmaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Seat {
    pub room: RoomId,
    pub slot: Slot,
}

/// A participant's claim of already-broadcast funds backing the wager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingRef {
    pub txid: String,
    pub output_index: u32,
    pub amount: Amount,
}

/// One funding input as reported by the funding summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundingInput {
    pub slot: Slot,
    pub txid: String,
    pub output_index: u32,
    pub amount: String,
}

/// Aggregated funding information, available once both slots have funded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundingSummary {
    pub inputs: Vec<FundingInput>,
    pub change_address: String,
    pub change: String,
    pub wager_amount: String,
    pub joint_transaction_hex: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RevealedNumber {
    pub slot: Slot,
    pub number: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantSecret {
    pub slot: Slot,
    pub secret: String,
    pub address: String,
}

/// Position of a room in its lifecycle. Ordered so that later phases compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Open,
    Paired,
    Funded,
    Announced,
    Complete,
}

/// Disclosure-safe snapshot of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomStatus {
    pub id: RoomId,
    pub phase: Phase,
    pub participants: usize,
    pub funding_count: usize,
    pub announce_count: usize,
    pub has_signed_transaction: bool,
    pub created_at: DateTime<Utc>,
}
