use crate::types::RoomId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Room not found: {0}")]
    NotFound(RoomId),

    #[error("Room {room} not ready for {operation}")]
    NotReady {
        room: RoomId,
        operation: &'static str,
    },

    #[error("Invalid slot {uid} for room {room}")]
    InvalidSlot { room: RoomId, uid: i64 },
}

impl ProtocolError {
    pub fn not_ready(room: RoomId, operation: &'static str) -> Self {
        Self::NotReady { room, operation }
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::NotReady { .. } => "not_ready",
            Self::InvalidSlot { .. } => "invalid_slot",
        }
    }
}
