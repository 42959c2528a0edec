use crate::error::Result;
use crate::matchmaker;
use crate::registry::RoomRegistry;
use crate::types::{
    FundingRef, FundingSummary, ParticipantSecret, RevealedNumber, RoomId, RoomStatus, Seat,
};
use parking_lot::RwLock;

/// Process-wide room store.
///
/// Every operation takes the registry lock exactly once and runs to completion
/// under it, so each call is atomic with respect to every other call. Mutations
/// take the write lock; queries share the read lock.
#[derive(Debug, Default)]
pub struct RoomService {
    registry: RwLock<RoomRegistry>,
}

impl RoomService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, secret: impl Into<String>, address: impl Into<String>) -> Seat {
        let mut registry = self.registry.write();
        matchmaker::join(&mut registry, secret.into(), address.into())
    }

    pub fn submit_funding(&self, room: RoomId, uid: i64, funding: FundingRef) -> Result<()> {
        let mut registry = self.registry.write();
        registry.get_mut(room)?.submit_funding(uid, funding)
    }

    pub fn funding_summary(&self, room: RoomId) -> Result<FundingSummary> {
        let registry = self.registry.read();
        registry.get(room)?.funding_summary()
    }

    pub fn record_signed_transaction(&self, room: RoomId, hex: impl Into<String>) -> Result<()> {
        let mut registry = self.registry.write();
        registry.get_mut(room)?.record_signed_transaction(hex.into())
    }

    pub fn announce_number(&self, room: RoomId, uid: i64, number: i64) -> Result<()> {
        let mut registry = self.registry.write();
        registry.get_mut(room)?.announce_number(uid, number)
    }

    pub fn revealed_numbers(&self, room: RoomId) -> Result<Vec<RevealedNumber>> {
        let registry = self.registry.read();
        registry.get(room)?.revealed_numbers()
    }

    pub fn secrets(&self, room: RoomId) -> Result<Vec<ParticipantSecret>> {
        let registry = self.registry.read();
        registry.get(room)?.secrets()
    }

    pub fn status(&self, room: RoomId) -> Result<RoomStatus> {
        let registry = self.registry.read();
        Ok(registry.get(room)?.status())
    }

    /// The assembled joint transaction, if one has been recorded.
    pub fn joint_transaction_hex(&self, room: RoomId) -> Result<Option<String>> {
        let registry = self.registry.read();
        Ok(registry.get(room)?.joint_transaction_hex().map(str::to_string))
    }

    /// Administrative removal of a room. Returns whether a room was removed.
    pub fn release(&self, room: RoomId) -> bool {
        self.registry.write().release(room)
    }

    pub fn room_count(&self) -> usize {
        self.registry.read().len()
    }
}
