//! Commit-gated protocol operations on a single room.
//!
//! Room lookup (and therefore `NotFound`) happens in the registry before any of
//! these run, so the check order seen by callers is not-found, not-ready, then
//! invalid slot. Nothing here discloses a committed number until both slots have
//! announced.

use crate::error::{ProtocolError, Result};
use crate::payout;
use crate::room::{Participant, Room, ROOM_CAPACITY};
use crate::types::{
    FundingInput, FundingRef, FundingSummary, ParticipantSecret, RevealedNumber, Slot,
};

impl Room {
    fn require_paired(&self, operation: &'static str) -> Result<()> {
        if self.is_paired() {
            Ok(())
        } else {
            Err(ProtocolError::not_ready(self.id, operation))
        }
    }

    fn participant_mut(&mut self, uid: i64) -> Result<&mut Participant> {
        let room = self.id;
        let slot = Slot::from_uid(uid).ok_or(ProtocolError::InvalidSlot { room, uid })?;
        self.participants
            .get_mut(slot.index())
            .ok_or(ProtocolError::InvalidSlot { room, uid })
    }

    /// Record a slot's funding reference. Resubmission overwrites without
    /// changing the funding count.
    pub(crate) fn submit_funding(&mut self, uid: i64, funding: FundingRef) -> Result<()> {
        self.require_paired("submit_funding")?;
        self.participant_mut(uid)?.funding = Some(funding);
        Ok(())
    }

    pub(crate) fn funding_summary(&self) -> Result<FundingSummary> {
        let not_ready = || ProtocolError::not_ready(self.id, "funding_summary");
        if self.funding_count() != ROOM_CAPACITY {
            return Err(not_ready());
        }

        let [creator, joiner] = self.participants.as_slice() else {
            return Err(not_ready());
        };
        let (Some(funding0), Some(funding1)) = (creator.funding(), joiner.funding()) else {
            return Err(not_ready());
        };

        let split = payout::calculate(funding0.amount, funding1.amount, creator.address());
        let inputs = self
            .participants
            .iter()
            .filter_map(|p| {
                p.funding().map(|f| FundingInput {
                    slot: p.slot,
                    txid: f.txid.clone(),
                    output_index: f.output_index,
                    amount: payout::format_amount(f.amount),
                })
            })
            .collect();

        Ok(FundingSummary {
            inputs,
            change_address: split.change_address,
            change: split.change,
            wager_amount: split.wager_amount,
            joint_transaction_hex: self.joint_transaction_hex.clone().unwrap_or_default(),
        })
    }

    /// Store the assembled joint transaction. Last writer wins.
    pub(crate) fn record_signed_transaction(&mut self, hex: String) -> Result<()> {
        self.require_paired("record_signed_transaction")?;
        self.joint_transaction_hex = Some(hex);
        Ok(())
    }

    pub(crate) fn announce_number(&mut self, uid: i64, number: i64) -> Result<()> {
        self.require_paired("announce_number")?;
        self.participant_mut(uid)?.number = Some(number);
        Ok(())
    }

    pub(crate) fn revealed_numbers(&self) -> Result<Vec<RevealedNumber>> {
        if self.announce_count() != ROOM_CAPACITY {
            return Err(ProtocolError::not_ready(self.id, "revealed_numbers"));
        }
        Ok(self
            .participants
            .iter()
            .filter_map(|p| {
                p.number.map(|number| RevealedNumber {
                    slot: p.slot,
                    number,
                })
            })
            .collect())
    }

    pub(crate) fn secrets(&self) -> Result<Vec<ParticipantSecret>> {
        self.require_paired("secrets")?;
        Ok(self
            .participants
            .iter()
            .map(|p| ParticipantSecret {
                slot: p.slot,
                secret: p.secret.clone(),
                address: p.address.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Phase, RoomId};
    use bitcoin::Amount;

    fn paired_room() -> Room {
        let mut room = Room::new(RoomId(7), "s0".into(), "addr0".into());
        room.seat_joiner("s1".into(), "addr1".into());
        room
    }

    fn funding(txid: &str, btc: f64) -> FundingRef {
        FundingRef {
            txid: txid.to_string(),
            output_index: 1,
            amount: Amount::from_btc(btc).unwrap(),
        }
    }

    #[test]
    fn test_solo_room_rejects_everything() {
        let mut room = Room::new(RoomId(1), "s0".into(), "addr0".into());

        assert_eq!(
            room.submit_funding(0, funding("aa", 1.0)),
            Err(ProtocolError::not_ready(RoomId(1), "submit_funding"))
        );
        for _ in 0..3 {
            assert!(matches!(
                room.announce_number(0, 42),
                Err(ProtocolError::NotReady { .. })
            ));
        }
        assert!(matches!(
            room.record_signed_transaction("00".into()),
            Err(ProtocolError::NotReady { .. })
        ));
        assert!(matches!(room.secrets(), Err(ProtocolError::NotReady { .. })));
        assert!(matches!(
            room.revealed_numbers(),
            Err(ProtocolError::NotReady { .. })
        ));
        assert_eq!(room.announce_count(), 0);
        assert!(room.joint_transaction_hex().is_none());
    }

    #[test]
    fn test_invalid_slot_checked_after_readiness() {
        let mut solo = Room::new(RoomId(2), "s0".into(), "addr0".into());
        assert!(matches!(
            solo.announce_number(5, 1),
            Err(ProtocolError::NotReady { .. })
        ));

        let mut room = paired_room();
        for uid in [-1, 2, 99] {
            assert_eq!(
                room.announce_number(uid, 1),
                Err(ProtocolError::InvalidSlot { room: RoomId(7), uid })
            );
            assert_eq!(
                room.submit_funding(uid, funding("aa", 1.0)),
                Err(ProtocolError::InvalidSlot { room: RoomId(7), uid })
            );
        }
        assert_eq!(room.announce_count(), 0);
        assert_eq!(room.funding_count(), 0);
    }

    #[test]
    fn test_resubmitted_funding_overwrites_without_double_count() {
        let mut room = paired_room();
        room.submit_funding(0, funding("first", 1.0)).unwrap();
        room.submit_funding(0, funding("second", 1.0)).unwrap();

        assert_eq!(room.funding_count(), 1);
        assert_eq!(room.participants()[0].funding().unwrap().txid, "second");
        assert!(matches!(
            room.funding_summary(),
            Err(ProtocolError::NotReady { .. })
        ));
    }

    #[test]
    fn test_funding_summary() {
        let mut room = paired_room();
        room.submit_funding(1, funding("tx1", 1.5)).unwrap();
        room.submit_funding(0, funding("tx0", 1.0)).unwrap();

        let summary = room.funding_summary().unwrap();
        assert_eq!(summary.inputs.len(), 2);
        assert_eq!(summary.inputs[0].slot, Slot::Creator);
        assert_eq!(summary.inputs[0].txid, "tx0");
        assert_eq!(summary.inputs[0].amount, "1.00000000");
        assert_eq!(summary.inputs[1].txid, "tx1");
        assert_eq!(summary.inputs[1].output_index, 1);
        assert_eq!(summary.change_address, "addr0");
        assert_eq!(summary.change, "0.50000000");
        assert_eq!(summary.wager_amount, "1.99000000");
        assert_eq!(summary.joint_transaction_hex, "");

        room.record_signed_transaction("deadbeef".into()).unwrap();
        room.record_signed_transaction("cafebabe".into()).unwrap();
        assert_eq!(room.funding_summary().unwrap().joint_transaction_hex, "cafebabe");
    }

    #[test]
    fn test_numbers_hidden_until_both_announce() {
        let mut room = paired_room();
        room.announce_number(1, 77).unwrap();
        room.announce_number(1, 78).unwrap();

        assert_eq!(room.announce_count(), 1);
        assert_eq!(
            room.revealed_numbers(),
            Err(ProtocolError::not_ready(RoomId(7), "revealed_numbers"))
        );

        room.announce_number(0, 3).unwrap();
        let numbers = room.revealed_numbers().unwrap();
        assert_eq!(
            numbers,
            vec![
                RevealedNumber { slot: Slot::Creator, number: 3 },
                RevealedNumber { slot: Slot::Joiner, number: 78 },
            ]
        );
    }

    #[test]
    fn test_secrets_in_slot_order() {
        let room = paired_room();
        let secrets = room.secrets().unwrap();
        assert_eq!(secrets[0].slot, Slot::Creator);
        assert_eq!(secrets[0].secret, "s0");
        assert_eq!(secrets[0].address, "addr0");
        assert_eq!(secrets[1].slot, Slot::Joiner);
        assert_eq!(secrets[1].secret, "s1");
        assert_eq!(secrets[1].address, "addr1");
    }

    #[test]
    fn test_phase_only_advances() {
        let mut room = Room::new(RoomId(9), "s0".into(), "addr0".into());
        let mut seen = vec![room.phase()];

        room.seat_joiner("s1".into(), "addr1".into());
        seen.push(room.phase());
        // Announcing before funding keeps the room in Paired.
        room.announce_number(0, 1).unwrap();
        seen.push(room.phase());
        room.submit_funding(0, funding("a", 1.0)).unwrap();
        room.submit_funding(1, funding("b", 1.0)).unwrap();
        seen.push(room.phase());
        room.submit_funding(1, funding("c", 2.0)).unwrap();
        seen.push(room.phase());
        room.announce_number(1, 2).unwrap();
        seen.push(room.phase());
        room.record_signed_transaction("00".into()).unwrap();
        seen.push(room.phase());
        room.announce_number(0, 5).unwrap();
        seen.push(room.phase());

        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.first(), Some(&Phase::Open));
        assert_eq!(seen.last(), Some(&Phase::Complete));
    }
}
