//! PairBet core - room lifecycle for two-party wagers
//!
//! Two participants are paired into a room, each funds a shared transaction and
//! each commits to a number. The committed numbers are only disclosed once both
//! participants have announced, so neither side can pick its number after seeing
//! the other's. All access goes through [`RoomService`], which serialises every
//! operation behind one lock.

pub mod error;
pub mod matchmaker;
pub mod payout;
mod protocol;
pub mod registry;
pub mod room;
pub mod service;
pub mod types;

pub use error::{ProtocolError, Result};
pub use payout::{Payout, WAGER_FEE};
pub use registry::RoomRegistry;
pub use room::{Participant, Room};
pub use service::RoomService;
pub use types::{
    FundingInput, FundingRef, FundingSummary, ParticipantSecret, Phase, RevealedNumber, RoomId,
    RoomStatus, Seat, Slot,
};

pub use ::bitcoin::Amount;

#[cfg(test)]
mod tests {
    use super::*;

    fn btc(value: &str) -> Amount {
        Amount::from_str_in(value, ::bitcoin::Denomination::Bitcoin).unwrap()
    }

    #[test]
    fn test_full_wager_session() {
        let service = RoomService::new();

        let alice = service.join("alice-secret", "addr-alice");
        let bob = service.join("bob-secret", "addr-bob");
        assert_eq!(alice.room, bob.room);
        let room = alice.room;
        assert_eq!(service.status(room).unwrap().phase, Phase::Paired);

        service
            .submit_funding(
                room,
                0,
                FundingRef {
                    txid: "a".repeat(64),
                    output_index: 0,
                    amount: btc("1.50"),
                },
            )
            .unwrap();
        assert!(matches!(
            service.funding_summary(room),
            Err(ProtocolError::NotReady { .. })
        ));
        service
            .submit_funding(
                room,
                1,
                FundingRef {
                    txid: "b".repeat(64),
                    output_index: 2,
                    amount: btc("1.00"),
                },
            )
            .unwrap();
        assert_eq!(service.status(room).unwrap().phase, Phase::Funded);

        let summary = service.funding_summary(room).unwrap();
        assert_eq!(summary.change_address, "addr-alice");
        assert_eq!(summary.change, "0.50000000");
        assert_eq!(summary.wager_amount, "1.99000000");

        service.record_signed_transaction(room, "0200").unwrap();
        service.announce_number(room, 1, 17).unwrap();
        assert!(matches!(
            service.revealed_numbers(room),
            Err(ProtocolError::NotReady { .. })
        ));
        service.announce_number(room, 0, 4).unwrap();

        let numbers = service.revealed_numbers(room).unwrap();
        assert_eq!(numbers[0].number, 4);
        assert_eq!(numbers[1].number, 17);
        assert_eq!(service.status(room).unwrap().phase, Phase::Complete);
        assert_eq!(
            service.joint_transaction_hex(room).unwrap().as_deref(),
            Some("0200")
        );
    }

    #[test]
    fn test_status_serializes_without_secrets() {
        let service = RoomService::new();
        let seat = service.join("hidden", "addr");
        let json = serde_json::to_string(&service.status(seat.room).unwrap()).unwrap();
        assert!(json.contains("\"phase\":\"open\""));
        assert!(!json.contains("hidden"));
    }
}
