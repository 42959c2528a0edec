//! Payout split for a funded room.
//!
//! Both participants fund the joint transaction independently, so their amounts
//! can differ. The wager locked into the shared output is twice the smaller
//! contribution minus a fixed fee, and whatever one side put in beyond that is
//! returned as change.

use bitcoin::Amount;
use std::cmp::Ordering;

/// Fee deducted from the joint wager output: 0.01 BTC.
pub const WAGER_FEE: Amount = Amount::from_sat(1_000_000);

const SATS_PER_BTC: i128 = 100_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payout {
    pub change_address: String,
    /// Empty when both sides funded the same amount.
    pub change: String,
    pub wager_amount: String,
}

/// Split the joint funding of slot 0 (`amount0`) and slot 1 (`amount1`).
///
/// Change is always addressed to slot 0, including when slot 1 is the one that
/// overfunded.
pub fn calculate(amount0: Amount, amount1: Amount, address0: &str) -> Payout {
    let a0 = i128::from(amount0.to_sat());
    let a1 = i128::from(amount1.to_sat());
    let fee = i128::from(WAGER_FEE.to_sat());
    let diff = a0 - a1;

    match diff.cmp(&0) {
        Ordering::Equal => Payout {
            change_address: String::new(),
            change: String::new(),
            wager_amount: format_btc(2 * a0 - fee),
        },
        Ordering::Greater => Payout {
            change_address: address0.to_string(),
            change: format_btc(diff),
            wager_amount: format_btc(2 * a1 - fee),
        },
        Ordering::Less => Payout {
            change_address: address0.to_string(),
            change: format_btc(-diff),
            wager_amount: format_btc(2 * a0 - fee),
        },
    }
}

/// Render a satoshi count as BTC with exactly eight fractional digits.
pub fn format_btc(sats: i128) -> String {
    let sign = if sats < 0 { "-" } else { "" };
    let abs = sats.abs();
    format!(
        "{}{}.{:08}",
        sign,
        abs / SATS_PER_BTC,
        abs % SATS_PER_BTC
    )
}

pub fn format_amount(amount: Amount) -> String {
    format_btc(i128::from(amount.to_sat()))
}
