//! Wager parsing, validation, and payout enrichment.
//!
//! Two-phase construction: `Wager::parse` validates raw user text against
//! the wallet snapshot, then `Wager::enrich` consumes the validated wager
//! together with the chosen corner's odds to produce payout figures.
//! Because `enrich` takes a `Wager` by value and a `Wager` only exists
//! once parsing succeeded, enriching an invalid wager is unrepresentable.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Why a raw wager input was rejected. `Display` is the user-facing
/// message shown in the chat reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WagerError {
    #[error("'{raw}' is not a number. Enter a plain amount like 25 or 12.50.")]
    NotNumeric { raw: String },

    #[error("A wager must be greater than zero.")]
    NonPositive { amount: Decimal },

    #[error("{amount} exceeds your wallet balance of {balance}.")]
    ExceedsBalance { amount: Decimal, balance: Decimal },
}

/// A validated wager amount. Odds are not yet known at this stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wager {
    raw: String,
    amount: Decimal,
}

impl Wager {
    /// Parse raw user text against the wallet snapshot amount.
    ///
    /// Accepts a positive decimal number not exceeding `wallet_balance`.
    /// Rejection is a value, not a panic; the saga converts it into a
    /// user-facing message and a `Rejected(InvalidWager)` terminal.
    pub fn parse(raw: &str, wallet_balance: Decimal) -> Result<Self, WagerError> {
        let trimmed = raw.trim();
        let amount = Decimal::from_str(trimmed).map_err(|_| WagerError::NotNumeric {
            raw: trimmed.to_string(),
        })?;

        if amount <= Decimal::ZERO {
            return Err(WagerError::NonPositive { amount });
        }
        if amount > wallet_balance {
            return Err(WagerError::ExceedsBalance {
                amount,
                balance: wallet_balance,
            });
        }

        Ok(Self {
            raw: trimmed.to_string(),
            amount,
        })
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn raw_input(&self) -> &str {
        &self.raw
    }

    /// Attach the chosen corner's American odds and derive payout figures.
    ///
    /// Positive odds `+O`: win = amount * O / 100.
    /// Negative odds `-O`: win = amount * 100 / O.
    /// Payout = amount + win. Figures are rounded to cents.
    pub fn enrich(self, odds: i32) -> EnrichedWager {
        let amount = self.amount;
        let win = if odds >= 0 {
            amount * Decimal::from(odds) / Decimal::from(100)
        } else {
            amount * Decimal::from(100) / Decimal::from(-odds)
        };
        let win = win.round_dp(2);

        EnrichedWager {
            amount,
            odds,
            amount_to_win: win,
            amount_to_payout: (amount + win).round_dp(2),
        }
    }
}

/// A wager with known odds and derived payout figures. Ready to be
/// assembled into a `BetIntent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedWager {
    pub amount: Decimal,
    pub odds: i32,
    pub amount_to_win: Decimal,
    pub amount_to_payout: Decimal,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
