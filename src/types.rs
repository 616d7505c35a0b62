//! Shared types for the RINGSIDE betting workflow.
//!
//! These types form the data model used across all modules: the wallet
//! snapshot, corner identification, and the commit payload sent to the
//! remote ledger. Wire field names match the ledger service's JSON.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// A read-only snapshot of a user's wallet, taken once per saga run.
///
/// The snapshot amount is a ceiling, not a guarantee: the remote ledger
/// is the source of truth at commit time, so a bet can still be rejected
/// for a stale balance after local validation passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub wallet_id: String,
    pub amount: Decimal,
}

// ---------------------------------------------------------------------------
// Corners
// ---------------------------------------------------------------------------

/// One of the two competing sides of a match. The synthetic Cancel
/// control presented alongside corner buttons is not a corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CornerColor {
    Red,
    Blue,
}

impl fmt::Display for CornerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CornerColor::Red => write!(f, "Red"),
            CornerColor::Blue => write!(f, "Blue"),
        }
    }
}

impl std::str::FromStr for CornerColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Red" => Ok(CornerColor::Red),
            "Blue" => Ok(CornerColor::Blue),
            _ => Err(anyhow::anyhow!("Unknown corner: {s}")),
        }
    }
}

/// A named corner with its American odds (e.g. +150, -200).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corner {
    pub name: String,
    pub odds: i32,
}

/// Render American odds with an explicit sign ("+150", "-200").
pub fn format_american_odds(odds: i32) -> String {
    if odds > 0 {
        format!("+{odds}")
    } else {
        odds.to_string()
    }
}

// ---------------------------------------------------------------------------
// User descriptor
// ---------------------------------------------------------------------------

/// Identifies the requesting user to the remote ledger when resolving
/// their wallet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub user_id: String,
}

impl UserRef {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Bet intent & ticket
// ---------------------------------------------------------------------------

/// The commit payload submitted to the remote ledger.
///
/// Built once from the created match id, the enriched wager, and the
/// wallet id; submitted once; never mutated after submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetIntent {
    pub match_id: String,
    pub user_id: String,
    pub wallet_id: String,
    pub selected_corner: CornerColor,
    pub wager_odds: i32,
    pub wager_amount: Decimal,
    pub amount_to_win: Decimal,
    pub amount_to_payout: Decimal,
}

/// Confirmation returned by the ledger after a bet is accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetTicket {
    pub confirmation: String,
    /// When the ledger omits a timestamp, stamp the ticket locally.
    #[serde(default = "Utc::now")]
    pub placed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
