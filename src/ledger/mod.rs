//! Remote ledger interface.
//!
//! Defines the `BetLedger` trait (the full remote surface the saga
//! consumes) plus the wire types for the fight-card and event-detail
//! responses. The HTTP implementation lives in [`http`]; tests drive the
//! saga against scripted in-memory implementations.
//!
//! Every read can come back empty (upstream asleep, record missing);
//! that is modelled as `Ok(None)`, distinct from a transport error.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{BetIntent, BetTicket, UserRef, Wallet};

// ---------------------------------------------------------------------------
// Wire types — upcoming fight card
// ---------------------------------------------------------------------------

/// The `getUpcomingFights` response: one event and its fight map.
///
/// `fights` keys are match titles ("A vs B") and the map's insertion
/// order is the presentation order, so it is kept as a `serde_json::Map`
/// (order-preserving) rather than a hash map.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FightCard {
    pub event_title: String,
    pub url: String,
    #[serde(default)]
    pub fights: serde_json::Map<String, serde_json::Value>,
}

/// One fight entry on the upcoming card.
#[derive(Debug, Clone, Deserialize)]
pub struct FightWire {
    #[serde(rename = "Red")]
    pub red: CornerWire,
    #[serde(rename = "Blue")]
    pub blue: CornerWire,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CornerWire {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Odds")]
    pub odds: i32,
}

// ---------------------------------------------------------------------------
// Wire types — event detail (revalidation)
// ---------------------------------------------------------------------------

/// The `getEventByUrl` response: the same card shape, with per-fight
/// live-state details attached.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    pub event_title: String,
    pub url: String,
    #[serde(default)]
    pub fights: serde_json::Map<String, serde_json::Value>,
}

/// One fight entry with live-state details.
#[derive(Debug, Clone, Deserialize)]
pub struct FightDetailWire {
    #[serde(rename = "Red")]
    pub red: CornerWire,
    #[serde(rename = "Blue")]
    pub blue: CornerWire,
    #[serde(rename = "Details")]
    pub details: FightDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FightDetails {
    #[serde(rename = "isLive", default)]
    pub is_live: bool,
    /// Recorded round number, present once the fight has started.
    #[serde(rename = "Round", default)]
    pub round: Option<u32>,
}

// ---------------------------------------------------------------------------
// Wire types — match creation
// ---------------------------------------------------------------------------

/// Request body for `createMatch`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub event_title: String,
    pub match_title: String,
    pub link: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedMatch {
    pub match_id: String,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Abstraction over the remote wallet/match/bet ledger.
///
/// The ledger exclusively owns the durable Wallet, Match, and Bet
/// records; the saga only reads snapshots and submits commits. `Ok(None)`
/// means the upstream answered with no data; `Err` means transport
/// failure. The saga treats both as the failing step's terminal outcome.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BetLedger: Send + Sync {
    /// Resolve the requesting user to their wallet id.
    async fn user_wallet_id(&self, user: &UserRef) -> Result<Option<String>>;

    /// Fetch a wallet snapshot.
    async fn wallet(&self, wallet_id: &str) -> Result<Wallet>;

    /// Fetch the upcoming fight card.
    async fn upcoming_fights(&self) -> Result<Option<FightCard>>;

    /// Re-fetch a single event by URL (pre-commit freshness check).
    async fn event_by_url(&self, url: &str) -> Result<Option<EventDetail>>;

    /// Register the selected match with the ledger.
    async fn create_match(&self, req: &CreateMatchRequest) -> Result<Option<CreatedMatch>>;

    /// Submit the bet. The ledger may still reject a stale-balance bet
    /// here even though local validation passed.
    async fn place_bet(&self, intent: &BetIntent) -> Result<Option<BetTicket>>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
