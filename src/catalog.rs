//! In-memory projection of the remote fight card.
//!
//! Turns the wire response into addressable match/corner records with a
//! stable presentation order, and interprets the revalidation response
//! into a bettable-or-not `MatchState`. Fight state can change between
//! selection and commit, so the saga re-fetches the event and runs the
//! selected match back through [`MatchState`] immediately before commit.

use std::collections::HashMap;
use tracing::warn;

use crate::ledger::{EventDetail, FightCard, FightDetailWire, FightWire};
use crate::types::{Corner, CornerColor};

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// One fight on the card: two named corners with odds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FightRecord {
    pub red: Corner,
    pub blue: Corner,
}

impl FightRecord {
    pub fn corner(&self, color: CornerColor) -> &Corner {
        match color {
            CornerColor::Red => &self.red,
            CornerColor::Blue => &self.blue,
        }
    }
}

/// Addressable projection of one event's upcoming fights.
///
/// Keys are match titles; `match_keys` preserves the wire response's
/// insertion order, which is also the presentation order.
#[derive(Debug, Clone)]
pub struct MatchCatalog {
    pub event_title: String,
    pub url: String,
    keys: Vec<String>,
    fights: HashMap<String, FightRecord>,
}

impl MatchCatalog {
    /// Build a catalog from the upcoming-fights response.
    ///
    /// Individual entries that fail to parse are skipped with a warning
    /// rather than failing the whole card.
    pub fn from_card(card: FightCard) -> Self {
        let mut keys = Vec::with_capacity(card.fights.len());
        let mut fights = HashMap::with_capacity(card.fights.len());

        for (key, value) in card.fights {
            match serde_json::from_value::<FightWire>(value) {
                Ok(fight) => {
                    fights.insert(
                        key.clone(),
                        FightRecord {
                            red: Corner {
                                name: fight.red.name,
                                odds: fight.red.odds,
                            },
                            blue: Corner {
                                name: fight.blue.name,
                                odds: fight.blue.odds,
                            },
                        },
                    );
                    keys.push(key);
                }
                Err(e) => {
                    warn!(match_key = %key, error = %e, "Skipping malformed fight entry");
                }
            }
        }

        Self {
            event_title: card.event_title,
            url: card.url,
            keys,
            fights,
        }
    }

    /// Match keys in presentation order.
    pub fn match_keys(&self) -> &[String] {
        &self.keys
    }

    pub fn fight(&self, key: &str) -> Option<&FightRecord> {
        self.fights.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

// ---------------------------------------------------------------------------
// Revalidation state
// ---------------------------------------------------------------------------

/// Live-state of one match, taken from the pre-commit event re-fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchState {
    pub is_live: bool,
    pub round: Option<u32>,
}

impl MatchState {
    /// A round on record means the fight has started (possibly finished).
    pub fn has_started(&self) -> bool {
        self.round.is_some()
    }

    /// A match is bettable only while it is neither live nor started.
    pub fn is_bettable(&self) -> bool {
        !self.is_live && !self.has_started()
    }
}

/// Look up one match in the revalidation response.
///
/// Returns the parsed fight entry and its state, or `None` when the
/// match has dropped off the card or its entry no longer parses.
pub fn revalidate_match(event: &EventDetail, key: &str) -> Option<(FightDetailWire, MatchState)> {
    let value = event.fights.get(key)?.clone();
    match serde_json::from_value::<FightDetailWire>(value) {
        Ok(fight) => {
            let state = MatchState {
                is_live: fight.details.is_live,
                round: fight.details.round,
            };
            Some((fight, state))
        }
        Err(e) => {
            warn!(match_key = %key, error = %e, "Malformed fight entry in revalidation response");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
