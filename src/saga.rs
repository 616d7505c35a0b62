//! The betting saga.
//!
//! A sequential state machine that drives the wager, catalog, gateway,
//! and ledger components through one bet attempt: collect a wager,
//! pick a match and corner, re-validate against a fresh event fetch,
//! then commit the match and bet to the remote ledger.
//!
//! Every run reaches exactly one terminal outcome. Cancellation and
//! failure exits branch off every suspend point and every remote-call
//! checkpoint; none of them leave partial state behind. The ledger is
//! only written at the final two checkpoints, and a rejection between
//! them stops the run before the bet submission.
//!
//! There are no retries anywhere. Every failure ends the run; the
//! remedy is always a fresh invocation.

use anyhow::{Context, Result};
use std::str::FromStr;
use tracing::{debug, error, warn};

use crate::catalog::{revalidate_match, MatchCatalog};
use crate::gateway::{
    ChoiceOption, InteractionGateway, ModalField, ModalRequest, SagaContext, Submission,
};
use crate::ledger::{BetLedger, CreateMatchRequest};
use crate::types::{format_american_odds, BetIntent, CornerColor, UserRef};
use crate::wager::{Wager, WagerError};

// ---------------------------------------------------------------------------
// States & outcomes
// ---------------------------------------------------------------------------

/// Linear saga states, advanced in order. Terminal outcomes are
/// reachable from every suspend and remote-call point in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaState {
    Init,
    WalletLoaded,
    WagerCollected,
    WagerValidated,
    FightsFetched,
    MatchSelected,
    CornerSelected,
    MatchRevalidated,
    MatchCreated,
    BetPlaced,
    Completed,
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SagaState::Init => "init",
            SagaState::WalletLoaded => "wallet_loaded",
            SagaState::WagerCollected => "wager_collected",
            SagaState::WagerValidated => "wager_validated",
            SagaState::FightsFetched => "fights_fetched",
            SagaState::MatchSelected => "match_selected",
            SagaState::CornerSelected => "corner_selected",
            SagaState::MatchRevalidated => "match_revalidated",
            SagaState::MatchCreated => "match_created",
            SagaState::BetPlaced => "bet_placed",
            SagaState::Completed => "completed",
        };
        write!(f, "{name}")
    }
}

/// Why the ledger or workflow infrastructure failed the run.
/// These are operator-visible and logged at error severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    WalletNotFound,
    UpstreamUnavailable,
    MatchPostFailed,
}

/// Why a revalidated match is no longer bettable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchClosedReason {
    Live,
    AlreadyStarted,
}

/// Rejections triggered by user input or legitimate remote policy.
/// Not operator errors, except bet placement which is also logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    InvalidWager(WagerError),
    MatchNoLongerOpen(MatchClosedReason),
    BetPlacementFailed,
}

/// The single terminal outcome of a saga run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SagaOutcome {
    Completed { confirmation: String },
    CancelledByUser,
    TimedOut,
    Rejected(RejectReason),
    Failed(FailureKind),
}

/// A terminal outcome paired with its one user-facing message.
struct Exit {
    outcome: SagaOutcome,
    message: String,
}

impl Exit {
    fn new(outcome: SagaOutcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Saga
// ---------------------------------------------------------------------------

/// One bet attempt for one user. Owns its wager, catalog, and intent;
/// concurrent runs share nothing and rely on the remote ledger for
/// consistency at commit time.
pub struct BettingSaga<'a, L: BetLedger, G: InteractionGateway> {
    ledger: &'a L,
    gateway: &'a G,
    ctx: SagaContext,
    state: SagaState,
}

impl<'a, L: BetLedger, G: InteractionGateway> BettingSaga<'a, L, G> {
    pub fn new(ledger: &'a L, gateway: &'a G, ctx: SagaContext) -> Self {
        Self {
            ledger,
            gateway,
            ctx,
            state: SagaState::Init,
        }
    }

    /// Drive the saga to its terminal outcome and deliver the terminal
    /// message. Only a broken reply channel escapes as `Err`; every
    /// domain failure is converted into an outcome.
    pub async fn run(mut self) -> Result<SagaOutcome> {
        debug!(run_id = %self.ctx.run_id, user_id = %self.ctx.user_id, "Saga starting");

        let exit = match self.drive().await {
            Ok(exit) => exit,
            Err(exit) => exit,
        };

        self.gateway
            .reply(&self.ctx, &exit.message)
            .await
            .context("Failed to deliver terminal saga message")?;

        debug!(
            run_id = %self.ctx.run_id,
            state = %self.state,
            outcome = ?exit.outcome,
            "Saga finished"
        );
        Ok(exit.outcome)
    }

    fn advance(&mut self, next: SagaState) {
        debug!(run_id = %self.ctx.run_id, from = %self.state, to = %next, "Saga transition");
        self.state = next;
    }

    /// Best-effort interim notice over the reply channel. Interim
    /// notices never count as the terminal message.
    async fn notify(&self, text: &str) {
        if let Err(e) = self.gateway.reply(&self.ctx, text).await {
            warn!(run_id = %self.ctx.run_id, error = %e, "Interim notice failed");
        }
    }

    async fn drive(&mut self) -> Result<Exit, Exit> {
        // -- Wallet snapshot ----------------------------------------------

        let user = UserRef::new(self.ctx.user_id.clone());
        let wallet_id = match self.ledger.user_wallet_id(&user).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                error!(run_id = %self.ctx.run_id, user_id = %self.ctx.user_id, "No wallet for user");
                return Err(Exit::new(
                    SagaOutcome::Failed(FailureKind::WalletNotFound),
                    "Error finding your wallet.",
                ));
            }
            Err(e) => {
                error!(run_id = %self.ctx.run_id, error = %e, "Wallet id lookup failed");
                return Err(Exit::new(
                    SagaOutcome::Failed(FailureKind::WalletNotFound),
                    "Error finding your wallet.",
                ));
            }
        };

        let wallet = match self.ledger.wallet(&wallet_id).await {
            Ok(wallet) => wallet,
            Err(e) => {
                error!(run_id = %self.ctx.run_id, wallet_id = %wallet_id, error = %e, "Wallet fetch failed");
                return Err(Exit::new(
                    SagaOutcome::Failed(FailureKind::WalletNotFound),
                    "Error finding your wallet.",
                ));
            }
        };
        self.advance(SagaState::WalletLoaded);

        // -- Wager modal --------------------------------------------------

        let modal = ModalRequest {
            title: "Place a wager".to_string(),
            fields: vec![ModalField::new(
                "wager",
                "How much would you like to wager?",
            )],
        };

        let raw_wager = match self.gateway.present_modal(&self.ctx, modal).await {
            Submission::Answered(reply) => reply.value("wager").unwrap_or_default().to_string(),
            Submission::TimedOut => {
                return Err(Exit::new(
                    SagaOutcome::TimedOut,
                    "The wager prompt timed out — no bet was placed.",
                ));
            }
            Submission::Cancelled => {
                return Err(Exit::new(
                    SagaOutcome::CancelledByUser,
                    "Bet cancelled — no bet was placed.",
                ));
            }
        };
        self.advance(SagaState::WagerCollected);

        // -- Wager validation (one attempt per run, no retry loop) --------

        let wager = match Wager::parse(&raw_wager, wallet.amount) {
            Ok(wager) => wager,
            Err(e) => {
                let message = e.to_string();
                return Err(Exit::new(
                    SagaOutcome::Rejected(RejectReason::InvalidWager(e)),
                    message,
                ));
            }
        };
        self.advance(SagaState::WagerValidated);

        // -- Fight card fetch ---------------------------------------------

        self.notify("Retrieving fight data, please wait...").await;

        let card = match self.ledger.upcoming_fights().await {
            Ok(Some(card)) => card,
            Ok(None) => {
                error!(run_id = %self.ctx.run_id, "No fight card from upstream — is the service asleep?");
                return Err(Exit::new(
                    SagaOutcome::Failed(FailureKind::UpstreamUnavailable),
                    "Error retrieving fight data — try again shortly. The upstream service may be asleep.",
                ));
            }
            Err(e) => {
                error!(run_id = %self.ctx.run_id, error = %e, "Fight card fetch failed");
                return Err(Exit::new(
                    SagaOutcome::Failed(FailureKind::UpstreamUnavailable),
                    "Error retrieving fight data — try again shortly. The upstream service may be asleep.",
                ));
            }
        };

        let catalog = MatchCatalog::from_card(card);
        if catalog.is_empty() {
            error!(run_id = %self.ctx.run_id, event = %catalog.event_title, "Fight card has no usable fights");
            return Err(Exit::new(
                SagaOutcome::Failed(FailureKind::UpstreamUnavailable),
                "Error retrieving fight data — try again shortly. The upstream service may be asleep.",
            ));
        }
        self.advance(SagaState::FightsFetched);

        // -- Match selection ----------------------------------------------

        let mut options: Vec<ChoiceOption> = catalog
            .match_keys()
            .iter()
            .map(|k| ChoiceOption::new(k.clone(), k.clone()))
            .collect();
        options.push(ChoiceOption::cancel());

        let prompt = format!("Select a match on {}", catalog.event_title);
        let selected_key = match self.gateway.present_choice(&self.ctx, &prompt, &options).await {
            Submission::Answered(key) => key,
            Submission::Cancelled => {
                return Err(Exit::new(
                    SagaOutcome::CancelledByUser,
                    "Bet cancelled — no bet was placed.",
                ));
            }
            Submission::TimedOut => {
                return Err(Exit::new(
                    SagaOutcome::TimedOut,
                    "Match selection timed out — no bet was placed.",
                ));
            }
        };

        let Some(fight) = catalog.fight(&selected_key) else {
            // The gateway echoed a key we never offered.
            error!(run_id = %self.ctx.run_id, key = %selected_key, "Selected match not in catalog");
            return Err(Exit::new(
                SagaOutcome::Failed(FailureKind::UpstreamUnavailable),
                "Something went wrong — please start again.",
            ));
        };
        self.advance(SagaState::MatchSelected);

        // -- Corner selection ---------------------------------------------

        let buttons = vec![
            ChoiceOption::new(CornerColor::Red.to_string(), fight.red.name.clone()),
            ChoiceOption::new(CornerColor::Blue.to_string(), fight.blue.name.clone()),
            ChoiceOption::cancel(),
        ];

        let corner_key = match self
            .gateway
            .present_buttons(&self.ctx, &selected_key, &buttons)
            .await
        {
            Submission::Answered(key) => key,
            Submission::Cancelled => {
                return Err(Exit::new(
                    SagaOutcome::CancelledByUser,
                    "Bet cancelled — no bet was placed.",
                ));
            }
            Submission::TimedOut => {
                return Err(Exit::new(
                    SagaOutcome::TimedOut,
                    "Corner selection timed out — no bet was placed.",
                ));
            }
        };

        let corner = match CornerColor::from_str(&corner_key) {
            Ok(corner) => corner,
            Err(e) => {
                error!(run_id = %self.ctx.run_id, key = %corner_key, error = %e, "Unknown corner key");
                return Err(Exit::new(
                    SagaOutcome::Failed(FailureKind::UpstreamUnavailable),
                    "Something went wrong — please start again.",
                ));
            }
        };
        self.advance(SagaState::CornerSelected);

        // -- Pre-commit revalidation --------------------------------------

        self.notify("Validating and placing bet...").await;

        let event = match self.ledger.event_by_url(&catalog.url).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                error!(run_id = %self.ctx.run_id, url = %catalog.url, "No revalidation response from upstream");
                return Err(Exit::new(
                    SagaOutcome::Failed(FailureKind::UpstreamUnavailable),
                    "Error validating the event — try again.",
                ));
            }
            Err(e) => {
                error!(run_id = %self.ctx.run_id, url = %catalog.url, error = %e, "Event revalidation failed");
                return Err(Exit::new(
                    SagaOutcome::Failed(FailureKind::UpstreamUnavailable),
                    "Error validating the event — try again.",
                ));
            }
        };

        let Some((fresh_fight, match_state)) = revalidate_match(&event, &selected_key) else {
            error!(run_id = %self.ctx.run_id, key = %selected_key, "Selected match missing from revalidated event");
            return Err(Exit::new(
                SagaOutcome::Failed(FailureKind::UpstreamUnavailable),
                "The selected match is no longer on the card — try again.",
            ));
        };

        // The freshness gate: once the match is live or has a round on
        // record it is no longer bettable and the run must stop here,
        // before any commit call.
        if match_state.is_live {
            return Err(Exit::new(
                SagaOutcome::Rejected(RejectReason::MatchNoLongerOpen(MatchClosedReason::Live)),
                "The match is already live — betting is closed.",
            ));
        }
        if match_state.has_started() {
            return Err(Exit::new(
                SagaOutcome::Rejected(RejectReason::MatchNoLongerOpen(
                    MatchClosedReason::AlreadyStarted,
                )),
                "The match has already started — betting is closed.",
            ));
        }
        self.advance(SagaState::MatchRevalidated);

        // -- Match creation -----------------------------------------------

        // Odds come from the revalidated fetch, not the earlier card.
        let fresh_corner = match corner {
            CornerColor::Red => &fresh_fight.red,
            CornerColor::Blue => &fresh_fight.blue,
        };
        let enriched = wager.enrich(fresh_corner.odds);

        let create_req = CreateMatchRequest {
            event_title: event.event_title.clone(),
            match_title: selected_key.clone(),
            link: event.url.clone(),
        };

        let created = match self.ledger.create_match(&create_req).await {
            Ok(Some(created)) => created,
            Ok(None) => {
                error!(run_id = %self.ctx.run_id, match_title = %selected_key, "Match creation returned no id");
                return Err(Exit::new(
                    SagaOutcome::Failed(FailureKind::MatchPostFailed),
                    "The match failed to post — please report this error.",
                ));
            }
            Err(e) => {
                error!(run_id = %self.ctx.run_id, match_title = %selected_key, error = %e, "Match creation failed");
                return Err(Exit::new(
                    SagaOutcome::Failed(FailureKind::MatchPostFailed),
                    "The match failed to post — please report this error.",
                ));
            }
        };
        self.advance(SagaState::MatchCreated);

        // -- Bet placement ------------------------------------------------

        let intent = BetIntent {
            match_id: created.match_id,
            user_id: self.ctx.user_id.clone(),
            wallet_id,
            selected_corner: corner,
            wager_odds: enriched.odds,
            wager_amount: enriched.amount,
            amount_to_win: enriched.amount_to_win,
            amount_to_payout: enriched.amount_to_payout,
        };

        let ticket = match self.ledger.place_bet(&intent).await {
            Ok(Some(ticket)) => ticket,
            Ok(None) => {
                error!(run_id = %self.ctx.run_id, match_id = %intent.match_id, "Bet placement rejected by ledger");
                return Err(Exit::new(
                    SagaOutcome::Rejected(RejectReason::BetPlacementFailed),
                    "The bet failed to place. Wallet data may be out of date — start a new bet to try again.",
                ));
            }
            Err(e) => {
                error!(run_id = %self.ctx.run_id, match_id = %intent.match_id, error = %e, "Bet placement failed");
                return Err(Exit::new(
                    SagaOutcome::Rejected(RejectReason::BetPlacementFailed),
                    "The bet failed to place. Wallet data may be out of date — start a new bet to try again.",
                ));
            }
        };
        self.advance(SagaState::BetPlaced);

        // -- Done ---------------------------------------------------------

        self.advance(SagaState::Completed);
        let message = format!(
            "You bet {} on {} ({}) in {}. Win: {} — payout {}. Confirmation: {}",
            enriched.amount,
            fresh_corner.name,
            format_american_odds(enriched.odds),
            selected_key,
            enriched.amount_to_win,
            enriched.amount_to_payout,
            ticket.confirmation,
        );

        Ok(Exit::new(
            SagaOutcome::Completed {
                confirmation: ticket.confirmation,
            },
            message,
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
