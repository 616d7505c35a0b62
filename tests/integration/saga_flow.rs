//! End-to-end saga scenarios against scripted ledger and gateway.

use rust_decimal_macros::dec;

use ringside::gateway::SagaContext;
use ringside::saga::{
    BettingSaga, FailureKind, MatchClosedReason, RejectReason, SagaOutcome,
};
use ringside::types::CornerColor;
use ringside::wager::WagerError;

use crate::mock_gateway::ScriptedGateway;
use crate::mock_ledger::{ScriptedLedger, MATCH_ONE, MATCH_TWO};

const USER: &str = "user-1";

fn saga<'a>(
    ledger: &'a ScriptedLedger,
    gateway: &'a ScriptedGateway,
) -> BettingSaga<'a, ScriptedLedger, ScriptedGateway> {
    BettingSaga::new(ledger, gateway, SagaContext::new(USER))
}

#[tokio::test]
async fn test_full_flow_places_bet() {
    let ledger = ScriptedLedger::healthy();
    let gateway = ScriptedGateway::new()
        .script_modal(USER, "50")
        .script_choice(USER, MATCH_ONE)
        .script_button(USER, "Blue");

    let outcome = saga(&ledger, &gateway).run().await.unwrap();
    assert_eq!(
        outcome,
        SagaOutcome::Completed {
            confirmation: "tkt-1".to_string()
        }
    );

    // Remote calls happen in the saga's checkpoint order, each exactly once.
    assert_eq!(
        ledger.calls(),
        vec![
            "user_wallet_id",
            "wallet",
            "upcoming_fights",
            "event_by_url",
            "create_match",
            "place_bet",
        ]
    );

    // Scenario E: Blue at +150, amount 50 → win 75, payout 125.
    let intent = ledger.last_intent().unwrap();
    assert_eq!(intent.selected_corner, CornerColor::Blue);
    assert_eq!(intent.wager_odds, 150);
    assert_eq!(intent.wager_amount, dec!(50));
    assert_eq!(intent.amount_to_win, dec!(75));
    assert_eq!(intent.amount_to_payout, dec!(125));
    assert_eq!(intent.wallet_id, "w-1");
    assert_eq!(intent.user_id, USER);

    // Exactly one terminal message, and it carries the confirmation.
    let replies = gateway.replies();
    assert!(replies.last().unwrap().contains("tkt-1"));
    assert!(replies.last().unwrap().contains("Jane Roe"));
}

#[tokio::test]
async fn test_match_options_keep_card_order_with_cancel_last() {
    let ledger = ScriptedLedger::healthy();
    let gateway = ScriptedGateway::new()
        .script_modal(USER, "50")
        .script_choice(USER, "Cancel");

    let _ = saga(&ledger, &gateway).run().await.unwrap();

    let offered = gateway.choice_keys();
    assert_eq!(offered.len(), 1);
    assert_eq!(
        offered[0],
        vec![
            MATCH_ONE.to_string(),
            MATCH_TWO.to_string(),
            "Cancel".to_string()
        ]
    );
}

#[tokio::test]
async fn test_wallet_lookup_failure() {
    let ledger = ScriptedLedger::healthy().without_wallet();
    let gateway = ScriptedGateway::new();

    let outcome = saga(&ledger, &gateway).run().await.unwrap();
    assert_eq!(outcome, SagaOutcome::Failed(FailureKind::WalletNotFound));
    assert_eq!(ledger.calls(), vec!["user_wallet_id"]);
    assert!(gateway.replies().last().unwrap().contains("wallet"));
}

#[tokio::test]
async fn test_invalid_wager_is_rejected_with_message() {
    // Scenario B: wallet 100, wager 150.
    let ledger = ScriptedLedger::healthy();
    let gateway = ScriptedGateway::new().script_modal(USER, "150");

    let outcome = saga(&ledger, &gateway).run().await.unwrap();
    assert_eq!(
        outcome,
        SagaOutcome::Rejected(RejectReason::InvalidWager(WagerError::ExceedsBalance {
            amount: dec!(150),
            balance: dec!(100),
        }))
    );
    // One attempt per run: no catalog fetch, no retry prompt.
    assert_eq!(ledger.calls(), vec!["user_wallet_id", "wallet"]);
    assert!(gateway
        .replies()
        .last()
        .unwrap()
        .contains("exceeds your wallet balance"));
}

#[tokio::test]
async fn test_empty_card_fails_before_any_selection_ui() {
    // Scenario C: empty fight response → Failed(UpstreamUnavailable),
    // and the match-selection prompt is never shown.
    let ledger = ScriptedLedger::healthy().without_card();
    let gateway = ScriptedGateway::new().script_modal(USER, "50");

    let outcome = saga(&ledger, &gateway).run().await.unwrap();
    assert_eq!(
        outcome,
        SagaOutcome::Failed(FailureKind::UpstreamUnavailable)
    );
    assert!(!gateway
        .prompts()
        .iter()
        .any(|p| p.contains("Select a match")));
}

#[tokio::test]
async fn test_selection_timeout_creates_no_match() {
    // Scenario D: nobody answers the match prompt.
    let ledger = ScriptedLedger::healthy();
    let gateway = ScriptedGateway::new().script_modal(USER, "50");

    let outcome = saga(&ledger, &gateway).run().await.unwrap();
    assert_eq!(outcome, SagaOutcome::TimedOut);
    assert!(!ledger.calls().contains(&"create_match"));
}

#[tokio::test]
async fn test_cancel_at_corner_buttons() {
    let ledger = ScriptedLedger::healthy();
    let gateway = ScriptedGateway::new()
        .script_modal(USER, "50")
        .script_choice(USER, MATCH_ONE)
        .script_button(USER, "Cancel");

    let outcome = saga(&ledger, &gateway).run().await.unwrap();
    assert_eq!(outcome, SagaOutcome::CancelledByUser);
    assert!(!ledger.calls().contains(&"event_by_url"));
    assert!(gateway.replies().last().unwrap().contains("cancelled"));
}

#[tokio::test]
async fn test_live_match_never_reaches_commit() {
    // Scenario F / regression guard: revalidation says live → Rejected,
    // and neither createMatch nor placeBet is ever invoked.
    let ledger = ScriptedLedger::healthy().with_live_event();
    let gateway = ScriptedGateway::new()
        .script_modal(USER, "50")
        .script_choice(USER, MATCH_ONE)
        .script_button(USER, "Red");

    let outcome = saga(&ledger, &gateway).run().await.unwrap();
    assert_eq!(
        outcome,
        SagaOutcome::Rejected(RejectReason::MatchNoLongerOpen(MatchClosedReason::Live))
    );
    assert!(!ledger.calls().contains(&"create_match"));
    assert!(!ledger.calls().contains(&"place_bet"));
}

#[tokio::test]
async fn test_started_match_never_reaches_commit() {
    let ledger = ScriptedLedger::healthy().with_started_event();
    let gateway = ScriptedGateway::new()
        .script_modal(USER, "50")
        .script_choice(USER, MATCH_ONE)
        .script_button(USER, "Red");

    let outcome = saga(&ledger, &gateway).run().await.unwrap();
    assert_eq!(
        outcome,
        SagaOutcome::Rejected(RejectReason::MatchNoLongerOpen(
            MatchClosedReason::AlreadyStarted
        ))
    );
    assert!(!ledger.calls().contains(&"create_match"));
    assert!(!ledger.calls().contains(&"place_bet"));
}

#[tokio::test]
async fn test_match_post_failure() {
    let ledger = ScriptedLedger::healthy().without_created_match();
    let gateway = ScriptedGateway::new()
        .script_modal(USER, "50")
        .script_choice(USER, MATCH_ONE)
        .script_button(USER, "Blue");

    let outcome = saga(&ledger, &gateway).run().await.unwrap();
    assert_eq!(outcome, SagaOutcome::Failed(FailureKind::MatchPostFailed));
    assert!(!ledger.calls().contains(&"place_bet"));
}

#[tokio::test]
async fn test_bet_rejection_mentions_stale_wallet() {
    let ledger = ScriptedLedger::healthy().without_ticket();
    let gateway = ScriptedGateway::new()
        .script_modal(USER, "50")
        .script_choice(USER, MATCH_ONE)
        .script_button(USER, "Blue");

    let outcome = saga(&ledger, &gateway).run().await.unwrap();
    assert_eq!(
        outcome,
        SagaOutcome::Rejected(RejectReason::BetPlacementFailed)
    );
    assert!(gateway
        .replies()
        .last()
        .unwrap()
        .contains("out of date"));
}

#[tokio::test]
async fn test_transport_error_ends_run_at_first_checkpoint() {
    let ledger = ScriptedLedger::healthy().with_forced_error("connection refused");
    let gateway = ScriptedGateway::new();

    let outcome = saga(&ledger, &gateway).run().await.unwrap();
    // First checkpoint is the wallet lookup, so that's where it lands.
    assert_eq!(outcome, SagaOutcome::Failed(FailureKind::WalletNotFound));
}

#[tokio::test]
async fn test_other_actors_cannot_resolve_suspend_points() {
    // Only the designated actor may answer; an intruder's picks are
    // ignored and the prompt eventually times out.
    let ledger = ScriptedLedger::healthy();
    let gateway = ScriptedGateway::new()
        .script_modal(USER, "50")
        .script_choice("intruder", MATCH_ONE)
        .script_choice("intruder", MATCH_TWO);

    let outcome = saga(&ledger, &gateway).run().await.unwrap();
    assert_eq!(outcome, SagaOutcome::TimedOut);
    assert_eq!(gateway.ignored().len(), 2);
    assert!(!ledger.calls().contains(&"create_match"));
}

#[tokio::test]
async fn test_concurrent_sagas_share_no_state() {
    // Two runs for different users against separate doubles: both
    // complete independently with their own intents.
    let ledger_a = ScriptedLedger::healthy();
    let ledger_b = ScriptedLedger::healthy();
    let gateway_a = ScriptedGateway::new()
        .script_modal("alice", "10")
        .script_choice("alice", MATCH_ONE)
        .script_button("alice", "Red");
    let gateway_b = ScriptedGateway::new()
        .script_modal("bob", "20")
        .script_choice("bob", MATCH_TWO)
        .script_button("bob", "Blue");

    let run_a = BettingSaga::new(&ledger_a, &gateway_a, SagaContext::new("alice")).run();
    let run_b = BettingSaga::new(&ledger_b, &gateway_b, SagaContext::new("bob")).run();
    let (out_a, out_b) = tokio::join!(run_a, run_b);

    assert!(matches!(out_a.unwrap(), SagaOutcome::Completed { .. }));
    assert!(matches!(out_b.unwrap(), SagaOutcome::Completed { .. }));

    let intent_a = ledger_a.last_intent().unwrap();
    let intent_b = ledger_b.last_intent().unwrap();
    assert_eq!(intent_a.user_id, "alice");
    assert_eq!(intent_a.wager_amount, dec!(10));
    assert_eq!(intent_b.user_id, "bob");
    assert_eq!(intent_b.wager_amount, dec!(20));
}
