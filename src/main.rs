//! RINGSIDE — Interactive fight-betting workflow engine
//!
//! Entry point for local runs. Loads configuration, initialises
//! structured logging, wires the HTTP ledger client to the console
//! interaction gateway, and drives one betting saga to its terminal
//! outcome.

use anyhow::Result;
use secrecy::Secret;
use tracing::{info, warn};

use ringside::config::AppConfig;
use ringside::gateway::console::ConsoleGateway;
use ringside::gateway::SagaContext;
use ringside::ledger::http::HttpLedger;
use ringside::saga::{BettingSaga, SagaOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load("config.toml")?;
    init_logging();

    // The actor driving this run. Chat-platform session handling is out
    // of scope; locally the operator passes their id on the command line.
    let user_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "local-operator".to_string());

    let token = match cfg.ledger.auth_token_env.as_deref() {
        Some(env_name) => match AppConfig::resolve_env(env_name) {
            Ok(token) => Some(Secret::new(token)),
            Err(e) => {
                warn!(error = %e, "Ledger token not resolved — continuing unauthenticated");
                None
            }
        },
        None => None,
    };

    let ledger = HttpLedger::new(&cfg.ledger.base_url, token)?;
    let gateway = ConsoleGateway::new(cfg.gateway.to_gateway_config());
    let ctx = SagaContext::new(user_id);

    info!(
        run_id = %ctx.run_id,
        user_id = %ctx.user_id,
        ledger = %cfg.ledger.base_url,
        "Starting betting saga"
    );

    let outcome = BettingSaga::new(&ledger, &gateway, ctx).run().await?;

    match &outcome {
        SagaOutcome::Completed { confirmation } => {
            info!(confirmation = %confirmation, "Bet placed")
        }
        other => info!(outcome = ?other, "Saga ended without a bet"),
    }

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ringside=info"));

    if std::env::var("RINGSIDE_LOG_JSON").is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
