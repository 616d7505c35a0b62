//! HTTP implementation of the ledger interface.
//!
//! Thin JSON client over the remote wallet/match/bet service. Empty
//! bodies, `null`, and 404s map to `Ok(None)` — the upstream answering
//! "no data" — while transport and 5xx errors surface as `Err`. The
//! saga treats both the same way at its remote-call checkpoints, but
//! transport errors carry detail for operator logs.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{BetLedger, CreateMatchRequest, CreatedMatch, EventDetail, FightCard};
use crate::types::{BetIntent, BetTicket, UserRef, Wallet};

/// Wire shape of the wallet-id lookup response.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletIdResponse {
    wallet_id: String,
}

pub struct HttpLedger {
    http: Client,
    base_url: String,
    /// Optional bearer token for authenticated deployments.
    token: Option<Secret<String>>,
}

impl HttpLedger {
    pub fn new(base_url: impl Into<String>, token: Option<Secret<String>>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent("ringside/0.1.0")
            .build()
            .context("Failed to build HTTP client for ledger")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn request(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        }
    }

    /// Decode a response, mapping "no data" shapes to `None`.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Option<T>> {
        if resp.status() == reqwest::StatusCode::NOT_FOUND
            || resp.status() == reqwest::StatusCode::NO_CONTENT
        {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Ledger API error {status}: {body}");
        }

        let body = resp.text().await.context("Failed to read ledger response")?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }

        let value = serde_json::from_str(trimmed)
            .with_context(|| format!("Failed to parse ledger response: {trimmed}"))?;
        Ok(Some(value))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "Ledger GET");
        let resp = self
            .request(self.http.get(&url))
            .send()
            .await
            .with_context(|| format!("Ledger request failed: GET {path}"))?;
        Self::decode(resp).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "Ledger POST");
        let resp = self
            .request(self.http.post(&url))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Ledger request failed: POST {path}"))?;
        Self::decode(resp).await
    }
}

#[async_trait]
impl BetLedger for HttpLedger {
    async fn user_wallet_id(&self, user: &UserRef) -> Result<Option<String>> {
        let resp: Option<WalletIdResponse> = self.post("/users/wallet-id", user).await?;
        Ok(resp.map(|r| r.wallet_id))
    }

    async fn wallet(&self, wallet_id: &str) -> Result<Wallet> {
        self.get(&format!("/wallets/{wallet_id}"))
            .await?
            .with_context(|| format!("Wallet not found: {wallet_id}"))
    }

    async fn upcoming_fights(&self) -> Result<Option<FightCard>> {
        self.get("/fights/upcoming").await
    }

    async fn event_by_url(&self, url: &str) -> Result<Option<EventDetail>> {
        self.get(&format!("/events?url={}", urlencoding::encode(url)))
            .await
    }

    async fn create_match(&self, req: &CreateMatchRequest) -> Result<Option<CreatedMatch>> {
        self.post("/matches", req).await
    }

    async fn place_bet(&self, intent: &BetIntent) -> Result<Option<BetTicket>> {
        self.post("/bets", intent).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
