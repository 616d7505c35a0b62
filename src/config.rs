//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the ledger token) are referenced by env-var name in the
//! config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::gateway::GatewayConfig;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub ledger: LedgerConfig,
    pub gateway: GatewayTimeouts,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    pub base_url: String,
    /// Env var holding the bearer token, if the deployment requires one.
    #[serde(default)]
    pub auth_token_env: Option<String>,
}

/// Suspend timeouts in seconds, one per UI shape.
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayTimeouts {
    pub modal_timeout_secs: u64,
    pub choice_timeout_secs: u64,
    pub button_timeout_secs: u64,
}

impl GatewayTimeouts {
    pub fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            modal_timeout: Duration::from_secs(self.modal_timeout_secs),
            choice_timeout: Duration::from_secs(self.choice_timeout_secs),
            button_timeout: Duration::from_secs(self.button_timeout_secs),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
