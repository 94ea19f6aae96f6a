//! TruthTensor API integration.
//!
//! Defines the `TensorService` trait the account session drives, and the
//! `TensorClient` implementation that talks to the real endpoints through
//! the retrying request executor.
//!
//! Hosts:
//! - `api.truthtensor.com`: identity, reactions, points
//! - `seeker.truthtensor.com`: markets, strategies

pub mod client;
pub mod headers;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::types::{Decision, Market, Reaction, ReactionRecord, Strategy, StrategyConfig};

pub use client::TensorClient;

pub const DEFAULT_API_BASE: &str = "https://api.truthtensor.com";
pub const DEFAULT_SEEKER_BASE: &str = "https://seeker.truthtensor.com";
pub const DEFAULT_IP_URL: &str = "https://api.ipify.org?format=json";

/// Number of popular markets requested per session.
pub const POPULAR_MARKETS_LIMIT: u32 = 50;

/// Base URLs of the remote service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub api_base: String,
    pub seeker_base: String,
    pub ip_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            seeker_base: DEFAULT_SEEKER_BASE.to_string(),
            ip_url: DEFAULT_IP_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub fn connected_accounts(&self) -> String {
        format!("{}/users/me/connected-accounts", self.api_base)
    }

    pub fn popular_markets(&self) -> String {
        format!("{}/markets/popular?limit={POPULAR_MARKETS_LIMIT}", self.seeker_base)
    }

    pub fn add_reaction(&self) -> String {
        format!("{}/reactions/add", self.api_base)
    }

    pub fn strategies(&self) -> String {
        format!("{}/strategies?includeInactive=true", self.seeker_base)
    }

    pub fn strategy(&self, id: &str) -> String {
        format!("{}/strategies/{id}", self.seeker_base)
    }

    pub fn points(&self, user_id: &str) -> String {
        format!("{}/points/{user_id}", self.api_base)
    }
}

/// Everything one account session needs from the remote service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TensorService: Send + Sync {
    /// Public IP as seen through this account's proxy.
    async fn public_ip(&self) -> Result<String>;

    /// Email of the first connected account, if any.
    async fn email(&self) -> Result<Option<String>>;

    async fn popular_markets(&self) -> Result<Vec<Market>>;

    /// React to a decision. Returns the stored reaction when the service
    /// echoes one back.
    async fn react(&self, decision: &Decision, reaction: Reaction) -> Result<Option<ReactionRecord>>;

    async fn strategies(&self) -> Result<Vec<Strategy>>;

    async fn update_strategy(&self, strategy_id: &str, config: &StrategyConfig) -> Result<Strategy>;

    async fn points(&self, user_id: &str) -> Result<f64>;
}
