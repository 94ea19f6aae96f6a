//! `TensorService` over HTTP.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::headers::browser_headers;
use super::{Endpoints, TensorService};
use crate::http::{RequestExecutor, RequestSpec};
use crate::types::{
    Credential, Decision, Market, Reaction, ReactionRecord, Strategy, StrategyConfig, UNKNOWN_IP,
};

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct IpResponse {
    #[serde(default)]
    ip: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConnectedAccounts {
    #[serde(default)]
    accounts: Vec<ConnectedAccount>,
}

#[derive(Debug, Deserialize)]
struct ConnectedAccount {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReactionResponse {
    #[serde(default)]
    reaction: Option<ReactionRecord>,
}

#[derive(Debug, Deserialize)]
struct PointsResponse {
    #[serde(default)]
    points: f64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for one account: one credential, one executor (and so one proxy).
pub struct TensorClient {
    executor: RequestExecutor,
    credential: Credential,
    endpoints: Endpoints,
    timeout: Duration,
}

impl TensorClient {
    pub fn new(
        executor: RequestExecutor,
        credential: Credential,
        endpoints: Endpoints,
        timeout: Duration,
    ) -> Self {
        Self {
            executor,
            credential,
            endpoints,
            timeout,
        }
    }

    fn request(&self, method: Method, url: String, authed: bool) -> Result<RequestSpec> {
        let headers = browser_headers(authed.then_some(&self.credential))?;
        Ok(RequestSpec::new(method, url)
            .with_headers(headers)
            .with_timeout(self.timeout))
    }

    async fn call<T: DeserializeOwned>(&self, spec: RequestSpec, what: &str) -> Result<T> {
        debug!(method = %spec.method, url = %spec.url, "Calling {what}");
        let resp = self.executor.execute(&spec).await?;
        let parsed = resp
            .json()
            .with_context(|| format!("Failed to parse {what} response"))?;
        Ok(parsed)
    }
}

#[async_trait]
impl TensorService for TensorClient {
    async fn public_ip(&self) -> Result<String> {
        let spec = self.request(Method::GET, self.endpoints.ip_url.clone(), false)?;
        let body: IpResponse = self.call(spec, "IP lookup").await?;
        Ok(body.ip.unwrap_or_else(|| UNKNOWN_IP.to_string()))
    }

    async fn email(&self) -> Result<Option<String>> {
        let spec = self.request(Method::GET, self.endpoints.connected_accounts(), true)?;
        let body: ConnectedAccounts = self.call(spec, "connected accounts").await?;
        Ok(body.accounts.into_iter().next().and_then(|a| a.email))
    }

    async fn popular_markets(&self) -> Result<Vec<Market>> {
        let spec = self.request(Method::GET, self.endpoints.popular_markets(), true)?;
        self.call(spec, "popular markets").await
    }

    async fn react(&self, decision: &Decision, reaction: Reaction) -> Result<Option<ReactionRecord>> {
        let spec = self
            .request(Method::POST, self.endpoints.add_reaction(), true)?
            .with_payload(json!({ "decision_id": decision.id, "reaction": reaction }));
        let body: ReactionResponse = self.call(spec, "reaction").await?;
        Ok(body.reaction)
    }

    async fn strategies(&self) -> Result<Vec<Strategy>> {
        let spec = self.request(Method::GET, self.endpoints.strategies(), true)?;
        self.call(spec, "strategies").await
    }

    async fn update_strategy(&self, strategy_id: &str, config: &StrategyConfig) -> Result<Strategy> {
        let spec = self
            .request(Method::PUT, self.endpoints.strategy(strategy_id), true)?
            .with_payload(json!({ "config": config }));
        self.call(spec, "strategy update").await
    }

    async fn points(&self, user_id: &str) -> Result<f64> {
        let spec = self.request(Method::GET, self.endpoints.points(user_id), true)?;
        let body: PointsResponse = self.call(spec, "points").await?;
        Ok(body.points)
    }
}
