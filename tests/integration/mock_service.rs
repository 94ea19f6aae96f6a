//! Mock service for integration testing.
//!
//! Provides a deterministic `TensorService` implementation that serves
//! known markets and strategies, records every reaction and strategy
//! update, and can be forced to fail. All state is in-memory.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use tensor_daily::api::TensorService;
use tensor_daily::engine::ServiceConnector;
use tensor_daily::http::ProxyAgent;
use tensor_daily::types::*;

/// Calls shared by every service a connector hands out.
#[derive(Default)]
pub struct Journal {
    pub connects: Vec<(String, Option<String>)>,
    pub reactions: Vec<(String, Value, Reaction)>,
    pub updates: Vec<(String, String)>,
    pub points_lookups: Vec<String>,
}

/// A mock TruthTensor service for one account.
pub struct MockService {
    context: String,
    markets: Vec<Market>,
    strategies: Vec<Strategy>,
    user_id: Option<String>,
    journal: Arc<Mutex<Journal>>,
    /// If set, every call fails with this message.
    force_error: Option<String>,
}

impl MockService {
    pub fn new(context: &str, journal: Arc<Mutex<Journal>>) -> Self {
        Self {
            context: context.to_string(),
            markets: Vec::new(),
            strategies: vec![default_strategy()],
            user_id: Some("user-1".to_string()),
            journal,
            force_error: None,
        }
    }

    fn check(&self) -> Result<()> {
        match &self.force_error {
            Some(msg) => Err(anyhow!(ClientError::Transport(msg.clone()))),
            None => Ok(()),
        }
    }
}

/// Markets holding `count` decisions in total, spread over two entries.
pub fn markets_with_decisions(count: usize) -> Vec<Market> {
    let decision = |i: usize| Decision {
        id: json!(format!("dec-{i}")),
        agent: Some(AgentInfo {
            name: Some(format!("agent-{i}")),
        }),
    };
    let split = count / 2;
    vec![
        Market {
            recent_decisions: (0..split).map(decision).collect(),
        },
        Market {
            recent_decisions: (split..count).map(decision).collect(),
        },
    ]
}

fn default_strategy() -> Strategy {
    serde_json::from_value(json!({
        "id": "strat-1",
        "name": "Momentum",
        "config": { "model": "x-ai/grok-4", "risk": "low" }
    }))
    .expect("valid strategy fixture")
}

#[async_trait]
impl TensorService for MockService {
    async fn public_ip(&self) -> Result<String> {
        self.check()?;
        Ok("198.51.100.4".to_string())
    }

    async fn email(&self) -> Result<Option<String>> {
        self.check()?;
        Ok(Some(format!("{}@example.com", self.context.replace([' ', '/'], "-"))))
    }

    async fn popular_markets(&self) -> Result<Vec<Market>> {
        self.check()?;
        Ok(self.markets.clone())
    }

    async fn react(&self, decision: &Decision, reaction: Reaction) -> Result<Option<ReactionRecord>> {
        self.check()?;
        self.journal
            .lock()
            .unwrap()
            .reactions
            .push((self.context.clone(), decision.id.clone(), reaction));
        Ok(Some(ReactionRecord {
            user_id: self.user_id.clone().map(Value::String),
        }))
    }

    async fn strategies(&self) -> Result<Vec<Strategy>> {
        self.check()?;
        Ok(self.strategies.clone())
    }

    async fn update_strategy(&self, strategy_id: &str, config: &StrategyConfig) -> Result<Strategy> {
        self.check()?;
        let Some(existing) = self.strategies.iter().find(|s| s.path_id() == strategy_id) else {
            bail!(ClientError::Upstream {
                status: 404,
                body: "\"not found\"".into()
            });
        };
        self.journal
            .lock()
            .unwrap()
            .updates
            .push((strategy_id.to_string(), config.model.clone()));
        Ok(Strategy {
            config: config.clone(),
            ..existing.clone()
        })
    }

    async fn points(&self, user_id: &str) -> Result<f64> {
        self.check()?;
        self.journal.lock().unwrap().points_lookups.push(user_id.to_string());
        Ok(1250.0)
    }
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

/// Hands out `MockService`s and records which proxy each account got.
pub struct MockConnector {
    pub journal: Arc<Mutex<Journal>>,
    pub markets: Vec<Market>,
    /// Account contexts whose service fails every call.
    pub failing_accounts: Vec<String>,
    /// Account contexts that cannot be connected at all.
    pub unreachable_accounts: Vec<String>,
}

impl MockConnector {
    pub fn new(markets: Vec<Market>) -> Self {
        Self {
            journal: Arc::new(Mutex::new(Journal::default())),
            markets,
            failing_accounts: Vec::new(),
            unreachable_accounts: Vec::new(),
        }
    }

    pub fn journal(&self) -> std::sync::MutexGuard<'_, Journal> {
        self.journal.lock().unwrap()
    }
}

impl ServiceConnector for MockConnector {
    fn connect(
        &self,
        _credential: &Credential,
        proxy: Option<&ProxyAgent>,
        context: &str,
    ) -> Result<Box<dyn TensorService>> {
        self.journal
            .lock()
            .unwrap()
            .connects
            .push((context.to_string(), proxy.map(|p| p.uri().to_string())));

        if self.unreachable_accounts.iter().any(|c| c == context) {
            bail!("Failed to build HTTP client for {context}");
        }

        let mut service = MockService::new(context, self.journal.clone());
        service.markets = self.markets.clone();
        if self.failing_accounts.iter().any(|c| c == context) {
            service.force_error = Some("connection reset".into());
        }
        Ok(Box::new(service))
    }
}
