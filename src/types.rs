//! Shared types for the daily runner.
//!
//! Remote payloads are only deserialized as far as the runner needs them;
//! everything else is carried through as opaque JSON.

use chrono::{DateTime, Utc};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Bearer token for one account. Never printed.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::new(token.into()))
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// Placeholder when the public IP cannot be determined.
pub const UNKNOWN_IP: &str = "unknown";
/// Placeholder when no email is linked to the account.
pub const UNKNOWN_EMAIL: &str = "N/A";

// ---------------------------------------------------------------------------
// Markets & decisions
// ---------------------------------------------------------------------------

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Entry of `/markets/popular`. Only the decisions matter here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    #[serde(default, deserialize_with = "null_as_default")]
    pub recent_decisions: Vec<Decision>,
}

/// Something an agent decided that can receive a reaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Decision {
    /// Opaque id, echoed back verbatim when reacting.
    pub id: Value,
    #[serde(default)]
    pub agent: Option<AgentInfo>,
}

impl Decision {
    pub fn agent_name(&self) -> &str {
        self.agent
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentInfo {
    #[serde(default)]
    pub name: Option<String>,
}

/// Reactions the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    Flag,
    Poop,
    Joy,
    Rocket,
}

impl Reaction {
    pub const ALL: [Reaction; 4] = [Reaction::Flag, Reaction::Poop, Reaction::Joy, Reaction::Rocket];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Poop => "poop",
            Self::Joy => "joy",
            Self::Rocket => "rocket",
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `reaction` object returned by `/reactions/add`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReactionRecord {
    #[serde(default)]
    pub user_id: Option<Value>,
}

impl ReactionRecord {
    /// User id as a path segment, whether the service sent a string or a number.
    pub fn user_id(&self) -> Option<String> {
        match self.user_id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub config: StrategyConfig,
}

impl Strategy {
    /// Id rendered for use in a URL path.
    pub fn path_id(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Strategy configuration. Fields other than `model` round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StrategyConfig {
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            extra: self.extra.clone(),
        }
    }
}

/// A model a strategy can be switched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelChoice {
    pub id: &'static str,
    pub name: &'static str,
}

pub const MODELS: &[ModelChoice] = &[
    ModelChoice { id: "google/gemini-3-pro-preview", name: "Gemini 3 Pro" },
    ModelChoice { id: "qwen/qwen3-max", name: "Qwen3 Max" },
    ModelChoice { id: "openai/gpt-5.1", name: "GPT-5.1" },
    ModelChoice { id: "x-ai/grok-4", name: "Grok 4" },
    ModelChoice { id: "deepseek/deepseek-chat-v3.1", name: "DeepSeek Chat 3.1" },
    ModelChoice { id: "anthropic/claude-sonnet-4.5", name: "Claude Sonnet 4.5" },
    ModelChoice { id: "moonshotai/kimi-k2-thinking", name: "Kimi K2 Thinking" },
    ModelChoice { id: "minimax/minimax-m2", name: "MiniMax M2" },
];

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Completed,
    Partial,
}

/// Outcome of one account session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub context: String,
    pub proxy: Option<String>,
    pub ip: String,
    pub email: String,
    pub decisions_found: usize,
    pub reactions_sent: usize,
    pub reactions_failed: usize,
    /// New model id when a strategy was updated.
    pub strategy_model: Option<String>,
    pub user_id: Option<String>,
    pub points: Option<f64>,
    /// One line per stage that failed or was skipped.
    pub issues: Vec<String>,
}

impl SessionReport {
    pub fn new(context: &str, proxy: Option<&str>) -> Self {
        Self {
            context: context.to_string(),
            proxy: proxy.map(String::from),
            ip: String::new(),
            email: String::new(),
            decisions_found: 0,
            reactions_sent: 0,
            reactions_failed: 0,
            strategy_model: None,
            user_id: None,
            points: None,
            issues: Vec::new(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        if self.issues.is_empty() {
            SessionStatus::Completed
        } else {
            SessionStatus::Partial
        }
    }
}

/// Everything one pass over the accounts produced.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub accounts_loaded: usize,
    pub sessions: Vec<SessionReport>,
    /// Accounts for which no session could be started.
    pub failed_accounts: usize,
}

impl CycleReport {
    pub fn new(accounts_loaded: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            accounts_loaded,
            sessions: Vec::new(),
            failed_accounts: 0,
        }
    }

    pub fn completed(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.status() == SessionStatus::Completed)
            .count()
    }

    pub fn partial(&self) -> usize {
        self.sessions.len() - self.completed()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors surfaced by the request layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Method {0} not supported")]
    UnsupportedMethod(Method),

    #[error("{0}")]
    Transport(String),

    #[error("Request failed with status code {status} | Status: {status} | Body: {body}")]
    Upstream { status: u16, body: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
