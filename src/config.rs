//! Configuration loading from TOML with environment overrides.
//!
//! `config.toml` is optional; every key has a default. The loaded
//! `AppConfig` is turned into an immutable `RunConfig` once at startup and
//! handed to the scheduler.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::api::Endpoints;
use crate::engine::session::SessionSettings;
use crate::http::RetryPolicy;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub runner: RunnerConfig,
    pub http: HttpConfig,
    pub service: Endpoints,
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Newline-separated bearer tokens, one account per line.
    pub tokens_file: String,
    /// Newline-separated proxy URIs.
    pub proxies_file: String,
    pub use_proxy: bool,
    pub cycle_interval_secs: u64,
    pub account_delay_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tokens_file: "token.txt".to_string(),
            proxies_file: "proxy.txt".to_string(),
            use_proxy: false,
            cycle_interval_secs: 24 * 60 * 60,
            account_delay_secs: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            retry: RetryPolicy::default(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `USE_PROXY`, `TOKENS_FILE` and `PROXIES_FILE` from the environment.
    pub fn override_from_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("USE_PROXY") {
            match parse_flag(&v) {
                Some(flag) => self.runner.use_proxy = flag,
                None => warn!(value = %v, "Ignoring unrecognised USE_PROXY value"),
            }
        }
        if let Some(path) = lookup("TOKENS_FILE") {
            self.runner.tokens_file = path;
        }
        if let Some(path) = lookup("PROXIES_FILE") {
            self.runner.proxies_file = path;
        }
    }

    /// Freeze into the runtime configuration. Proxying is switched off when
    /// it was requested but `proxies` is empty.
    pub fn into_run_config(self, proxies: Vec<String>) -> RunConfig {
        let use_proxy = if self.runner.use_proxy && proxies.is_empty() {
            warn!("No proxies available, proceeding without proxy.");
            false
        } else {
            if !self.runner.use_proxy {
                info!("Proceeding without proxy.");
            }
            self.runner.use_proxy
        };

        RunConfig {
            use_proxy,
            proxies: if use_proxy { proxies } else { Vec::new() },
            cycle_interval: Duration::from_secs(self.runner.cycle_interval_secs),
            account_delay: Duration::from_secs(self.runner.account_delay_secs),
            timeout: self.http.timeout(),
            retry: self.http.retry,
            endpoints: self.service,
            session: self.session,
        }
    }
}

/// Accepts y/yes/true/1 and n/no/false/0, case-insensitively.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Runtime configuration
// ---------------------------------------------------------------------------

/// Immutable settings for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub use_proxy: bool,
    /// Proxy URIs in file order.
    pub proxies: Vec<String>,
    pub cycle_interval: Duration,
    pub account_delay: Duration,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub endpoints: Endpoints,
    pub session: SessionSettings,
}

impl Default for RunConfig {
    fn default() -> Self {
        AppConfig::default().into_run_config(Vec::new())
    }
}

impl RunConfig {
    /// Round-robin proxy for the account at `index`.
    pub fn proxy_for(&self, index: usize) -> Option<&str> {
        if !self.use_proxy || self.proxies.is_empty() {
            return None;
        }
        Some(self.proxies[index % self.proxies.len()].as_str())
    }
}
