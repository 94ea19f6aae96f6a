//! Cycle scheduler.
//!
//! One pass walks every account in file order, pairs it with a proxy
//! (round-robin over the account index) and runs its session. Passes repeat
//! forever with a fixed sleep in between.

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use super::session::AccountSession;
use crate::accounts::CredentialSource;
use crate::api::{Endpoints, TensorClient, TensorService};
use crate::config::RunConfig;
use crate::http::{create_agent, ProxyAgent, RequestExecutor, ReqwestTransport, RetryPolicy};
use crate::types::{CycleReport, Credential};

// ---------------------------------------------------------------------------
// Service construction
// ---------------------------------------------------------------------------

/// Builds the service handle for one account.
pub trait ServiceConnector: Send + Sync {
    fn connect(
        &self,
        credential: &Credential,
        proxy: Option<&ProxyAgent>,
        context: &str,
    ) -> Result<Box<dyn TensorService>>;
}

/// Connects over HTTP with a fresh client per account.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    timeout: Duration,
    retry: RetryPolicy,
    endpoints: Endpoints,
}

impl HttpConnector {
    pub fn new(timeout: Duration, retry: RetryPolicy, endpoints: Endpoints) -> Self {
        Self {
            timeout,
            retry,
            endpoints,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.timeout, config.retry.clone(), config.endpoints.clone())
    }
}

impl ServiceConnector for HttpConnector {
    fn connect(
        &self,
        credential: &Credential,
        proxy: Option<&ProxyAgent>,
        context: &str,
    ) -> Result<Box<dyn TensorService>> {
        let transport = ReqwestTransport::new(proxy, self.timeout)
            .with_context(|| format!("Failed to build HTTP client for {context}"))?;
        let executor =
            RequestExecutor::new(Arc::new(transport), self.retry.clone()).with_context(context);
        Ok(Box::new(TensorClient::new(
            executor,
            credential.clone(),
            self.endpoints.clone(),
            self.timeout,
        )))
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

pub struct CycleScheduler {
    config: RunConfig,
    credentials: Arc<dyn CredentialSource>,
    connector: Arc<dyn ServiceConnector>,
}

impl CycleScheduler {
    pub fn new(
        config: RunConfig,
        credentials: Arc<dyn CredentialSource>,
        connector: Arc<dyn ServiceConnector>,
    ) -> Self {
        Self {
            config,
            credentials,
            connector,
        }
    }

    /// Process every account once, sequentially.
    pub async fn run_pass(&self) -> CycleReport {
        let credentials = self.credentials.load();
        let mut report = CycleReport::new(credentials.len());

        if credentials.is_empty() {
            error!(cycle = %report.id, "No tokens found. Skipping this pass.");
            report.finished_at = Some(Utc::now());
            return report;
        }

        let total = credentials.len();
        for (i, credential) in credentials.iter().enumerate() {
            let context = format!("Account {}/{}", i + 1, total);
            let agent = self.config.proxy_for(i).and_then(create_agent);

            match self.connector.connect(credential, agent.as_ref(), &context) {
                Ok(service) => {
                    let session =
                        AccountSession::new(service.as_ref(), &context, self.config.session.clone())
                            .with_proxy(agent.as_ref().map(ProxyAgent::uri));
                    report.sessions.push(session.run().await);
                }
                Err(e) => {
                    error!(account = %context, "Failed to set up account: {e:#}");
                    report.failed_accounts += 1;
                }
            }

            info!(
                account = %context,
                delay_secs = self.config.account_delay.as_secs(),
                "Waiting before next account"
            );
            tokio::time::sleep(self.config.account_delay).await;
        }

        report.finished_at = Some(Utc::now());
        info!(
            cycle = %report.id,
            accounts = report.accounts_loaded,
            completed = report.completed(),
            partial = report.partial(),
            failed = report.failed_accounts,
            "Pass finished"
        );
        report
    }

    /// Run passes forever, sleeping `cycle_interval` after each one.
    pub async fn run_forever(&self) {
        loop {
            let report = self.run_pass().await;

            let reactions: usize = report.sessions.iter().map(|s| s.reactions_sent).sum();
            let next_run = chrono::Duration::from_std(self.config.cycle_interval)
                .ok()
                .and_then(|d| Utc::now().checked_add_signed(d));
            info!(
                cycle = %report.id,
                reactions,
                next_run = %next_run.map(|t| t.to_rfc3339()).unwrap_or_else(|| "unknown".into()),
                "All accounts processed. Sleeping until next cycle"
            );

            tokio::time::sleep(self.config.cycle_interval).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
