//! Account session.
//!
//! Runs the daily pipeline for one credential/proxy pairing:
//! IP → email → markets → reactions → strategy update → points.
//! Each stage catches and logs its own failure; a later stage only gets
//! skipped when it needs an earlier stage's output.

use fastrand::Rng;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};

use super::selection::{pick_index, pick_reaction, pick_replacement_model, sample_without_replacement};
use crate::api::TensorService;
use crate::types::{Decision, ModelChoice, Reaction, SessionReport, MODELS};

pub use crate::types::{UNKNOWN_EMAIL, UNKNOWN_IP};

/// Tunables for one session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Decisions reacted to per session.
    pub sample_size: usize,
    /// Pause after every reaction.
    pub reaction_delay_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            sample_size: 5,
            reaction_delay_secs: 5,
        }
    }
}

impl SessionSettings {
    pub fn reaction_delay(&self) -> Duration {
        Duration::from_secs(self.reaction_delay_secs)
    }
}

pub struct AccountSession<'a> {
    service: &'a dyn TensorService,
    context: String,
    proxy: Option<String>,
    settings: SessionSettings,
    models: &'a [ModelChoice],
    reactions: &'a [Reaction],
    rng: Rng,
}

impl<'a> AccountSession<'a> {
    pub fn new(service: &'a dyn TensorService, context: &str, settings: SessionSettings) -> Self {
        Self {
            service,
            context: context.to_string(),
            proxy: None,
            settings,
            models: MODELS,
            reactions: &Reaction::ALL,
            rng: Rng::new(),
        }
    }

    pub fn with_proxy(mut self, proxy: Option<&str>) -> Self {
        self.proxy = proxy.map(String::from);
        self
    }

    pub fn with_rng(mut self, rng: Rng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_models(mut self, models: &'a [ModelChoice]) -> Self {
        self.models = models;
        self
    }

    /// Run every stage in order. Never fails; problems end up in the report.
    pub async fn run(mut self) -> SessionReport {
        let mut report = SessionReport::new(&self.context, self.proxy.as_deref());
        info!(
            account = %self.context,
            proxy = self.proxy.as_deref().unwrap_or("none"),
            "Starting account processing"
        );

        report.ip = self.resolve_ip(&mut report).await;
        report.email = self.resolve_email(&mut report).await;
        info!(account = %self.context, ip = %report.ip, email = %report.email, "Account info");

        info!(account = %self.context, "Starting daily react process");
        let decisions = self.collect_decisions(&mut report).await;
        report.decisions_found = decisions.len();
        self.react_to(decisions, &mut report).await;

        info!(account = %self.context, "Starting daily strategy update");
        self.rotate_strategy_model(&mut report).await;

        self.report_points(&mut report).await;

        info!(
            account = %self.context,
            status = ?report.status(),
            reactions = report.reactions_sent,
            issues = report.issues.len(),
            "Completed account processing"
        );
        report
    }

    // -- Stages ----------------------------------------------------------

    async fn resolve_ip(&self, report: &mut SessionReport) -> String {
        match self.service.public_ip().await {
            Ok(ip) => ip,
            Err(e) => {
                error!(account = %self.context, "Failed to get IP: {e:#}");
                report.issues.push(format!("ip lookup failed: {e}"));
                UNKNOWN_IP.to_string()
            }
        }
    }

    async fn resolve_email(&self, report: &mut SessionReport) -> String {
        match self.service.email().await {
            Ok(email) => email.unwrap_or_else(|| UNKNOWN_EMAIL.to_string()),
            Err(e) => {
                error!(account = %self.context, "Failed to fetch email: {e:#}");
                report.issues.push(format!("email lookup failed: {e}"));
                UNKNOWN_EMAIL.to_string()
            }
        }
    }

    async fn collect_decisions(&self, report: &mut SessionReport) -> Vec<Decision> {
        let markets = match self.service.popular_markets().await {
            Ok(m) => m,
            Err(e) => {
                error!(account = %self.context, "Failed to fetch popular markets: {e:#}");
                report.issues.push(format!("markets fetch failed: {e}"));
                return Vec::new();
            }
        };

        let decisions: Vec<Decision> = markets
            .into_iter()
            .flat_map(|m| m.recent_decisions)
            .collect();

        if decisions.is_empty() {
            warn!(account = %self.context, "No recent decisions found.");
            report.issues.push("no recent decisions".into());
        }
        decisions
    }

    async fn react_to(&mut self, decisions: Vec<Decision>, report: &mut SessionReport) {
        let selected = sample_without_replacement(&mut self.rng, decisions, self.settings.sample_size);
        let delay = self.settings.reaction_delay();

        for decision in &selected {
            let Some(reaction) = pick_reaction(&mut self.rng, self.reactions) else {
                break;
            };
            let agent = decision.agent_name();

            match self.service.react(decision, reaction).await {
                Ok(record) => {
                    report.reactions_sent += 1;
                    info!(account = %self.context, %reaction, agent, "Reacted successfully");
                    if report.user_id.is_none() {
                        report.user_id = record.and_then(|r| r.user_id());
                    }
                }
                Err(e) => {
                    report.reactions_failed += 1;
                    error!(account = %self.context, agent, "Failed to react: {e:#}");
                }
            }

            tokio::time::sleep(delay).await;
        }

        if report.reactions_failed > 0 {
            report
                .issues
                .push(format!("{} reaction(s) failed", report.reactions_failed));
        }
    }

    async fn rotate_strategy_model(&mut self, report: &mut SessionReport) {
        let strategies = match self.service.strategies().await {
            Ok(s) => s,
            Err(e) => {
                error!(account = %self.context, "Failed to fetch strategies: {e:#}");
                report.issues.push(format!("strategies fetch failed: {e}"));
                return;
            }
        };

        let Some(idx) = pick_index(&mut self.rng, strategies.len()) else {
            warn!(account = %self.context, "No strategies found.");
            report.issues.push("no strategies".into());
            return;
        };
        let strategy = &strategies[idx];
        info!(
            account = %self.context,
            strategy = %strategy.name,
            current_model = %strategy.config.model,
            "Selected strategy"
        );

        let Some(model) = pick_replacement_model(&mut self.rng, self.models, &strategy.config.model)
        else {
            warn!(account = %self.context, "No alternative models available.");
            report.issues.push("no alternative model".into());
            return;
        };

        let config = strategy.config.with_model(model.id);
        match self.service.update_strategy(&strategy.path_id(), &config).await {
            Ok(updated) => {
                info!(
                    account = %self.context,
                    new_model = %updated.config.model,
                    model_name = model.name,
                    "Updated strategy successfully"
                );
                report.strategy_model = Some(model.id.to_string());
            }
            Err(e) => {
                error!(account = %self.context, "Failed to update strategy: {e:#}");
                report.issues.push(format!("strategy update failed: {e}"));
            }
        }
    }

    async fn report_points(&self, report: &mut SessionReport) {
        let Some(user_id) = report.user_id.clone() else {
            warn!(account = %self.context, "No user ID found from reactions.");
            report.issues.push("no user id".into());
            return;
        };

        match self.service.points(&user_id).await {
            Ok(points) => {
                report.points = Some(points);
                info!(
                    account = %self.context,
                    user_id = %user_id,
                    email = %report.email,
                    total_points = points,
                    "Profile info"
                );
            }
            Err(e) => {
                error!(account = %self.context, "Failed to fetch points: {e:#}");
                report.issues.push(format!("points fetch failed: {e}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
