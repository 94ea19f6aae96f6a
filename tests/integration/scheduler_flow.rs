//! End-to-end passes through the scheduler and account sessions.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tensor_daily::accounts::{CredentialSource, TokenFile};
use tensor_daily::config::{AppConfig, RunConfig};
use tensor_daily::engine::CycleScheduler;
use tensor_daily::engine::session::{UNKNOWN_EMAIL, UNKNOWN_IP};
use tensor_daily::types::{Credential, Reaction, SessionStatus};

use crate::mock_service::{markets_with_decisions, MockConnector};

fn run_config(proxies: &[&str]) -> RunConfig {
    let mut cfg = AppConfig::default();
    cfg.runner.use_proxy = !proxies.is_empty();
    cfg.into_run_config(proxies.iter().map(|p| p.to_string()).collect())
}

fn tokens(n: usize) -> Arc<dyn CredentialSource> {
    Arc::new((0..n).map(|i| Credential::new(format!("token-{i}"))).collect::<Vec<_>>())
}

#[tokio::test(start_paused = true)]
async fn test_three_decisions_give_three_reactions() {
    let connector = Arc::new(MockConnector::new(markets_with_decisions(3)));
    let scheduler = CycleScheduler::new(run_config(&[]), tokens(1), connector.clone());

    let start = tokio::time::Instant::now();
    let report = scheduler.run_pass().await;
    let elapsed = start.elapsed();

    let session = &report.sessions[0];
    assert_eq!(session.decisions_found, 3);
    assert_eq!(session.reactions_sent, 3);
    assert_eq!(session.status(), SessionStatus::Completed);
    assert_eq!(session.user_id.as_deref(), Some("user-1"));
    assert_eq!(session.points, Some(1250.0));

    // Three paced reactions plus the pause after the account.
    assert!(elapsed >= Duration::from_secs(20), "elapsed {elapsed:?}");

    let journal = connector.journal();
    assert_eq!(journal.reactions.len(), 3);
    let ids: HashSet<_> = journal.reactions.iter().map(|(_, id, _)| id.to_string()).collect();
    assert_eq!(ids.len(), 3);
    assert!(journal
        .reactions
        .iter()
        .all(|(_, _, r)| Reaction::ALL.contains(r)));
    assert_eq!(journal.points_lookups, vec!["user-1".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_sample_is_capped_at_five() {
    let connector = Arc::new(MockConnector::new(markets_with_decisions(12)));
    let scheduler = CycleScheduler::new(run_config(&[]), tokens(1), connector.clone());

    let report = scheduler.run_pass().await;

    assert_eq!(report.sessions[0].decisions_found, 12);
    assert_eq!(report.sessions[0].reactions_sent, 5);
    let journal = connector.journal();
    let ids: HashSet<_> = journal.reactions.iter().map(|(_, id, _)| id.to_string()).collect();
    assert_eq!(ids.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_strategy_model_is_rotated() {
    let connector = Arc::new(MockConnector::new(markets_with_decisions(1)));
    let scheduler = CycleScheduler::new(run_config(&[]), tokens(1), connector.clone());

    let report = scheduler.run_pass().await;

    let journal = connector.journal();
    assert_eq!(journal.updates.len(), 1);
    let (id, model) = &journal.updates[0];
    assert_eq!(id, "strat-1");
    assert_ne!(model, "x-ai/grok-4");
    assert_eq!(report.sessions[0].strategy_model.as_deref(), Some(model.as_str()));
}

#[tokio::test(start_paused = true)]
async fn test_round_robin_proxies_across_accounts() {
    let connector = Arc::new(MockConnector::new(Vec::new()));
    let scheduler = CycleScheduler::new(
        run_config(&["http://10.0.0.1:3128", "socks5://10.0.0.2:1080"]),
        tokens(3),
        connector.clone(),
    );

    scheduler.run_pass().await;

    let journal = connector.journal();
    assert_eq!(
        journal.connects,
        vec![
            ("Account 1/3".to_string(), Some("http://10.0.0.1:3128".to_string())),
            ("Account 2/3".to_string(), Some("socks5://10.0.0.2:1080".to_string())),
            ("Account 3/3".to_string(), Some("http://10.0.0.1:3128".to_string())),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_bad_accounts_do_not_abort_pass() {
    let mut connector = MockConnector::new(markets_with_decisions(2));
    connector.failing_accounts = vec!["Account 1/3".to_string()];
    connector.unreachable_accounts = vec!["Account 2/3".to_string()];
    let connector = Arc::new(connector);
    let scheduler = CycleScheduler::new(run_config(&[]), tokens(3), connector.clone());

    let report = scheduler.run_pass().await;

    assert_eq!(report.accounts_loaded, 3);
    assert_eq!(report.failed_accounts, 1);
    assert_eq!(report.sessions.len(), 2);
    assert_eq!(report.partial(), 1);
    assert_eq!(report.completed(), 1);

    let broken = &report.sessions[0];
    assert_eq!(broken.context, "Account 1/3");
    assert_eq!(broken.ip, UNKNOWN_IP);
    assert_eq!(broken.email, UNKNOWN_EMAIL);
    assert_eq!(broken.reactions_sent, 0);
    assert_eq!(broken.points, None);

    let healthy = &report.sessions[1];
    assert_eq!(healthy.context, "Account 3/3");
    assert_eq!(healthy.reactions_sent, 2);

    let journal = connector.journal();
    assert!(journal.reactions.iter().all(|(ctx, _, _)| ctx == "Account 3/3"));
}

#[tokio::test(start_paused = true)]
async fn test_empty_token_list_makes_no_calls() {
    let connector = Arc::new(MockConnector::new(markets_with_decisions(3)));
    let scheduler = CycleScheduler::new(run_config(&[]), tokens(0), connector.clone());

    let report = scheduler.run_pass().await;

    assert_eq!(report.accounts_loaded, 0);
    assert!(report.sessions.is_empty());
    assert!(connector.journal().connects.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_token_file_is_reread_each_pass() {
    let mut path = std::env::temp_dir();
    path.push(format!("tensor_daily_it_{}.txt", uuid::Uuid::new_v4()));
    std::fs::write(&path, "alpha\n\n  beta  \n").unwrap();

    let connector = Arc::new(MockConnector::new(Vec::new()));
    let scheduler = CycleScheduler::new(
        run_config(&[]),
        Arc::new(TokenFile::new(&path)),
        connector.clone(),
    );

    let first = scheduler.run_pass().await;
    assert_eq!(first.accounts_loaded, 2);

    std::fs::write(&path, "alpha\nbeta\ngamma\n").unwrap();
    let second = scheduler.run_pass().await;
    assert_eq!(second.accounts_loaded, 3);
    assert_eq!(connector.journal().connects.len(), 5);

    std::fs::remove_file(path).unwrap();
}
