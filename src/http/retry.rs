//! Retry policy.
//!
//! The policy is immutable; all per-call state is the attempt index the
//! executor passes into [`RetryPolicy::decide`].

use serde::Deserialize;
use std::time::Duration;

use crate::types::ClientError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 2000;
pub const DEFAULT_MULTIPLIER: f64 = 1.5;

/// What to do after an attempt.
#[derive(Debug)]
pub enum RetryDecision<T> {
    Success(T),
    Retry(Duration),
    GiveUp(ClientError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub multiplier: f64,
    /// Whether 4xx responses are retried like 5xx ones.
    pub retry_client_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            multiplier: DEFAULT_MULTIPLIER,
            retry_client_errors: true,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts,
            initial_backoff_ms: initial_backoff.as_millis() as u64,
            multiplier,
            ..Self::default()
        }
    }

    pub fn with_retry_client_errors(mut self, retry: bool) -> Self {
        self.retry_client_errors = retry;
        self
    }

    /// Attempts actually made; zero is treated as one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before the retry that follows failed attempt `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ms = self.initial_backoff_ms as f64 * self.multiplier.powi(attempt as i32);
        Duration::from_millis(ms.round() as u64)
    }

    /// Classify the outcome of attempt `attempt` (0-based).
    pub fn decide<T>(&self, attempt: u32, outcome: Result<T, ClientError>) -> RetryDecision<T> {
        let err = match outcome {
            Ok(resp) => return RetryDecision::Success(resp),
            Err(e) => e,
        };

        if !self.is_retryable(&err) || attempt + 1 >= self.attempts() {
            return RetryDecision::GiveUp(err);
        }

        RetryDecision::Retry(self.backoff(attempt))
    }

    fn is_retryable(&self, err: &ClientError) -> bool {
        match err {
            ClientError::Transport(_) => true,
            ClientError::Upstream { status, .. } => *status >= 500 || self.retry_client_errors,
            ClientError::UnsupportedMethod(_)
            | ClientError::Decode(_)
            | ClientError::Configuration(_) => false,
        }
    }
}
