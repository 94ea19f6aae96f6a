//! Request executor.
//!
//! Issues one logical request through a [`Transport`], retrying failed
//! attempts with exponential backoff according to a [`RetryPolicy`].

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::retry::{RetryDecision, RetryPolicy};
use crate::types::ClientError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// One HTTP call, fully described.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub payload: Option<Value>,
    pub headers: HeaderMap,
    pub timeout: Duration,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            payload: None,
            headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A successful (2xx) response with its body read.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Sends a single attempt. Non-2xx statuses come back as
/// [`ClientError::Upstream`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, spec: &RequestSpec) -> Result<HttpResponse, ClientError>;
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    context: String,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            context: String::new(),
        }
    }

    /// Label attached to every log line (e.g. `Account 2/5`).
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub async fn execute(&self, spec: &RequestSpec) -> Result<HttpResponse, ClientError> {
        self.execute_with(spec, &self.policy).await
    }

    /// Execute with a one-off policy. Returns the first successful response
    /// or the error of the final attempt.
    pub async fn execute_with(
        &self,
        spec: &RequestSpec,
        policy: &RetryPolicy,
    ) -> Result<HttpResponse, ClientError> {
        if !is_supported(&spec.method) {
            return Err(ClientError::UnsupportedMethod(spec.method.clone()));
        }

        let attempts = policy.attempts();
        let mut attempt = 0;

        loop {
            debug!(
                account = %self.context,
                method = %spec.method,
                url = %spec.url,
                attempt = attempt + 1,
                "Sending request"
            );

            let outcome = self.transport.send(spec).await;
            if let Err(ref e) = outcome {
                error!(account = %self.context, status = ?e.status(), "Request failed: {e}");
            }

            match policy.decide(attempt, outcome) {
                RetryDecision::Success(resp) => return Ok(resp),
                RetryDecision::GiveUp(e) => return Err(e),
                RetryDecision::Retry(delay) => {
                    warn!(
                        account = %self.context,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying {} {} ({}/{})",
                        spec.method,
                        spec.url,
                        attempt + 1,
                        attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn is_supported(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::POST | Method::PATCH | Method::PUT)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
