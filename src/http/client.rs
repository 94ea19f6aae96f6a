//! reqwest-backed transport.
//!
//! One client is built per account session so the account's proxy stays
//! fixed for every call it makes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::executor::{HttpResponse, RequestSpec, Transport};
use super::proxy::ProxyAgent;
use crate::types::ClientError;

/// Build an HTTP client, optionally routed through `proxy`.
pub fn build_client(proxy: Option<&ProxyAgent>, timeout: Duration) -> Result<Client> {
    let mut builder = Client::builder().timeout(timeout);

    if let Some(agent) = proxy {
        let proxy = agent
            .to_reqwest()
            .with_context(|| format!("Invalid proxy {agent}"))?;
        builder = builder.proxy(proxy);
        debug!(proxy = %agent, kind = ?agent.kind(), "HTTP client using proxy");
    }

    builder.build().context("Failed to build HTTP client")
}

/// [`Transport`] over a real reqwest client.
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new(proxy: Option<&ProxyAgent>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_client(proxy, timeout)?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, spec: &RequestSpec) -> Result<HttpResponse, ClientError> {
        let mut req = self
            .http
            .request(spec.method.clone(), &spec.url)
            .headers(spec.headers.clone())
            .timeout(spec.timeout);

        if let Some(ref payload) = spec.payload {
            req = req.json(payload);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ClientError::Upstream {
                status: status.as_u16(),
                body: if body.is_empty() { "\"No body\"".to_string() } else { body },
            });
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}
