//! Resilient HTTP layer: proxy agents, the reqwest transport, retry policy
//! and the request executor every API call goes through.

pub mod client;
pub mod executor;
pub mod proxy;
pub mod retry;

pub use client::{build_client, ReqwestTransport};
pub use executor::{HttpResponse, RequestExecutor, RequestSpec, Transport};
pub use proxy::{create_agent, ProxyAgent, ProxyKind, ProxyScheme};
pub use retry::{RetryDecision, RetryPolicy};
