//! Proxy classification.
//!
//! A proxy URI is resolved once per account into a [`ProxyAgent`]; the
//! HTTP client for that account is then built around it.

use reqwest::Proxy;
use std::fmt;
use tracing::warn;

/// Address family of a proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyKind {
    /// HTTP(S) CONNECT tunneling.
    Http,
    /// SOCKS4 / SOCKS5.
    Socks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyScheme {
    Http,
    Https,
    Socks4,
    Socks5,
}

impl ProxyScheme {
    const PREFIXES: [(&'static str, ProxyScheme); 4] = [
        ("http://", ProxyScheme::Http),
        ("https://", ProxyScheme::Https),
        ("socks4://", ProxyScheme::Socks4),
        ("socks5://", ProxyScheme::Socks5),
    ];

    fn detect(uri: &str) -> Option<Self> {
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| uri.starts_with(prefix))
            .map(|(_, scheme)| *scheme)
    }

    pub fn kind(&self) -> ProxyKind {
        match self {
            Self::Http | Self::Https => ProxyKind::Http,
            Self::Socks4 | Self::Socks5 => ProxyKind::Socks,
        }
    }
}

/// A parsed, ready-to-install proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAgent {
    scheme: ProxyScheme,
    uri: String,
}

impl ProxyAgent {
    pub fn scheme(&self) -> ProxyScheme {
        self.scheme
    }

    pub fn kind(&self) -> ProxyKind {
        self.scheme.kind()
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Convert into a reqwest proxy applied to every request scheme.
    pub fn to_reqwest(&self) -> reqwest::Result<Proxy> {
        Proxy::all(&self.uri)
    }
}

impl fmt::Display for ProxyAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Build an agent for `uri`, or warn and return `None` for an unknown scheme.
pub fn create_agent(uri: &str) -> Option<ProxyAgent> {
    let uri = uri.trim();
    match ProxyScheme::detect(uri) {
        Some(scheme) => Some(ProxyAgent {
            scheme,
            uri: uri.to_string(),
        }),
        None => {
            warn!(proxy = %uri, "Unsupported proxy: {uri}");
            None
        }
    }
}
