//! Account and proxy sources.
//!
//! Both files are plain text, one entry per line. Blank lines are skipped
//! and entries are trimmed. A missing or empty source is a configuration
//! problem: it is logged and treated as an empty list, never fatal.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::types::{ClientError, Credential};

/// Supplies the credentials for one pass. Called again every pass.
pub trait CredentialSource: Send + Sync {
    fn load(&self) -> Vec<Credential>;
}

/// Tokens read from a file on every pass.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for TokenFile {
    fn load(&self) -> Vec<Credential> {
        load_tokens(&self.path)
    }
}

impl CredentialSource for Vec<Credential> {
    fn load(&self) -> Vec<Credential> {
        self.clone()
    }
}

/// Non-empty, trimmed lines of `path`.
pub fn read_entries(path: &Path) -> Result<Vec<String>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

pub fn load_tokens(path: &Path) -> Vec<Credential> {
    let tokens = read_entries(path).and_then(|tokens| {
        if tokens.is_empty() {
            Err(ClientError::Configuration(format!("No tokens found in {}", path.display())).into())
        } else {
            Ok(tokens)
        }
    });

    match tokens {
        Ok(tokens) => {
            info!("Loaded {} {}", tokens.len(), plural(tokens.len(), "account", "accounts"));
            tokens.into_iter().map(Credential::new).collect()
        }
        Err(e) => {
            error!(path = %path.display(), "Failed to load tokens: {e:#}");
            Vec::new()
        }
    }
}

pub fn load_proxies(path: &Path) -> Vec<String> {
    match read_entries(path) {
        Ok(proxies) if proxies.is_empty() => {
            warn!(path = %path.display(), "No proxies found. Proceeding without proxy.");
            proxies
        }
        Ok(proxies) => {
            info!("Loaded {} {}", proxies.len(), plural(proxies.len(), "proxy", "proxies"));
            proxies
        }
        Err(e) => {
            warn!(path = %path.display(), "Proxy list not available: {e:#}");
            Vec::new()
        }
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}
