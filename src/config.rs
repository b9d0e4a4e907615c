// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Proxy server configuration

use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::http::headers;

/// Default listening port
pub const DEFAULT_PORT: u16 = 8888;

/// Dotenv file read at start-up, relative to the working directory
pub const DOTENV_FILE: &str = ".env";

/// Cookie set by the page once its interceptor is installed
pub const SERVICE_WORKER_COOKIE: &str = "trev-proxy-service-worker-installed";

/// Proxy server configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Port to listen on (all interfaces)
    pub port: u16,
    /// Per-request timeout for the whole handler
    pub request_timeout: Duration,
    /// Largest request body accepted when no content-length is sent
    pub body_limit: usize,
    /// Request headers passed on to the upstream
    pub forwarded_headers: Vec<String>,
    /// Cookie that must be present before `/web` and `/proxy` serve content
    pub service_worker_cookie: String,
    /// Rewrite links in proxied HTML documents
    pub rewrite_html: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(10),
            body_limit: 100_000_000,
            forwarded_headers: vec![
                headers::RANGE.to_string(),
                headers::USER_AGENT.to_string(),
                headers::AUTHORIZATION.to_string(),
                headers::COOKIE.to_string(),
            ],
            service_worker_cookie: SERVICE_WORKER_COOKIE.to_string(),
            rewrite_html: false,
        }
    }
}

impl ProxyConfig {
    /// Create a new config
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from `PROXY_PORT`, `PROXY_TIMEOUT_SECS`,
    /// `PROXY_BODY_LIMIT` and `PROXY_REWRITE_HTML`
    ///
    /// `PROXY_FORWARD_HEADERS` is a comma-separated list of extra request
    /// headers to pass upstream.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = parse_var::<u16, _>(&lookup, "PROXY_PORT")? {
            config.port = port;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "PROXY_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = parse_var::<usize, _>(&lookup, "PROXY_BODY_LIMIT")? {
            config.body_limit = limit;
        }
        if let Some(rewrite) = parse_var::<bool, _>(&lookup, "PROXY_REWRITE_HTML")? {
            config.rewrite_html = rewrite;
        }
        if let Some(extra) = lookup("PROXY_FORWARD_HEADERS") {
            for name in extra.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                config = config.forward_header(name.to_ascii_lowercase());
            }
        }

        Ok(config)
    }

    /// Set port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set body limit
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Add a forwarded header
    pub fn forward_header(mut self, name: impl Into<String>) -> Self {
        self.forwarded_headers.push(name.into());
        self
    }

    /// Enable/disable HTML link rewriting
    pub fn rewrite_html(mut self, enabled: bool) -> Self {
        self.rewrite_html = enabled;
        self
    }
}

/// Load a dotenv file into the process environment
///
/// Variables that are already set keep their value.
pub fn load_dotenv(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    dotenvy::from_path(path)
        .map_err(|e| Error::config(format!("could not load {}: {}", path.display(), e)))
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::config(format!("{} must be a valid value, got '{}': {}", key, raw, e))),
    }
}
