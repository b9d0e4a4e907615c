// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for trev-proxy
//!
//! The interceptor never wraps or translates egress failures; whatever the
//! network layer returns is what the caller sees. These variants describe
//! the failures the network layer and the server setup can produce.

use thiserror::Error;

/// Result type alias for trev-proxy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for trev-proxy
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Network call failed for a reason the HTTP layer does not report itself
    #[error("Network error: {0}")]
    Network(String),

    /// Redirect received while the request's redirect mode is `error`
    #[error("Redirect blocked for {url}")]
    RedirectBlocked { url: String },

    /// Response body does not match the request's integrity metadata
    #[error("Integrity check failed for {url}: expected {expected}")]
    Integrity { url: String, expected: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Error::Network(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a failure of the network call itself
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Error::Network(_)
                | Error::Http(_)
                | Error::RedirectBlocked { .. }
                | Error::Integrity { .. }
        )
    }

    /// Check if the underlying HTTP layer failed to connect
    pub fn is_connect(&self) -> bool {
        matches!(self, Error::Http(e) if e.is_connect())
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Http(e) => e.url().map(|u| u.as_str()),
            Error::RedirectBlocked { url } => Some(url),
            Error::Integrity { url, .. } => Some(url),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Other(format!("{}: {}", msg, err))
        })
    }
}
