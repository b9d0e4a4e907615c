// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # trev-proxy - Request Interceptor and Forwarding Proxy
//!
//! Every request a page issues is rewritten so it travels through a proxy
//! path on the page's own host, then sent on with its method, headers,
//! body and transport flags untouched.
//!
//! ## Features
//!
//! - Locator rewriting: root-relative paths stay under the page path,
//!   everything else goes to `/proxy/<locator>`
//! - Fetch events: listeners may answer a request before the network does
//! - Transport flags: cache, credentials, redirect, referrer, integrity
//!   and keepalive carried through to the HTTP client
//! - Proxy server: `/proxy`, `/web` and `/dl` routes that forward to the
//!   embedded URL
//! - HTML rewriting: point document links back through the proxy
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trev_proxy::{FetchEventSource, HttpClient, InterceptedRequest, Interceptor, PageLocation};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(HttpClient::new()?);
//!     let page = PageLocation::try_from("https://example.com/app")?;
//!
//!     let source = FetchEventSource::new(client.clone());
//!     source.add_listener(Arc::new(Interceptor::new(page, client)));
//!
//!     // Goes out as example.com/proxy/https://cdn.site.org/lib.js
//!     let response = source
//!         .dispatch(InterceptedRequest::get("https://cdn.site.org/lib.js"))
//!         .await?;
//!     println!("{} {}", response.status, response.url);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod network;
pub mod rewrite;
pub mod security;
pub mod server;

// Re-exports for convenience

// Configuration
pub use config::ProxyConfig;

// Errors
pub use error::{Error, ErrorContext, Result};

// HTTP
pub use http::{HttpClient, HttpClientConfig, InterceptedRequest, Response, TransportFlags};
pub use http::{CacheMode, CredentialsMode, RedirectMode, ReferrerPolicy, RequestMode};

// Network
pub use network::{FetchAction, FetchEvent, FetchEventSource, FetchHandler, Fetcher, Interceptor};

// Rewriting
pub use rewrite::{rewrite_html_urls, rewrite_locator, PageLocation};

// Security
pub use security::IntegrityMetadata;

/// trev-proxy version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
