// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer for trev-proxy
//!
//! Request descriptors with their transport flags, the client that sends
//! them, and the header helpers shared with the proxy server.

mod client;
mod cookie;
mod request;
mod response;

use reqwest::header::HeaderMap;

pub use client::{resolve_locator, HttpClient, HttpClientConfig};
pub use cookie::{Cookie, RequestCookies};
pub use request::{
    is_root_relative, CacheMode, CredentialsMode, HeaderList, InterceptedRequest, RedirectMode,
    ReferrerPolicy, RequestMode, TransportFlags, CLIENT_REFERRER,
};
pub use response::{is_html_content_type, is_redirect_status, Response};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("trev-proxy/", env!("CARGO_PKG_VERSION"));

/// Common HTTP headers
pub mod headers {
    pub const AUTHORIZATION: &str = "authorization";
    pub const CACHE_CONTROL: &str = "cache-control";
    pub const CONTENT_LENGTH: &str = "content-length";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const PRAGMA: &str = "pragma";
    pub const RANGE: &str = "range";
    pub const REFERER: &str = "referer";
    pub const SERVICE_WORKER_ALLOWED: &str = "service-worker-allowed";
    pub const USER_AGENT: &str = "user-agent";
}

/// Keep only the headers named in `wanted` (case-insensitive)
pub fn filter_headers<S: AsRef<str>>(headers: HeaderMap, wanted: &[S]) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    let mut current = None;
    // `into_iter` yields `None` for repeated values of the previous name
    for (name, value) in headers {
        if let Some(name) = name {
            current = wanted
                .iter()
                .any(|w| w.as_ref().eq_ignore_ascii_case(name.as_str()))
                .then_some(name);
        }
        if let Some(ref name) = current {
            filtered.append(name.clone(), value);
        }
    }
    filtered
}
