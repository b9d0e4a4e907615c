// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation
//!
//! Plays the part of the platform's native fetch: it takes a request
//! descriptor, applies its transport flags and sends it.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use url::Url;

use super::request::{
    CacheMode, CredentialsMode, HeaderList, InterceptedRequest, RedirectMode, ReferrerPolicy,
    TransportFlags,
};
use super::response::{is_redirect_status, Response};
use super::headers as names;
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};
use crate::network::Fetcher;
use crate::security::IntegrityMetadata;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Client-wide timeout (none by default)
    pub timeout: Option<Duration>,
    /// Maximum redirects to follow in `follow` mode
    pub max_redirects: usize,
    /// Scheme used to qualify locators that carry none
    pub default_scheme: String,
    /// Upstream proxy URL
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            max_redirects: 10,
            default_scheme: "http".to_string(),
            proxy: None,
        }
    }
}

impl HttpClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the scheme for scheme-less locators
    pub fn default_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.default_scheme = scheme.into();
        self
    }

    /// Set upstream proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

/// HTTP client
///
/// Holds one client that follows redirects and one that does not, since
/// reqwest fixes the redirect policy per client.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    no_redirect: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Self::builder(&config)?
            .redirect(Policy::limited(config.max_redirects))
            .build()?;
        let no_redirect = Self::builder(&config)?.redirect(Policy::none()).build()?;

        Ok(Self {
            client,
            no_redirect,
            config,
        })
    }

    fn builder(config: &HttpClientConfig) -> Result<reqwest::ClientBuilder> {
        let mut builder = Client::builder().user_agent(&config.user_agent);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        Ok(builder)
    }

    /// Execute a request descriptor
    pub async fn execute(&self, request: InterceptedRequest) -> Result<Response> {
        let start = Instant::now();

        let InterceptedRequest {
            url: locator,
            method,
            mut headers,
            body,
            flags,
        } = request;

        let url = resolve_locator(&locator, &self.config.default_scheme)?;
        apply_transport_headers(&mut headers, &flags, &url);

        let client = match flags.redirect {
            RedirectMode::Follow => &self.client,
            RedirectMode::Error | RedirectMode::Manual => &self.no_redirect,
        };

        let mut builder = client
            .request(method.clone(), url.clone())
            .headers(headers.to_header_map());

        if let Some(body) = body {
            builder = builder.body(body);
        }

        tracing::debug!(method = %method, url = %url, "sending request");

        let response = builder.send().await?;
        let status = response.status();
        let final_url = response.url().clone();

        if flags.redirect == RedirectMode::Error && is_redirect_status(status) {
            return Err(Error::RedirectBlocked {
                url: final_url.to_string(),
            });
        }

        let redirected = final_url != url;
        let response_headers = response.headers().clone();
        let body = response.bytes().await?;

        if !flags.integrity.is_empty() && !IntegrityMetadata::parse(&flags.integrity).matches(&body) {
            return Err(Error::Integrity {
                url: final_url.to_string(),
                expected: flags.integrity,
            });
        }

        Ok(Response::new(
            status,
            response_headers,
            body,
            final_url,
            redirected,
            start.elapsed().as_millis() as u64,
        ))
    }

    /// Start a raw request that follows redirects, for streaming use
    pub fn request(&self, method: Method, url: impl reqwest::IntoUrl) -> reqwest::RequestBuilder {
        self.client.request(method, url)
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, request: InterceptedRequest) -> Result<Response> {
        self.execute(request).await
    }
}

/// Resolve a locator to an absolute URL
///
/// A locator with a host is used as is. Anything else is qualified with
/// `scheme`, so `example.com/proxy/x` becomes `http://example.com/proxy/x`.
pub fn resolve_locator(locator: &str, scheme: &str) -> Result<Url> {
    if let Ok(url) = Url::parse(locator) {
        if url.has_host() {
            return Ok(url);
        }
    }
    Ok(Url::parse(&format!("{}://{}", scheme, locator))?)
}

/// Headers a fetch implementation derives from the transport flags
fn apply_transport_headers(headers: &mut HeaderList, flags: &TransportFlags, target: &Url) {
    match flags.cache {
        CacheMode::NoStore | CacheMode::Reload => {
            append_if_absent(headers, names::PRAGMA, "no-cache");
            append_if_absent(headers, names::CACHE_CONTROL, "no-cache");
        }
        CacheMode::NoCache => {
            append_if_absent(headers, names::CACHE_CONTROL, "max-age=0");
        }
        _ => {}
    }

    let referrer = Url::parse(&flags.referrer)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .and_then(|u| referrer_for(u, target, flags.referrer_policy));
    if let Some(referrer) = referrer {
        append_if_absent(headers, names::REFERER, &referrer);
    }

    if flags.credentials == CredentialsMode::Omit {
        headers.remove(names::COOKIE);
        headers.remove(names::AUTHORIZATION);
    }
}

/// `referer` value for `referrer` under `policy`, or none
///
/// An unset policy behaves as `strict-origin-when-cross-origin`.
fn referrer_for(mut referrer: Url, target: &Url, policy: ReferrerPolicy) -> Option<String> {
    referrer.set_fragment(None);
    let _ = referrer.set_username("");
    let _ = referrer.set_password(None);

    let origin = format!("{}/", referrer.origin().ascii_serialization());
    let same_origin = referrer.origin() == target.origin();
    let downgrade = referrer.scheme() == "https" && target.scheme() != "https";

    match policy {
        ReferrerPolicy::NoReferrer => None,
        ReferrerPolicy::UnsafeUrl => Some(referrer.into()),
        ReferrerPolicy::NoReferrerWhenDowngrade => (!downgrade).then(|| referrer.into()),
        ReferrerPolicy::SameOrigin => same_origin.then(|| referrer.into()),
        ReferrerPolicy::Origin => Some(origin),
        ReferrerPolicy::StrictOrigin => (!downgrade).then_some(origin),
        ReferrerPolicy::OriginWhenCrossOrigin if same_origin => Some(referrer.into()),
        ReferrerPolicy::OriginWhenCrossOrigin => Some(origin),
        ReferrerPolicy::Empty | ReferrerPolicy::StrictOriginWhenCrossOrigin => {
            if same_origin {
                Some(referrer.into())
            } else {
                (!downgrade).then_some(origin)
            }
        }
    }
}

fn append_if_absent(headers: &mut HeaderList, name: &'static str, value: &str) {
    if headers.contains(name) {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.append(reqwest::header::HeaderName::from_static(name), value);
    }
}
