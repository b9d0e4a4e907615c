// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Intercepted request descriptor and its transport flags

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Description of an outgoing network call, before it is sent
///
/// The locator is kept as the caller wrote it: it may be root-relative
/// (`/api/data`), absolute, protocol-relative or missing a scheme. It is
/// only resolved to a URL by the network layer.
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    /// Target locator
    pub url: String,
    /// Request method
    pub method: Method,
    /// Request headers, in the order they were set
    pub headers: HeaderList,
    /// Request body
    pub body: Option<Bytes>,
    /// Cache, credentials, redirect, referrer, integrity, keepalive and mode
    pub flags: TransportFlags,
}

impl InterceptedRequest {
    /// Create a new request with arbitrary method
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HeaderList::new(),
            body: None,
            flags: TransportFlags::default(),
        }
    }

    /// Create a new GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a new POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Append a header, keeping any existing values for the same name
    ///
    /// A name or value that is not valid in HTTP is skipped.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let (name, value) = (name.as_ref(), value.as_ref());
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => self.headers.append(name, value),
            _ => tracing::debug!(header = %name, url = %self.url, "dropping invalid header"),
        }
        self
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Replace all transport flags
    pub fn flags(mut self, flags: TransportFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set cache mode
    pub fn cache(mut self, mode: CacheMode) -> Self {
        self.flags.cache = mode;
        self
    }

    /// Set credentials mode
    pub fn credentials(mut self, mode: CredentialsMode) -> Self {
        self.flags.credentials = mode;
        self
    }

    /// Set redirect mode
    pub fn redirect(mut self, mode: RedirectMode) -> Self {
        self.flags.redirect = mode;
        self
    }

    /// Set referrer
    pub fn referrer(mut self, referrer: impl Into<String>) -> Self {
        self.flags.referrer = referrer.into();
        self
    }

    /// Set referrer policy
    pub fn referrer_policy(mut self, policy: ReferrerPolicy) -> Self {
        self.flags.referrer_policy = policy;
        self
    }

    /// Set integrity metadata
    pub fn integrity(mut self, integrity: impl Into<String>) -> Self {
        self.flags.integrity = integrity.into();
        self
    }

    /// Set keepalive
    pub fn keepalive(mut self, keepalive: bool) -> Self {
        self.flags.keepalive = keepalive;
        self
    }

    /// Set request mode
    pub fn mode(mut self, mode: RequestMode) -> Self {
        self.flags.mode = mode;
        self
    }

    /// Same request aimed at a different locator
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Locator is a path on the current host (`/x`, but not `//x`)
    pub fn is_root_relative(&self) -> bool {
        is_root_relative(&self.url)
    }
}

/// Check whether a locator is root-relative
pub fn is_root_relative(locator: &str) -> bool {
    locator.starts_with('/') && !locator.starts_with("//")
}

/// Multi-valued, order-preserving header list
///
/// `HeaderMap` groups values by name; this keeps the exact sequence the
/// caller produced so a forwarded request can be compared entry by entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn append(&mut self, name: HeaderName, value: HeaderValue) {
        self.entries.push((name, value));
    }

    /// First value for a name
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_str().eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// All values for a name, in order
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a HeaderValue> + 'a {
        self.entries
            .iter()
            .filter(move |(n, _)| n.as_str().eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove every entry with this name
    pub fn remove(&mut self, name: &str) {
        self.entries
            .retain(|(n, _)| !n.as_str().eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert to a `HeaderMap`, appending repeated names
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            map.append(name.clone(), value.clone());
        }
        map
    }
}

/// Non-header, non-body request attributes
///
/// Field names and values follow `RequestInit`, so a descriptor captured
/// as JSON in a browser deserializes directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransportFlags {
    pub cache: CacheMode,
    pub credentials: CredentialsMode,
    pub redirect: RedirectMode,
    pub referrer: String,
    pub referrer_policy: ReferrerPolicy,
    pub integrity: String,
    pub keepalive: bool,
    pub mode: RequestMode,
}

impl Default for TransportFlags {
    fn default() -> Self {
        Self {
            cache: CacheMode::default(),
            credentials: CredentialsMode::default(),
            redirect: RedirectMode::default(),
            referrer: CLIENT_REFERRER.to_string(),
            referrer_policy: ReferrerPolicy::default(),
            integrity: String::new(),
            keepalive: false,
            mode: RequestMode::default(),
        }
    }
}

impl TransportFlags {
    /// Parse flags from a `RequestInit`-shaped JSON object
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Referrer value meaning "whatever the client would send"
pub const CLIENT_REFERRER: &str = "about:client";

macro_rules! fetch_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            /// Value as written in `RequestInit`
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(Error::other(format!(
                        concat!("unknown ", stringify!($name), " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

fetch_enum! {
    /// Cache mode
    CacheMode {
        #[default]
        Default => "default",
        NoStore => "no-store",
        Reload => "reload",
        NoCache => "no-cache",
        ForceCache => "force-cache",
        OnlyIfCached => "only-if-cached",
    }
}

fetch_enum! {
    /// Credentials mode
    CredentialsMode {
        /// Never send credentials
        Omit => "omit",
        /// Send credentials only to same-origin requests
        #[default]
        SameOrigin => "same-origin",
        /// Always send credentials
        Include => "include",
    }
}

fetch_enum! {
    /// Redirect mode
    RedirectMode {
        #[default]
        Follow => "follow",
        /// A redirect is a network error
        Error => "error",
        /// Hand the 3xx response back as is
        Manual => "manual",
    }
}

fetch_enum! {
    /// Referrer policy
    ReferrerPolicy {
        /// Unset; the client's policy applies
        #[default]
        Empty => "",
        NoReferrer => "no-referrer",
        NoReferrerWhenDowngrade => "no-referrer-when-downgrade",
        SameOrigin => "same-origin",
        Origin => "origin",
        StrictOrigin => "strict-origin",
        OriginWhenCrossOrigin => "origin-when-cross-origin",
        StrictOriginWhenCrossOrigin => "strict-origin-when-cross-origin",
        UnsafeUrl => "unsafe-url",
    }
}

fetch_enum! {
    /// Request mode
    RequestMode {
        Navigate => "navigate",
        SameOrigin => "same-origin",
        NoCors => "no-cors",
        #[default]
        Cors => "cors",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_creation() {
        let req = InterceptedRequest::get("/api/data");
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url, "/api/data");
        assert!(req.is_root_relative());
        assert_eq!(req.flags, TransportFlags::default());
    }

    #[test]
    fn test_root_relative() {
        assert!(is_root_relative("/img.png"));
        assert!(!is_root_relative("//cdn.example.com/img.png"));
        assert!(!is_root_relative("https://other.com/img.png"));
        assert!(!is_root_relative("img.png"));
    }

    #[test]
    fn test_headers_keep_order_and_repeats() {
        let req = InterceptedRequest::get("https://example.com")
            .header("x-b", "2")
            .header("accept", "text/html")
            .header("x-b", "3");

        let entries: Vec<_> = req
            .headers
            .iter()
            .map(|(n, v)| (n.as_str(), v.to_str().unwrap()))
            .collect();
        assert_eq!(entries, vec![("x-b", "2"), ("accept", "text/html"), ("x-b", "3")]);

        let map = req.headers.to_header_map();
        let values: Vec<_> = map.get_all("x-b").iter().map(|v| v.to_str().unwrap()).collect();
        assert_eq!(values, vec!["2", "3"]);
    }

    #[test]
    fn test_invalid_header_is_skipped() {
        let req = InterceptedRequest::get("/")
            .header("bad name", "1")
            .header("x-ok", "line\nbreak")
            .header("x-ok", "2");

        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.headers.get("x-ok").unwrap(), "2");
    }

    #[test]
    fn test_header_remove() {
        let mut headers = InterceptedRequest::get("/")
            .header("cookie", "a=1")
            .header("Accept", "*/*")
            .headers;
        headers.remove("Cookie");
        assert!(!headers.contains("cookie"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_with_url_keeps_everything_else() {
        let req = InterceptedRequest::post("/submit")
            .header("content-type", "text/plain")
            .body("hi")
            .cache(CacheMode::NoStore)
            .keepalive(true);
        let moved = req.clone().with_url("example.com/proxy/x");

        assert_eq!(moved.url, "example.com/proxy/x");
        assert_eq!(moved.method, req.method);
        assert_eq!(moved.headers, req.headers);
        assert_eq!(moved.body, req.body);
        assert_eq!(moved.flags, req.flags);
    }

    #[test]
    fn test_flags_from_request_init_json() {
        let flags = TransportFlags::from_json(
            r#"{"cache":"no-store","credentials":"include","redirect":"manual",
                "referrerPolicy":"strict-origin-when-cross-origin","keepalive":true,
                "mode":"no-cors"}"#,
        )
        .unwrap();

        assert_eq!(flags.cache, CacheMode::NoStore);
        assert_eq!(flags.credentials, CredentialsMode::Include);
        assert_eq!(flags.redirect, RedirectMode::Manual);
        assert_eq!(flags.referrer, CLIENT_REFERRER);
        assert_eq!(flags.referrer_policy, ReferrerPolicy::StrictOriginWhenCrossOrigin);
        assert!(flags.keepalive);
        assert_eq!(flags.mode, RequestMode::NoCors);
    }

    #[test]
    fn test_enum_strings() {
        assert_eq!("only-if-cached".parse::<CacheMode>().unwrap(), CacheMode::OnlyIfCached);
        assert_eq!(ReferrerPolicy::Empty.as_str(), "");
        assert_eq!(RedirectMode::Error.to_string(), "error");
        assert!("sometimes".parse::<RequestMode>().is_err());
    }
}
