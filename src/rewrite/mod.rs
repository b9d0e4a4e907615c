// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Locator and document rewriting
//!
//! Everything that decides where a request should really go lives here;
//! the network layer only applies the result.

mod html;

use url::Url;

use crate::http::is_root_relative;

pub use html::rewrite_html_urls;

/// Path segment that absolute locators are tunnelled through
pub const PROXY_SEGMENT: &str = "proxy";

/// Location of the page whose requests are being intercepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    scheme: String,
    host: String,
    path: String,
}

impl PageLocation {
    /// Build from explicit parts
    ///
    /// `host` may include a port (`localhost:8888`).
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            path: path.into(),
        }
    }

    /// Build from the page URL
    pub fn from_url(url: &Url) -> Self {
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };
        Self::new(url.scheme(), host, url.path())
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl TryFrom<&str> for PageLocation {
    type Error = url::ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(Self::from_url(&Url::parse(value)?))
    }
}

/// Compute the locator an intercepted request is sent to
///
/// Root-relative locators are nested under the current page path:
/// `/api/data` on `example.com/app` becomes `example.com/app//api/data`.
/// Anything else is tunnelled through the proxy segment:
/// `https://other.com/img.png` becomes
/// `example.com/proxy/https://other.com/img.png`.
pub fn rewrite_locator(locator: &str, page: &PageLocation) -> String {
    if is_root_relative(locator) {
        format!(
            "{}/{}/{}",
            page.host(),
            page.path().trim_start_matches('/'),
            locator
        )
    } else {
        format!("{}/{}/{}", page.host(), PROXY_SEGMENT, locator)
    }
}
