// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookies sent by the browser on an incoming request

use reqwest::header::HeaderMap;

use super::headers::COOKIE;

/// A single `name=value` pair from a `Cookie` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

/// Cookies from every `Cookie` header of a request
#[derive(Debug, Clone, Default)]
pub struct RequestCookies {
    cookies: Vec<Cookie>,
}

impl RequestCookies {
    /// Parse all `Cookie` headers
    ///
    /// Pairs without `=` and headers that are not valid strings are skipped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookies = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(Cookie {
                    name: name.to_string(),
                    value: value.trim().trim_matches('"').to_string(),
                })
            })
            .collect();

        Self { cookies }
    }

    /// Value of the first cookie with this name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}
