// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! URL rewriting inside proxied HTML documents

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use url::Url;

lazy_static! {
    static ref URL_ATTRIBUTE: Regex =
        Regex::new(r#"(?i)(\s(?:href|src|action|poster)\s*=\s*)(?:"([^"]*)"|'([^']*)')"#)
            .expect("valid attribute regex");
}

/// Schemes that never point at a fetchable resource
const SKIPPED_SCHEMES: &[&str] = &["data:", "javascript:", "mailto:", "tel:", "about:", "blob:"];

/// Rewrite link-bearing attributes so they load through the proxy
///
/// Every `href`, `src`, `action` and `poster` value is resolved against
/// `page_url` and replaced by `<proxy_prefix>/<absolute url>`. The quote
/// style of each attribute is kept. If `page_url` is not a valid URL the
/// document is returned untouched.
pub fn rewrite_html_urls(html: String, page_url: &str, proxy_prefix: &str) -> String {
    let Ok(base) = Url::parse(page_url) else {
        tracing::debug!(page_url, "not rewriting document with invalid base url");
        return html;
    };
    let prefix = proxy_prefix.trim_end_matches('/');

    let rewritten = match URL_ATTRIBUTE.replace_all(&html, |caps: &Captures| {
        let (value, quote) = match (caps.get(2), caps.get(3)) {
            (Some(v), _) => (v.as_str(), '"'),
            (None, Some(v)) => (v.as_str(), '\''),
            (None, None) => return caps[0].to_string(),
        };

        match proxied_value(value, &base, prefix) {
            Some(rewritten) => format!("{}{}{}{}", &caps[1], quote, rewritten, quote),
            None => caps[0].to_string(),
        }
    }) {
        Cow::Owned(rewritten) => Some(rewritten),
        Cow::Borrowed(_) => None,
    };

    rewritten.unwrap_or(html)
}

fn proxied_value(value: &str, base: &Url, prefix: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.starts_with('#') {
        return None;
    }

    let lower = value.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        return None;
    }
    if !prefix.is_empty() && value.starts_with(&format!("{}/", prefix)) {
        return None;
    }

    let absolute = base.join(&value.replace("&amp;", "&")).ok()?;
    Some(format!("{}/{}", prefix, absolute).replace('&', "&amp;"))
}
