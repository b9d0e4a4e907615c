// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! `/web/*` and `/proxy/*`: forward any request to the embedded URL

use axum::body::{self, Body};
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

use super::forward::{handle_forward_request, relay, response_headers, target_url};
use super::AppState;
use crate::http::{filter_headers, headers, is_html_content_type, RequestCookies};
use crate::rewrite::rewrite_html_urls;

pub async fn proxy(
    State(state): State<AppState>,
    Path(url): Path<String>,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();

    if !RequestCookies::from_headers(&parts.headers).contains(&state.config.service_worker_cookie) {
        return Redirect::temporary(&format!("/?back={url}")).into_response();
    }

    let body_limit = parts
        .headers
        .get(headers::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(state.config.body_limit);

    let body = match body::to_bytes(body, body_limit).await {
        Ok(body) => body,
        Err(err) => {
            tracing::warn!("failed to convert request body to bytes: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    };

    let target = target_url(url, &parts.uri);
    let prefix = route_prefix(parts.uri.path());

    let request = state
        .client
        .request(parts.method, &target)
        .headers(filter_headers(parts.headers, &state.config.forwarded_headers))
        .body(body);

    let resp = match handle_forward_request(request).await {
        Ok(resp) => resp,
        Err(err) => return err,
    };

    let mut extra = HeaderMap::new();
    extra.insert(headers::SERVICE_WORKER_ALLOWED, HeaderValue::from_static("/"));

    let is_html = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(is_html_content_type)
        .unwrap_or(false);

    if state.config.rewrite_html && is_html {
        return rewrite_document(resp, &target, prefix, extra).await;
    }

    tracing::info!(url = %target, "proxying request");
    relay(resp, extra)
}

/// Buffer an HTML response and point its links back through the proxy
async fn rewrite_document(
    resp: reqwest::Response,
    page_url: &str,
    prefix: &str,
    extra: HeaderMap,
) -> Response {
    let status = resp.status();
    let mut headers = response_headers(&resp);
    headers.remove(header::CONTENT_LENGTH);
    headers.extend(extra);

    let html = match resp.text().await {
        Ok(html) => html,
        Err(err) => {
            tracing::warn!("failed to read upstream document: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    };

    tracing::info!(url = %page_url, "proxying rewritten document");
    let body = Body::from(rewrite_html_urls(html, page_url, prefix));
    (status, headers, body).into_response()
}

/// Route a request came in on, used as the prefix for rewritten links
fn route_prefix(path: &str) -> &'static str {
    if path.starts_with("/proxy/") {
        "/proxy"
    } else {
        "/web"
    }
}
