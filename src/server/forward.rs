// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Sending upstream requests and relaying their responses

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

/// Headers that describe one connection and must not be relayed
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "upgrade",
];

/// Upstream URL: the captured path plus the incoming query string
pub fn target_url(url: String, uri: &Uri) -> String {
    match uri.query() {
        Some(query) => format!("{url}?{query}"),
        None => url,
    }
}

/// Send the upstream request
///
/// # Errors
///
/// A failed send is turned into a ready-to-return response: the error's
/// status when the request itself was rejected with one, otherwise 500,
/// with the error message as the body.
pub async fn handle_forward_request(
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, Response> {
    request.send().await.map_err(|err| {
        tracing::warn!("failed to send request: {err}");

        let status = if err.is_request() {
            err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, err.to_string()).into_response()
    })
}

/// Upstream status and headers with the body streamed through
pub fn relay(response: reqwest::Response, extra: HeaderMap) -> Response {
    let status = response.status();
    let mut headers = response_headers(&response);
    headers.extend(extra);
    let body = Body::from_stream(response.bytes_stream());

    (status, headers, body).into_response()
}

/// Upstream headers minus hop-by-hop ones
pub fn response_headers(response: &reqwest::Response) -> HeaderMap {
    let mut headers = response.headers().clone();
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
    headers
}
