// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! `/dl/*`: stream a GET of the embedded URL back to the caller

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;

use super::forward::{handle_forward_request, relay, target_url};
use super::AppState;
use crate::http::filter_headers;

pub async fn download(
    State(state): State<AppState>,
    Path(url): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let target = target_url(url, &uri);
    let request = state
        .client
        .request(Method::GET, &target)
        .headers(filter_headers(headers, &state.config.forwarded_headers));

    let resp = match handle_forward_request(request).await {
        Ok(resp) => resp,
        Err(err) => return err,
    };

    tracing::info!(url = %target, "streaming response");
    relay(resp, HeaderMap::new())
}
