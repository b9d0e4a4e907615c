// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Proxy HTTP server
//!
//! Serves the locators the interceptor produces: `/proxy/<url>` and
//! `/web/<url>` forward any request, `/dl/<url>` streams a download.

mod download;
mod forward;
mod proxy;

use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{any, get};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::error::{ErrorContext, Result};
use crate::http::HttpClient;

pub use download::download;
pub use forward::handle_forward_request;
pub use proxy::proxy;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub client: HttpClient,
    pub config: Arc<ProxyConfig>,
}

impl AppState {
    pub fn new(client: HttpClient, config: ProxyConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }
}

/// Build the router
pub fn router(state: AppState) -> Router {
    let timeout = state.config.request_timeout;

    Router::new()
        .route("/dl/{*url}", get(download))
        .route("/web/{*url}", any(proxy))
        .route("/proxy/{*url}", any(proxy))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl-C or SIGTERM
pub async fn serve(config: ProxyConfig) -> Result<()> {
    let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.port);
    let state = AppState::new(HttpClient::new()?, config);

    tracing::info!("running server at {addr}");

    let listener = TcpListener::bind(addr)
        .await
        .context(&format!("binding {addr}"))?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown())
        .await?;

    Ok(())
}

async fn shutdown() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutting down..");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::time::Duration;

    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::SERVICE_WORKER_COOKIE;

    fn app(config: ProxyConfig) -> Router {
        router(AppState::new(HttpClient::new().unwrap(), config))
    }

    fn installed(uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, format!("{}=1", SERVICE_WORKER_COOKIE))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_redirects_until_worker_installed() {
        let resp = app(ProxyConfig::default())
            .oneshot(
                Request::builder()
                    .uri("/web/https://site.org/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/?back=https://site.org/"
        );
    }

    #[tokio::test]
    async fn test_proxy_route_is_cookie_gated_too() {
        let resp = app(ProxyConfig::default())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/proxy/https://site.org/api?x=1")
                    .body(Body::from("ignored"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/?back=https://site.org/api"
        );
    }

    #[tokio::test]
    async fn test_proxy_forwards_and_marks_worker_scope() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .and(wiremock::matchers::header("range", "bytes=0-3"))
            .respond_with(ResponseTemplate::new(410).set_body_string("gone"))
            .mount(&upstream)
            .await;

        let resp = app(ProxyConfig::default())
            .oneshot(
                installed(&format!("/proxy/{}/api?x=1", upstream.uri()))
                    .method("POST")
                    .header("range", "bytes=0-3")
                    .header("x-secret", "do-not-forward")
                    .body(Body::from("hello"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::GONE);
        assert_eq!(resp.headers().get("service-worker-allowed").unwrap(), "/");
        assert_eq!(body_string(resp).await, "gone");

        let received = upstream.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].url.query(), Some("x=1"));
        assert_eq!(received[0].body, b"hello");
    }

    #[tokio::test]
    async fn test_download_streams_body() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/file.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3, 4]))
            .mount(&upstream)
            .await;

        let resp = app(ProxyConfig::default())
            .oneshot(
                Request::builder()
                    .uri(format!("/dl/{}/file.bin", upstream.uri()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], &[1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_download_keeps_query() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/file.bin"))
            .and(query_param("token", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("signed"))
            .mount(&upstream)
            .await;

        let resp = app(ProxyConfig::default())
            .oneshot(
                Request::builder()
                    .uri(format!("/dl/{}/file.bin?token=abc", upstream.uri()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "signed");
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let upstream = MockServer::start().await;
        Mock::given(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&upstream)
            .await;

        let config = ProxyConfig::default().request_timeout(Duration::from_millis(200));
        let resp = app(config)
            .oneshot(installed(&format!("/web/{}/slow", upstream.uri())).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let resp = app(ProxyConfig::default())
            .oneshot(installed("/web/http://127.0.0.1:9/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_html_rewriting() {
        let upstream = MockServer::start().await;
        Mock::given(path("/index.html"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"<a href="/about">about</a>"#, "text/html"),
            )
            .mount(&upstream)
            .await;

        let page = format!("{}/index.html", upstream.uri());
        let resp = app(ProxyConfig::default().rewrite_html(true))
            .oneshot(installed(&format!("/web/{}", page)).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_string(resp).await,
            format!(r#"<a href="/web/{}/about">about</a>"#, upstream.uri())
        );
    }
}
