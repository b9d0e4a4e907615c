// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interceptor that routes page requests through the local proxy

use std::sync::Arc;

use async_trait::async_trait;

use super::event::FetchEvent;
use super::handler::{FetchAction, FetchHandler, Fetcher};
use crate::error::Result;
use crate::http::{InterceptedRequest, Response};
use crate::rewrite::{rewrite_locator, PageLocation};

/// Rewrites each outgoing request's locator and sends it on
///
/// Stateless: every call is independent, and nothing about the request
/// other than its locator is touched. Whatever the egress returns, success
/// or failure, is handed back unchanged.
#[derive(Clone)]
pub struct Interceptor {
    page: PageLocation,
    fetcher: Arc<dyn Fetcher>,
}

impl Interceptor {
    /// Create an interceptor for the page at `page`
    pub fn new(page: PageLocation, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { page, fetcher }
    }

    /// The page requests are rewritten relative to
    pub fn page(&self) -> &PageLocation {
        &self.page
    }

    /// Same request, aimed at the rewritten locator
    pub fn rewrite(&self, request: InterceptedRequest) -> InterceptedRequest {
        let locator = rewrite_locator(&request.url, &self.page);
        request.with_url(locator)
    }

    /// Rewrite and send a request
    pub async fn intercept(&self, request: InterceptedRequest) -> Result<Response> {
        tracing::debug!(method = %request.method, url = %request.url, "intercepted request");
        let rewritten = self.rewrite(request);
        let result = self.fetcher.fetch(rewritten).await;

        if let Err(ref err) = result {
            tracing::debug!(
                url = err.url().unwrap_or_default(),
                network = err.is_network(),
                "intercepted request failed: {err}"
            );
        }
        result
    }
}

#[async_trait]
impl FetchHandler for Interceptor {
    async fn on_fetch(&self, event: &FetchEvent) -> FetchAction {
        FetchAction::Respond(self.intercept(event.request().clone()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::future::join_all;
    use parking_lot::Mutex;
    use reqwest::header::HeaderMap;
    use reqwest::{Method, StatusCode};
    use url::Url;
    use wiremock::matchers::path_regex;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::http::{
        CacheMode, CredentialsMode, HttpClient, RedirectMode, ReferrerPolicy, RequestMode,
    };
    use crate::network::FetchEventSource;

    /// Keeps every request it is asked to send
    #[derive(Default)]
    struct CapturingFetcher {
        sent: Mutex<Vec<InterceptedRequest>>,
    }

    #[async_trait]
    impl Fetcher for CapturingFetcher {
        async fn fetch(&self, request: InterceptedRequest) -> Result<Response> {
            self.sent.lock().push(request);
            Ok(Response::new(
                StatusCode::OK,
                HeaderMap::new(),
                Bytes::from_static(b"ok"),
                Url::parse("http://example.com/").unwrap(),
                false,
                0,
            ))
        }
    }

    fn page() -> PageLocation {
        PageLocation::new("https", "example.com", "/app")
    }

    fn capturing() -> (Arc<CapturingFetcher>, Interceptor) {
        let fetcher = Arc::new(CapturingFetcher::default());
        let interceptor = Interceptor::new(page(), fetcher.clone());
        (fetcher, interceptor)
    }

    #[tokio::test]
    async fn test_root_relative_locator() {
        let (fetcher, interceptor) = capturing();
        interceptor
            .intercept(InterceptedRequest::get("/api/data"))
            .await
            .unwrap();

        assert_eq!(fetcher.sent.lock()[0].url, "example.com/app//api/data");
    }

    #[tokio::test]
    async fn test_absolute_locator() {
        let (fetcher, interceptor) = capturing();
        interceptor
            .intercept(InterceptedRequest::get("https://other.com/img.png"))
            .await
            .unwrap();

        assert_eq!(
            fetcher.sent.lock()[0].url,
            "example.com/proxy/https://other.com/img.png"
        );
    }

    #[tokio::test]
    async fn test_everything_but_locator_preserved() {
        let (fetcher, interceptor) = capturing();
        let original = InterceptedRequest::new(Method::PUT, "https://other.com/upload")
            .header("x-trace", "1")
            .header("accept", "application/json")
            .header("x-trace", "2")
            .body("payload")
            .cache(CacheMode::NoStore)
            .credentials(CredentialsMode::Include)
            .redirect(RedirectMode::Manual)
            .referrer("https://example.com/app")
            .referrer_policy(ReferrerPolicy::Origin)
            .integrity("sha256-abc")
            .keepalive(true)
            .mode(RequestMode::NoCors);

        interceptor.intercept(original.clone()).await.unwrap();

        let sent = fetcher.sent.lock()[0].clone();
        assert_ne!(sent.url, original.url);
        assert_eq!(sent.method, original.method);
        assert_eq!(sent.headers, original.headers);
        assert_eq!(sent.body, original.body);
        assert_eq!(sent.flags, original.flags);
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_independent() {
        let (fetcher, interceptor) = capturing();
        let locators = ["/a", "/b", "https://c.test/", "/d"];

        let results = join_all(
            locators
                .iter()
                .map(|l| interceptor.intercept(InterceptedRequest::get(*l))),
        )
        .await;

        assert!(results.iter().all(|r| r.is_ok()));
        let mut sent: Vec<_> = fetcher.sent.lock().iter().map(|r| r.url.clone()).collect();
        sent.sort();
        assert_eq!(
            sent,
            vec![
                "example.com/app//a",
                "example.com/app//b",
                "example.com/app//d",
                "example.com/proxy/https://c.test/",
            ]
        );
    }

    #[tokio::test]
    async fn test_connection_error_passes_through() {
        // Nothing listens on the discard port
        let page = PageLocation::new("http", "127.0.0.1:9", "/");
        let interceptor = Interceptor::new(page, Arc::new(HttpClient::new().unwrap()));

        let err = interceptor
            .intercept(InterceptedRequest::get("https://other.com/img.png"))
            .await
            .unwrap_err();

        assert!(err.is_connect());
    }

    #[tokio::test]
    async fn test_not_found_resolves_as_response() {
        let server = MockServer::start().await;
        Mock::given(path_regex("^/proxy/"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such image"))
            .mount(&server)
            .await;

        let page = PageLocation::try_from(server.uri().as_str()).unwrap();
        let interceptor = Interceptor::new(page, Arc::new(HttpClient::new().unwrap()));

        let resp = interceptor
            .intercept(InterceptedRequest::get("https://other.com/img.png"))
            .await
            .unwrap();

        assert_eq!(resp.status_code(), 404);
        assert_eq!(resp.text().unwrap(), "no such image");
    }

    #[tokio::test]
    async fn test_registered_with_event_source() {
        let network = Arc::new(CapturingFetcher::default());
        let routed = Arc::new(CapturingFetcher::default());

        let source = FetchEventSource::new(network.clone());
        source.add_listener(Arc::new(Interceptor::new(page(), routed.clone())));

        source
            .dispatch(InterceptedRequest::get("/api/data"))
            .await
            .unwrap();

        assert!(network.sent.lock().is_empty());
        assert_eq!(routed.sent.lock()[0].url, "example.com/app//api/data");
    }
}
