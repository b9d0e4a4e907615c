// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Fetch listener and egress traits
//!
//! A `FetchHandler` is what gets registered with the interception
//! facility; a `Fetcher` is whatever actually puts a request on the wire.

use async_trait::async_trait;

use super::event::FetchEvent;
use crate::error::Result;
use crate::http::{InterceptedRequest, Response};

/// Network egress - the platform's native fetch
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Send the request and resolve with whatever the network returns
    ///
    /// Non-OK statuses resolve successfully; only failures to obtain a
    /// response are errors.
    async fn fetch(&self, request: InterceptedRequest) -> Result<Response>;
}

/// Listener for interception events
///
/// # Example
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use trev_proxy::network::{FetchAction, FetchEvent, FetchHandler};
///
/// struct BlockTrackers;
///
/// #[async_trait]
/// impl FetchHandler for BlockTrackers {
///     async fn on_fetch(&self, event: &FetchEvent) -> FetchAction {
///         if event.request().url.contains("tracker") {
///             return FetchAction::Respond(Err(trev_proxy::Error::network("blocked")));
///         }
///         FetchAction::Continue
///     }
/// }
/// ```
#[async_trait]
pub trait FetchHandler: Send + Sync {
    /// Called once per outgoing request
    async fn on_fetch(&self, event: &FetchEvent) -> FetchAction;
}

/// What a listener decided to do with an event
#[derive(Debug)]
pub enum FetchAction {
    /// Leave the event to later listeners, or to the network
    Continue,
    /// Resolve the event with this outcome
    Respond(Result<Response>),
}
