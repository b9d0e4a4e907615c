// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interception events and the facility that dispatches them

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;

use super::handler::{FetchAction, FetchHandler, Fetcher};
use crate::error::Result;
use crate::http::{InterceptedRequest, Response};

/// An outgoing network call, before it is sent
#[derive(Debug, Clone)]
pub struct FetchEvent {
    id: u64,
    timestamp: SystemTime,
    request: InterceptedRequest,
}

impl FetchEvent {
    /// Create a new event
    pub fn new(id: u64, request: InterceptedRequest) -> Self {
        Self {
            id,
            timestamp: SystemTime::now(),
            request,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// The request as the page issued it
    pub fn request(&self) -> &InterceptedRequest {
        &self.request
    }

    pub fn into_request(self) -> InterceptedRequest {
        self.request
    }
}

/// Process-wide request interception facility
///
/// Built once at start-up and kept for the life of the process.
/// Listeners are registered with [`add_listener`](Self::add_listener) and
/// stay registered; there is no teardown.
pub struct FetchEventSource {
    listeners: RwLock<Vec<Arc<dyn FetchHandler>>>,
    network: Arc<dyn Fetcher>,
    next_id: AtomicU64,
}

impl FetchEventSource {
    /// Create a facility that falls back to `network` when no listener responds
    pub fn new(network: Arc<dyn Fetcher>) -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            network,
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener
    pub fn add_listener(&self, listener: Arc<dyn FetchHandler>) {
        self.listeners.write().push(listener);
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Run an outgoing request through the listeners
    ///
    /// Listeners are asked in registration order; the first one to respond
    /// decides the outcome. If none does, the request is sent unchanged.
    pub async fn dispatch(&self, request: InterceptedRequest) -> Result<Response> {
        let event = FetchEvent::new(self.next_id.fetch_add(1, Ordering::Relaxed), request);
        // Snapshot so the lock is not held across awaits
        let listeners: Vec<_> = self.listeners.read().clone();

        for listener in listeners {
            if let FetchAction::Respond(outcome) = listener.on_fetch(&event).await {
                return outcome;
            }
        }

        tracing::trace!(event = event.id(), "no listener responded, fetching directly");
        self.network.fetch(event.into_request()).await
    }
}
