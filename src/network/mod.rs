// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network interception
//!
//! Outgoing requests are turned into events, offered to registered
//! listeners, and sent to the network when nobody answers.

mod event;
mod handler;
mod interceptor;

pub use event::{FetchEvent, FetchEventSource};
pub use handler::{FetchAction, FetchHandler, Fetcher};
pub use interceptor::Interceptor;
