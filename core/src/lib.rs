//! Dispatch-driven HTTP request pipeline.
//!
//! # Overview
//! Integrates outbound HTTP requests with a centralized application state
//! container: every call emits lifecycle notifications (`Requested`, then
//! `Succeeded` or `Failed`) into an [`EventSink`], and an optional
//! background poller reflects device connectivity into the same stream.
//!
//! # Design
//! - [`Api`] is the explicitly constructed pipeline: configuration, sink
//!   and transport are injected at build time, no global instance.
//! - The actual HTTP exchange is behind the [`Transport`] trait — the core
//!   never performs I/O itself, which keeps it deterministic under test.
//! - HTTP failures resolve: `call` returns a [`CallOutcome`] whose
//!   `success` flag classifies the result, and the configured transforms
//!   shape the returned value. Only pre-pipeline payload encoding uses
//!   `Result`.
//! - Exactly one `Requested` precedes exactly one terminal event per call,
//!   even when a pre-request hook intercepts — the hook wraps the dispatch
//!   through its `next` continuation, it cannot replace it.

pub mod client;
pub mod connectivity;
pub mod error;
pub mod event;
pub mod http;
pub mod query;
pub mod settings;
pub mod transport;

pub use client::Api;
pub use connectivity::ConnectivityMonitor;
pub use error::ApiError;
pub use event::{ApiEvent, EventSink, FnSink, PendingRequests};
pub use http::{
    CallOutcome, HttpMethod, RawResponse, RequestOptions, ResponseBody, ResponseMeta, Target,
};
pub use query::to_query_string;
pub use settings::{ApiSettings, Next, PostHook, PreRequestHook, Transform};
pub use transport::{ConnectivitySignal, Transport};
