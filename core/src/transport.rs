//! Injected platform boundaries: the HTTP transport and the connectivity
//! signal.
//!
//! # Design
//! The core never performs I/O itself. The host supplies a [`Transport`]
//! (usually wrapping a real HTTP client) and, when connectivity monitoring
//! is enabled, a [`ConnectivitySignal`] reporting the platform's
//! online/offline flag. Both are object-safe so they can sit behind `Arc`
//! in the pipeline.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::http::{RawResponse, RequestOptions};

/// Executes one HTTP exchange.
///
/// Implementations return `Err` only for transport-level failures
/// (connection refused, DNS, timeout). A response with any status code —
/// including 4xx/5xx — is `Ok`; status interpretation belongs to the
/// pipeline.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform(&self, url: &str, options: &RequestOptions) -> Result<RawResponse, ApiError>;
}

/// The platform's current online/offline flag, sampled by the connectivity
/// monitor on each poll.
pub trait ConnectivitySignal: Send + Sync {
    fn is_online(&self) -> bool;
}

impl<F> ConnectivitySignal for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_online(&self) -> bool {
        self()
    }
}
