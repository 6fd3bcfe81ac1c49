//! Error types for the request pipeline.
//!
//! # Design
//! Ordinary HTTP failures (non-2xx responses) are *not* errors here — the
//! pipeline normalizes them into a failure outcome and resolves the call.
//! `ApiError` covers only the conditions that prevent a response from being
//! interpreted at all: the transport could not complete the exchange, the
//! body could not be decoded, or a request payload could not be encoded.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport failed before producing a response (connection
    /// refused, DNS failure, timeout).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response body could not be decoded as JSON.
    #[error("response body decode failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("request payload serialization failed: {0}")]
    Serialization(String),
}
