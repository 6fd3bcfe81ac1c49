//! Lifecycle notification records and the channel they travel on.
//!
//! # Design
//! The pipeline only ever *emits* events; it never reads state back from the
//! consumer. `EventSink` is the whole contract with the external state
//! container — anything that can absorb an [`ApiEvent`] qualifies. An
//! unbounded tokio channel sender works out of the box, which is also what
//! the test suites use to observe emission order.
//!
//! `PendingRequests` is the conventional consumer: it counts in-flight
//! requests by folding the event stream. It lives here so consumers (and the
//! pairing tests) do not have to re-derive the fold.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::http::{HttpMethod, RequestOptions};

/// A lifecycle notification: one phase of a request, or a connectivity
/// transition.
///
/// For `Succeeded`/`Failed`, `json` is present iff the pipeline ran in JSON
/// mode — absence of the field (not `null`) is what signals blob mode, which
/// the serialization preserves via `skip_serializing_if`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ApiEvent {
    /// Emitted before the network call begins, so consumers can reflect
    /// in-flight state immediately.
    Requested {
        url: String,
        method: HttpMethod,
        options: RequestOptions,
    },
    Succeeded {
        url: String,
        method: HttpMethod,
        #[serde(skip_serializing_if = "Option::is_none")]
        json: Option<Value>,
    },
    /// `status`/`status_text` are `None` when the transport failed before
    /// producing a response.
    Failed {
        url: String,
        method: HttpMethod,
        status: Option<u16>,
        status_text: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        json: Option<Value>,
    },
    Disconnected,
    Reconnected,
}

/// The notification channel into the external state container.
///
/// Dispatch must tolerate interleaving across concurrent calls; the pipeline
/// only guarantees per-call ordering (Requested strictly before its terminal
/// event).
pub trait EventSink: Send + Sync {
    fn dispatch(&self, event: ApiEvent);
}

impl EventSink for mpsc::UnboundedSender<ApiEvent> {
    fn dispatch(&self, event: ApiEvent) {
        // A closed receiver means the consumer is gone; dropping the event
        // is the correct behavior for a fire-and-forget channel.
        let _ = self.send(event);
    }
}

/// Adapter turning any closure into an [`EventSink`].
///
/// A blanket impl over `Fn(ApiEvent)` would overlap the sender impl above
/// under coherence rules, so closures wrap in this newtype instead.
pub struct FnSink<F>(pub F);

impl<F> EventSink for FnSink<F>
where
    F: Fn(ApiEvent) + Send + Sync,
{
    fn dispatch(&self, event: ApiEvent) {
        (self.0)(event)
    }
}

/// Reference reducer over the event stream: one pending increment per
/// `Requested`, one decrement per terminal event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingRequests {
    pub pending: u64,
}

impl PendingRequests {
    pub fn reduce(&mut self, event: &ApiEvent) {
        match event {
            ApiEvent::Requested { .. } => self.pending += 1,
            ApiEvent::Succeeded { .. } | ApiEvent::Failed { .. } => {
                self.pending = self.pending.saturating_sub(1);
            }
            ApiEvent::Disconnected | ApiEvent::Reconnected => {}
        }
    }
}
