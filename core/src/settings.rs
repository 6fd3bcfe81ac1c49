//! Pipeline configuration.
//!
//! # Design
//! `ApiSettings` is built once and handed to [`Api::new`]; it is never
//! mutated field-by-field afterwards. Reconfiguration means constructing a
//! new pipeline with a new settings value, which keeps concurrent readers
//! race-free by construction.
//!
//! Optional hooks are plain `Option` fields holding `Arc`'d closures —
//! invoked when present, skipped when not. The pre-request hook receives an
//! explicit `next` continuation so it can veto, delay or wrap the call
//! without ever being able to skip the notification contract when it does
//! proceed.
//!
//! [`Api::new`]: crate::client::Api::new

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::event::EventSink;
use crate::http::{CallOutcome, RequestOptions, ResponseBody, ResponseMeta};

/// Maps the classified outcome to the value returned to the caller.
/// Defaults to identity.
pub type Transform = Arc<dyn Fn(CallOutcome) -> CallOutcome + Send + Sync>;

/// Side-effect hook invoked after outcome classification with
/// `(url, response metadata, decoded body)`. Metadata/body are `None` when
/// the transport or decode step failed.
pub type PostHook = Arc<dyn Fn(&str, Option<&ResponseMeta>, Option<&ResponseBody>) + Send + Sync>;

/// The continuation handed to the pre-request hook: each invocation runs
/// the dispatch → network → classify sequence once, emitting its own
/// Requested/terminal pair. Invoking it again is how a hook retries.
pub type Next = Box<dyn Fn() -> BoxFuture<'static, CallOutcome> + Send>;

/// Interception hook invoked with `(url, options, notifier, next)` before
/// anything is dispatched. Whatever its future resolves to becomes the
/// call's return value.
pub type PreRequestHook = Arc<
    dyn Fn(String, RequestOptions, Arc<dyn EventSink>, Next) -> BoxFuture<'static, CallOutcome>
        + Send
        + Sync,
>;

/// Immutable-after-setup configuration record.
#[derive(Clone)]
pub struct ApiSettings {
    /// Prefix for every resolved URL; a trailing slash is normalized away.
    pub base_url: String,
    /// Default headers applied to every call, below per-call headers in
    /// precedence.
    pub headers: Vec<(String, String)>,
    /// Opaque transport passthroughs.
    pub mode: String,
    pub cache: String,
    pub credentials: String,
    pub referrer: String,
    /// JSON mode: adds Accept/Content-Type defaults and decodes bodies as
    /// JSON. When false, bodies take the opaque blob path.
    pub json: bool,
    pub transform_success: Transform,
    pub transform_error: Transform,
    /// Start the connectivity monitor at construction time (requires a
    /// signal, see [`Api::with_connectivity`]).
    ///
    /// [`Api::with_connectivity`]: crate::client::Api::with_connectivity
    pub check_internet_connection: bool,
    /// Poll cadence while the monitor believes it is online.
    pub online_interval: Duration,
    /// Poll cadence while offline. Shorter than `online_interval` by
    /// default: reconnect detection is prioritized over steady-state cost.
    pub offline_interval: Duration,
    pub pre_request: Option<PreRequestHook>,
    pub post_request: Option<PostHook>,
    pub post_success: Option<PostHook>,
    pub post_error: Option<PostHook>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "/".to_string(),
            headers: Vec::new(),
            mode: "cors".to_string(),
            cache: "default".to_string(),
            credentials: "omit".to_string(),
            referrer: "client".to_string(),
            json: true,
            transform_success: Arc::new(|outcome| outcome),
            transform_error: Arc::new(|outcome| outcome),
            check_internet_connection: true,
            online_interval: Duration::from_millis(5000),
            offline_interval: Duration::from_millis(1000),
            pre_request: None,
            post_request: None,
            post_success: None,
            post_error: None,
        }
    }
}
