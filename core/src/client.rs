//! The request lifecycle pipeline.
//!
//! # Design
//! `Api` is an explicitly constructed, explicitly owned pipeline object —
//! call sites receive it by reference or `Arc`, there is no process-wide
//! instance. It owns the configuration, the notification sink and the
//! injected transport, and for each call runs the same sequence:
//!
//! 1. resolve the target against `base_url`
//! 2. assemble request options (header precedence: JSON defaults <
//!    configured defaults < per-call)
//! 3. give a configured pre-request hook the chance to intercept, handing
//!    it an explicit `next` continuation
//! 4. dispatch `Requested`, await the transport, decode the body
//! 5. classify success vs failure, run post hooks, dispatch the terminal
//!    event, apply the matching transform
//!
//! HTTP failures resolve rather than error: `call` always returns a
//! [`CallOutcome`], and `outcome.success` is the discriminator. This is the
//! documented contract — error handling goes through `transform_error` and
//! the `Failed` notification, not through `Result`.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::connectivity::ConnectivityMonitor;
use crate::error::ApiError;
use crate::event::{ApiEvent, EventSink};
use crate::http::{CallOutcome, HttpMethod, RequestOptions, ResponseBody, ResponseMeta, Target};
use crate::settings::{ApiSettings, Next};
use crate::transport::{ConnectivitySignal, Transport};

/// The configured request pipeline.
pub struct Api {
    settings: Arc<ApiSettings>,
    sink: Arc<dyn EventSink>,
    transport: Arc<dyn Transport>,
    monitor: Mutex<Option<ConnectivityMonitor>>,
}

impl Api {
    /// Build a pipeline without connectivity monitoring.
    pub fn new(settings: ApiSettings, sink: Arc<dyn EventSink>, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings: Arc::new(settings),
            sink,
            transport,
            monitor: Mutex::new(None),
        }
    }

    /// Build a pipeline and, when `check_internet_connection` is set, start
    /// the connectivity monitor against the given platform signal.
    ///
    /// Must run inside a tokio runtime when monitoring is enabled.
    pub fn with_connectivity(
        settings: ApiSettings,
        sink: Arc<dyn EventSink>,
        transport: Arc<dyn Transport>,
        signal: Arc<dyn ConnectivitySignal>,
    ) -> Self {
        let api = Self::new(settings, sink, transport);
        if api.settings.check_internet_connection {
            api.start_monitor(signal);
        }
        api
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Start (or restart) connectivity polling. A previous monitor is
    /// stopped before the replacement spawns, so two poll loops never
    /// coexist, even briefly.
    pub fn start_monitor(&self, signal: Arc<dyn ConnectivitySignal>) {
        let mut slot = self.monitor.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.take() {
            previous.stop();
        }
        *slot = Some(ConnectivityMonitor::start(
            signal,
            Arc::clone(&self.sink),
            self.settings.online_interval,
            self.settings.offline_interval,
        ));
    }

    /// Stop connectivity polling, for clean shutdown and tests.
    pub fn stop_monitor(&self) {
        let mut slot = self.monitor.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(monitor) = slot.take() {
            monitor.stop();
        }
    }

    /// Resolve a target into the final URL used for both the transport call
    /// and every notification: base URL with a single trailing slash
    /// stripped, joined by `/` to the target's formatted path.
    pub fn resolve_url(&self, target: &Target) -> String {
        let base = &self.settings.base_url;
        let base = base.strip_suffix('/').unwrap_or(base);
        format!("{base}/{}", target.format())
    }

    /// Merge headers and transport passthroughs into the options for one
    /// call. `body` is attached only when the caller supplied one.
    pub fn assemble_options(
        &self,
        method: HttpMethod,
        body: Option<String>,
        headers: &[(&str, &str)],
    ) -> RequestOptions {
        let mut merged: Vec<(String, String)> = Vec::new();
        if self.settings.json {
            set_header(&mut merged, "Accept", "application/json");
            set_header(&mut merged, "Content-Type", "application/json");
        }
        for (key, value) in &self.settings.headers {
            set_header(&mut merged, key, value);
        }
        for (key, value) in headers {
            set_header(&mut merged, key, value);
        }

        RequestOptions {
            method,
            mode: self.settings.mode.clone(),
            cache: self.settings.cache.clone(),
            credentials: self.settings.credentials.clone(),
            referrer: self.settings.referrer.clone(),
            headers: merged,
            body,
        }
    }

    /// Run one call through the full pipeline.
    ///
    /// When a pre-request hook is configured it receives the resolved URL,
    /// the assembled options, the notifier and a `next` continuation that
    /// performs the dispatch → transport → classify sequence; the hook's
    /// result becomes the call's result. Without a hook, `next` runs
    /// unconditionally.
    pub async fn call(
        &self,
        method: HttpMethod,
        target: impl Into<Target>,
        body: Option<String>,
        headers: &[(&str, &str)],
    ) -> CallOutcome {
        let url = self.resolve_url(&target.into());
        let options = self.assemble_options(method, body, headers);

        if let Some(pre_request) = &self.settings.pre_request {
            let settings = Arc::clone(&self.settings);
            let sink = Arc::clone(&self.sink);
            let transport = Arc::clone(&self.transport);
            let next_url = url.clone();
            let next_options = options.clone();
            let next: Next = Box::new(move || {
                Box::pin(execute(
                    Arc::clone(&settings),
                    Arc::clone(&sink),
                    Arc::clone(&transport),
                    next_url.clone(),
                    next_options.clone(),
                ))
            });
            pre_request(url, options, Arc::clone(&self.sink), next).await
        } else {
            execute(
                Arc::clone(&self.settings),
                Arc::clone(&self.sink),
                Arc::clone(&self.transport),
                url,
                options,
            )
            .await
        }
    }

    pub async fn get(&self, target: impl Into<Target>, headers: &[(&str, &str)]) -> CallOutcome {
        self.call(HttpMethod::Get, target, None, headers).await
    }

    /// POST with a JSON-encoded payload. Returns `Err` only when the
    /// payload cannot be serialized — that happens before any notification,
    /// so the Requested/terminal pairing stays exact.
    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        target: impl Into<Target>,
        body: &T,
        headers: &[(&str, &str)],
    ) -> Result<CallOutcome, ApiError> {
        let encoded = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.call(HttpMethod::Post, target, Some(encoded), headers).await)
    }

    /// PUT with a JSON-encoded payload; same error contract as [`post`].
    ///
    /// [`post`]: Api::post
    pub async fn put<T: serde::Serialize + ?Sized>(
        &self,
        target: impl Into<Target>,
        body: &T,
        headers: &[(&str, &str)],
    ) -> Result<CallOutcome, ApiError> {
        let encoded = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.call(HttpMethod::Put, target, Some(encoded), headers).await)
    }

    pub async fn delete(&self, target: impl Into<Target>, headers: &[(&str, &str)]) -> CallOutcome {
        self.call(HttpMethod::Delete, target, None, headers).await
    }

    /// Generic entry point for any verb, pre-encoded body included.
    pub async fn request(
        &self,
        method: HttpMethod,
        target: impl Into<Target>,
        body: Option<String>,
        headers: &[(&str, &str)],
    ) -> CallOutcome {
        self.call(method, target, body, headers).await
    }
}

/// Insert or replace a header, keeping first-insertion position on replace.
fn set_header(headers: &mut Vec<(String, String)>, key: &str, value: &str) {
    if let Some(slot) = headers.iter_mut().find(|(existing, _)| existing == key) {
        slot.1 = value.to_string();
    } else {
        headers.push((key.to_string(), value.to_string()));
    }
}

/// The dispatch → transport → classify sequence, shared by the direct path
/// and the pre-hook's `next` continuation. Free function so the `next`
/// closure stays `'static` over cloned `Arc`s rather than borrowing the
/// pipeline.
async fn execute(
    settings: Arc<ApiSettings>,
    sink: Arc<dyn EventSink>,
    transport: Arc<dyn Transport>,
    url: String,
    options: RequestOptions,
) -> CallOutcome {
    let method = options.method.clone();

    sink.dispatch(ApiEvent::Requested {
        url: url.clone(),
        method: method.clone(),
        options: options.clone(),
    });
    debug!(url = %url, method = %method, "request dispatched");

    let (meta, body, success) = match transport.perform(&url, &options).await {
        Ok(raw) => {
            let meta = ResponseMeta {
                status: raw.status,
                ok: raw.ok,
                status_text: raw.status_text,
            };
            if settings.json {
                match serde_json::from_slice::<serde_json::Value>(&raw.body) {
                    Ok(value) => {
                        let ok = meta.ok;
                        (Some(meta), Some(ResponseBody::Json(value)), ok)
                    }
                    Err(e) => {
                        warn!(url = %url, error = %e, "response body decode failed");
                        (Some(meta), None, false)
                    }
                }
            } else {
                let ok = meta.ok;
                (Some(meta), Some(ResponseBody::Raw(raw.body)), ok)
            }
        }
        Err(e) => {
            warn!(url = %url, error = %e, "transport failure");
            (None, None, false)
        }
    };

    if let Some(post_request) = &settings.post_request {
        post_request(&url, meta.as_ref(), body.as_ref());
    }

    let json = if settings.json {
        body.as_ref().and_then(|b| b.as_json().cloned())
    } else {
        None
    };

    let outcome = CallOutcome {
        url: url.clone(),
        method: method.clone(),
        success,
        meta,
        body,
    };

    if success {
        if let Some(post_success) = &settings.post_success {
            post_success(&url, outcome.meta.as_ref(), outcome.body.as_ref());
        }
        sink.dispatch(ApiEvent::Succeeded { url, method, json });
        (settings.transform_success)(outcome)
    } else {
        if let Some(post_error) = &settings.post_error {
            post_error(&url, outcome.meta.as_ref(), outcome.body.as_ref());
        }
        sink.dispatch(ApiEvent::Failed {
            url,
            method,
            status: outcome.meta.as_ref().map(|m| m.status),
            status_text: outcome.meta.as_ref().map(|m| m.status_text.clone()),
            json,
        });
        (settings.transform_error)(outcome)
    }
}
