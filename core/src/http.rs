//! Plain-data HTTP types for the host-does-IO pattern.
//!
//! # Design
//! The pipeline builds `RequestOptions` values and interprets `RawResponse`
//! values without ever touching the network — the injected [`Transport`]
//! executes the actual exchange. All fields use owned types so values can be
//! moved into hook continuations and notification records freely.
//!
//! [`Transport`]: crate::transport::Transport

use std::fmt;

use bytes::Bytes;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::query::to_query_string;

/// HTTP verb. `Other` carries any method string the caller wants to send
/// through the generic `request` entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Other(method) => method,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Where a call should go: either a raw URL string or a structured
/// pathname + query form that the pipeline encodes itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Raw(String),
    Structured {
        pathname: String,
        query: Vec<(String, String)>,
    },
}

impl Target {
    pub fn structured(pathname: impl Into<String>, query: &[(&str, &str)]) -> Self {
        Target::Structured {
            pathname: pathname.into(),
            query: query.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    /// Path (and query, when present) relative to the base URL, with a
    /// single leading slash stripped.
    pub(crate) fn format(&self) -> String {
        match self {
            Target::Raw(url) => {
                let url = url.strip_prefix('/').unwrap_or(url);
                url.to_string()
            }
            Target::Structured { pathname, query } => {
                let path = pathname.strip_prefix('/').unwrap_or(pathname);
                if query.is_empty() {
                    path.to_string()
                } else {
                    format!("{path}?{}", to_query_string(query))
                }
            }
        }
    }
}

impl From<&str> for Target {
    fn from(url: &str) -> Self {
        Target::Raw(url.to_string())
    }
}

impl From<String> for Target {
    fn from(url: String) -> Self {
        Target::Raw(url)
    }
}

/// Assembled options for one outgoing request.
///
/// `mode`, `cache`, `credentials` and `referrer` are opaque transport
/// passthroughs copied from the configuration; the pipeline never interprets
/// them. `body` is `None` when the caller supplied no body — the field must
/// stay absent for verbs like GET/DELETE, never become an empty string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub mode: String,
    pub cache: String,
    pub credentials: String,
    pub referrer: String,
    pub headers: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// What the transport hands back after executing a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    /// Success flag per the transport (2xx range).
    pub ok: bool,
    pub status_text: String,
    pub body: Bytes,
}

/// Response metadata visible to post hooks and transforms after the body
/// has been consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    pub ok: bool,
    pub status_text: String,
}

/// Decoded response body: the JSON path or the opaque blob path, depending
/// on the configured mode.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Raw(Bytes),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Raw(_) => None,
        }
    }
}

/// The classified result of one call, fed to the configured transform and
/// returned to the caller.
///
/// `meta` is `None` when the transport failed before producing a response;
/// `body` is `None` on transport failure or when the body could not be
/// decoded. An HTTP-level failure still *resolves* the call with
/// `success: false` — callers inspect the outcome rather than matching on
/// an error.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub url: String,
    pub method: HttpMethod,
    pub success: bool,
    pub meta: Option<ResponseMeta>,
    pub body: Option<ResponseBody>,
}

impl CallOutcome {
    /// Decoded JSON body, when the call ran in JSON mode and decoding
    /// succeeded.
    pub fn json(&self) -> Option<&Value> {
        self.body.as_ref().and_then(ResponseBody::as_json)
    }

    /// Response status, when a response was received at all.
    pub fn status(&self) -> Option<u16> {
        self.meta.as_ref().map(|meta| meta.status)
    }
}
