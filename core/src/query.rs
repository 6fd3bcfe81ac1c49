//! URL query-string encoding.
//!
//! # Design
//! Pairs are encoded in slice order so resolved URLs are deterministic and
//! directly assertable in tests. Keys pass through verbatim; values go
//! through standard percent-encoding.

/// Serialize key/value pairs into a `key=value&key=value` query string.
///
/// An empty slice yields an empty string. Values are percent-encoded per
/// URI component rules; keys are emitted as-is.
pub fn to_query_string(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
