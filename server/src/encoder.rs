//! Response encoding.
//!
//! The gateway's ancestors delivered results through script-tag
//! injection (callback invocations and global-variable assignments) to
//! dodge cross-origin rules. This server keeps only the semantic
//! intent: every result is a plain JSON body, and a client that asked
//! for periodic refresh via `interval` gets the interval echoed back
//! as a header so it can schedule its own re-fetch.

use axum::{
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

/// Header carrying the client-requested re-poll interval.
pub const POLL_INTERVAL_HEADER: &str = "x-poll-interval-ms";

/// How the client asked for the result to be delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Re-poll interval in milliseconds, when requested
    pub interval_ms: Option<u64>,
}

impl Delivery {
    /// Read delivery options from the request's query parameters.
    pub fn from_param(interval: Option<&str>) -> Self {
        Self {
            interval_ms: interval.and_then(|raw| raw.parse().ok()),
        }
    }
}

/// Wrap a dispatcher result for the wire. The payload itself is never
/// transformed.
pub fn encode(delivery: Delivery, body: serde_json::Value) -> Response {
    let mut response = Json(body).into_response();

    if let Some(interval) = delivery.interval_ms {
        if let Ok(value) = HeaderValue::from_str(&interval.to_string()) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(POLL_INTERVAL_HEADER), value);
        }
    }

    response
}
