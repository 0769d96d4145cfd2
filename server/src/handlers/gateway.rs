//! The gateway handler - one entry point, query-parameter driven.
//!
//! Every request names a collection (`sheet`), an action, and the
//! action's inputs; any query key the transport does not claim becomes
//! an equality filter for `get`. The handler decodes the payload,
//! builds the engine request, dispatches it under the store lock, and
//! snapshots the store after a successful mutation.

use crate::encoder::{self, Delivery};
use crate::error::{AppError, Result};
use crate::{persist, AppState};
use axum::response::Response;
use gridgate_engine::{is_reserved_key, Action, GatewayRequest, DEFAULT_SHEET};
use std::collections::HashMap;

/// Process one gateway request.
///
/// `params` are the decoded query parameters; `body` is an optional
/// JSON request body, used as the payload when no `data` parameter is
/// present (historical clients sent everything through the query
/// string; newer ones POST a body).
pub async fn handle_gateway(
    state: &AppState,
    params: HashMap<String, String>,
    body: Option<serde_json::Value>,
) -> Result<Response> {
    let delivery = Delivery::from_param(params.get("interval").map(String::as_str));
    let sheet = params
        .get("sheet")
        .filter(|s| !s.is_empty())
        .cloned()
        .unwrap_or_else(|| DEFAULT_SHEET.to_string());

    let action = Action::parse(params.get("action").map(String::as_str))
        .map_err(|e| AppError::gateway(e, sheet.clone()))?;

    // `data` decoding is a transport concern: it fails before any
    // handler runs and never has side effects.
    let payload = match params.get("data") {
        Some(raw) => Some(
            serde_json::from_str(raw).map_err(|e| AppError::MalformedPayload(e.to_string()))?,
        ),
        None => body,
    };

    let id = params.get("id").filter(|s| !s.is_empty()).cloned();
    let filters: HashMap<String, String> = params
        .into_iter()
        .filter(|(key, _)| !is_reserved_key(key))
        .collect();

    let mut request = GatewayRequest::get(&sheet)
        .with_action(action)
        .with_filters(filters);
    if let Some(id) = id {
        request = request.with_id(id);
    }
    if let Some(payload) = payload {
        request = request.with_payload(payload);
    }

    let now = chrono::Utc::now().timestamp_millis();

    let mut store = state.store.lock().await;
    let response = state
        .dispatcher
        .dispatch(&mut *store, request, now)
        .map_err(|e| AppError::gateway(e, sheet.clone()))?;

    if action != Action::Get {
        if let Some(path) = state.config.store_path.as_deref() {
            persist::save_store(path, &store);
        }
    }
    drop(store);

    let body = serde_json::to_value(&response)
        .map_err(|e| AppError::Internal(format!("unserializable response: {e}")))?;
    Ok(encoder::encode(delivery, body))
}
