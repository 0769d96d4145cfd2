//! Gateway endpoint routes.

use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Json, Router,
};
use std::collections::HashMap;

use crate::auth::Authorized;
use crate::error::Result;
use crate::handlers::handle_gateway;
use crate::AppState;

/// Create gateway routes.
///
/// Historical clients used several verbs against the same endpoint, so
/// `/api` accepts both GET (everything in the query string) and POST
/// (payload optionally in the body).
pub fn routes() -> Router<AppState> {
    Router::new().route("/api", get(get_handler).post(post_handler))
}

/// GET /api - query-parameter driven gateway request.
async fn get_handler(
    State(state): State<AppState>,
    _auth: Authorized,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response> {
    handle_gateway(&state, params, None).await
}

/// POST /api - same contract, with an optional JSON body as payload.
async fn post_handler(
    State(state): State<AppState>,
    _auth: Authorized,
    Query(params): Query<HashMap<String, String>>,
    body: Option<Json<serde_json::Value>>,
) -> Result<Response> {
    handle_gateway(&state, params, body.map(|Json(value)| value)).await
}
