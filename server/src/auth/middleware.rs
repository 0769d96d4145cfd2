//! Shared-secret extraction.
//!
//! Authentication is a single optional shared secret: when
//! `AUTH_SECRET` is configured, every request must carry it as a
//! bearer token. Without configuration all requests pass.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};

use crate::AppState;

/// Marker for a request that passed the shared-secret check.
#[derive(Debug, Clone)]
pub struct Authorized;

impl FromRequestParts<AppState> for Authorized {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(secret) = state.config.auth_secret.as_deref() else {
            // No secret configured, allow anonymous access.
            return Ok(Authorized);
        };

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                let token = header.trim_start_matches("Bearer ");
                if token == secret {
                    Ok(Authorized)
                } else {
                    Err((StatusCode::UNAUTHORIZED, "Invalid shared secret"))
                }
            }
            Some(_) => Err((
                StatusCode::UNAUTHORIZED,
                "Invalid authorization header format",
            )),
            None => Err((StatusCode::UNAUTHORIZED, "Missing authorization header")),
        }
    }
}
