// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Authentication route handlers.

use crate::app::{ApiError, AppState};
use crate::models::auth::{GoogleAuthRequest, GoogleAuthResponse};
use crate::services::logging::redact_token;
use axum::{http::StatusCode, routing::post, Json, Router};
use tracing::info;

/// Create auth router.
pub fn auth_router() -> Router<AppState> {
    Router::new().route("/google", post(google_auth_handler))
}

/// POST /auth/google - Accept a Google sign-in token.
///
/// The token is handed back unchanged as the access token; checking it with
/// Google is left to the frontend.
async fn google_auth_handler(
    Json(payload): Json<GoogleAuthRequest>,
) -> Result<Json<GoogleAuthResponse>, ApiError> {
    if payload.token.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Token is missing"));
    }

    info!(token = %redact_token(&payload.token), "google sign-in");

    Ok(Json(GoogleAuthResponse {
        access_token: payload.token,
    }))
}
