// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Bearer authentication for Axum.
//!
//! - `BearerClaims`: extractor that verifies the `Authorization: Bearer` token
//! - `AuthError`: rejection returned when it is missing or invalid

use crate::app::AppState;
use crate::models::version::ErrorResponse;
use crate::services::logging::redact_token;
use crate::services::token::Claims;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::debug;

/// Auth error responses.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let detail = match self {
            AuthError::MissingToken => "Not authenticated",
            AuthError::InvalidToken => "Invalid token",
        };
        (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                detail: detail.to_string(),
            }),
        )
            .into_response()
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Claims of a request that carried a valid bearer token.
pub struct BearerClaims(pub Claims);

impl FromRequestParts<AppState> for BearerClaims {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;

        state.token_verifier.verify(token).map(BearerClaims).map_err(|e| {
            debug!(token = %redact_token(token), error = %e, "rejected bearer token");
            AuthError::InvalidToken
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer abc.def.ghi")),
            Some("abc.def.ghi")
        );
        assert_eq!(
            extract_bearer_token(&headers_with("bearer abc")),
            Some("abc")
        );
    }

    #[test]
    fn test_extract_rejects_other_schemes() {
        assert_eq!(extract_bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer_token(&headers_with("Bearer")), None);
        assert_eq!(extract_bearer_token(&headers_with("Bearer   ")), None);
    }

    #[test]
    fn test_extract_missing_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_auth_error_status_codes() {
        let response = AuthError::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = AuthError::InvalidToken.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
