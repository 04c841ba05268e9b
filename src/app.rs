// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, route handlers, and router construction.
//!
//! This module is `pub` so that integration tests can build a test router directly
//! without starting the full binary.

use crate::models::auth::{GoogleAuthRequest, GoogleAuthResponse};
use crate::models::calculator::{CalculationRequest, CalculationResponse, OperationsResponse};
use crate::models::crawler::{CrawlError, CrawlRequest, ScrapeResponse};
use crate::models::version::{ErrorResponse, MessageResponse, VersionResponse};
use crate::routes::{auth_router, calculator_router};
use crate::services::calculator::CalculationError;
use crate::services::engine::CrawlEngine;
use crate::services::token::TokenVerifier;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::env;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use utoipa::OpenApi;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `AUTOPOSTER_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("AUTOPOSTER_VERSION");

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// HTTP-layer settings that are not tied to a service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The one browser origin allowed to call the API with credentials
    pub cors_allowed_origin: HeaderValue,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origin: HeaderValue::from_static("http://localhost:3000"),
        }
    }
}

impl ServerConfig {
    /// Load server configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let Ok(origin) = env::var("CORS_ALLOWED_ORIGIN") else {
            return Ok(Self::default());
        };

        Ok(Self {
            cors_allowed_origin: HeaderValue::from_str(&origin)
                .context("CORS_ALLOWED_ORIGIN must be a valid header value")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// The process-wide crawl engine. Its loop starts on the first scrape.
    pub engine: Arc<CrawlEngine>,
    pub token_verifier: Arc<TokenVerifier>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error response carrying a status code and a `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

impl From<CrawlError> for ApiError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::InvalidRequest(_) => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            _ => {
                error!(error = %err, "scrape failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}

impl From<CalculationError> for ApiError {
    fn from(err: CalculationError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

pub async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "AutoPoster backend is running".to_string(),
    })
}

pub async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        agent: "autoposter-agent".to_string(),
        version: VERSION.to_string(),
    })
}

/// POST /scrape - Crawl the given URLs and return their visible text.
pub async fn scrape_handler(
    State(state): State<AppState>,
    Json(payload): Json<CrawlRequest>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    info!(urls = payload.urls.len(), "scrape requested");
    let data = state.engine.crawl(payload).await?;
    Ok(Json(ScrapeResponse { data }))
}

#[derive(OpenApi)]
#[openapi(components(schemas(
    CrawlRequest,
    ScrapeResponse,
    ErrorResponse,
    MessageResponse,
    VersionResponse,
    GoogleAuthRequest,
    GoogleAuthResponse,
    CalculationRequest,
    CalculationResponse,
    OperationsResponse
)))]
pub struct ApiDoc;

pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(server.cors_allowed_origin.clone())
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Build the Axum application router.
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/version", get(version_handler))
        .route("/api-docs/openapi.json", get(openapi_handler))
        .route("/scrape", post(scrape_handler))
        .nest("/auth", auth_router())
        .nest("/calculator", calculator_router())
        .with_state(state)
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_invalid_request_maps_to_bad_request() {
        let err: ApiError = CrawlError::InvalidRequest("empty".to_string()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_job_failure_maps_to_server_error() {
        let err: ApiError = CrawlError::JobFailure {
            job_id: Uuid::now_v7(),
            source: Box::new(CrawlError::FetchFailure {
                url: "https://a.example/404".to_string(),
                reason: "HTTP status 404 Not Found".to_string(),
            }),
        }
        .into();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.detail.contains("https://a.example/404"));
    }

    #[test]
    fn test_engine_errors_map_to_server_error() {
        let err: ApiError = CrawlError::StartupFailure("no threads".to_string()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_calculation_errors_map_by_kind() {
        let err: ApiError = CalculationError::DivideByZero.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.detail, "Cannot divide by zero");

        let err: ApiError =
            CalculationError::MissingOperand(crate::services::calculator::Operation::Add).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_default_cors_origin() {
        assert_eq!(
            ServerConfig::default().cors_allowed_origin,
            "http://localhost:3000"
        );
    }

    #[test]
    fn test_openapi_lists_scrape_schemas() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let schemas = &doc["components"]["schemas"];
        assert!(schemas.get("CrawlRequest").is_some());
        assert!(schemas.get("ScrapeResponse").is_some());
    }
}
