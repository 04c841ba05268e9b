// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Calculator route handlers. Every route requires a bearer token.

use crate::app::{ApiError, AppState};
use crate::models::calculator::{CalculationRequest, CalculationResponse, OperationsResponse};
use crate::services::auth_middleware::BearerClaims;
use crate::services::calculator::{perform_calculation, Operation};
use axum::{
    routing::{get, post},
    Json, Router,
};
use tracing::debug;

/// Create calculator router.
pub fn calculator_router() -> Router<AppState> {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/operations", get(list_operations_handler))
}

/// POST /calculator/calculate - Evaluate one operation.
async fn calculate_handler(
    BearerClaims(claims): BearerClaims,
    Json(payload): Json<CalculationRequest>,
) -> Result<Json<CalculationResponse>, ApiError> {
    debug!(
        sub = claims.get("sub").and_then(|v| v.as_str()).unwrap_or("-"),
        operation = %payload.operation,
        "calculation requested"
    );

    let result = perform_calculation(&payload.operation, payload.num1, payload.num2)?;

    Ok(Json(CalculationResponse {
        operation: payload.operation,
        result,
    }))
}

/// GET /calculator/operations - List the supported operations.
async fn list_operations_handler(_claims: BearerClaims) -> Json<OperationsResponse> {
    Json(OperationsResponse {
        available_operations: Operation::ALL
            .iter()
            .map(|op| op.as_str().to_string())
            .collect(),
    })
}
