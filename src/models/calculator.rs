// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to evaluate one arithmetic operation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CalculationRequest {
    /// One of `add`, `subtract`, `multiply`, `divide`, `power`, `square_root`
    pub operation: String,
    pub num1: f64,
    /// Not needed for `square_root`
    #[serde(default)]
    pub num2: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CalculationResponse {
    pub operation: String,
    pub result: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OperationsResponse {
    pub available_operations: Vec<String>,
}
