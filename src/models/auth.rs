// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Google sign-in token handed over by the frontend.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct GoogleAuthRequest {
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct GoogleAuthResponse {
    pub access_token: String,
}
