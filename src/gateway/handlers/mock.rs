//! Mock owner provisioning for local development.
//!
//! Compiled only with the `mock-api` feature.

use std::sync::Arc;

use axum::extract::State;

use super::super::auth::issue_token;
use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, MockOwnerResponse, ok};
use crate::core_types::OwnerId;

const MOCK_TOKEN_TTL_HOURS: i64 = 24;

/// Provision a fresh owner with an empty wallet and return a bearer token
#[utoipa::path(
    post,
    path = "/internal/mock/owners",
    responses(
        (status = 200, description = "Owner provisioned", body = MockOwnerResponse, content_type = "application/json")
    ),
    tag = "Mock"
)]
pub async fn create_owner(State(state): State<Arc<AppState>>) -> ApiResult<MockOwnerResponse> {
    let owner = OwnerId::new();
    let wallet = state.funds.provision(owner).await?;
    let token = issue_token(
        &state.jwt_secret,
        owner,
        chrono::Duration::hours(MOCK_TOKEN_TTL_HOURS),
    )
    .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(owner = %owner, "[MOCK] Owner provisioned");
    ok(MockOwnerResponse {
        owner_id: owner.to_string(),
        token,
        wallet,
    })
}
