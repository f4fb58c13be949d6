//! Wallet handlers (balance, top-up)

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};

use super::super::auth::AuthenticatedOwner;
use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, TopUpRequest, ok};
use crate::money::Amount;
use crate::wallet::Wallet;

/// Caller's wallet
#[utoipa::path(
    get,
    path = "/api/v1/wallet/balance",
    responses(
        (status = 200, description = "Current wallet", body = Wallet, content_type = "application/json"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No wallet for this owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Wallet"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedOwner(owner)): Extension<AuthenticatedOwner>,
) -> ApiResult<Wallet> {
    ok(state.funds.balance(owner).await?)
}

/// Credit the caller's wallet
#[utoipa::path(
    post,
    path = "/api/v1/wallet/topup",
    request_body = TopUpRequest,
    responses(
        (status = 200, description = "Updated wallet", body = Wallet, content_type = "application/json"),
        (status = 400, description = "Invalid amount"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No wallet for this owner"),
        (status = 503, description = "Wallet busy, retry later")
    ),
    security(("bearer_auth" = [])),
    tag = "Wallet"
)]
pub async fn top_up(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedOwner(owner)): Extension<AuthenticatedOwner>,
    body: Result<Json<TopUpRequest>, JsonRejection>,
) -> ApiResult<Wallet> {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let amount = Amount::parse(&req.amount)?;

    ok(state.funds.top_up(owner, amount).await?)
}
