//! Transfer and history handlers

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::JsonRejection},
};

use super::super::auth::AuthenticatedOwner;
use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, HistoryQuery, TransferRequest, ok};
use crate::core_types::OwnerId;
use crate::ledger::{Transaction, parse_limit};
use crate::money::Amount;

/// Transfer from the caller to another owner
///
/// A rejected transfer that got past validation still leaves a `failed`
/// entry in the caller's history.
#[utoipa::path(
    post,
    path = "/api/v1/transactions/transfer",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Committed ledger entry", body = Transaction, content_type = "application/json"),
        (status = 400, description = "Invalid amount, receiver id or self transfer"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Receiver or wallet not found"),
        (status = 422, description = "Insufficient balance"),
        (status = 503, description = "Wallet busy, retry later")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedOwner(sender)): Extension<AuthenticatedOwner>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<Transaction> {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let receiver: OwnerId = req
        .receiver_id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid receiver_id"))?;
    let amount = Amount::parse(&req.amount)?;

    ok(state.funds.transfer(sender, receiver, amount).await?)
}

/// Caller's ledger entries, newest first
#[utoipa::path(
    get,
    path = "/api/v1/transactions/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Ledger entries", body = Vec<Transaction>, content_type = "application/json"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn history(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedOwner(owner)): Extension<AuthenticatedOwner>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<Transaction>> {
    let limit = parse_limit(query.limit.as_deref());
    ok(state.funds.history(owner, limit).await?)
}
