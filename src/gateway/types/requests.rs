//! Request and response DTOs
//!
//! Amounts arrive as JSON strings and are parsed with [`Amount::parse`] in
//! the handler, so numbers, signs and a third decimal digit never reach the
//! funds core.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::wallet::Wallet;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TopUpRequest {
    /// Positive amount with at most 2 decimal places
    #[schema(example = "20.00")]
    pub amount: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferRequest {
    #[schema(example = "6f1c2d3e-4a5b-4c6d-8e7f-901234567890")]
    pub receiver_id: String,
    #[schema(example = "30.00")]
    pub amount: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Page size; non-positive or unparsable values select the default (50)
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MockOwnerResponse {
    #[schema(example = "6f1c2d3e-4a5b-4c6d-8e7f-901234567890")]
    pub owner_id: String,
    /// Bearer token for the new owner
    pub token: String,
    pub wallet: Wallet,
}
