//! Wallet row

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::core_types::{OwnerId, WalletId};
use crate::money::Amount;

/// One custodial balance per owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Wallet {
    #[schema(value_type = String, example = "1b4e28ba-2fa1-11d2-883f-0016d3cca427")]
    pub id: WalletId,
    #[schema(value_type = String, example = "6f1c2d3e-4a5b-4c6d-8e7f-901234567890")]
    pub owner_id: OwnerId,
    /// Never negative at any commit point
    #[schema(value_type = String, example = "70.00")]
    pub balance: Amount,
    pub created_at: DateTime<Utc>,
    /// Strictly increases on every balance write
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Fresh wallet for a newly registered owner, balance 0.00
    pub fn open(owner_id: OwnerId) -> Self {
        let now = Utc::now();
        Self {
            id: WalletId::new(),
            owner_id,
            balance: Amount::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Next `updated_at` for a row last written at `previous`.
///
/// Wall-clock time, bumped by one microsecond when the clock has not moved
/// past the previous write.
pub fn next_update_time(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    let floor = previous + chrono::Duration::microseconds(1);
    if now > floor { now } else { floor }
}
