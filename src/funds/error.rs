//! Funds Error Types
//!
//! One taxonomy for transfers, top-ups, history reads and provisioning.

use thiserror::Error;

use crate::core_types::OwnerId;
use crate::persistence::StoreError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FundsError {
    // === Validation Errors (no side effects) ===
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Sender and receiver cannot be the same")]
    SelfTransfer,

    #[error("User not found: {0}")]
    UserNotFound(OwnerId),

    // === Unit-of-work Errors (rolled back) ===
    #[error("Wallet not found for owner {0}")]
    WalletNotFound(OwnerId),

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Balance arithmetic would overflow")]
    Overflow,

    #[error("Timed out waiting for a wallet lock")]
    LockTimeout,

    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    // === Provisioning ===
    #[error("Owner already registered: {0}")]
    AlreadyRegistered(OwnerId),
}

impl FundsError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            FundsError::InvalidAmount => "INVALID_AMOUNT",
            FundsError::SelfTransfer => "SELF_TRANSFER",
            FundsError::UserNotFound(_) => "USER_NOT_FOUND",
            FundsError::WalletNotFound(_) => "WALLET_NOT_FOUND",
            FundsError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            FundsError::Overflow => "OVERFLOW",
            FundsError::LockTimeout => "LOCK_TIMEOUT",
            FundsError::Conflict(_) => "CONFLICT",
            FundsError::Persistence(_) => "PERSISTENCE_FAILURE",
            FundsError::AlreadyRegistered(_) => "ALREADY_REGISTERED",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            FundsError::InvalidAmount | FundsError::SelfTransfer | FundsError::Overflow => 400,
            FundsError::UserNotFound(_) | FundsError::WalletNotFound(_) => 404,
            FundsError::AlreadyRegistered(_) => 409,
            FundsError::InsufficientBalance => 422,
            FundsError::LockTimeout | FundsError::Conflict(_) => 503,
            FundsError::Persistence(_) => 500,
        }
    }

    /// Client-side rejection, as opposed to a server or lock failure
    pub fn is_business_error(&self) -> bool {
        self.http_status() < 500
    }
}

impl From<StoreError> for FundsError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::WalletNotFound(owner) => FundsError::WalletNotFound(owner),
            StoreError::LockTimeout => FundsError::LockTimeout,
            StoreError::Conflict(msg) => FundsError::Conflict(msg),
            other => FundsError::Persistence(other.to_string()),
        }
    }
}
