//! Store Error Types
//!
//! Errors raised by the persistence backends, independent of the backend in use.

use thiserror::Error;

use crate::core_types::{OwnerId, WalletId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Wallet not found for owner {0}")]
    WalletNotFound(OwnerId),

    /// Balance write attempted without holding the row lock
    #[error("Wallet {0} is not locked by this unit of work")]
    NotLocked(WalletId),

    #[error("Timed out waiting for a row lock")]
    LockTimeout,

    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            let message = db_err.message().to_string();
            match db_err.code().as_deref() {
                // lock_not_available: SET lock_timeout expired
                Some("55P03") => return StoreError::LockTimeout,
                // deadlock_detected / serialization_failure
                Some("40P01") | Some("40001") => return StoreError::Conflict(message),
                Some("23505") => return StoreError::Duplicate(message),
                Some("23514") => return StoreError::Constraint(message),
                _ => {}
            }
        }
        StoreError::Database(e.to_string())
    }
}
