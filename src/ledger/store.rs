//! Ledger capability

use async_trait::async_trait;

use super::models::Transaction;
use crate::core_types::OwnerId;
use crate::persistence::{StoreError, UnitOfWorkSource};

/// Append-only store of ledger entries
#[async_trait]
pub trait Ledger: UnitOfWorkSource {
    /// Insert inside `uow`; visible only after commit
    async fn insert(&self, entry: &Transaction, uow: &mut Self::Uow) -> Result<(), StoreError>;

    /// Standalone auto-committed insert, outside any unit of work.
    ///
    /// Used for audit entries written after a unit of work has aborted.
    async fn append(&self, entry: &Transaction) -> Result<(), StoreError>;

    /// Entries where `owner` is sender or receiver, newest first, at most `limit`
    async fn list_by_owner(
        &self,
        owner: OwnerId,
        limit: usize,
    ) -> Result<Vec<Transaction>, StoreError>;
}
