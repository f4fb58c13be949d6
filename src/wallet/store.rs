//! Wallet Store capability

use async_trait::async_trait;

use super::models::Wallet;
use crate::core_types::{OwnerId, WalletId};
use crate::money::Amount;
use crate::persistence::{StoreError, UnitOfWorkSource};

/// Balance rows, one per owner.
///
/// Mutation is only allowed inside a unit of work that holds the row lock.
#[async_trait]
pub trait WalletStore: UnitOfWorkSource {
    /// Exclusive row lock held until `uow` ends.
    ///
    /// # Errors
    /// `WalletNotFound` if the owner has no wallet, `LockTimeout` if the lock
    /// is not granted within the backend's bound.
    async fn lock_for_update(
        &self,
        owner: OwnerId,
        uow: &mut Self::Uow,
    ) -> Result<Wallet, StoreError>;

    /// Overwrite the balance of a wallet already locked by `uow`.
    ///
    /// Returns the row as it will be committed (new balance, new `updated_at`).
    async fn replace_balance(
        &self,
        wallet_id: WalletId,
        new_balance: Amount,
        uow: &mut Self::Uow,
    ) -> Result<Wallet, StoreError>;

    /// Unlocked read of the last committed row
    async fn find_by_owner(&self, owner: OwnerId) -> Result<Option<Wallet>, StoreError>;

    /// Insert a new wallet row inside `uow`
    async fn create(&self, wallet: &Wallet, uow: &mut Self::Uow) -> Result<(), StoreError>;
}
