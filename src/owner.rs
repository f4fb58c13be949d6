//! Owner directory
//!
//! Resolves whether an owner identity is known. Credentials live elsewhere;
//! this only tracks the identities that have been provisioned.

use async_trait::async_trait;

use crate::core_types::OwnerId;
use crate::persistence::{StoreError, UnitOfWorkSource};

#[async_trait]
pub trait OwnerDirectory: UnitOfWorkSource {
    /// Unlocked existence check on committed state
    async fn owner_exists(&self, owner: OwnerId) -> Result<bool, StoreError>;

    /// Register `owner` inside `uow`.
    ///
    /// # Errors
    /// `Duplicate` if the owner is already registered.
    async fn register(&self, owner: OwnerId, uow: &mut Self::Uow) -> Result<(), StoreError>;
}
