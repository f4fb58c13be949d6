//! Wallet provisioning
//!
//! Registers an owner and opens its wallet (balance 0.00) in one unit of work.

use std::sync::Arc;

use tracing::info;

use super::FundsStore;
use super::error::FundsError;
use crate::core_types::OwnerId;
use crate::persistence::{StoreError, UnitOfWork};
use crate::wallet::Wallet;

pub struct WalletProvisioner<S> {
    store: Arc<S>,
}

impl<S> Clone for WalletProvisioner<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: FundsStore> WalletProvisioner<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn provision(&self, owner: OwnerId) -> Result<Wallet, FundsError> {
        let duplicate = |e: StoreError| match e {
            StoreError::Duplicate(_) => FundsError::AlreadyRegistered(owner),
            other => FundsError::from(other),
        };

        let mut uow = self.store.begin().await?;
        let wallet = Wallet::open(owner);

        // Dropping uow on error rolls back both inserts
        self.store.register(owner, &mut uow).await.map_err(duplicate)?;
        self.store.create(&wallet, &mut uow).await.map_err(duplicate)?;
        uow.commit().await.map_err(duplicate)?;

        info!(owner = %owner, wallet_id = %wallet.id, "Wallet provisioned");
        Ok(wallet)
    }
}
