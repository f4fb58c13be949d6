//! Funds movement core
//!
//! Coordinators for transfers, top-ups and provisioning, plus the
//! [`FundsService`] facade the gateway consumes. The backend is picked once,
//! when [`Funds`] is constructed.

pub mod error;
pub mod provision;
pub mod top_up;
pub mod transfer;

use std::sync::Arc;

use async_trait::async_trait;

pub use error::FundsError;
pub use provision::WalletProvisioner;
pub use top_up::TopUpCoordinator;
pub use transfer::TransferCoordinator;

use crate::config::FundsConfig;
use crate::core_types::OwnerId;
use crate::ledger::{HistoryReader, Ledger, Transaction};
use crate::money::Amount;
use crate::owner::OwnerDirectory;
use crate::persistence::UnitOfWorkSource;
use crate::wallet::{Wallet, WalletStore};

/// Every capability the coordinators need from one backend
pub trait FundsStore: WalletStore + Ledger + OwnerDirectory {}

impl<T: WalletStore + Ledger + OwnerDirectory> FundsStore for T {}

/// Object-safe entry point for the request layer
#[async_trait]
pub trait FundsService: Send + Sync {
    async fn transfer(
        &self,
        sender: OwnerId,
        receiver: OwnerId,
        amount: Amount,
    ) -> Result<Transaction, FundsError>;

    async fn top_up(&self, owner: OwnerId, amount: Amount) -> Result<Wallet, FundsError>;

    /// `limit`: `None`, zero or negative selects the default page size
    async fn history(
        &self,
        owner: OwnerId,
        limit: Option<i64>,
    ) -> Result<Vec<Transaction>, FundsError>;

    /// Unlocked read of the committed wallet
    async fn balance(&self, owner: OwnerId) -> Result<Wallet, FundsError>;

    async fn provision(&self, owner: OwnerId) -> Result<Wallet, FundsError>;

    async fn health_check(&self) -> Result<(), FundsError>;
}

pub struct Funds<S> {
    store: Arc<S>,
    transfers: TransferCoordinator<S>,
    top_ups: TopUpCoordinator<S>,
    history: HistoryReader<S>,
    provisioner: WalletProvisioner<S>,
}

impl<S: FundsStore> Funds<S> {
    pub fn new(store: Arc<S>, config: &FundsConfig) -> Self {
        Self {
            transfers: TransferCoordinator::new(store.clone()),
            top_ups: TopUpCoordinator::new(store.clone()),
            history: HistoryReader::new(
                store.clone(),
                config.history_default_limit,
                config.history_max_limit,
            ),
            provisioner: WalletProvisioner::new(store.clone()),
            store,
        }
    }
}

#[async_trait]
impl<S: FundsStore> FundsService for Funds<S> {
    async fn transfer(
        &self,
        sender: OwnerId,
        receiver: OwnerId,
        amount: Amount,
    ) -> Result<Transaction, FundsError> {
        self.transfers.transfer(sender, receiver, amount).await
    }

    async fn top_up(&self, owner: OwnerId, amount: Amount) -> Result<Wallet, FundsError> {
        self.top_ups.top_up(owner, amount).await
    }

    async fn history(
        &self,
        owner: OwnerId,
        limit: Option<i64>,
    ) -> Result<Vec<Transaction>, FundsError> {
        Ok(self.history.history(owner, limit).await?)
    }

    async fn balance(&self, owner: OwnerId) -> Result<Wallet, FundsError> {
        self.store
            .find_by_owner(owner)
            .await?
            .ok_or(FundsError::WalletNotFound(owner))
    }

    async fn provision(&self, owner: OwnerId) -> Result<Wallet, FundsError> {
        self.provisioner.provision(owner).await
    }

    async fn health_check(&self) -> Result<(), FundsError> {
        Ok(UnitOfWorkSource::health_check(self.store.as_ref()).await?)
    }
}
