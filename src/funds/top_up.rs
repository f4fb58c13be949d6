//! Top-Up Coordinator
//!
//! Credits one wallet. A single row lock, so ordering does not matter here.

use std::sync::Arc;

use tracing::{info, warn};

use super::FundsStore;
use super::error::FundsError;
use crate::core_types::OwnerId;
use crate::ledger::Transaction;
use crate::money::Amount;
use crate::persistence::{UnitOfWork, UnitOfWorkSource};
use crate::wallet::Wallet;

pub struct TopUpCoordinator<S> {
    store: Arc<S>,
}

impl<S> Clone for TopUpCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: FundsStore> TopUpCoordinator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Credit `amount` to the owner's wallet and return the updated row
    pub async fn top_up(&self, owner: OwnerId, amount: Amount) -> Result<Wallet, FundsError> {
        if !amount.is_positive() {
            return Err(FundsError::InvalidAmount);
        }

        let mut uow = self.store.begin().await?;
        match self.apply(owner, amount, &mut uow).await {
            Ok((wallet, entry)) => {
                uow.commit().await?;
                info!(
                    transaction_id = %entry.id,
                    owner = %owner,
                    amount = %amount,
                    balance = %wallet.balance,
                    "Top-up committed"
                );
                Ok(wallet)
            }
            Err(e) => {
                if let Err(rollback_err) = uow.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed top-up reported an error");
                }
                warn!(owner = %owner, amount = %amount, reason = e.code(), "Top-up failed");
                Err(e)
            }
        }
    }

    async fn apply(
        &self,
        owner: OwnerId,
        amount: Amount,
        uow: &mut <S as UnitOfWorkSource>::Uow,
    ) -> Result<(Wallet, Transaction), FundsError> {
        let wallet = self.store.lock_for_update(owner, uow).await?;
        let credited = wallet.balance.checked_add(amount).ok_or(FundsError::Overflow)?;
        let updated = self.store.replace_balance(wallet.id, credited, uow).await?;

        let entry = Transaction::top_up(owner, amount);
        self.store.insert(&entry, uow).await?;
        Ok((updated, entry))
    }
}
