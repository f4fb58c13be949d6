//! Transfer Coordinator
//!
//! Moves an amount between two wallets in one unit of work.
//!
//! ```text
//! validate ──▶ resolve receiver ──▶ begin
//!                                     │
//!              lock lower id ◀────────┘
//!              lock higher id
//!              check balance, debit, credit
//!              insert success entry
//!              commit ──▶ Ok(entry)
//!
//! any error inside the unit of work:
//!              rollback ──▶ append failed entry (best effort) ──▶ Err
//! ```
//!
//! Locks are always taken in [`lock_order`], whichever side is the sender, so
//! opposite transfers between the same pair cannot wait on each other.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::FundsStore;
use super::error::FundsError;
use crate::core_types::{OwnerId, lock_order};
use crate::ledger::{Transaction, TransactionStatus};
use crate::money::Amount;
use crate::persistence::{UnitOfWork, UnitOfWorkSource};

pub struct TransferCoordinator<S> {
    store: Arc<S>,
}

impl<S> Clone for TransferCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: FundsStore> TransferCoordinator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Transfer `amount` from `sender` to `receiver`.
    ///
    /// Validation failures return before any lock or write. Failures after
    /// validation roll the unit of work back and leave one failed ledger
    /// entry behind, unless that audit write itself fails.
    pub async fn transfer(
        &self,
        sender: OwnerId,
        receiver: OwnerId,
        amount: Amount,
    ) -> Result<Transaction, FundsError> {
        if !amount.is_positive() {
            return Err(FundsError::InvalidAmount);
        }
        if sender == receiver {
            return Err(FundsError::SelfTransfer);
        }
        if !self.store.owner_exists(receiver).await? {
            return Err(FundsError::UserNotFound(receiver));
        }

        match self.execute(sender, receiver, amount).await {
            Ok(entry) => {
                info!(
                    transaction_id = %entry.id,
                    sender = %sender,
                    receiver = %receiver,
                    amount = %amount,
                    "Transfer committed"
                );
                Ok(entry)
            }
            Err(e) => {
                self.record_failure(sender, receiver, amount, &e).await;
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        sender: OwnerId,
        receiver: OwnerId,
        amount: Amount,
    ) -> Result<Transaction, FundsError> {
        let mut uow = self.store.begin().await?;

        match self.apply(sender, receiver, amount, &mut uow).await {
            Ok(entry) => {
                uow.commit().await?;
                Ok(entry)
            }
            Err(e) => {
                if let Err(rollback_err) = uow.rollback().await {
                    // The backend still discards the transaction on drop
                    warn!(error = %rollback_err, "Rollback after failed transfer reported an error");
                }
                Err(e)
            }
        }
    }

    async fn apply(
        &self,
        sender: OwnerId,
        receiver: OwnerId,
        amount: Amount,
        uow: &mut <S as UnitOfWorkSource>::Uow,
    ) -> Result<Transaction, FundsError> {
        let (first, second) = lock_order(sender, receiver);
        let first_wallet = self.store.lock_for_update(first, uow).await?;
        let second_wallet = self.store.lock_for_update(second, uow).await?;
        debug!(first = %first, second = %second, "Wallet pair locked");

        let (from, to) = if first == sender {
            (first_wallet, second_wallet)
        } else {
            (second_wallet, first_wallet)
        };

        if from.balance < amount {
            debug!(
                sender = %sender,
                balance = %from.balance,
                amount = %amount,
                "Insufficient balance"
            );
            return Err(FundsError::InsufficientBalance);
        }

        let debited = from.balance.checked_sub(amount).ok_or(FundsError::Overflow)?;
        let credited = to.balance.checked_add(amount).ok_or(FundsError::Overflow)?;

        self.store.replace_balance(from.id, debited, uow).await?;
        self.store.replace_balance(to.id, credited, uow).await?;

        let entry = Transaction::transfer(sender, receiver, amount, TransactionStatus::Success);
        self.store.insert(&entry, uow).await?;
        Ok(entry)
    }

    /// Best-effort audit of an aborted transfer. Never retried, never surfaced.
    async fn record_failure(
        &self,
        sender: OwnerId,
        receiver: OwnerId,
        amount: Amount,
        cause: &FundsError,
    ) {
        let entry = Transaction::transfer(sender, receiver, amount, TransactionStatus::Failed);
        match self.store.append(&entry).await {
            Ok(()) => info!(
                transaction_id = %entry.id,
                sender = %sender,
                receiver = %receiver,
                amount = %amount,
                reason = cause.code(),
                "Transfer failed"
            ),
            Err(audit_err) => warn!(
                sender = %sender,
                receiver = %receiver,
                amount = %amount,
                reason = cause.code(),
                error = %audit_err,
                "Transfer failed and the failed entry could not be recorded"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionKind;
    use crate::money::MAX_CENTS;
    use crate::persistence::MemoryStore;
    use crate::persistence::memory::Fault;
    use crate::wallet::WalletStore;
    use std::time::Duration;

    fn setup() -> (Arc<MemoryStore>, TransferCoordinator<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(Duration::from_millis(100)));
        (store.clone(), TransferCoordinator::new(store))
    }

    async fn balance(store: &MemoryStore, owner: OwnerId) -> Amount {
        store.find_by_owner(owner).await.unwrap().unwrap().balance
    }

    #[tokio::test]
    async fn test_successful_transfer() {
        let (store, coordinator) = setup();
        let a = OwnerId::new();
        let b = OwnerId::new();
        store.seed_wallet(a, Amount::from_cents(10_000));
        store.seed_wallet(b, Amount::from_cents(5_000));

        let entry = coordinator
            .transfer(a, b, Amount::from_cents(3_000))
            .await
            .unwrap();

        assert_eq!(entry.sender_id, Some(a));
        assert_eq!(entry.receiver_id, b);
        assert_eq!(entry.amount, Amount::from_cents(3_000));
        assert_eq!(entry.kind, TransactionKind::Transfer);
        assert_eq!(entry.status, TransactionStatus::Success);
        assert_eq!(balance(&store, a).await, Amount::from_cents(7_000));
        assert_eq!(balance(&store, b).await, Amount::from_cents(8_000));
        assert_eq!(store.ledger_snapshot().await, vec![entry]);
    }

    #[tokio::test]
    async fn test_transfer_of_entire_balance() {
        let (store, coordinator) = setup();
        let a = OwnerId::new();
        let b = OwnerId::new();
        store.seed_wallet(a, Amount::from_cents(100));
        store.seed_wallet(b, Amount::ZERO);

        coordinator.transfer(a, b, Amount::from_cents(100)).await.unwrap();
        assert_eq!(balance(&store, a).await, Amount::ZERO);
        assert_eq!(balance(&store, b).await, Amount::from_cents(100));
    }

    #[tokio::test]
    async fn test_validation_has_no_side_effects() {
        let (store, coordinator) = setup();
        let a = OwnerId::new();
        let b = OwnerId::new();
        store.seed_wallet(a, Amount::from_cents(1_000));
        store.seed_wallet(b, Amount::ZERO);

        let err = coordinator.transfer(a, a, Amount::from_cents(1)).await.unwrap_err();
        assert_eq!(err, FundsError::SelfTransfer);

        let err = coordinator.transfer(a, b, Amount::ZERO).await.unwrap_err();
        assert_eq!(err, FundsError::InvalidAmount);

        let stranger = OwnerId::new();
        let err = coordinator
            .transfer(a, stranger, Amount::from_cents(1))
            .await
            .unwrap_err();
        assert_eq!(err, FundsError::UserNotFound(stranger));

        assert!(store.ledger_snapshot().await.is_empty());
        assert_eq!(balance(&store, a).await, Amount::from_cents(1_000));
    }

    #[tokio::test]
    async fn test_insufficient_balance_records_one_failed_entry() {
        let (store, coordinator) = setup();
        let a = OwnerId::new();
        let b = OwnerId::new();
        store.seed_wallet(a, Amount::from_cents(10_000));
        store.seed_wallet(b, Amount::from_cents(5_000));

        let err = coordinator
            .transfer(a, b, Amount::from_cents(15_000))
            .await
            .unwrap_err();
        assert_eq!(err, FundsError::InsufficientBalance);
        assert_eq!(balance(&store, a).await, Amount::from_cents(10_000));
        assert_eq!(balance(&store, b).await, Amount::from_cents(5_000));

        let ledger = store.ledger_snapshot().await;
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].status, TransactionStatus::Failed);
        assert_eq!(ledger[0].sender_id, Some(a));
        assert_eq!(ledger[0].receiver_id, b);
        assert_eq!(ledger[0].amount, Amount::from_cents(15_000));
    }

    #[tokio::test]
    async fn test_sender_without_wallet() {
        let (store, coordinator) = setup();
        let a = OwnerId::new();
        let b = OwnerId::new();
        store.seed_wallet(b, Amount::ZERO);

        let err = coordinator.transfer(a, b, Amount::from_cents(1)).await.unwrap_err();
        assert_eq!(err, FundsError::WalletNotFound(a));
        assert_eq!(store.ledger_snapshot().await.len(), 1);
        assert_eq!(balance(&store, b).await, Amount::ZERO);
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_replace_primary_error() {
        let (store, coordinator) = setup();
        let a = OwnerId::new();
        let b = OwnerId::new();
        store.seed_wallet(a, Amount::from_cents(100));
        store.seed_wallet(b, Amount::ZERO);
        store.inject(Fault::Append, true);

        let err = coordinator
            .transfer(a, b, Amount::from_cents(500))
            .await
            .unwrap_err();
        assert_eq!(err, FundsError::InsufficientBalance);
        assert!(store.ledger_snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_lock_timeout_rolls_back() {
        let (store, coordinator) = setup();
        let a = OwnerId::new();
        let b = OwnerId::new();
        store.seed_wallet(a, Amount::from_cents(1_000));
        store.seed_wallet(b, Amount::from_cents(1_000));

        // Hold the receiver's row so the transfer cannot finish
        let mut holder = store.begin().await.unwrap();
        store.lock_for_update(b, &mut holder).await.unwrap();

        let err = coordinator
            .transfer(a, b, Amount::from_cents(100))
            .await
            .unwrap_err();
        assert_eq!(err, FundsError::LockTimeout);
        drop(holder);

        assert_eq!(balance(&store, a).await, Amount::from_cents(1_000));
        assert_eq!(balance(&store, b).await, Amount::from_cents(1_000));
        let ledger = store.ledger_snapshot().await;
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].status, TransactionStatus::Failed);

        // Both locks were released
        coordinator.transfer(a, b, Amount::from_cents(100)).await.unwrap();
    }

    #[tokio::test]
    async fn test_credit_overflow_is_rejected() {
        let (store, coordinator) = setup();
        let a = OwnerId::new();
        let b = OwnerId::new();
        store.seed_wallet(a, Amount::from_cents(100));
        store.seed_wallet(b, Amount::from_cents(MAX_CENTS));

        let err = coordinator.transfer(a, b, Amount::from_cents(1)).await.unwrap_err();
        assert_eq!(err, FundsError::Overflow);
        assert_eq!(balance(&store, a).await, Amount::from_cents(100));
    }

    #[tokio::test]
    async fn test_retry_after_failure_is_a_new_entry() {
        let (store, coordinator) = setup();
        let a = OwnerId::new();
        let b = OwnerId::new();
        store.seed_wallet(a, Amount::from_cents(100));
        store.seed_wallet(b, Amount::ZERO);

        coordinator.transfer(a, b, Amount::from_cents(200)).await.unwrap_err();
        store.seed_wallet(a, Amount::from_cents(300));
        let ok = coordinator.transfer(a, b, Amount::from_cents(200)).await.unwrap();

        let ledger = store.ledger_snapshot().await;
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].status, TransactionStatus::Failed);
        assert_eq!(ledger[1].id, ok.id);
        assert_ne!(ledger[0].id, ledger[1].id);
    }

    /// Inject `fault`, run a 30.00 transfer from 100.00 to 50.00, then check
    /// nothing moved and exactly one failed entry was recorded.
    async fn assert_fault_leaves_balances(fault: Fault) {
        let (store, coordinator) = setup();
        let a = OwnerId::new();
        let b = OwnerId::new();
        store.seed_wallet(a, Amount::from_cents(10_000));
        store.seed_wallet(b, Amount::from_cents(5_000));
        store.inject(fault, true);

        let err = coordinator
            .transfer(a, b, Amount::from_cents(3_000))
            .await
            .unwrap_err();
        assert!(matches!(err, FundsError::Persistence(_)), "{fault:?}: got {err:?}");
        assert_eq!(balance(&store, a).await, Amount::from_cents(10_000));
        assert_eq!(balance(&store, b).await, Amount::from_cents(5_000));

        let ledger = store.ledger_snapshot().await;
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].status, TransactionStatus::Failed);
        assert_eq!(ledger[0].sender_id, Some(a));

        // Row locks were released with the failed unit of work
        store.inject(fault, false);
        coordinator.transfer(a, b, Amount::from_cents(3_000)).await.unwrap();
        assert_eq!(balance(&store, a).await, Amount::from_cents(7_000));
        assert_eq!(balance(&store, b).await, Amount::from_cents(8_000));
    }

    #[tokio::test]
    async fn test_ledger_insert_failure_rolls_back() {
        assert_fault_leaves_balances(Fault::Insert).await;
    }

    #[tokio::test]
    async fn test_balance_write_failure_rolls_back() {
        assert_fault_leaves_balances(Fault::BalanceWrite).await;
    }

    #[tokio::test]
    async fn test_commit_failure_rolls_back() {
        assert_fault_leaves_balances(Fault::Commit).await;
    }
}
