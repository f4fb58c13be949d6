//! In-process backend.
//!
//! Committed wallet rows live in a `DashMap`. Each wallet row has its own
//! `tokio::sync::Mutex`; a unit of work holds the owned guards and stages its
//! writes until commit.
//!
//! Commit publishes every staged row and ledger entry while holding the
//! `published` gate exclusively. Readers take the gate shared, so they see
//! either none or all of a unit of work. Row-lock waits never touch the gate.

use std::collections::HashMap;
use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, warn};

use super::{StoreError, UnitOfWork, UnitOfWorkSource};
use crate::core_types::{OwnerId, WalletId};
use crate::ledger::Ledger;
use crate::ledger::history::newest_first;
use crate::ledger::models::Transaction;
use crate::money::Amount;
use crate::owner::OwnerDirectory;
use crate::wallet::{Wallet, WalletStore, next_update_time};

/// Write paths that tests can make fail
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub(crate) enum Fault {
    Append,
    Insert,
    BalanceWrite,
    Commit,
}

#[cfg(test)]
#[derive(Default)]
struct Faults([AtomicBool; 4]);

#[cfg(test)]
impl Faults {
    fn check(&self, fault: Fault) -> Result<(), StoreError> {
        if self.0[fault as usize].load(Ordering::SeqCst) {
            return Err(StoreError::Database(format!("injected {fault:?} failure")));
        }
        Ok(())
    }
}

struct Inner {
    /// Last committed row per owner
    wallets: DashMap<OwnerId, Wallet>,
    row_locks: DashMap<OwnerId, Arc<Mutex<()>>>,
    owners: DashMap<OwnerId, DateTime<Utc>>,
    ledger: RwLock<Vec<Transaction>>,
    /// Exclusive while a commit publishes, shared for committed reads
    published: RwLock<()>,
    lock_timeout: Duration,
    #[cfg(test)]
    faults: Faults,
}

/// Thread-safe in-memory store. Clones share the same state.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                wallets: DashMap::new(),
                row_locks: DashMap::new(),
                owners: DashMap::new(),
                ledger: RwLock::new(Vec::new()),
                published: RwLock::new(()),
                lock_timeout,
                #[cfg(test)]
                faults: Faults::default(),
            }),
        }
    }

    /// Register `owner` with a wallet holding `balance`, bypassing the ledger.
    ///
    /// Fixture helper for tests and local `--in-memory` runs.
    pub fn seed_wallet(&self, owner: OwnerId, balance: Amount) -> Wallet {
        let mut wallet = Wallet::open(owner);
        wallet.balance = balance;
        self.inner.owners.entry(owner).or_insert_with(Utc::now);
        self.inner.wallets.insert(owner, wallet.clone());
        wallet
    }

    /// Snapshot of every ledger entry, in insertion order
    pub async fn ledger_snapshot(&self) -> Vec<Transaction> {
        let _gate = self.inner.published.read().await;
        self.inner.ledger.read().await.clone()
    }

    /// Sum of all committed balances, `None` if the sum overflows
    pub async fn total_balance(&self) -> Option<Amount> {
        let _gate = self.inner.published.read().await;
        self.inner
            .wallets
            .iter()
            .try_fold(Amount::ZERO, |acc, row| acc.checked_add(row.value().balance))
    }

    #[cfg(test)]
    pub(crate) fn inject(&self, fault: Fault, fail: bool) {
        self.inner.faults.0[fault as usize].store(fail, Ordering::SeqCst);
    }
}

/// Unit of work over [`MemoryStore`].
///
/// Dropping it discards staged writes and releases the row locks.
pub struct MemoryUnitOfWork {
    inner: Arc<Inner>,
    guards: HashMap<OwnerId, OwnedMutexGuard<()>>,
    /// Locked rows with their pending values
    locked: HashMap<OwnerId, Wallet>,
    new_wallets: HashMap<OwnerId, Wallet>,
    new_owners: Vec<OwnerId>,
    entries: Vec<Transaction>,
}

impl MemoryUnitOfWork {
    fn staged_mut(&mut self, wallet_id: WalletId) -> Option<&mut Wallet> {
        if let Some(w) = self.locked.values_mut().find(|w| w.id == wallet_id) {
            return Some(w);
        }
        self.new_wallets.values_mut().find(|w| w.id == wallet_id)
    }

    /// Undo a partially published registration
    fn unpublish(inner: &Inner, owners: &[OwnerId], wallets: &[OwnerId]) {
        for owner in owners {
            inner.owners.remove(owner);
        }
        for owner in wallets {
            inner.wallets.remove(owner);
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(mut self) -> Result<(), StoreError> {
        #[cfg(test)]
        self.inner.faults.check(Fault::Commit)?;

        let inner = self.inner.clone();
        let _gate = inner.published.write().await;

        // New owners and wallets first; these are the only writes that can
        // still collide with another unit of work.
        let mut published_owners = Vec::with_capacity(self.new_owners.len());
        for owner in &self.new_owners {
            // The entry guard must be released before unpublish touches the map
            let taken = match inner.owners.entry(*owner) {
                Entry::Occupied(_) => true,
                Entry::Vacant(slot) => {
                    slot.insert(Utc::now());
                    false
                }
            };
            if taken {
                Self::unpublish(&inner, &published_owners, &[]);
                return Err(StoreError::Duplicate(format!("owner {owner}")));
            }
            published_owners.push(*owner);
        }
        let mut published_wallets = Vec::with_capacity(self.new_wallets.len());
        for (owner, wallet) in self.new_wallets.drain() {
            let taken = match inner.wallets.entry(owner) {
                Entry::Occupied(_) => true,
                Entry::Vacant(slot) => {
                    slot.insert(wallet);
                    false
                }
            };
            if taken {
                Self::unpublish(&inner, &published_owners, &published_wallets);
                return Err(StoreError::Duplicate(format!("wallet for owner {owner}")));
            }
            published_wallets.push(owner);
        }

        // Locked rows: we hold their mutexes, nobody else can write them
        for (owner, wallet) in self.locked.drain() {
            inner.wallets.insert(owner, wallet);
        }

        if !self.entries.is_empty() {
            let mut ledger = inner.ledger.write().await;
            ledger.append(&mut self.entries);
        }

        // Gate drops first, then the row guards with self
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        debug!(
            locked = self.guards.len(),
            staged_entries = self.entries.len(),
            "Memory unit of work rolled back"
        );
        Ok(())
    }
}

#[async_trait]
impl UnitOfWorkSource for MemoryStore {
    type Uow = MemoryUnitOfWork;

    async fn begin(&self) -> Result<MemoryUnitOfWork, StoreError> {
        Ok(MemoryUnitOfWork {
            inner: self.inner.clone(),
            guards: HashMap::new(),
            locked: HashMap::new(),
            new_wallets: HashMap::new(),
            new_owners: Vec::new(),
            entries: Vec::new(),
        })
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl WalletStore for MemoryStore {
    async fn lock_for_update(
        &self,
        owner: OwnerId,
        uow: &mut MemoryUnitOfWork,
    ) -> Result<Wallet, StoreError> {
        // Re-entrant within one unit of work
        if let Some(wallet) = uow.locked.get(&owner) {
            return Ok(wallet.clone());
        }
        if let Some(wallet) = uow.new_wallets.get(&owner) {
            return Ok(wallet.clone());
        }
        if !self.inner.wallets.contains_key(&owner) {
            return Err(StoreError::WalletNotFound(owner));
        }

        // Clone the Arc out so no DashMap guard is held across the await
        let row_lock = self
            .inner
            .row_locks
            .entry(owner)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = match tokio::time::timeout(self.inner.lock_timeout, row_lock.lock_owned()).await
        {
            Ok(guard) => guard,
            Err(_) => {
                let timeout_ms = self.inner.lock_timeout.as_millis() as u64;
                warn!(owner = %owner, timeout_ms, "Row lock timed out");
                return Err(StoreError::LockTimeout);
            }
        };

        // Only the holder of the row mutex publishes this row
        let wallet = self
            .inner
            .wallets
            .get(&owner)
            .map(|row| row.value().clone())
            .ok_or(StoreError::WalletNotFound(owner))?;

        uow.guards.insert(owner, guard);
        uow.locked.insert(owner, wallet.clone());
        Ok(wallet)
    }

    async fn replace_balance(
        &self,
        wallet_id: WalletId,
        new_balance: Amount,
        uow: &mut MemoryUnitOfWork,
    ) -> Result<Wallet, StoreError> {
        #[cfg(test)]
        self.inner.faults.check(Fault::BalanceWrite)?;

        if new_balance.is_negative() {
            return Err(StoreError::Constraint(format!(
                "balance of wallet {wallet_id} would become {new_balance}"
            )));
        }
        let wallet = uow
            .staged_mut(wallet_id)
            .ok_or(StoreError::NotLocked(wallet_id))?;
        wallet.balance = new_balance;
        wallet.updated_at = next_update_time(wallet.updated_at);
        Ok(wallet.clone())
    }

    async fn find_by_owner(&self, owner: OwnerId) -> Result<Option<Wallet>, StoreError> {
        let _gate = self.inner.published.read().await;
        Ok(self.inner.wallets.get(&owner).map(|row| row.value().clone()))
    }

    async fn create(&self, wallet: &Wallet, uow: &mut MemoryUnitOfWork) -> Result<(), StoreError> {
        if wallet.balance.is_negative() {
            return Err(StoreError::Constraint("negative opening balance".to_string()));
        }
        let owner = wallet.owner_id;
        if self.inner.wallets.contains_key(&owner) || uow.new_wallets.contains_key(&owner) {
            return Err(StoreError::Duplicate(format!("wallet for owner {owner}")));
        }
        uow.new_wallets.insert(owner, wallet.clone());
        Ok(())
    }
}

#[async_trait]
impl Ledger for MemoryStore {
    async fn insert(&self, entry: &Transaction, uow: &mut MemoryUnitOfWork) -> Result<(), StoreError> {
        #[cfg(test)]
        self.inner.faults.check(Fault::Insert)?;

        if !entry.amount.is_positive() {
            return Err(StoreError::Constraint("ledger amount must be positive".to_string()));
        }
        uow.entries.push(entry.clone());
        Ok(())
    }

    async fn append(&self, entry: &Transaction) -> Result<(), StoreError> {
        #[cfg(test)]
        self.inner.faults.check(Fault::Append)?;

        if !entry.amount.is_positive() {
            return Err(StoreError::Constraint("ledger amount must be positive".to_string()));
        }
        self.inner.ledger.write().await.push(entry.clone());
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner: OwnerId,
        limit: usize,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut entries: Vec<Transaction> = {
            let _gate = self.inner.published.read().await;
            let ledger = self.inner.ledger.read().await;
            ledger
                .iter()
                .filter(|entry| entry.involves(owner))
                .cloned()
                .collect()
        };

        entries.sort_by(newest_first);
        entries.truncate(limit);
        Ok(entries)
    }
}

#[async_trait]
impl OwnerDirectory for MemoryStore {
    async fn owner_exists(&self, owner: OwnerId) -> Result<bool, StoreError> {
        let _gate = self.inner.published.read().await;
        Ok(self.inner.owners.contains_key(&owner))
    }

    async fn register(&self, owner: OwnerId, uow: &mut MemoryUnitOfWork) -> Result<(), StoreError> {
        if self.inner.owners.contains_key(&owner) || uow.new_owners.contains(&owner) {
            return Err(StoreError::Duplicate(format!("owner {owner}")));
        }
        uow.new_owners.push(owner);
        Ok(())
    }
}
