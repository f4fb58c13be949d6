//! Wallet Ledger - custodial balances with an append-only ledger
//!
//! Moves money between per-owner wallets under concurrent access: a fixed
//! lock order prevents deadlocks, every balance change commits atomically
//! with its ledger entry, and aborted transfers leave a failed entry behind.
//!
//! # Modules
//!
//! - [`core_types`] - Identifiers (OwnerId, WalletId, TransactionId) and lock order
//! - [`money`] - Fixed-point `Amount` (2 fractional digits)
//! - [`persistence`] - Units of work, memory and PostgreSQL backends
//! - [`wallet`] - Wallet rows and the `WalletStore` capability
//! - [`ledger`] - Ledger entries, the `Ledger` capability, history reads
//! - [`owner`] - Owner existence and registration
//! - [`funds`] - Transfer / top-up / provisioning coordinators and the service facade
//! - [`gateway`] - axum request layer

// Core types - must be first!
pub mod core_types;
pub mod money;

pub mod persistence;

pub mod ledger;
pub mod owner;
pub mod wallet;

pub mod funds;

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use core_types::{OwnerId, TransactionId, WalletId, lock_order};
pub use funds::{Funds, FundsError, FundsService, FundsStore};
pub use ledger::{Ledger, Transaction, TransactionKind, TransactionStatus};
pub use money::{Amount, MoneyError};
pub use owner::OwnerDirectory;
pub use persistence::{MemoryStore, PgStore, StoreError, UnitOfWork, UnitOfWorkSource};
pub use wallet::{Wallet, WalletStore};
