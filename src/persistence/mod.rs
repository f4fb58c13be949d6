//! Persistence layer
//!
//! The coordinators never touch a connection pool directly. They open an
//! explicit unit of work, pass it into every store call that must be atomic,
//! and finish it with `commit` or `rollback`.
//!
//! # Backends
//!
//! - [`postgres::PgStore`]: sqlx transaction + `SELECT ... FOR UPDATE`
//! - [`memory::MemoryStore`]: per-row `tokio::sync::Mutex`, used by tests and
//!   `--in-memory` runs
//!
//! Both implement [`UnitOfWorkSource`], [`crate::wallet::WalletStore`],
//! [`crate::ledger::Ledger`] and [`crate::owner::OwnerDirectory`] with one
//! shared unit-of-work type.

pub mod error;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// An atomic group of reads and writes.
///
/// Dropping a unit of work without calling `commit` rolls it back and
/// releases every row lock it holds.
#[async_trait]
pub trait UnitOfWork: Send + Sized {
    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}

/// Opens units of work against one backend
#[async_trait]
pub trait UnitOfWorkSource: Send + Sync + 'static {
    type Uow: UnitOfWork;

    async fn begin(&self) -> Result<Self::Uow, StoreError>;

    /// Cheap liveness check for the health endpoint
    async fn health_check(&self) -> Result<(), StoreError>;
}
