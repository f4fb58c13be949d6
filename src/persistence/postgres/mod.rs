//! PostgreSQL backend.
//!
//! A unit of work is one sqlx transaction. Row locks are `SELECT ... FOR
//! UPDATE`; the wait is bounded by a transaction-local `lock_timeout`, so an
//! expired wait surfaces as SQLSTATE 55P03 and the transaction is abandoned.

mod ledger;
mod owners;
pub mod schema;
mod wallets;

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tracing::debug;

use super::{StoreError, UnitOfWork, UnitOfWorkSource};
use crate::db::Database;

pub use schema::init_schema;

/// Wallet, ledger and owner storage on one PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    db: Database,
    lock_timeout: Duration,
}

impl PgStore {
    pub fn new(db: Database, lock_timeout: Duration) -> Self {
        Self { db, lock_timeout }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// An open sqlx transaction.
///
/// sqlx issues `ROLLBACK` when a transaction is dropped unfinished.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        debug!("PostgreSQL unit of work rolled back");
        Ok(())
    }
}

#[async_trait]
impl UnitOfWorkSource for PgStore {
    type Uow = PgUnitOfWork;

    async fn begin(&self) -> Result<PgUnitOfWork, StoreError> {
        let mut tx = self.db.pool().begin().await?;

        // is_local = true: reset at COMMIT/ROLLBACK
        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(format!("{}ms", self.lock_timeout.as_millis().max(1)))
            .execute(&mut *tx)
            .await?;

        Ok(PgUnitOfWork { tx })
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.db.health_check().await?;
        Ok(())
    }
}
