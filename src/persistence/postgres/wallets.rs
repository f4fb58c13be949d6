use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use super::{PgStore, PgUnitOfWork};
use crate::core_types::{OwnerId, WalletId};
use crate::money::Amount;
use crate::persistence::StoreError;
use crate::wallet::{Wallet, WalletStore};

const WALLET_COLUMNS: &str = "wallet_id, user_id, balance, created_at, updated_at";

#[derive(Debug, FromRow)]
struct WalletRow {
    wallet_id: Uuid,
    user_id: Uuid,
    balance: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WalletRow> for Wallet {
    type Error = StoreError;

    fn try_from(row: WalletRow) -> Result<Self, Self::Error> {
        let balance = Amount::from_decimal(row.balance).map_err(|e| {
            StoreError::Corrupt(format!("wallet {} balance {}: {}", row.wallet_id, row.balance, e))
        })?;
        Ok(Wallet {
            id: WalletId::from_uuid(row.wallet_id),
            owner_id: OwnerId::from_uuid(row.user_id),
            balance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl WalletStore for PgStore {
    async fn lock_for_update(
        &self,
        owner: OwnerId,
        uow: &mut PgUnitOfWork,
    ) -> Result<Wallet, StoreError> {
        let row: Option<WalletRow> = sqlx::query_as(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets_tb WHERE user_id = $1 FOR UPDATE"
        ))
        .bind(owner.as_uuid())
        .fetch_optional(&mut *uow.tx)
        .await?;

        row.ok_or(StoreError::WalletNotFound(owner))?.try_into()
    }

    async fn replace_balance(
        &self,
        wallet_id: WalletId,
        new_balance: Amount,
        uow: &mut PgUnitOfWork,
    ) -> Result<Wallet, StoreError> {
        // The row lock is held by the enclosing transaction; the CHECK
        // constraint rejects negative balances with 23514.
        let row: Option<WalletRow> = sqlx::query_as(&format!(
            "UPDATE wallets_tb
             SET balance = $1,
                 updated_at = GREATEST(NOW(), updated_at + interval '1 microsecond')
             WHERE wallet_id = $2
             RETURNING {WALLET_COLUMNS}"
        ))
        .bind(new_balance.as_decimal())
        .bind(wallet_id.as_uuid())
        .fetch_optional(&mut *uow.tx)
        .await?;

        row.ok_or(StoreError::NotLocked(wallet_id))?.try_into()
    }

    async fn find_by_owner(&self, owner: OwnerId) -> Result<Option<Wallet>, StoreError> {
        let row: Option<WalletRow> = sqlx::query_as(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets_tb WHERE user_id = $1"
        ))
        .bind(owner.as_uuid())
        .fetch_optional(self.db.pool())
        .await?;

        row.map(Wallet::try_from).transpose()
    }

    async fn create(&self, wallet: &Wallet, uow: &mut PgUnitOfWork) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO wallets_tb (wallet_id, user_id, balance, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(wallet.id.as_uuid())
        .bind(wallet.owner_id.as_uuid())
        .bind(wallet.balance.as_decimal())
        .bind(wallet.created_at)
        .bind(wallet.updated_at)
        .execute(&mut *uow.tx)
        .await?;
        Ok(())
    }
}
