use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use super::{PgStore, PgUnitOfWork};
use crate::core_types::{OwnerId, TransactionId};
use crate::ledger::{Ledger, Transaction, TransactionKind, TransactionStatus};
use crate::money::Amount;
use crate::persistence::StoreError;

#[derive(Debug, FromRow)]
struct TransactionRow {
    transaction_id: String,
    sender_id: Option<Uuid>,
    receiver_id: Uuid,
    amount: Decimal,
    kind: i16,
    status: i16,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let corrupt = |what: &str| StoreError::Corrupt(format!("transaction {}: {}", row.transaction_id, what));

        let id: TransactionId = row
            .transaction_id
            .parse()
            .map_err(|_| corrupt("bad id"))?;
        let amount = Amount::from_decimal(row.amount).map_err(|_| corrupt("bad amount"))?;
        let kind = TransactionKind::from_id(row.kind).ok_or_else(|| corrupt("unknown kind"))?;
        let status =
            TransactionStatus::from_id(row.status).ok_or_else(|| corrupt("unknown status"))?;

        Ok(Transaction {
            id,
            sender_id: row.sender_id.map(OwnerId::from_uuid),
            receiver_id: OwnerId::from_uuid(row.receiver_id),
            amount,
            kind,
            status,
            created_at: row.created_at,
        })
    }
}

async fn insert_entry<'e, E>(executor: E, entry: &Transaction) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "INSERT INTO transactions_tb
            (transaction_id, sender_id, receiver_id, amount, kind, status, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(entry.id.to_string())
    .bind(entry.sender_id.map(|s| s.as_uuid()))
    .bind(entry.receiver_id.as_uuid())
    .bind(entry.amount.as_decimal())
    .bind(entry.kind.id())
    .bind(entry.status.id())
    .bind(entry.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl Ledger for PgStore {
    async fn insert(&self, entry: &Transaction, uow: &mut PgUnitOfWork) -> Result<(), StoreError> {
        insert_entry(&mut *uow.tx, entry).await
    }

    async fn append(&self, entry: &Transaction) -> Result<(), StoreError> {
        // Auto-commit on the pool, independent of any aborted transaction
        insert_entry(self.db.pool(), entry).await
    }

    async fn list_by_owner(
        &self,
        owner: OwnerId,
        limit: usize,
    ) -> Result<Vec<Transaction>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<TransactionRow> = sqlx::query_as(
            "SELECT transaction_id, sender_id, receiver_id, amount, kind, status, created_at
             FROM transactions_tb
             WHERE sender_id = $1 OR receiver_id = $1
             ORDER BY created_at DESC, transaction_id DESC
             LIMIT $2",
        )
        .bind(owner.as_uuid())
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }
}
