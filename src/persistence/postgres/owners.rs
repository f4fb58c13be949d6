use async_trait::async_trait;

use super::{PgStore, PgUnitOfWork};
use crate::core_types::OwnerId;
use crate::owner::OwnerDirectory;
use crate::persistence::StoreError;

#[async_trait]
impl OwnerDirectory for PgStore {
    async fn owner_exists(&self, owner: OwnerId) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users_tb WHERE user_id = $1)")
                .bind(owner.as_uuid())
                .fetch_one(self.db.pool())
                .await?;
        Ok(exists)
    }

    async fn register(&self, owner: OwnerId, uow: &mut PgUnitOfWork) -> Result<(), StoreError> {
        // Unique violation (23505) maps to StoreError::Duplicate
        sqlx::query("INSERT INTO users_tb (user_id) VALUES ($1)")
            .bind(owner.as_uuid())
            .execute(&mut *uow.tx)
            .await?;
        Ok(())
    }
}
