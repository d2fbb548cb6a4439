use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::idempotency_key::IdempotencyKeyRow;
use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, PartialEq)]
pub enum IdempotencyKeyRepositoryError {
    StorageUnavailable,
}

impl From<DatabaseError> for IdempotencyKeyRepositoryError {
    fn from(_: DatabaseError) -> Self {
        IdempotencyKeyRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait IdempotencyKeyStore: Send + Sync {
    async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        actor_id: Uuid,
        idempotency_key: String,
    ) -> Result<Option<IdempotencyKeyRow>, IdempotencyKeyRepositoryError>;

    /// Claims the key. Returns `false` when another request holds it,
    /// in which case the caller replays the stored outcome.
    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: IdempotencyKeyRow,
    ) -> Result<bool, IdempotencyKeyRepositoryError>;
}
