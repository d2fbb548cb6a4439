use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::payment::PaymentRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, PartialEq)]
pub enum PaymentRepositoryError {
    NotFound,
    Conflict,
    StorageUnavailable,
}

impl From<DatabaseError> for PaymentRepositoryError {
    fn from(_: DatabaseError) -> Self {
        PaymentRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<PaymentRow>, PaymentRepositoryError>;

    async fn get_by_intent_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        intent_id: String,
    ) -> Result<Option<PaymentRow>, PaymentRepositoryError>;

    async fn get_by_milestone_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        milestone_id: Uuid,
    ) -> Result<Option<PaymentRow>, PaymentRepositoryError>;

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: PaymentRow,
    ) -> Result<(), PaymentRepositoryError>;

    /// Oldest first, so the transfer worker drains in capture order.
    async fn list_by_status(
        &self,
        status: String,
        limit: i64,
    ) -> Result<Vec<PaymentRow>, PaymentRepositoryError>;

    /// captured -> transferred; `None` when already transferred.
    async fn mark_transferred_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        transfer_id: String,
        now: OffsetDateTime,
    ) -> Result<Option<PaymentRow>, PaymentRepositoryError>;
}
