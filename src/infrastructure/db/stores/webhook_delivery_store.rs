use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::webhook_delivery::WebhookDeliveryRow;
use async_trait::async_trait;
use time::OffsetDateTime;

#[derive(Debug, PartialEq)]
pub enum WebhookDeliveryRepositoryError {
    NotFound,
    StorageUnavailable,
}

impl From<DatabaseError> for WebhookDeliveryRepositoryError {
    fn from(_: DatabaseError) -> Self {
        WebhookDeliveryRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait WebhookDeliveryStore: Send + Sync {
    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: WebhookDeliveryRow,
    ) -> Result<(), WebhookDeliveryRepositoryError>;

    /// Pending deliveries whose retry time has come, oldest first.
    async fn list_due(
        &self,
        now: OffsetDateTime,
        limit: i64,
    ) -> Result<Vec<WebhookDeliveryRow>, WebhookDeliveryRepositoryError>;

    /// Writes back the mutable outcome fields after a send attempt.
    async fn update(&self, row: WebhookDeliveryRow)
    -> Result<(), WebhookDeliveryRepositoryError>;
}
