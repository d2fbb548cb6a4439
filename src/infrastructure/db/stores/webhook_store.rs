use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::webhook::WebhookSubscriptionRow;
use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, PartialEq)]
pub enum WebhookRepositoryError {
    NotFound,
    StorageUnavailable,
}

impl From<DatabaseError> for WebhookRepositoryError {
    fn from(_: DatabaseError) -> Self {
        WebhookRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait WebhookStore: Send + Sync {
    async fn insert(&self, row: WebhookSubscriptionRow) -> Result<(), WebhookRepositoryError>;

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<WebhookSubscriptionRow>, WebhookRepositoryError>;

    async fn list_for_actor(
        &self,
        actor_id: Uuid,
    ) -> Result<Vec<WebhookSubscriptionRow>, WebhookRepositoryError>;

    /// Subscriptions whose topic list names `topic`, read inside the
    /// producing transaction so fan-out commits with the event.
    async fn list_for_topic_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        topic: String,
    ) -> Result<Vec<WebhookSubscriptionRow>, WebhookRepositoryError>;

    /// Deletes only when `actor_id` owns the subscription; returns the
    /// number of rows removed.
    async fn delete(&self, id: Uuid, actor_id: Uuid) -> Result<u64, WebhookRepositoryError>;
}
