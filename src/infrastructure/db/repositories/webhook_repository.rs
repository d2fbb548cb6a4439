use crate::domain::entities::event::EventTopic;
use crate::domain::entities::webhook::WebhookSubscription;
use crate::domain::value_objects::ids::{ActorId, SubscriptionId};
use crate::infrastructure::db::dto::webhook::WebhookSubscriptionRow;
use crate::infrastructure::db::stores::webhook_store::{WebhookRepositoryError, WebhookStore};
use std::sync::Arc;

pub struct WebhookRepository {
    store: Arc<dyn WebhookStore>,
}

impl WebhookRepository {
    pub fn new(store: Arc<dyn WebhookStore>) -> Self {
        Self { store }
    }

    pub async fn insert(
        &self,
        subscription: &WebhookSubscription,
    ) -> Result<(), WebhookRepositoryError> {
        self.store
            .insert(WebhookSubscriptionRow::from_subscription(subscription))
            .await
    }

    pub async fn get(
        &self,
        id: SubscriptionId,
    ) -> Result<Option<WebhookSubscription>, WebhookRepositoryError> {
        let row = self.store.get(id.0).await?;
        Ok(row.map(WebhookSubscriptionRow::into_subscription))
    }

    pub async fn list_for_actor(
        &self,
        actor_id: ActorId,
    ) -> Result<Vec<WebhookSubscription>, WebhookRepositoryError> {
        let rows = self.store.list_for_actor(actor_id.0).await?;
        Ok(rows
            .into_iter()
            .map(WebhookSubscriptionRow::into_subscription)
            .collect())
    }

    pub async fn list_for_topic_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        topic: EventTopic,
    ) -> Result<Vec<WebhookSubscription>, WebhookRepositoryError> {
        let rows = self
            .store
            .list_for_topic_tx(tx, topic.as_str().to_string())
            .await?;
        Ok(rows
            .into_iter()
            .map(WebhookSubscriptionRow::into_subscription)
            .collect())
    }

    /// `false` when the subscription does not exist or belongs to
    /// another actor.
    pub async fn delete(
        &self,
        id: SubscriptionId,
        actor_id: ActorId,
    ) -> Result<bool, WebhookRepositoryError> {
        let removed = self.store.delete(id.0, actor_id.0).await?;
        Ok(removed > 0)
    }
}
