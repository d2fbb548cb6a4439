use crate::domain::entities::webhook::WebhookDelivery;
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::dto::webhook_delivery::WebhookDeliveryRow;
use crate::infrastructure::db::stores::webhook_delivery_store::{
    WebhookDeliveryRepositoryError, WebhookDeliveryStore,
};
use std::sync::Arc;

pub struct WebhookDeliveryRepository {
    store: Arc<dyn WebhookDeliveryStore>,
}

impl WebhookDeliveryRepository {
    pub fn new(store: Arc<dyn WebhookDeliveryStore>) -> Self {
        Self { store }
    }

    pub async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        delivery: &WebhookDelivery,
    ) -> Result<(), WebhookDeliveryRepositoryError> {
        self.store
            .insert_tx(tx, WebhookDeliveryRow::from_delivery(delivery))
            .await
    }

    pub async fn list_due(
        &self,
        now: Timestamp,
        limit: i64,
    ) -> Result<Vec<WebhookDelivery>, WebhookDeliveryRepositoryError> {
        let rows = self.store.list_due(now.into_inner(), limit).await?;
        Ok(rows
            .into_iter()
            .map(WebhookDeliveryRow::into_delivery)
            .collect())
    }

    pub async fn update(
        &self,
        delivery: &WebhookDelivery,
    ) -> Result<(), WebhookDeliveryRepositoryError> {
        self.store
            .update(WebhookDeliveryRow::from_delivery(delivery))
            .await
    }
}
