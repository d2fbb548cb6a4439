use crate::infrastructure::db::dto::webhook_delivery::WebhookDeliveryRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::webhook_delivery_store::{
    WebhookDeliveryRepositoryError, WebhookDeliveryStore,
};
use async_trait::async_trait;
use std::sync::Arc;
use time::OffsetDateTime;

const COLUMNS: &str = "id, subscription_id, event_id, target_url, topic, payload, occurred_at, \
    status, attempt, response_status, last_error, next_attempt_at, delivered_at, \
    created_at, updated_at";

pub struct WebhookDeliveryStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl WebhookDeliveryStorePostgres {
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn insert_impl_conn(
        conn: &mut sqlx::PgConnection,
        row: WebhookDeliveryRow,
    ) -> Result<(), WebhookDeliveryRepositoryError> {
        sqlx::query(&format!(
            "INSERT INTO webhook_deliveries ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"
        ))
        .bind(row.id)
        .bind(row.subscription_id)
        .bind(row.event_id)
        .bind(row.target_url)
        .bind(row.topic)
        .bind(row.payload)
        .bind(row.occurred_at)
        .bind(row.status)
        .bind(row.attempt)
        .bind(row.response_status)
        .bind(row.last_error)
        .bind(row.next_attempt_at)
        .bind(row.delivered_at)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(conn)
        .await
        .map_err(|_| WebhookDeliveryRepositoryError::StorageUnavailable)?;
        Ok(())
    }

    async fn list_due_impl_conn(
        conn: &mut sqlx::PgConnection,
        now: OffsetDateTime,
        limit: i64,
    ) -> Result<Vec<WebhookDeliveryRow>, WebhookDeliveryRepositoryError> {
        sqlx::query_as::<_, WebhookDeliveryRow>(&format!(
            "SELECT {COLUMNS} FROM webhook_deliveries \
             WHERE status = 'pending' AND (next_attempt_at IS NULL OR next_attempt_at <= $1) \
             ORDER BY created_at ASC LIMIT $2"
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(conn)
        .await
        .map_err(|_| WebhookDeliveryRepositoryError::StorageUnavailable)
    }

    async fn update_impl_conn(
        conn: &mut sqlx::PgConnection,
        row: WebhookDeliveryRow,
    ) -> Result<(), WebhookDeliveryRepositoryError> {
        let result = sqlx::query(
            "UPDATE webhook_deliveries SET \
               status = $2, attempt = $3, response_status = $4, last_error = $5, \
               next_attempt_at = $6, delivered_at = $7, updated_at = $8 \
             WHERE id = $1",
        )
        .bind(row.id)
        .bind(row.status)
        .bind(row.attempt)
        .bind(row.response_status)
        .bind(row.last_error)
        .bind(row.next_attempt_at)
        .bind(row.delivered_at)
        .bind(row.updated_at)
        .execute(conn)
        .await
        .map_err(|_| WebhookDeliveryRepositoryError::StorageUnavailable)?;
        if result.rows_affected() == 0 {
            return Err(WebhookDeliveryRepositoryError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl WebhookDeliveryStore for WebhookDeliveryStorePostgres {
    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: WebhookDeliveryRow,
    ) -> Result<(), WebhookDeliveryRepositoryError> {
        Self::insert_impl_conn(&mut *tx, row).await
    }

    async fn list_due(
        &self,
        now: OffsetDateTime,
        limit: i64,
    ) -> Result<Vec<WebhookDeliveryRow>, WebhookDeliveryRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move { Self::list_due_impl_conn(conn, now, limit).await })
            })
            .await
    }

    async fn update(
        &self,
        row: WebhookDeliveryRow,
    ) -> Result<(), WebhookDeliveryRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(async move { Self::update_impl_conn(conn, row).await }))
            .await
    }
}
