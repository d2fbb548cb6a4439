use crate::infrastructure::db::dto::webhook::WebhookSubscriptionRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::webhook_store::{WebhookRepositoryError, WebhookStore};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

const COLUMNS: &str = "id, actor_id, target_url, topics, created_at";

pub struct WebhookStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl WebhookStorePostgres {
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn insert_impl_conn(
        conn: &mut sqlx::PgConnection,
        row: WebhookSubscriptionRow,
    ) -> Result<(), WebhookRepositoryError> {
        sqlx::query(&format!(
            "INSERT INTO webhook_subscriptions ({COLUMNS}) VALUES ($1, $2, $3, $4, $5)"
        ))
        .bind(row.id)
        .bind(row.actor_id)
        .bind(row.target_url)
        .bind(row.topics)
        .bind(row.created_at)
        .execute(conn)
        .await
        .map_err(|_| WebhookRepositoryError::StorageUnavailable)?;
        Ok(())
    }

    async fn get_impl_conn(
        conn: &mut sqlx::PgConnection,
        id: Uuid,
    ) -> Result<Option<WebhookSubscriptionRow>, WebhookRepositoryError> {
        sqlx::query_as::<_, WebhookSubscriptionRow>(&format!(
            "SELECT {COLUMNS} FROM webhook_subscriptions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|_| WebhookRepositoryError::StorageUnavailable)
    }

    async fn list_for_actor_impl_conn(
        conn: &mut sqlx::PgConnection,
        actor_id: Uuid,
    ) -> Result<Vec<WebhookSubscriptionRow>, WebhookRepositoryError> {
        sqlx::query_as::<_, WebhookSubscriptionRow>(&format!(
            "SELECT {COLUMNS} FROM webhook_subscriptions \
             WHERE actor_id = $1 ORDER BY created_at ASC"
        ))
        .bind(actor_id)
        .fetch_all(conn)
        .await
        .map_err(|_| WebhookRepositoryError::StorageUnavailable)
    }

    async fn list_for_topic_impl_conn(
        conn: &mut sqlx::PgConnection,
        topic: String,
    ) -> Result<Vec<WebhookSubscriptionRow>, WebhookRepositoryError> {
        sqlx::query_as::<_, WebhookSubscriptionRow>(&format!(
            "SELECT {COLUMNS} FROM webhook_subscriptions WHERE $1 = ANY (topics)"
        ))
        .bind(topic)
        .fetch_all(conn)
        .await
        .map_err(|_| WebhookRepositoryError::StorageUnavailable)
    }

    async fn delete_impl_conn(
        conn: &mut sqlx::PgConnection,
        id: Uuid,
        actor_id: Uuid,
    ) -> Result<u64, WebhookRepositoryError> {
        let result =
            sqlx::query("DELETE FROM webhook_subscriptions WHERE id = $1 AND actor_id = $2")
                .bind(id)
                .bind(actor_id)
                .execute(conn)
                .await
                .map_err(|_| WebhookRepositoryError::StorageUnavailable)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl WebhookStore for WebhookStorePostgres {
    async fn insert(&self, row: WebhookSubscriptionRow) -> Result<(), WebhookRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(async move { Self::insert_impl_conn(conn, row).await }))
            .await
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<WebhookSubscriptionRow>, WebhookRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(async move { Self::get_impl_conn(conn, id).await }))
            .await
    }

    async fn list_for_actor(
        &self,
        actor_id: Uuid,
    ) -> Result<Vec<WebhookSubscriptionRow>, WebhookRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move { Self::list_for_actor_impl_conn(conn, actor_id).await })
            })
            .await
    }

    async fn list_for_topic_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        topic: String,
    ) -> Result<Vec<WebhookSubscriptionRow>, WebhookRepositoryError> {
        Self::list_for_topic_impl_conn(&mut *tx, topic).await
    }

    async fn delete(&self, id: Uuid, actor_id: Uuid) -> Result<u64, WebhookRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move { Self::delete_impl_conn(conn, id, actor_id).await })
            })
            .await
    }
}
