use crate::infrastructure::db::dto::api_key::ApiKeyRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::api_key_store::{ApiKeyRepositoryError, ApiKeyStore};
use async_trait::async_trait;
use std::sync::Arc;

pub struct ApiKeyStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl ApiKeyStorePostgres {
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn find_active_impl_conn(
        conn: &mut sqlx::PgConnection,
        key_prefix: String,
        key_hash: String,
    ) -> Result<Option<ApiKeyRow>, ApiKeyRepositoryError> {
        sqlx::query_as::<_, ApiKeyRow>(
            "SELECT id, actor_id, key_prefix, key_hash, active, created_at \
             FROM api_keys WHERE key_prefix = $1 AND key_hash = $2 AND active",
        )
        .bind(key_prefix)
        .bind(key_hash)
        .fetch_optional(conn)
        .await
        .map_err(|_| ApiKeyRepositoryError::StorageUnavailable)
    }

    async fn insert_impl_conn(
        conn: &mut sqlx::PgConnection,
        row: ApiKeyRow,
    ) -> Result<(), ApiKeyRepositoryError> {
        sqlx::query(
            "INSERT INTO api_keys (id, actor_id, key_prefix, key_hash, active, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(row.id)
        .bind(row.actor_id)
        .bind(row.key_prefix)
        .bind(row.key_hash)
        .bind(row.active)
        .bind(row.created_at)
        .execute(conn)
        .await
        .map_err(|_| ApiKeyRepositoryError::StorageUnavailable)?;
        Ok(())
    }
}

#[async_trait]
impl ApiKeyStore for ApiKeyStorePostgres {
    async fn find_active(
        &self,
        key_prefix: String,
        key_hash: String,
    ) -> Result<Option<ApiKeyRow>, ApiKeyRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(
                    async move { Self::find_active_impl_conn(conn, key_prefix, key_hash).await },
                )
            })
            .await
    }

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: ApiKeyRow,
    ) -> Result<(), ApiKeyRepositoryError> {
        Self::insert_impl_conn(&mut *tx, row).await
    }
}
