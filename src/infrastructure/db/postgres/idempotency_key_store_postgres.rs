use crate::infrastructure::db::dto::idempotency_key::IdempotencyKeyRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::idempotency_key_store::{
    IdempotencyKeyRepositoryError, IdempotencyKeyStore,
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub struct IdempotencyKeyStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl IdempotencyKeyStorePostgres {
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn get_impl_conn(
        conn: &mut sqlx::PgConnection,
        actor_id: Uuid,
        idempotency_key: String,
    ) -> Result<Option<IdempotencyKeyRow>, IdempotencyKeyRepositoryError> {
        sqlx::query_as::<_, IdempotencyKeyRow>(
            "SELECT actor_id, idempotency_key, work_request_id, created_at \
             FROM idempotency_keys WHERE actor_id = $1 AND idempotency_key = $2",
        )
        .bind(actor_id)
        .bind(idempotency_key)
        .fetch_optional(conn)
        .await
        .map_err(|_| IdempotencyKeyRepositoryError::StorageUnavailable)
    }

    // ON CONFLICT DO NOTHING keeps the transaction alive on replay; a
    // concurrent holder blocks this insert until it commits, so a zero
    // row count always means the committed winner is readable.
    async fn insert_impl_conn(
        conn: &mut sqlx::PgConnection,
        row: IdempotencyKeyRow,
    ) -> Result<bool, IdempotencyKeyRepositoryError> {
        let result = sqlx::query(
            "INSERT INTO idempotency_keys (actor_id, idempotency_key, work_request_id, created_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (actor_id, idempotency_key) DO NOTHING",
        )
        .bind(row.actor_id)
        .bind(row.idempotency_key)
        .bind(row.work_request_id)
        .bind(row.created_at)
        .execute(conn)
        .await
        .map_err(|_| IdempotencyKeyRepositoryError::StorageUnavailable)?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl IdempotencyKeyStore for IdempotencyKeyStorePostgres {
    async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        actor_id: Uuid,
        idempotency_key: String,
    ) -> Result<Option<IdempotencyKeyRow>, IdempotencyKeyRepositoryError> {
        Self::get_impl_conn(&mut *tx, actor_id, idempotency_key).await
    }

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: IdempotencyKeyRow,
    ) -> Result<bool, IdempotencyKeyRepositoryError> {
        Self::insert_impl_conn(&mut *tx, row).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn test_db_url() -> Option<String> {
        std::env::var("DATABASE_URL").ok()
    }

    async fn connect() -> Option<Arc<PostgresDatabase>> {
        let url = test_db_url()?;
        let db = PostgresDatabase::connect(&url, 5).await.unwrap();
        db.migrate().await.unwrap();
        Some(Arc::new(db))
    }

    fn key_row(actor_id: Uuid, key: &str) -> IdempotencyKeyRow {
        IdempotencyKeyRow {
            actor_id,
            idempotency_key: key.to_string(),
            work_request_id: Some(Uuid::new_v4()),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn given_fresh_key_when_insert_twice_should_claim_once() {
        let Some(db) = connect().await else {
            return;
        };
        let actor_id = Uuid::new_v4();
        let key = format!("key-{}", Uuid::new_v4());

        let first = db
            .with_tx(|tx| {
                let store = IdempotencyKeyStorePostgres::new(db.clone());
                let row = key_row(actor_id, &key);
                Box::pin(async move { store.insert_tx(tx, row).await })
            })
            .await
            .unwrap();
        let second = db
            .with_tx(|tx| {
                let store = IdempotencyKeyStorePostgres::new(db.clone());
                let row = key_row(actor_id, &key);
                Box::pin(async move { store.insert_tx(tx, row).await })
            })
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
    }
}
