use crate::infrastructure::db::dto::payment::PaymentRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::payment_store::{PaymentRepositoryError, PaymentStore};
use async_trait::async_trait;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

const COLUMNS: &str = "id, amount_minor, currency, status, intent_id, transfer_id, \
    work_request_id, milestone_id, created_at, updated_at";

pub struct PaymentStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl PaymentStorePostgres {
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn get_impl_conn(
        conn: &mut sqlx::PgConnection,
        id: Uuid,
    ) -> Result<Option<PaymentRow>, PaymentRepositoryError> {
        sqlx::query_as::<_, PaymentRow>(&format!("SELECT {COLUMNS} FROM payments WHERE id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|_| PaymentRepositoryError::StorageUnavailable)
    }

    async fn get_by_intent_impl_conn(
        conn: &mut sqlx::PgConnection,
        intent_id: String,
    ) -> Result<Option<PaymentRow>, PaymentRepositoryError> {
        sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {COLUMNS} FROM payments WHERE intent_id = $1"
        ))
        .bind(intent_id)
        .fetch_optional(conn)
        .await
        .map_err(|_| PaymentRepositoryError::StorageUnavailable)
    }

    async fn get_by_milestone_impl_conn(
        conn: &mut sqlx::PgConnection,
        milestone_id: Uuid,
    ) -> Result<Option<PaymentRow>, PaymentRepositoryError> {
        sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {COLUMNS} FROM payments WHERE milestone_id = $1"
        ))
        .bind(milestone_id)
        .fetch_optional(conn)
        .await
        .map_err(|_| PaymentRepositoryError::StorageUnavailable)
    }

    async fn insert_impl_conn(
        conn: &mut sqlx::PgConnection,
        row: PaymentRow,
    ) -> Result<(), PaymentRepositoryError> {
        sqlx::query(&format!(
            "INSERT INTO payments ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(row.id)
        .bind(row.amount_minor)
        .bind(row.currency)
        .bind(row.status)
        .bind(row.intent_id)
        .bind(row.transfer_id)
        .bind(row.work_request_id)
        .bind(row.milestone_id)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PaymentRepositoryError::Conflict
            }
            _ => PaymentRepositoryError::StorageUnavailable,
        })?;
        Ok(())
    }

    async fn list_by_status_impl_conn(
        conn: &mut sqlx::PgConnection,
        status: String,
        limit: i64,
    ) -> Result<Vec<PaymentRow>, PaymentRepositoryError> {
        sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {COLUMNS} FROM payments WHERE status = $1 ORDER BY created_at ASC LIMIT $2"
        ))
        .bind(status)
        .bind(limit)
        .fetch_all(conn)
        .await
        .map_err(|_| PaymentRepositoryError::StorageUnavailable)
    }

    async fn mark_transferred_impl_conn(
        conn: &mut sqlx::PgConnection,
        id: Uuid,
        transfer_id: String,
        now: OffsetDateTime,
    ) -> Result<Option<PaymentRow>, PaymentRepositoryError> {
        sqlx::query_as::<_, PaymentRow>(&format!(
            "UPDATE payments SET status = 'transferred', transfer_id = $2, updated_at = $3 \
             WHERE id = $1 AND status = 'captured' \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(transfer_id)
        .bind(now)
        .fetch_optional(conn)
        .await
        .map_err(|_| PaymentRepositoryError::StorageUnavailable)
    }
}

#[async_trait]
impl PaymentStore for PaymentStorePostgres {
    async fn get(&self, id: Uuid) -> Result<Option<PaymentRow>, PaymentRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(async move { Self::get_impl_conn(conn, id).await }))
            .await
    }

    async fn get_by_intent_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        intent_id: String,
    ) -> Result<Option<PaymentRow>, PaymentRepositoryError> {
        Self::get_by_intent_impl_conn(&mut *tx, intent_id).await
    }

    async fn get_by_milestone_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        milestone_id: Uuid,
    ) -> Result<Option<PaymentRow>, PaymentRepositoryError> {
        Self::get_by_milestone_impl_conn(&mut *tx, milestone_id).await
    }

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: PaymentRow,
    ) -> Result<(), PaymentRepositoryError> {
        Self::insert_impl_conn(&mut *tx, row).await
    }

    async fn list_by_status(
        &self,
        status: String,
        limit: i64,
    ) -> Result<Vec<PaymentRow>, PaymentRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move { Self::list_by_status_impl_conn(conn, status, limit).await })
            })
            .await
    }

    async fn mark_transferred_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        transfer_id: String,
        now: OffsetDateTime,
    ) -> Result<Option<PaymentRow>, PaymentRepositoryError> {
        Self::mark_transferred_impl_conn(&mut *tx, id, transfer_id, now).await
    }
}
