use crate::infrastructure::db::dto::payment_attempt::PaymentAttemptRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::payment_attempt_store::{
    PaymentAttemptRepositoryError, PaymentAttemptStore,
};
use async_trait::async_trait;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

const COLUMNS: &str = "id, work_request_id, submission_id, submission_version, intent_id, \
    amount_minor, currency, status, last_error, created_at, updated_at";

pub struct PaymentAttemptStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl PaymentAttemptStorePostgres {
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn insert_impl_conn(
        conn: &mut sqlx::PgConnection,
        row: PaymentAttemptRow,
    ) -> Result<(), PaymentAttemptRepositoryError> {
        sqlx::query(&format!(
            "INSERT INTO payment_attempts ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(row.id)
        .bind(row.work_request_id)
        .bind(row.submission_id)
        .bind(row.submission_version)
        .bind(row.intent_id)
        .bind(row.amount_minor)
        .bind(row.currency)
        .bind(row.status)
        .bind(row.last_error)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PaymentAttemptRepositoryError::Conflict
            }
            _ => PaymentAttemptRepositoryError::StorageUnavailable,
        })?;
        Ok(())
    }

    async fn get_by_intent_impl_conn(
        conn: &mut sqlx::PgConnection,
        intent_id: String,
    ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
        sqlx::query_as::<_, PaymentAttemptRow>(&format!(
            "SELECT {COLUMNS} FROM payment_attempts WHERE intent_id = $1"
        ))
        .bind(intent_id)
        .fetch_optional(conn)
        .await
        .map_err(|_| PaymentAttemptRepositoryError::StorageUnavailable)
    }

    async fn find_open_impl_conn(
        conn: &mut sqlx::PgConnection,
        submission_id: Uuid,
    ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
        sqlx::query_as::<_, PaymentAttemptRow>(&format!(
            "SELECT {COLUMNS} FROM payment_attempts \
             WHERE submission_id = $1 AND status = 'awaiting_confirmation' \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(submission_id)
        .fetch_optional(conn)
        .await
        .map_err(|_| PaymentAttemptRepositoryError::StorageUnavailable)
    }

    async fn update_status_impl_conn(
        conn: &mut sqlx::PgConnection,
        id: Uuid,
        expected_status: String,
        next_status: String,
        last_error: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
        sqlx::query_as::<_, PaymentAttemptRow>(&format!(
            "UPDATE payment_attempts SET status = $3, last_error = $4, updated_at = $5 \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(expected_status)
        .bind(next_status)
        .bind(last_error)
        .bind(now)
        .fetch_optional(conn)
        .await
        .map_err(|_| PaymentAttemptRepositoryError::StorageUnavailable)
    }

    async fn list_stale_impl_conn(
        conn: &mut sqlx::PgConnection,
        status: String,
        older_than: OffsetDateTime,
        limit: i64,
    ) -> Result<Vec<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
        sqlx::query_as::<_, PaymentAttemptRow>(&format!(
            "SELECT {COLUMNS} FROM payment_attempts \
             WHERE status = $1 AND updated_at < $2 \
             ORDER BY updated_at ASC LIMIT $3"
        ))
        .bind(status)
        .bind(older_than)
        .bind(limit)
        .fetch_all(conn)
        .await
        .map_err(|_| PaymentAttemptRepositoryError::StorageUnavailable)
    }
}

#[async_trait]
impl PaymentAttemptStore for PaymentAttemptStorePostgres {
    async fn insert(&self, row: PaymentAttemptRow) -> Result<(), PaymentAttemptRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(async move { Self::insert_impl_conn(conn, row).await }))
            .await
    }

    async fn get_by_intent(
        &self,
        intent_id: String,
    ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move { Self::get_by_intent_impl_conn(conn, intent_id).await })
            })
            .await
    }

    async fn get_by_intent_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        intent_id: String,
    ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
        Self::get_by_intent_impl_conn(&mut *tx, intent_id).await
    }

    async fn find_open_for_submission(
        &self,
        submission_id: Uuid,
    ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move { Self::find_open_impl_conn(conn, submission_id).await })
            })
            .await
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected_status: String,
        next_status: String,
        last_error: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move {
                    Self::update_status_impl_conn(conn, id, expected_status, next_status, last_error, now)
                        .await
                })
            })
            .await
    }

    async fn update_status_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        expected_status: String,
        next_status: String,
        last_error: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
        Self::update_status_impl_conn(&mut *tx, id, expected_status, next_status, last_error, now)
            .await
    }

    async fn list_stale(
        &self,
        status: String,
        older_than: OffsetDateTime,
        limit: i64,
    ) -> Result<Vec<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move {
                    Self::list_stale_impl_conn(conn, status, older_than, limit).await
                })
            })
            .await
    }
}
