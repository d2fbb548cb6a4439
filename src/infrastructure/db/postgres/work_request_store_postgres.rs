use crate::infrastructure::db::dto::work_request::WorkRequestRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::work_request_store::{
    WorkRequestRepositoryError, WorkRequestStore,
};
use async_trait::async_trait;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

const COLUMNS: &str = "id, project_id, business_id, contractor_id, title, description, \
    deliverable_description, amount_minor, currency, due_date, status, review_notes, \
    created_at, updated_at, accepted_at, declined_at";

pub struct WorkRequestStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl WorkRequestStorePostgres {
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn get_impl_conn(
        conn: &mut sqlx::PgConnection,
        id: Uuid,
    ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError> {
        sqlx::query_as::<_, WorkRequestRow>(&format!(
            "SELECT {COLUMNS} FROM work_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|_| WorkRequestRepositoryError::StorageUnavailable)
    }

    async fn insert_impl_conn(
        conn: &mut sqlx::PgConnection,
        row: WorkRequestRow,
    ) -> Result<(), WorkRequestRepositoryError> {
        sqlx::query(&format!(
            "INSERT INTO work_requests ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        ))
        .bind(row.id)
        .bind(row.project_id)
        .bind(row.business_id)
        .bind(row.contractor_id)
        .bind(row.title)
        .bind(row.description)
        .bind(row.deliverable_description)
        .bind(row.amount_minor)
        .bind(row.currency)
        .bind(row.due_date)
        .bind(row.status)
        .bind(row.review_notes)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(row.accepted_at)
        .bind(row.declined_at)
        .execute(conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                WorkRequestRepositoryError::Conflict
            }
            _ => WorkRequestRepositoryError::StorageUnavailable,
        })?;
        Ok(())
    }

    async fn transition_impl_conn(
        conn: &mut sqlx::PgConnection,
        id: Uuid,
        expected_status: String,
        next_status: String,
        review_notes: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError> {
        sqlx::query_as::<_, WorkRequestRow>(&format!(
            "UPDATE work_requests SET \
               status = $3, \
               review_notes = COALESCE($4, review_notes), \
               updated_at = $5, \
               accepted_at = CASE WHEN $3 = 'accepted' THEN $5 ELSE accepted_at END, \
               declined_at = CASE WHEN $3 = 'declined' THEN $5 ELSE declined_at END \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(expected_status)
        .bind(next_status)
        .bind(review_notes)
        .bind(now)
        .fetch_optional(conn)
        .await
        .map_err(|_| WorkRequestRepositoryError::StorageUnavailable)
    }

    async fn list_impl_conn(
        conn: &mut sqlx::PgConnection,
        party_column: &str,
        party_id: Uuid,
        status: Option<String>,
    ) -> Result<Vec<WorkRequestRow>, WorkRequestRepositoryError> {
        sqlx::query_as::<_, WorkRequestRow>(&format!(
            "SELECT {COLUMNS} FROM work_requests \
             WHERE {party_column} = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC"
        ))
        .bind(party_id)
        .bind(status)
        .fetch_all(conn)
        .await
        .map_err(|_| WorkRequestRepositoryError::StorageUnavailable)
    }

    async fn status_counts_impl_conn(
        conn: &mut sqlx::PgConnection,
        business_id: Uuid,
    ) -> Result<Vec<(String, i64)>, WorkRequestRepositoryError> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM work_requests WHERE business_id = $1 GROUP BY status",
        )
        .bind(business_id)
        .fetch_all(conn)
        .await
        .map_err(|_| WorkRequestRepositoryError::StorageUnavailable)
    }
}

#[async_trait]
impl WorkRequestStore for WorkRequestStorePostgres {
    async fn get(&self, id: Uuid) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(async move { Self::get_impl_conn(conn, id).await }))
            .await
    }

    async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
    ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError> {
        Self::get_impl_conn(&mut *tx, id).await
    }

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: WorkRequestRow,
    ) -> Result<(), WorkRequestRepositoryError> {
        Self::insert_impl_conn(&mut *tx, row).await
    }

    async fn transition_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        expected_status: String,
        next_status: String,
        review_notes: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError> {
        Self::transition_impl_conn(&mut *tx, id, expected_status, next_status, review_notes, now)
            .await
    }

    async fn list_for_business(
        &self,
        business_id: Uuid,
        status: Option<String>,
    ) -> Result<Vec<WorkRequestRow>, WorkRequestRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move {
                    Self::list_impl_conn(conn, "business_id", business_id, status).await
                })
            })
            .await
    }

    async fn list_for_contractor(
        &self,
        contractor_id: Uuid,
        status: Option<String>,
    ) -> Result<Vec<WorkRequestRow>, WorkRequestRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move {
                    Self::list_impl_conn(conn, "contractor_id", contractor_id, status).await
                })
            })
            .await
    }

    async fn status_counts_for_business(
        &self,
        business_id: Uuid,
    ) -> Result<Vec<(String, i64)>, WorkRequestRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move { Self::status_counts_impl_conn(conn, business_id).await })
            })
            .await
    }
}
