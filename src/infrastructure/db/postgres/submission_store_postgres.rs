use crate::infrastructure::db::dto::submission::SubmissionRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::submission_store::{
    SubmissionRepositoryError, SubmissionStore,
};
use async_trait::async_trait;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

const COLUMNS: &str = "id, work_request_id, submitted_by, version, kind, artifact_url, \
    deliverable_files, description, notes, status, review_notes, submitted_at, updated_at";

pub struct SubmissionStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl SubmissionStorePostgres {
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn latest_impl_conn(
        conn: &mut sqlx::PgConnection,
        work_request_id: Uuid,
    ) -> Result<Option<SubmissionRow>, SubmissionRepositoryError> {
        sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {COLUMNS} FROM submissions \
             WHERE work_request_id = $1 ORDER BY version DESC LIMIT 1"
        ))
        .bind(work_request_id)
        .fetch_optional(conn)
        .await
        .map_err(|_| SubmissionRepositoryError::StorageUnavailable)
    }

    async fn list_impl_conn(
        conn: &mut sqlx::PgConnection,
        work_request_id: Uuid,
    ) -> Result<Vec<SubmissionRow>, SubmissionRepositoryError> {
        sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {COLUMNS} FROM submissions WHERE work_request_id = $1 ORDER BY version ASC"
        ))
        .bind(work_request_id)
        .fetch_all(conn)
        .await
        .map_err(|_| SubmissionRepositoryError::StorageUnavailable)
    }

    async fn insert_impl_conn(
        conn: &mut sqlx::PgConnection,
        row: SubmissionRow,
    ) -> Result<(), SubmissionRepositoryError> {
        sqlx::query(&format!(
            "INSERT INTO submissions ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        ))
        .bind(row.id)
        .bind(row.work_request_id)
        .bind(row.submitted_by)
        .bind(row.version)
        .bind(row.kind)
        .bind(row.artifact_url)
        .bind(row.deliverable_files)
        .bind(row.description)
        .bind(row.notes)
        .bind(row.status)
        .bind(row.review_notes)
        .bind(row.submitted_at)
        .bind(row.updated_at)
        .execute(conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                SubmissionRepositoryError::Conflict
            }
            _ => SubmissionRepositoryError::StorageUnavailable,
        })?;
        Ok(())
    }

    async fn update_status_impl_conn(
        conn: &mut sqlx::PgConnection,
        id: Uuid,
        expected_status: String,
        next_status: String,
        review_notes: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Option<SubmissionRow>, SubmissionRepositoryError> {
        sqlx::query_as::<_, SubmissionRow>(&format!(
            "UPDATE submissions SET \
               status = $3, \
               review_notes = COALESCE($4, review_notes), \
               updated_at = $5 \
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
        .map_err(|_| SubmissionRepositoryError::StorageUnavailable)
    }
}

#[async_trait]
impl SubmissionStore for SubmissionStorePostgres {
    async fn latest_for_work_request(
        &self,
        work_request_id: Uuid,
    ) -> Result<Option<SubmissionRow>, SubmissionRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move { Self::latest_impl_conn(conn, work_request_id).await })
            })
            .await
    }

    async fn latest_for_work_request_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        work_request_id: Uuid,
    ) -> Result<Option<SubmissionRow>, SubmissionRepositoryError> {
        Self::latest_impl_conn(&mut *tx, work_request_id).await
    }

    async fn list_for_work_request(
        &self,
        work_request_id: Uuid,
    ) -> Result<Vec<SubmissionRow>, SubmissionRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move { Self::list_impl_conn(conn, work_request_id).await })
            })
            .await
    }

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: SubmissionRow,
    ) -> Result<(), SubmissionRepositoryError> {
        Self::insert_impl_conn(&mut *tx, row).await
    }

    async fn update_status_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        expected_status: String,
        next_status: String,
        review_notes: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Option<SubmissionRow>, SubmissionRepositoryError> {
        Self::update_status_impl_conn(&mut *tx, id, expected_status, next_status, review_notes, now)
            .await
    }
}
