use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::submission::SubmissionRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, PartialEq)]
pub enum SubmissionRepositoryError {
    NotFound,
    Conflict,
    StorageUnavailable,
}

impl From<DatabaseError> for SubmissionRepositoryError {
    fn from(_: DatabaseError) -> Self {
        SubmissionRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Highest version for the work request, the only one open to review.
    async fn latest_for_work_request(
        &self,
        work_request_id: Uuid,
    ) -> Result<Option<SubmissionRow>, SubmissionRepositoryError>;

    async fn latest_for_work_request_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        work_request_id: Uuid,
    ) -> Result<Option<SubmissionRow>, SubmissionRepositoryError>;

    /// Full version history, oldest first.
    async fn list_for_work_request(
        &self,
        work_request_id: Uuid,
    ) -> Result<Vec<SubmissionRow>, SubmissionRepositoryError>;

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: SubmissionRow,
    ) -> Result<(), SubmissionRepositoryError>;

    /// Compare-and-set on the submission status; `None` when the row is
    /// gone or no longer in `expected_status`.
    async fn update_status_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        expected_status: String,
        next_status: String,
        review_notes: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Option<SubmissionRow>, SubmissionRepositoryError>;
}
