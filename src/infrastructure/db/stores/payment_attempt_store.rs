use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::payment_attempt::PaymentAttemptRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, PartialEq)]
pub enum PaymentAttemptRepositoryError {
    NotFound,
    Conflict,
    StorageUnavailable,
}

impl From<DatabaseError> for PaymentAttemptRepositoryError {
    fn from(_: DatabaseError) -> Self {
        PaymentAttemptRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait PaymentAttemptStore: Send + Sync {
    /// Journaled before the provider intent is handed to the client, so
    /// a crash can never orphan a confirmed charge.
    async fn insert(&self, row: PaymentAttemptRow) -> Result<(), PaymentAttemptRepositoryError>;

    async fn get_by_intent(
        &self,
        intent_id: String,
    ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError>;

    async fn get_by_intent_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        intent_id: String,
    ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError>;

    /// Most recent attempt still waiting on client confirmation for the
    /// given submission, if any.
    async fn find_open_for_submission(
        &self,
        submission_id: Uuid,
    ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError>;

    async fn update_status(
        &self,
        id: Uuid,
        expected_status: String,
        next_status: String,
        last_error: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError>;

    async fn update_status_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        expected_status: String,
        next_status: String,
        last_error: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError>;

    /// Attempts stuck in `status` since before `older_than`, oldest
    /// first, for the reconciliation sweep.
    async fn list_stale(
        &self,
        status: String,
        older_than: OffsetDateTime,
        limit: i64,
    ) -> Result<Vec<PaymentAttemptRow>, PaymentAttemptRepositoryError>;
}
