use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::work_request::WorkRequestRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, PartialEq)]
pub enum WorkRequestRepositoryError {
    NotFound,
    Conflict,
    StorageUnavailable,
}

impl From<DatabaseError> for WorkRequestRepositoryError {
    fn from(_: DatabaseError) -> Self {
        WorkRequestRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait WorkRequestStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError>;

    async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
    ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError>;

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: WorkRequestRow,
    ) -> Result<(), WorkRequestRepositoryError>;

    /// Compare-and-set status change. Matches only when the row still
    /// carries `expected_status`; `None` means someone else moved it
    /// first or the id does not exist.
    async fn transition_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        expected_status: String,
        next_status: String,
        review_notes: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError>;

    async fn list_for_business(
        &self,
        business_id: Uuid,
        status: Option<String>,
    ) -> Result<Vec<WorkRequestRow>, WorkRequestRepositoryError>;

    async fn list_for_contractor(
        &self,
        contractor_id: Uuid,
        status: Option<String>,
    ) -> Result<Vec<WorkRequestRow>, WorkRequestRepositoryError>;

    async fn status_counts_for_business(
        &self,
        business_id: Uuid,
    ) -> Result<Vec<(String, i64)>, WorkRequestRepositoryError>;
}
