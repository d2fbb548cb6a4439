use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::milestone::MilestoneRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, PartialEq)]
pub enum MilestoneRepositoryError {
    NotFound,
    Conflict,
    StorageUnavailable,
}

impl From<DatabaseError> for MilestoneRepositoryError {
    fn from(_: DatabaseError) -> Self {
        MilestoneRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait MilestoneStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<MilestoneRow>, MilestoneRepositoryError>;

    async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
    ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError>;

    async fn list_by_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Vec<MilestoneRow>, MilestoneRepositoryError>;

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: MilestoneRow,
    ) -> Result<(), MilestoneRepositoryError>;

    /// pending -> submitted, stamping the deliverable and submit time.
    async fn submit_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        deliverable_url: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError>;

    /// submitted -> approved. The `approved_at IS NULL` guard makes the
    /// stamp single-shot even under concurrent approvals.
    async fn approve_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        now: OffsetDateTime,
    ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError>;

    /// submitted -> rejected with the reviewer's notes.
    async fn reject_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        review_notes: String,
        now: OffsetDateTime,
    ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError>;
}
