use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::budget::BudgetRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, PartialEq)]
pub enum BudgetRepositoryError {
    NotFound,
    StorageUnavailable,
}

impl From<DatabaseError> for BudgetRepositoryError {
    fn from(_: DatabaseError) -> Self {
        BudgetRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait BudgetStore: Send + Sync {
    async fn get(&self, business_id: Uuid) -> Result<Option<BudgetRow>, BudgetRepositoryError>;

    async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        business_id: Uuid,
    ) -> Result<Option<BudgetRow>, BudgetRepositoryError>;

    /// Creates or reconfigures the cap for a business. `used_minor` is
    /// preserved on update; only the insert seeds it from the row.
    async fn upsert(&self, row: BudgetRow) -> Result<BudgetRow, BudgetRepositoryError>;

    /// Conditionally reserves `amount_minor` against the cap. Returns
    /// `None` when no budget exists for the business and currency or
    /// when the reservation would reach or exceed the cap.
    async fn allocate_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        business_id: Uuid,
        amount_minor: i64,
        currency: String,
        now: OffsetDateTime,
    ) -> Result<Option<BudgetRow>, BudgetRepositoryError>;

    /// Gives back a prior reservation, clamped at zero.
    async fn release_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        business_id: Uuid,
        amount_minor: i64,
        now: OffsetDateTime,
    ) -> Result<Option<BudgetRow>, BudgetRepositoryError>;
}
