use crate::domain::entities::budget::Budget;
use crate::domain::value_objects::ids::ActorId;
use crate::domain::value_objects::money::Money;
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::dto::budget::BudgetRow;
use crate::infrastructure::db::stores::budget_store::{BudgetRepositoryError, BudgetStore};
use std::sync::Arc;

pub struct BudgetRepository {
    store: Arc<dyn BudgetStore>,
}

impl BudgetRepository {
    pub fn new(store: Arc<dyn BudgetStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, business_id: ActorId) -> Result<Option<Budget>, BudgetRepositoryError> {
        let row = self.store.get(business_id.0).await?;
        Ok(row.map(BudgetRow::into_budget))
    }

    pub async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        business_id: ActorId,
    ) -> Result<Option<Budget>, BudgetRepositoryError> {
        let row = self.store.get_tx(tx, business_id.0).await?;
        Ok(row.map(BudgetRow::into_budget))
    }

    pub async fn upsert(&self, budget: &Budget) -> Result<Budget, BudgetRepositoryError> {
        let row = self.store.upsert(BudgetRow::from_budget(budget)).await?;
        Ok(row.into_budget())
    }

    /// `None` means the reservation was refused: no budget row for the
    /// business and currency, or the amount would reach the cap.
    pub async fn allocate_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        business_id: ActorId,
        amount: Money,
        now: Timestamp,
    ) -> Result<Option<Budget>, BudgetRepositoryError> {
        let row = self
            .store
            .allocate_tx(
                tx,
                business_id.0,
                amount.amount_minor,
                amount.currency.as_str().to_string(),
                now.into_inner(),
            )
            .await?;
        Ok(row.map(BudgetRow::into_budget))
    }

    pub async fn release_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        business_id: ActorId,
        amount: Money,
        now: Timestamp,
    ) -> Result<Option<Budget>, BudgetRepositoryError> {
        let row = self
            .store
            .release_tx(tx, business_id.0, amount.amount_minor, now.into_inner())
            .await?;
        Ok(row.map(BudgetRow::into_budget))
    }
}
