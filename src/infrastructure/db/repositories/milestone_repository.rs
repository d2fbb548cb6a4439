use crate::domain::entities::milestone::Milestone;
use crate::domain::value_objects::ids::{ContractId, MilestoneId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::dto::milestone::MilestoneRow;
use crate::infrastructure::db::stores::milestone_store::{
    MilestoneRepositoryError, MilestoneStore,
};
use std::sync::Arc;

pub struct MilestoneRepository {
    store: Arc<dyn MilestoneStore>,
}

impl MilestoneRepository {
    pub fn new(store: Arc<dyn MilestoneStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: MilestoneId) -> Result<Option<Milestone>, MilestoneRepositoryError> {
        let row = self.store.get(id.0).await?;
        Ok(row.map(MilestoneRow::into_milestone))
    }

    pub async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: MilestoneId,
    ) -> Result<Option<Milestone>, MilestoneRepositoryError> {
        let row = self.store.get_tx(tx, id.0).await?;
        Ok(row.map(MilestoneRow::into_milestone))
    }

    pub async fn list_by_contract(
        &self,
        contract_id: ContractId,
    ) -> Result<Vec<Milestone>, MilestoneRepositoryError> {
        let rows = self.store.list_by_contract(contract_id.0).await?;
        Ok(rows.into_iter().map(MilestoneRow::into_milestone).collect())
    }

    pub async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        milestone: &Milestone,
    ) -> Result<(), MilestoneRepositoryError> {
        self.store
            .insert_tx(tx, MilestoneRow::from_milestone(milestone))
            .await
    }

    pub async fn submit_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: MilestoneId,
        deliverable_url: Option<String>,
        now: Timestamp,
    ) -> Result<Option<Milestone>, MilestoneRepositoryError> {
        let row = self
            .store
            .submit_tx(tx, id.0, deliverable_url, now.into_inner())
            .await?;
        Ok(row.map(MilestoneRow::into_milestone))
    }

    pub async fn approve_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: MilestoneId,
        now: Timestamp,
    ) -> Result<Option<Milestone>, MilestoneRepositoryError> {
        let row = self.store.approve_tx(tx, id.0, now.into_inner()).await?;
        Ok(row.map(MilestoneRow::into_milestone))
    }

    pub async fn reject_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: MilestoneId,
        review_notes: String,
        now: Timestamp,
    ) -> Result<Option<Milestone>, MilestoneRepositoryError> {
        let row = self
            .store
            .reject_tx(tx, id.0, review_notes, now.into_inner())
            .await?;
        Ok(row.map(MilestoneRow::into_milestone))
    }
}
