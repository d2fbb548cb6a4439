use crate::domain::entities::payment::{Payment, PaymentStatus};
use crate::domain::value_objects::ids::{MilestoneId, PaymentId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::dto::payment::PaymentRow;
use crate::infrastructure::db::stores::payment_store::{PaymentRepositoryError, PaymentStore};
use std::sync::Arc;

pub struct PaymentRepository {
    store: Arc<dyn PaymentStore>,
}

impl PaymentRepository {
    pub fn new(store: Arc<dyn PaymentStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: PaymentId) -> Result<Option<Payment>, PaymentRepositoryError> {
        let row = self.store.get(id.0).await?;
        Ok(row.map(PaymentRow::into_payment))
    }

    pub async fn get_by_intent_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        intent_id: &str,
    ) -> Result<Option<Payment>, PaymentRepositoryError> {
        let row = self
            .store
            .get_by_intent_tx(tx, intent_id.to_string())
            .await?;
        Ok(row.map(PaymentRow::into_payment))
    }

    pub async fn get_by_milestone_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        milestone_id: MilestoneId,
    ) -> Result<Option<Payment>, PaymentRepositoryError> {
        let row = self.store.get_by_milestone_tx(tx, milestone_id.0).await?;
        Ok(row.map(PaymentRow::into_payment))
    }

    pub async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payment: &Payment,
    ) -> Result<(), PaymentRepositoryError> {
        self.store
            .insert_tx(tx, PaymentRow::from_payment(payment))
            .await
    }

    pub async fn list_by_status(
        &self,
        status: PaymentStatus,
        limit: i64,
    ) -> Result<Vec<Payment>, PaymentRepositoryError> {
        let rows = self
            .store
            .list_by_status(status.as_str().to_string(), limit)
            .await?;
        Ok(rows.into_iter().map(PaymentRow::into_payment).collect())
    }

    pub async fn mark_transferred_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: PaymentId,
        transfer_id: &str,
        now: Timestamp,
    ) -> Result<Option<Payment>, PaymentRepositoryError> {
        let row = self
            .store
            .mark_transferred_tx(tx, id.0, transfer_id.to_string(), now.into_inner())
            .await?;
        Ok(row.map(PaymentRow::into_payment))
    }
}
