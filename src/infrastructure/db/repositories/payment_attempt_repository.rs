use crate::domain::entities::payment::{PaymentAttempt, PaymentAttemptStatus};
use crate::domain::value_objects::ids::{PaymentAttemptId, SubmissionId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::dto::payment_attempt::PaymentAttemptRow;
use crate::infrastructure::db::stores::payment_attempt_store::{
    PaymentAttemptRepositoryError, PaymentAttemptStore,
};
use std::sync::Arc;

pub struct PaymentAttemptRepository {
    store: Arc<dyn PaymentAttemptStore>,
}

impl PaymentAttemptRepository {
    pub fn new(store: Arc<dyn PaymentAttemptStore>) -> Self {
        Self { store }
    }

    pub async fn insert(
        &self,
        attempt: &PaymentAttempt,
    ) -> Result<(), PaymentAttemptRepositoryError> {
        self.store
            .insert(PaymentAttemptRow::from_attempt(attempt))
            .await
    }

    pub async fn get_by_intent(
        &self,
        intent_id: &str,
    ) -> Result<Option<PaymentAttempt>, PaymentAttemptRepositoryError> {
        let row = self.store.get_by_intent(intent_id.to_string()).await?;
        Ok(row.map(PaymentAttemptRow::into_attempt))
    }

    pub async fn get_by_intent_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        intent_id: &str,
    ) -> Result<Option<PaymentAttempt>, PaymentAttemptRepositoryError> {
        let row = self
            .store
            .get_by_intent_tx(tx, intent_id.to_string())
            .await?;
        Ok(row.map(PaymentAttemptRow::into_attempt))
    }

    pub async fn find_open_for_submission(
        &self,
        submission_id: SubmissionId,
    ) -> Result<Option<PaymentAttempt>, PaymentAttemptRepositoryError> {
        let row = self.store.find_open_for_submission(submission_id.0).await?;
        Ok(row.map(PaymentAttemptRow::into_attempt))
    }

    pub async fn update_status(
        &self,
        id: PaymentAttemptId,
        expected: PaymentAttemptStatus,
        next: PaymentAttemptStatus,
        last_error: Option<String>,
        now: Timestamp,
    ) -> Result<Option<PaymentAttempt>, PaymentAttemptRepositoryError> {
        let row = self
            .store
            .update_status(
                id.0,
                expected.as_str().to_string(),
                next.as_str().to_string(),
                last_error,
                now.into_inner(),
            )
            .await?;
        Ok(row.map(PaymentAttemptRow::into_attempt))
    }

    pub async fn update_status_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: PaymentAttemptId,
        expected: PaymentAttemptStatus,
        next: PaymentAttemptStatus,
        last_error: Option<String>,
        now: Timestamp,
    ) -> Result<Option<PaymentAttempt>, PaymentAttemptRepositoryError> {
        let row = self
            .store
            .update_status_tx(
                tx,
                id.0,
                expected.as_str().to_string(),
                next.as_str().to_string(),
                last_error,
                now.into_inner(),
            )
            .await?;
        Ok(row.map(PaymentAttemptRow::into_attempt))
    }

    pub async fn list_stale(
        &self,
        status: PaymentAttemptStatus,
        older_than: Timestamp,
        limit: i64,
    ) -> Result<Vec<PaymentAttempt>, PaymentAttemptRepositoryError> {
        let rows = self
            .store
            .list_stale(status.as_str().to_string(), older_than.into_inner(), limit)
            .await?;
        Ok(rows
            .into_iter()
            .map(PaymentAttemptRow::into_attempt)
            .collect())
    }
}
