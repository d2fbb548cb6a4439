use crate::domain::value_objects::ids::{ActorId, WorkRequestId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::dto::idempotency_key::IdempotencyKeyRow;
use crate::infrastructure::db::stores::idempotency_key_store::{
    IdempotencyKeyRepositoryError, IdempotencyKeyStore,
};
use std::sync::Arc;

pub struct IdempotencyKeyRepository {
    store: Arc<dyn IdempotencyKeyStore>,
}

impl IdempotencyKeyRepository {
    pub fn new(store: Arc<dyn IdempotencyKeyStore>) -> Self {
        Self { store }
    }

    /// The work request a previous holder of this key created, if any.
    pub async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        actor_id: ActorId,
        idempotency_key: &str,
    ) -> Result<Option<WorkRequestId>, IdempotencyKeyRepositoryError> {
        let row = self
            .store
            .get_tx(tx, actor_id.0, idempotency_key.to_string())
            .await?;
        Ok(row.and_then(|row| row.work_request_id).map(WorkRequestId))
    }

    /// Claims the key for `work_request_id`; `false` on replay.
    pub async fn claim_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        actor_id: ActorId,
        idempotency_key: &str,
        work_request_id: WorkRequestId,
        now: Timestamp,
    ) -> Result<bool, IdempotencyKeyRepositoryError> {
        let row = IdempotencyKeyRow {
            actor_id: actor_id.0,
            idempotency_key: idempotency_key.to_string(),
            work_request_id: Some(work_request_id.0),
            created_at: now.into_inner(),
        };
        self.store.insert_tx(tx, row).await
    }
}
