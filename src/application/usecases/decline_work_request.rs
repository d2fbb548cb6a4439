// Use case: decline_work_request.

use crate::application::context::AppContext;
use crate::domain::entities::work_request::{WorkRequest, WorkRequestStatus};
use crate::domain::services::work_request_lifecycle::WorkRequestLifecycleError;
use crate::domain::value_objects::ids::{ActorId, WorkRequestId};

/// Contractor declines a pending assignment. No feedback is required;
/// the request becomes terminal and keeps its record.
pub struct DeclineWorkRequestUseCase;

#[derive(Debug)]
pub enum DeclineWorkRequestError {
    NotFound,
    Forbidden,
    Conflict,
    Storage(String),
}

impl DeclineWorkRequestUseCase {
    pub async fn execute(
        ctx: &AppContext,
        id: WorkRequestId,
        caller: ActorId,
    ) -> Result<WorkRequest, DeclineWorkRequestError> {
        // Step 1: Load the work request.
        let work_request = ctx
            .repos
            .work_request
            .get(id)
            .await
            .map_err(|e| DeclineWorkRequestError::Storage(format!("{e:?}")))?
            .ok_or(DeclineWorkRequestError::NotFound)?;

        // Step 2: Only the assigned contractor may decline.
        if caller != work_request.contractor_id {
            return Err(DeclineWorkRequestError::Forbidden);
        }

        // Step 3: Transition pending -> declined.
        let declined = ctx
            .lifecycle
            .transition(
                id,
                WorkRequestStatus::Pending,
                WorkRequestStatus::Declined,
                None,
            )
            .await
            .map_err(|error| match error {
                WorkRequestLifecycleError::NotFound => DeclineWorkRequestError::NotFound,
                WorkRequestLifecycleError::Conflict
                | WorkRequestLifecycleError::InvalidTransition { .. } => {
                    DeclineWorkRequestError::Conflict
                }
                other => DeclineWorkRequestError::Storage(format!("{other:?}")),
            })?;

        Ok(declined)
    }
}

#[cfg(test)]
mod tests {
    use super::{DeclineWorkRequestError, DeclineWorkRequestUseCase};
    use crate::application::context::test_support::test_context;
    use crate::domain::entities::event::Event;
    use crate::domain::entities::work_request::{WorkRequest, WorkRequestStatus};
    use crate::domain::services::work_request_lifecycle::{
        CreatedWorkRequest, WorkRequestLifecycleError, WorkRequestLifecycleService,
    };
    use crate::domain::value_objects::ids::{ActorId, ProjectId, WorkRequestId};
    use crate::domain::value_objects::money::{Currency, Money};
    use crate::domain::value_objects::timestamps::Timestamp;
    use crate::infrastructure::db::dto::work_request::WorkRequestRow;
    use crate::infrastructure::db::repositories::work_request_repository::WorkRequestRepository;
    use crate::infrastructure::db::stores::work_request_store::{
        WorkRequestRepositoryError, WorkRequestStore,
    };
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use time::OffsetDateTime;
    use uuid::Uuid;

    struct DummyWorkRequestStore {
        row: Mutex<Option<WorkRequestRow>>,
    }

    #[async_trait]
    impl WorkRequestStore for DummyWorkRequestStore {
        async fn get(
            &self,
            id: Uuid,
        ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError> {
            Ok(self
                .row
                .lock()
                .unwrap()
                .clone()
                .filter(|row| row.id == id))
        }

        async fn get_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: Uuid,
        ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError> {
            Err(WorkRequestRepositoryError::StorageUnavailable)
        }

        async fn insert_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _row: WorkRequestRow,
        ) -> Result<(), WorkRequestRepositoryError> {
            Err(WorkRequestRepositoryError::StorageUnavailable)
        }

        async fn transition_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: Uuid,
            _expected_status: String,
            _next_status: String,
            _review_notes: Option<String>,
            _now: OffsetDateTime,
        ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError> {
            Err(WorkRequestRepositoryError::StorageUnavailable)
        }

        async fn list_for_business(
            &self,
            _business_id: Uuid,
            _status: Option<String>,
        ) -> Result<Vec<WorkRequestRow>, WorkRequestRepositoryError> {
            Ok(Vec::new())
        }

        async fn list_for_contractor(
            &self,
            _contractor_id: Uuid,
            _status: Option<String>,
        ) -> Result<Vec<WorkRequestRow>, WorkRequestRepositoryError> {
            Ok(Vec::new())
        }

        async fn status_counts_for_business(
            &self,
            _business_id: Uuid,
        ) -> Result<Vec<(String, i64)>, WorkRequestRepositoryError> {
            Ok(Vec::new())
        }
    }

    struct DummyLifecycle {
        outcome: Result<WorkRequest, WorkRequestLifecycleError>,
    }

    #[async_trait]
    impl WorkRequestLifecycleService for DummyLifecycle {
        async fn create(
            &self,
            _work_request: WorkRequest,
            _idempotency_key: Option<String>,
        ) -> Result<CreatedWorkRequest, WorkRequestLifecycleError> {
            Err(WorkRequestLifecycleError::Storage("unused".to_string()))
        }

        async fn transition(
            &self,
            _id: WorkRequestId,
            _expected: WorkRequestStatus,
            _next: WorkRequestStatus,
            _review_notes: Option<String>,
        ) -> Result<WorkRequest, WorkRequestLifecycleError> {
            self.outcome.clone()
        }

        async fn transition_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: WorkRequestId,
            _expected: WorkRequestStatus,
            _next: WorkRequestStatus,
            _review_notes: Option<String>,
            _now: Timestamp,
        ) -> Result<WorkRequest, WorkRequestLifecycleError> {
            Err(WorkRequestLifecycleError::Storage("unused".to_string()))
        }

        async fn record_event_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _event: &Event,
        ) -> Result<(), WorkRequestLifecycleError> {
            Err(WorkRequestLifecycleError::Storage("unused".to_string()))
        }
    }

    fn sample_work_request() -> WorkRequest {
        WorkRequest::new(
            WorkRequestId::new(),
            ProjectId::new(),
            ActorId::new(),
            ActorId::new(),
            "Landing page".to_string(),
            "Build the marketing landing page".to_string(),
            "Deployed page plus source archive".to_string(),
            Money::new(50_000, Currency::Usd),
            None,
        )
        .expect("work request should be valid")
    }

    #[tokio::test]
    async fn given_pending_request_when_contractor_declines_should_record_declined_at() {
        let work_request = sample_work_request();
        let mut declined = work_request.clone();
        declined.status = WorkRequestStatus::Declined;
        declined.declined_at = Some(Timestamp::now_utc());

        let mut ctx = test_context();
        ctx.repos.work_request = Arc::new(WorkRequestRepository::new(Arc::new(
            DummyWorkRequestStore {
                row: Mutex::new(Some(WorkRequestRow::from_work_request(&work_request))),
            },
        )));
        ctx.lifecycle = Arc::new(DummyLifecycle {
            outcome: Ok(declined),
        });

        let result =
            DeclineWorkRequestUseCase::execute(&ctx, work_request.id, work_request.contractor_id)
                .await
                .expect("decline should succeed");

        assert_eq!(result.status, WorkRequestStatus::Declined);
        assert!(result.declined_at.is_some());
    }

    #[tokio::test]
    async fn given_unrelated_caller_when_declining_should_be_forbidden() {
        let work_request = sample_work_request();
        let mut ctx = test_context();
        ctx.repos.work_request = Arc::new(WorkRequestRepository::new(Arc::new(
            DummyWorkRequestStore {
                row: Mutex::new(Some(WorkRequestRow::from_work_request(&work_request))),
            },
        )));

        let result =
            DeclineWorkRequestUseCase::execute(&ctx, work_request.id, ActorId::new()).await;

        match result {
            Err(DeclineWorkRequestError::Forbidden) => {}
            other => panic!("expected forbidden, got {other:?}"),
        }
    }
}
