// Use case: create_work_request.

use crate::application::context::AppContext;
use crate::domain::entities::work_request::{WorkRequest, WorkRequestValidationError};
use crate::domain::services::work_request_lifecycle::{
    CreatedWorkRequest, WorkRequestLifecycleError,
};
use crate::domain::value_objects::ids::{ActorId, ProjectId, WorkRequestId};
use crate::domain::value_objects::money::Money;
use crate::domain::value_objects::timestamps::Timestamp;
use crate::domain::workflows::budget_guard::BudgetViolation;

/// Creates and assigns a work request, reserving its amount against the
/// business budget.
pub struct CreateWorkRequestUseCase;

#[derive(Debug, Clone)]
pub struct CreateWorkRequestCommand {
    pub project_id: ProjectId,
    pub business_id: ActorId,
    pub contractor_id: ActorId,
    pub title: String,
    pub description: String,
    pub deliverable_description: String,
    pub amount: Money,
    pub due_date: Option<Timestamp>,
    pub idempotency_key: Option<String>,
}

#[derive(Debug)]
pub enum CreateWorkRequestError {
    Validation(WorkRequestValidationError),
    BudgetNotConfigured,
    BudgetExceeded(BudgetViolation),
    CurrencyMismatch,
    IdempotencyConflict,
    Storage(String),
}

#[derive(Debug)]
pub struct CreateWorkRequestResult {
    pub work_request: WorkRequest,
    /// True when an idempotency key replay returned the original.
    pub replayed: bool,
}

impl CreateWorkRequestUseCase {
    pub async fn execute(
        ctx: &AppContext,
        cmd: CreateWorkRequestCommand,
    ) -> Result<CreateWorkRequestResult, CreateWorkRequestError> {
        // Step 1: Build the domain work request (validates fields).
        let work_request = WorkRequest::new(
            WorkRequestId::new(),
            cmd.project_id,
            cmd.business_id,
            cmd.contractor_id,
            cmd.title,
            cmd.description,
            cmd.deliverable_description,
            cmd.amount,
            cmd.due_date,
        )
        .map_err(CreateWorkRequestError::Validation)?;

        // Step 2: Create through the lifecycle; the budget guard, the
        // created event and webhook fan-out all run in one transaction.
        let CreatedWorkRequest {
            work_request,
            replayed,
        } = ctx
            .lifecycle
            .create(work_request, cmd.idempotency_key)
            .await
            .map_err(map_lifecycle_error)?;

        // Step 3: Return the stored work request.
        Ok(CreateWorkRequestResult {
            work_request,
            replayed,
        })
    }
}

fn map_lifecycle_error(error: WorkRequestLifecycleError) -> CreateWorkRequestError {
    match error {
        WorkRequestLifecycleError::BudgetNotConfigured => {
            CreateWorkRequestError::BudgetNotConfigured
        }
        WorkRequestLifecycleError::BudgetExceeded(violation) => {
            CreateWorkRequestError::BudgetExceeded(violation)
        }
        WorkRequestLifecycleError::CurrencyMismatch => CreateWorkRequestError::CurrencyMismatch,
        WorkRequestLifecycleError::Conflict => CreateWorkRequestError::IdempotencyConflict,
        other => CreateWorkRequestError::Storage(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CreateWorkRequestCommand, CreateWorkRequestError, CreateWorkRequestUseCase,
    };
    use crate::application::context::test_support::test_context;
    use crate::domain::entities::event::Event;
    use crate::domain::entities::work_request::{
        WorkRequest, WorkRequestStatus, WorkRequestValidationError,
    };
    use crate::domain::services::work_request_lifecycle::{
        CreatedWorkRequest, WorkRequestLifecycleError, WorkRequestLifecycleService,
    };
    use crate::domain::value_objects::ids::{ActorId, ProjectId, WorkRequestId};
    use crate::domain::value_objects::money::{Currency, Money};
    use crate::domain::value_objects::timestamps::Timestamp;
    use crate::domain::workflows::budget_guard::BudgetViolation;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct DummyLifecycle {
        outcome: Result<CreatedWorkRequest, WorkRequestLifecycleError>,
    }

    #[async_trait]
    impl WorkRequestLifecycleService for DummyLifecycle {
        async fn create(
            &self,
            _work_request: WorkRequest,
            _idempotency_key: Option<String>,
        ) -> Result<CreatedWorkRequest, WorkRequestLifecycleError> {
            self.outcome.clone()
        }

        async fn transition(
            &self,
            _id: WorkRequestId,
            _expected: WorkRequestStatus,
            _next: WorkRequestStatus,
            _review_notes: Option<String>,
        ) -> Result<WorkRequest, WorkRequestLifecycleError> {
            Err(WorkRequestLifecycleError::Storage("unused".to_string()))
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

    fn command() -> CreateWorkRequestCommand {
        CreateWorkRequestCommand {
            project_id: ProjectId::new(),
            business_id: ActorId::new(),
            contractor_id: ActorId::new(),
            title: "Landing page".to_string(),
            description: "Build the marketing landing page".to_string(),
            deliverable_description: "Deployed page plus source archive".to_string(),
            amount: Money::new(50_000, Currency::Usd),
            due_date: None,
            idempotency_key: None,
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
    async fn given_same_parties_when_execute_should_fail_validation() {
        let ctx = test_context();
        let mut cmd = command();
        cmd.contractor_id = cmd.business_id;

        let result = CreateWorkRequestUseCase::execute(&ctx, cmd).await;

        match result {
            Err(CreateWorkRequestError::Validation(
                WorkRequestValidationError::SameBusinessAndContractor,
            )) => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn given_lifecycle_success_when_execute_should_return_work_request() {
        let mut ctx = test_context();
        let work_request = sample_work_request();
        ctx.lifecycle = Arc::new(DummyLifecycle {
            outcome: Ok(CreatedWorkRequest {
                work_request: work_request.clone(),
                replayed: false,
            }),
        });

        let result = CreateWorkRequestUseCase::execute(&ctx, command())
            .await
            .expect("create should succeed");

        assert_eq!(result.work_request.id, work_request.id);
        assert_eq!(result.work_request.status, WorkRequestStatus::Pending);
        assert!(!result.replayed);
    }

    #[tokio::test]
    async fn given_replayed_key_when_execute_should_flag_replay() {
        let mut ctx = test_context();
        ctx.lifecycle = Arc::new(DummyLifecycle {
            outcome: Ok(CreatedWorkRequest {
                work_request: sample_work_request(),
                replayed: true,
            }),
        });
        let mut cmd = command();
        cmd.idempotency_key = Some("retry-123".to_string());

        let result = CreateWorkRequestUseCase::execute(&ctx, cmd)
            .await
            .expect("replay should succeed");

        assert!(result.replayed);
    }

    #[tokio::test]
    async fn given_exhausted_budget_when_execute_should_report_violation() {
        let mut ctx = test_context();
        let violation = BudgetViolation {
            proposed_minor: 50_000,
            cap_minor: 60_000,
            already_allocated_minor: 20_000,
            shortfall_minor: 10_000,
        };
        ctx.lifecycle = Arc::new(DummyLifecycle {
            outcome: Err(WorkRequestLifecycleError::BudgetExceeded(violation)),
        });

        let result = CreateWorkRequestUseCase::execute(&ctx, command()).await;

        match result {
            Err(CreateWorkRequestError::BudgetExceeded(reported)) => {
                assert_eq!(reported.shortfall_minor, 10_000);
            }
            other => panic!("expected budget violation, got {other:?}"),
        }
    }
}
