use crate::domain::entities::event::Event;
use crate::domain::entities::webhook::WebhookDelivery;
use crate::domain::entities::work_request::{WorkRequest, WorkRequestStatus};
use crate::domain::value_objects::ids::WorkRequestId;
use crate::domain::value_objects::timestamps::Timestamp;
use crate::domain::workflows::budget_guard::{check_budget, BudgetViolation};
use crate::domain::workflows::state_machine::WorkRequestStateMachine;
use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::repositories::Repositories;
use crate::infrastructure::db::stores::work_request_store::WorkRequestRepositoryError;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub enum WorkRequestLifecycleError {
    InvalidTransition {
        from: WorkRequestStatus,
        to: WorkRequestStatus,
    },
    NotFound,
    Conflict,
    BudgetNotConfigured,
    BudgetExceeded(BudgetViolation),
    CurrencyMismatch,
    Storage(String),
}

impl From<DatabaseError> for WorkRequestLifecycleError {
    fn from(error: DatabaseError) -> Self {
        WorkRequestLifecycleError::Storage(error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedWorkRequest {
    pub work_request: WorkRequest,
    /// True when an idempotency key replay returned the original resource
    /// instead of creating a new one.
    pub replayed: bool,
}

/// Orchestrates work-request mutations: every accepted change runs in one
/// transaction that moves the entity, appends its typed event, and queues
/// webhook deliveries for matching subscriptions.
#[async_trait]
pub trait WorkRequestLifecycleService: Send + Sync {
    /// Create a work request, allocating its amount against the business
    /// budget. An `Idempotency-Key` replay returns the original.
    async fn create(
        &self,
        work_request: WorkRequest,
        idempotency_key: Option<String>,
    ) -> Result<CreatedWorkRequest, WorkRequestLifecycleError>;

    /// Apply a status transition in its own transaction.
    async fn transition(
        &self,
        id: WorkRequestId,
        expected: WorkRequestStatus,
        next: WorkRequestStatus,
        review_notes: Option<String>,
    ) -> Result<WorkRequest, WorkRequestLifecycleError>;

    /// Apply a status transition inside a caller-owned transaction, for
    /// flows that change more than the work request.
    async fn transition_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: WorkRequestId,
        expected: WorkRequestStatus,
        next: WorkRequestStatus,
        review_notes: Option<String>,
        now: Timestamp,
    ) -> Result<WorkRequest, WorkRequestLifecycleError>;

    /// Persist an event and queue its webhook deliveries inside a
    /// caller-owned transaction.
    async fn record_event_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event: &Event,
    ) -> Result<(), WorkRequestLifecycleError>;
}

pub struct WorkRequestLifecycle {
    repos: Repositories,
}

impl WorkRequestLifecycle {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl WorkRequestLifecycleService for WorkRequestLifecycle {
    async fn create(
        &self,
        work_request: WorkRequest,
        idempotency_key: Option<String>,
    ) -> Result<CreatedWorkRequest, WorkRequestLifecycleError> {
        let repos = self.repos.clone();
        self.repos
            .with_tx(move |tx| {
                Box::pin(async move {
                    create_in(&repos, tx, work_request, idempotency_key.as_deref()).await
                })
            })
            .await
    }

    async fn transition(
        &self,
        id: WorkRequestId,
        expected: WorkRequestStatus,
        next: WorkRequestStatus,
        review_notes: Option<String>,
    ) -> Result<WorkRequest, WorkRequestLifecycleError> {
        // Forbidden pairs fail before any storage round trip.
        WorkRequestStateMachine::transition(expected, next).map_err(|_| {
            WorkRequestLifecycleError::InvalidTransition {
                from: expected,
                to: next,
            }
        })?;

        let repos = self.repos.clone();
        self.repos
            .with_tx(move |tx| {
                Box::pin(async move {
                    transition_in(
                        &repos,
                        tx,
                        id,
                        expected,
                        next,
                        review_notes,
                        Timestamp::now_utc(),
                    )
                    .await
                })
            })
            .await
    }

    async fn transition_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: WorkRequestId,
        expected: WorkRequestStatus,
        next: WorkRequestStatus,
        review_notes: Option<String>,
        now: Timestamp,
    ) -> Result<WorkRequest, WorkRequestLifecycleError> {
        WorkRequestStateMachine::transition(expected, next).map_err(|_| {
            WorkRequestLifecycleError::InvalidTransition {
                from: expected,
                to: next,
            }
        })?;
        transition_in(&self.repos, tx, id, expected, next, review_notes, now).await
    }

    async fn record_event_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event: &Event,
    ) -> Result<(), WorkRequestLifecycleError> {
        record_event_in(&self.repos, tx, event).await
    }
}

async fn create_in(
    repos: &Repositories,
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    work_request: WorkRequest,
    idempotency_key: Option<&str>,
) -> Result<CreatedWorkRequest, WorkRequestLifecycleError> {
    let now = Timestamp::now_utc();
    let business_id = work_request.business_id;

    // Step 1: Replay check, then claim the key before any other write so a
    // lost race rolls the whole creation back.
    if let Some(key) = idempotency_key {
        if let Some(existing_id) = repos
            .idempotency
            .get_tx(tx, business_id, key)
            .await
            .map_err(|e| WorkRequestLifecycleError::Storage(format!("{e:?}")))?
        {
            return replay(repos, tx, existing_id).await;
        }

        let claimed = repos
            .idempotency
            .claim_tx(tx, business_id, key, work_request.id, now)
            .await
            .map_err(|e| WorkRequestLifecycleError::Storage(format!("{e:?}")))?;
        if !claimed {
            // A concurrent holder committed between the read and the claim.
            let existing_id = repos
                .idempotency
                .get_tx(tx, business_id, key)
                .await
                .map_err(|e| WorkRequestLifecycleError::Storage(format!("{e:?}")))?
                .ok_or(WorkRequestLifecycleError::Conflict)?;
            return replay(repos, tx, existing_id).await;
        }
    }

    // Step 2: Budget guard against the business budget, then the row-level
    // allocation which is the arbiter under concurrency.
    let budget = repos
        .budget
        .get_tx(tx, business_id)
        .await
        .map_err(|e| WorkRequestLifecycleError::Storage(format!("{e:?}")))?
        .ok_or(WorkRequestLifecycleError::BudgetNotConfigured)?;
    if budget.currency != work_request.amount.currency {
        return Err(WorkRequestLifecycleError::CurrencyMismatch);
    }
    check_budget(
        work_request.amount.amount_minor,
        budget.cap_minor,
        budget.used_minor,
    )
    .map_err(WorkRequestLifecycleError::BudgetExceeded)?;

    let allocated = repos
        .budget
        .allocate_tx(tx, business_id, work_request.amount, now)
        .await
        .map_err(|e| WorkRequestLifecycleError::Storage(format!("{e:?}")))?;
    if allocated.is_none() {
        // The pre-check passed but a concurrent allocation claimed the
        // headroom first.
        let budget = repos
            .budget
            .get_tx(tx, business_id)
            .await
            .map_err(|e| WorkRequestLifecycleError::Storage(format!("{e:?}")))?
            .ok_or(WorkRequestLifecycleError::BudgetNotConfigured)?;
        let violation = check_budget(
            work_request.amount.amount_minor,
            budget.cap_minor,
            budget.used_minor,
        )
        .err()
        .ok_or(WorkRequestLifecycleError::Conflict)?;
        return Err(WorkRequestLifecycleError::BudgetExceeded(violation));
    }

    // Step 3: Persist the work request and its created event.
    repos
        .work_request
        .insert_tx(tx, &work_request)
        .await
        .map_err(map_work_request_error)?;
    let event = Event::work_request_created(&work_request);
    record_event_in(repos, tx, &event).await?;

    Ok(CreatedWorkRequest {
        work_request,
        replayed: false,
    })
}

async fn replay(
    repos: &Repositories,
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    existing_id: WorkRequestId,
) -> Result<CreatedWorkRequest, WorkRequestLifecycleError> {
    let existing = repos
        .work_request
        .get_tx(tx, existing_id)
        .await
        .map_err(map_work_request_error)?
        .ok_or(WorkRequestLifecycleError::Conflict)?;
    Ok(CreatedWorkRequest {
        work_request: existing,
        replayed: true,
    })
}

async fn transition_in(
    repos: &Repositories,
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: WorkRequestId,
    expected: WorkRequestStatus,
    next: WorkRequestStatus,
    review_notes: Option<String>,
    now: Timestamp,
) -> Result<WorkRequest, WorkRequestLifecycleError> {
    let updated = repos
        .work_request
        .transition_tx(tx, id, expected, next, review_notes, now)
        .await
        .map_err(map_work_request_error)?;

    let Some(updated) = updated else {
        // Zero rows: the work request is missing or its status moved.
        let current = repos
            .work_request
            .get_tx(tx, id)
            .await
            .map_err(map_work_request_error)?;
        return Err(match current {
            None => WorkRequestLifecycleError::NotFound,
            Some(_) => WorkRequestLifecycleError::Conflict,
        });
    };

    // A declined or rejected request never pays out; its allocation goes
    // back to the budget. A missing budget row has nothing to release.
    if matches!(
        next,
        WorkRequestStatus::Declined | WorkRequestStatus::Rejected
    ) {
        repos
            .budget
            .release_tx(tx, updated.business_id, updated.amount, now)
            .await
            .map_err(|e| WorkRequestLifecycleError::Storage(format!("{e:?}")))?;
    }

    let event = Event::from_work_request_transition(&updated, expected).map_err(|_| {
        WorkRequestLifecycleError::InvalidTransition {
            from: expected,
            to: next,
        }
    })?;
    record_event_in(repos, tx, &event).await?;
    Ok(updated)
}

async fn record_event_in(
    repos: &Repositories,
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    event: &Event,
) -> Result<(), WorkRequestLifecycleError> {
    repos
        .event
        .insert_tx(tx, event)
        .await
        .map_err(|e| WorkRequestLifecycleError::Storage(format!("{e:?}")))?;

    let subscriptions = repos
        .webhook
        .list_for_topic_tx(tx, event.topic)
        .await
        .map_err(|e| WorkRequestLifecycleError::Storage(format!("{e:?}")))?;
    for subscription in subscriptions {
        let delivery = WebhookDelivery::pending_for(&subscription, event);
        repos
            .webhook_delivery
            .insert_tx(tx, &delivery)
            .await
            .map_err(|e| WorkRequestLifecycleError::Storage(format!("{e:?}")))?;
    }
    Ok(())
}

fn map_work_request_error(error: WorkRequestRepositoryError) -> WorkRequestLifecycleError {
    match error {
        WorkRequestRepositoryError::NotFound => WorkRequestLifecycleError::NotFound,
        WorkRequestRepositoryError::Conflict => WorkRequestLifecycleError::Conflict,
        WorkRequestRepositoryError::StorageUnavailable => {
            WorkRequestLifecycleError::Storage("storage unavailable".to_string())
        }
    }
}
