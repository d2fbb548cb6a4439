// Use case: finalize_approval.

use crate::application::context::AppContext;
use crate::domain::entities::event::Event;
use crate::domain::entities::payment::{Payment, PaymentAttempt, PaymentAttemptStatus};
use crate::domain::entities::submission::SubmissionStatus;
use crate::domain::entities::work_request::{WorkRequest, WorkRequestStatus};
use crate::domain::services::work_request_lifecycle::WorkRequestLifecycleError;
use crate::domain::value_objects::ids::{ActorId, PaymentId, SubmissionId, WorkRequestId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::payment::gateway::DeclineCode;
use crate::infrastructure::payment::PaymentGatewayError;

/// Phase two of approval: verify the provider captured the intent, then
/// atomically approve submission and work request, record the Payment
/// and close the journaled attempt. The only code path that moves a
/// work request to `approved`.
pub struct FinalizeApprovalUseCase;

#[derive(Debug, Clone)]
pub struct FinalizeApprovalCommand {
    pub work_request_id: WorkRequestId,
    pub submission_id: SubmissionId,
    pub caller: ActorId,
    pub payment_intent_id: String,
    pub review_notes: Option<String>,
}

#[derive(Debug)]
pub enum FinalizeApprovalError {
    NotFound,
    Forbidden,
    Conflict,
    /// The provider has not captured the intent and reported no decline;
    /// the payer has not finished confirming yet.
    NotCaptured,
    PaymentDeclined {
        code: DeclineCode,
        message: String,
    },
    /// The captured intent does not match the journaled attempt; needs
    /// operator attention, never an automatic new charge.
    Reconciliation(String),
    Provider(String),
    Storage(String),
}

impl From<DatabaseError> for FinalizeApprovalError {
    fn from(error: DatabaseError) -> Self {
        FinalizeApprovalError::Storage(error.to_string())
    }
}

#[derive(Debug)]
pub struct FinalizedApproval {
    pub work_request: WorkRequest,
    pub payment: Payment,
    /// True when a finished finalize answered this call; no state moved.
    pub replayed: bool,
}

impl FinalizeApprovalUseCase {
    pub async fn execute(
        ctx: &AppContext,
        cmd: FinalizeApprovalCommand,
    ) -> Result<FinalizedApproval, FinalizeApprovalError> {
        // Step 1: Load the work request and authorize the business.
        let work_request = ctx
            .repos
            .work_request
            .get(cmd.work_request_id)
            .await
            .map_err(|e| FinalizeApprovalError::Storage(format!("{e:?}")))?
            .ok_or(FinalizeApprovalError::NotFound)?;
        if cmd.caller != work_request.business_id {
            return Err(FinalizeApprovalError::Forbidden);
        }

        // Step 2: The journaled attempt for this intent is the anchor; a
        // finalize for an intent nobody journaled is rejected outright.
        let attempt = ctx
            .repos
            .payment_attempt
            .get_by_intent(&cmd.payment_intent_id)
            .await
            .map_err(|e| FinalizeApprovalError::Storage(format!("{e:?}")))?
            .ok_or(FinalizeApprovalError::NotFound)?;
        if attempt.work_request_id != cmd.work_request_id
            || attempt.submission_id != cmd.submission_id
        {
            return Err(FinalizeApprovalError::Conflict);
        }

        // Step 3: Ask the provider what actually happened to the intent.
        let intent = ctx
            .gateway
            .retrieve_intent(&cmd.payment_intent_id)
            .await
            .map_err(map_gateway_error)?;
        if !intent.status.is_captured() {
            if let Some(decline) = intent.last_decline {
                // Journal the decline; the attempt stays open so the payer
                // can retry with another payment method.
                let _ = ctx
                    .repos
                    .payment_attempt
                    .update_status(
                        attempt.id,
                        PaymentAttemptStatus::AwaitingConfirmation,
                        PaymentAttemptStatus::AwaitingConfirmation,
                        Some(format!("{}: {}", decline.code.as_str(), decline.message)),
                        Timestamp::now_utc(),
                    )
                    .await;
                return Err(FinalizeApprovalError::PaymentDeclined {
                    code: decline.code,
                    message: decline.message,
                });
            }
            return Err(FinalizeApprovalError::NotCaptured);
        }

        // Step 4: The capture must match the journaled amount exactly.
        if intent.amount_minor != attempt.amount.amount_minor
            || !intent
                .currency
                .eq_ignore_ascii_case(attempt.amount.currency.as_str())
        {
            return Err(FinalizeApprovalError::Reconciliation(format!(
                "intent {} captured {} {} but the attempt journaled {} {}",
                intent.id,
                intent.amount_minor,
                intent.currency,
                attempt.amount.amount_minor,
                attempt.amount.currency.as_str()
            )));
        }

        // Step 5: Durably mark the capture before finalizing, so a crash
        // here leaves a resumable journal entry instead of a lost charge.
        // A missed compare-and-set means the attempt already advanced;
        // the finalize transaction below answers that idempotently.
        let _ = ctx
            .repos
            .payment_attempt
            .update_status(
                attempt.id,
                PaymentAttemptStatus::AwaitingConfirmation,
                PaymentAttemptStatus::ConfirmedPendingFinalize,
                None,
                Timestamp::now_utc(),
            )
            .await
            .map_err(|e| FinalizeApprovalError::Storage(format!("{e:?}")))?;

        // Step 6: Finalize.
        Self::finalize_confirmed(ctx, &attempt, cmd.review_notes).await
    }

    /// Finalize a capture-confirmed attempt: approve submission and work
    /// request, record the Payment, emit events and close the attempt,
    /// all in one transaction. Also the resume path for attempts a crash
    /// left in `confirmed_pending_finalize`.
    pub async fn finalize_confirmed(
        ctx: &AppContext,
        attempt: &PaymentAttempt,
        review_notes: Option<String>,
    ) -> Result<FinalizedApproval, FinalizeApprovalError> {
        let repos = ctx.repos.clone();
        let lifecycle = ctx.lifecycle.clone();
        let attempt_id = attempt.id;
        let work_request_id = attempt.work_request_id;
        let submission_id = attempt.submission_id;
        let intent_id = attempt.intent_id.clone();
        let amount = attempt.amount;
        let now = Timestamp::now_utc();

        ctx.repos
            .with_tx(move |tx| {
                Box::pin(async move {
                    // Step 1: A recorded payment for this intent answers
                    // repeated finalizes without moving anything.
                    if let Some(existing) = repos
                        .payment
                        .get_by_intent_tx(tx, &intent_id)
                        .await
                        .map_err(|e| FinalizeApprovalError::Storage(format!("{e:?}")))?
                    {
                        let work_request = repos
                            .work_request
                            .get_tx(tx, work_request_id)
                            .await
                            .map_err(|e| FinalizeApprovalError::Storage(format!("{e:?}")))?
                            .ok_or(FinalizeApprovalError::NotFound)?;
                        return Ok(FinalizedApproval {
                            work_request,
                            payment: existing,
                            replayed: true,
                        });
                    }

                    // Step 2: Approve the submission.
                    repos
                        .submission
                        .update_status_tx(
                            tx,
                            submission_id,
                            SubmissionStatus::Submitted,
                            SubmissionStatus::Approved,
                            review_notes.clone(),
                            now,
                        )
                        .await
                        .map_err(|e| FinalizeApprovalError::Storage(format!("{e:?}")))?
                        .ok_or(FinalizeApprovalError::Conflict)?;

                    // Step 3: Approve the work request; the approval event
                    // and its webhook fan-out commit with this transaction.
                    let work_request = lifecycle
                        .transition_tx(
                            tx,
                            work_request_id,
                            WorkRequestStatus::Submitted,
                            WorkRequestStatus::Approved,
                            review_notes,
                            now,
                        )
                        .await
                        .map_err(|error| match error {
                            WorkRequestLifecycleError::NotFound => FinalizeApprovalError::NotFound,
                            WorkRequestLifecycleError::Conflict
                            | WorkRequestLifecycleError::InvalidTransition { .. } => {
                                FinalizeApprovalError::Conflict
                            }
                            other => FinalizeApprovalError::Storage(format!("{other:?}")),
                        })?;

                    // Step 4: Record the captured payment.
                    let payment = Payment::captured_for_work_request(
                        PaymentId::new(),
                        amount,
                        intent_id.clone(),
                        work_request_id,
                    );
                    repos
                        .payment
                        .insert_tx(tx, &payment)
                        .await
                        .map_err(|e| FinalizeApprovalError::Storage(format!("{e:?}")))?;
                    lifecycle
                        .record_event_tx(tx, &Event::payment_captured(&payment))
                        .await
                        .map_err(|e| FinalizeApprovalError::Storage(format!("{e:?}")))?;

                    // Step 5: Close the journal entry.
                    repos
                        .payment_attempt
                        .update_status_tx(
                            tx,
                            attempt_id,
                            PaymentAttemptStatus::ConfirmedPendingFinalize,
                            PaymentAttemptStatus::Finalized,
                            None,
                            now,
                        )
                        .await
                        .map_err(|e| FinalizeApprovalError::Storage(format!("{e:?}")))?
                        .ok_or(FinalizeApprovalError::Conflict)?;

                    Ok(FinalizedApproval {
                        work_request,
                        payment,
                        replayed: false,
                    })
                })
            })
            .await
    }
}

fn map_gateway_error(error: PaymentGatewayError) -> FinalizeApprovalError {
    match error {
        PaymentGatewayError::Declined { code, message } => {
            FinalizeApprovalError::PaymentDeclined { code, message }
        }
        PaymentGatewayError::IntentNotFound(id) => {
            FinalizeApprovalError::Reconciliation(format!("intent {id} unknown at the provider"))
        }
        PaymentGatewayError::Provider(message) => FinalizeApprovalError::Provider(message),
        PaymentGatewayError::Transport(message) => FinalizeApprovalError::Provider(message),
    }
}

#[cfg(test)]
mod tests {
    use super::{FinalizeApprovalCommand, FinalizeApprovalError, FinalizeApprovalUseCase};
    use crate::application::context::test_support::test_context;
    use crate::domain::entities::payment::PaymentAttempt;
    use crate::domain::entities::work_request::{WorkRequest, WorkRequestStatus};
    use crate::domain::value_objects::ids::{
        ActorId, PaymentAttemptId, ProjectId, SubmissionId, WorkRequestId,
    };
    use crate::domain::value_objects::money::{Currency, Money};
    use crate::infrastructure::db::dto::payment_attempt::PaymentAttemptRow;
    use crate::infrastructure::db::dto::work_request::WorkRequestRow;
    use crate::infrastructure::db::repositories::payment_attempt_repository::PaymentAttemptRepository;
    use crate::infrastructure::db::repositories::work_request_repository::WorkRequestRepository;
    use crate::infrastructure::db::stores::payment_attempt_store::{
        PaymentAttemptRepositoryError, PaymentAttemptStore,
    };
    use crate::infrastructure::db::stores::work_request_store::{
        WorkRequestRepositoryError, WorkRequestStore,
    };
    use crate::infrastructure::payment::gateway::{
        DeclineCode, DeclineDetail, IntentStatus, PaymentGateway, PaymentIntent, ProviderTransfer,
    };
    use crate::infrastructure::payment::PaymentGatewayError;
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

    struct DummyPaymentAttemptStore {
        by_intent: Mutex<Option<PaymentAttemptRow>>,
        errors: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl PaymentAttemptStore for DummyPaymentAttemptStore {
        async fn insert(
            &self,
            _row: PaymentAttemptRow,
        ) -> Result<(), PaymentAttemptRepositoryError> {
            Err(PaymentAttemptRepositoryError::StorageUnavailable)
        }

        async fn get_by_intent(
            &self,
            intent_id: String,
        ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
            Ok(self
                .by_intent
                .lock()
                .unwrap()
                .clone()
                .filter(|row| row.intent_id == intent_id))
        }

        async fn get_by_intent_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _intent_id: String,
        ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
            Err(PaymentAttemptRepositoryError::StorageUnavailable)
        }

        async fn find_open_for_submission(
            &self,
            _submission_id: Uuid,
        ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
            Ok(None)
        }

        async fn update_status(
            &self,
            _id: Uuid,
            _expected_status: String,
            _next_status: String,
            last_error: Option<String>,
            _now: OffsetDateTime,
        ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
            self.errors.lock().unwrap().push(last_error);
            Ok(self.by_intent.lock().unwrap().clone())
        }

        async fn update_status_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: Uuid,
            _expected_status: String,
            _next_status: String,
            _last_error: Option<String>,
            _now: OffsetDateTime,
        ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
            Err(PaymentAttemptRepositoryError::StorageUnavailable)
        }

        async fn list_stale(
            &self,
            _status: String,
            _older_than: OffsetDateTime,
            _limit: i64,
        ) -> Result<Vec<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
            Ok(Vec::new())
        }
    }

    struct DummyGateway {
        intent: PaymentIntent,
    }

    #[async_trait]
    impl PaymentGateway for DummyGateway {
        async fn create_intent(
            &self,
            _amount_minor: i64,
            _currency: &str,
            _reference: &str,
        ) -> Result<PaymentIntent, PaymentGatewayError> {
            Err(PaymentGatewayError::Provider("unused".to_string()))
        }

        async fn retrieve_intent(
            &self,
            _intent_id: &str,
        ) -> Result<PaymentIntent, PaymentGatewayError> {
            Ok(self.intent.clone())
        }

        async fn transfer(
            &self,
            _amount_minor: i64,
            _currency: &str,
            _destination: &str,
            _idempotency_key: &str,
        ) -> Result<ProviderTransfer, PaymentGatewayError> {
            Err(PaymentGatewayError::Provider("unused".to_string()))
        }
    }

    fn sample_work_request() -> WorkRequest {
        let mut work_request = WorkRequest::new(
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
        .expect("work request should be valid");
        work_request.status = WorkRequestStatus::Submitted;
        work_request
    }

    fn sample_attempt(work_request: &WorkRequest, submission_id: SubmissionId) -> PaymentAttempt {
        PaymentAttempt::awaiting_confirmation(
            PaymentAttemptId::new(),
            work_request.id,
            submission_id,
            1,
            "pi_1".to_string(),
            work_request.amount,
        )
    }

    fn context_with(
        work_request: &WorkRequest,
        attempt: &PaymentAttempt,
        intent: PaymentIntent,
    ) -> (
        crate::application::context::AppContext,
        Arc<DummyPaymentAttemptStore>,
    ) {
        let mut ctx = test_context();
        ctx.repos.work_request = Arc::new(WorkRequestRepository::new(Arc::new(
            DummyWorkRequestStore {
                row: Mutex::new(Some(WorkRequestRow::from_work_request(work_request))),
            },
        )));
        let attempts = Arc::new(DummyPaymentAttemptStore {
            by_intent: Mutex::new(Some(PaymentAttemptRow::from_attempt(attempt))),
            errors: Mutex::new(Vec::new()),
        });
        ctx.repos.payment_attempt = Arc::new(PaymentAttemptRepository::new(attempts.clone()));
        ctx.gateway = Arc::new(DummyGateway { intent });
        (ctx, attempts)
    }

    fn command(work_request: &WorkRequest, attempt: &PaymentAttempt) -> FinalizeApprovalCommand {
        FinalizeApprovalCommand {
            work_request_id: work_request.id,
            submission_id: attempt.submission_id,
            caller: work_request.business_id,
            payment_intent_id: attempt.intent_id.clone(),
            review_notes: None,
        }
    }

    #[tokio::test]
    async fn given_declined_intent_when_finalizing_should_surface_code_and_keep_attempt_open() {
        let work_request = sample_work_request();
        let attempt = sample_attempt(&work_request, SubmissionId::new());
        let intent = PaymentIntent {
            id: "pi_1".to_string(),
            status: IntentStatus::RequiresConfirmation,
            amount_minor: 50_000,
            currency: "usd".to_string(),
            client_secret: None,
            last_decline: Some(DeclineDetail {
                code: DeclineCode::InsufficientFunds,
                message: "balance too low".to_string(),
            }),
        };
        let (ctx, attempts) = context_with(&work_request, &attempt, intent);

        let result =
            FinalizeApprovalUseCase::execute(&ctx, command(&work_request, &attempt)).await;

        match result {
            Err(FinalizeApprovalError::PaymentDeclined { code, message }) => {
                assert_eq!(code, DeclineCode::InsufficientFunds);
                assert_eq!(message, "balance too low");
            }
            other => panic!("expected decline, got {other:?}"),
        }
        let errors = attempts.errors.lock().unwrap();
        assert_eq!(
            errors.as_slice(),
            &[Some("insufficient_funds: balance too low".to_string())]
        );
    }

    #[tokio::test]
    async fn given_unconfirmed_intent_when_finalizing_should_not_capture() {
        let work_request = sample_work_request();
        let attempt = sample_attempt(&work_request, SubmissionId::new());
        let intent = PaymentIntent {
            id: "pi_1".to_string(),
            status: IntentStatus::Processing,
            amount_minor: 50_000,
            currency: "usd".to_string(),
            client_secret: None,
            last_decline: None,
        };
        let (ctx, _) = context_with(&work_request, &attempt, intent);

        let result =
            FinalizeApprovalUseCase::execute(&ctx, command(&work_request, &attempt)).await;

        match result {
            Err(FinalizeApprovalError::NotCaptured) => {}
            other => panic!("expected not captured, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn given_amount_mismatch_when_finalizing_should_flag_reconciliation() {
        let work_request = sample_work_request();
        let attempt = sample_attempt(&work_request, SubmissionId::new());
        let intent = PaymentIntent {
            id: "pi_1".to_string(),
            status: IntentStatus::Succeeded,
            amount_minor: 1_000,
            currency: "usd".to_string(),
            client_secret: None,
            last_decline: None,
        };
        let (ctx, _) = context_with(&work_request, &attempt, intent);

        let result =
            FinalizeApprovalUseCase::execute(&ctx, command(&work_request, &attempt)).await;

        match result {
            Err(FinalizeApprovalError::Reconciliation(message)) => {
                assert!(message.contains("captured 1000 usd"));
            }
            other => panic!("expected reconciliation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn given_unknown_intent_when_finalizing_should_be_not_found() {
        let work_request = sample_work_request();
        let attempt = sample_attempt(&work_request, SubmissionId::new());
        let intent = PaymentIntent {
            id: "pi_1".to_string(),
            status: IntentStatus::Succeeded,
            amount_minor: 50_000,
            currency: "usd".to_string(),
            client_secret: None,
            last_decline: None,
        };
        let (ctx, _) = context_with(&work_request, &attempt, intent);
        let mut cmd = command(&work_request, &attempt);
        cmd.payment_intent_id = "pi_other".to_string();

        let result = FinalizeApprovalUseCase::execute(&ctx, cmd).await;

        match result {
            Err(FinalizeApprovalError::NotFound) => {}
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn given_captured_intent_when_finalizing_should_reach_the_transaction() {
        let work_request = sample_work_request();
        let attempt = sample_attempt(&work_request, SubmissionId::new());
        let intent = PaymentIntent {
            id: "pi_1".to_string(),
            status: IntentStatus::Succeeded,
            amount_minor: 50_000,
            currency: "USD".to_string(),
            client_secret: None,
            last_decline: None,
        };
        let (ctx, _) = context_with(&work_request, &attempt, intent);

        let result =
            FinalizeApprovalUseCase::execute(&ctx, command(&work_request, &attempt)).await;

        // Currency casing from the provider must not trip reconciliation;
        // the call gets as far as the finalize transaction.
        match result {
            Err(FinalizeApprovalError::Storage(message)) => {
                assert!(message.contains("tx_unavailable"));
            }
            other => panic!("expected storage error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn given_contractor_caller_when_finalizing_should_be_forbidden() {
        let work_request = sample_work_request();
        let attempt = sample_attempt(&work_request, SubmissionId::new());
        let intent = PaymentIntent {
            id: "pi_1".to_string(),
            status: IntentStatus::Succeeded,
            amount_minor: 50_000,
            currency: "usd".to_string(),
            client_secret: None,
            last_decline: None,
        };
        let (ctx, _) = context_with(&work_request, &attempt, intent);
        let mut cmd = command(&work_request, &attempt);
        cmd.caller = work_request.contractor_id;

        let result = FinalizeApprovalUseCase::execute(&ctx, cmd).await;

        match result {
            Err(FinalizeApprovalError::Forbidden) => {}
            other => panic!("expected forbidden, got {other:?}"),
        }
    }
}
