// Use case: begin_approval.

use crate::application::context::AppContext;
use crate::domain::entities::payment::PaymentAttempt;
use crate::domain::entities::work_request::WorkRequestStatus;
use crate::domain::value_objects::ids::{ActorId, PaymentAttemptId, SubmissionId, WorkRequestId};
use crate::infrastructure::payment::gateway::DeclineCode;
use crate::infrastructure::payment::PaymentGatewayError;

/// Phase one of approval: create the provider capture intent for exactly
/// the work request amount and journal the attempt. The work request
/// stays `submitted` until the payment is confirmed and finalized.
pub struct BeginApprovalUseCase;

#[derive(Debug, Clone)]
pub struct BeginApprovalCommand {
    pub work_request_id: WorkRequestId,
    pub submission_id: SubmissionId,
    pub caller: ActorId,
    /// The version the reviewer looked at; must still be the latest.
    pub version: i32,
}

#[derive(Debug)]
pub enum BeginApprovalError {
    NotFound,
    Forbidden,
    Conflict,
    StaleSubmission,
    PaymentDeclined { code: DeclineCode, message: String },
    Provider(String),
    Storage(String),
}

#[derive(Debug)]
pub struct BegunApproval {
    pub attempt: PaymentAttempt,
    pub intent_id: String,
    /// Handed to the client's payment element to confirm the charge.
    pub client_secret: Option<String>,
    /// True when an open attempt for this submission was resumed instead
    /// of creating a second provider intent.
    pub resumed: bool,
}

impl BeginApprovalUseCase {
    pub async fn execute(
        ctx: &AppContext,
        cmd: BeginApprovalCommand,
    ) -> Result<BegunApproval, BeginApprovalError> {
        // Step 1: Load the work request and authorize the business.
        let work_request = ctx
            .repos
            .work_request
            .get(cmd.work_request_id)
            .await
            .map_err(|e| BeginApprovalError::Storage(format!("{e:?}")))?
            .ok_or(BeginApprovalError::NotFound)?;
        if cmd.caller != work_request.business_id {
            return Err(BeginApprovalError::Forbidden);
        }
        if work_request.status != WorkRequestStatus::Submitted {
            return Err(BeginApprovalError::Conflict);
        }

        // Step 2: The approved version must still be the latest.
        let latest = ctx
            .repos
            .submission
            .latest_for_work_request(cmd.work_request_id)
            .await
            .map_err(|e| BeginApprovalError::Storage(format!("{e:?}")))?
            .ok_or(BeginApprovalError::NotFound)?;
        if latest.id != cmd.submission_id || latest.version != cmd.version {
            return Err(BeginApprovalError::StaleSubmission);
        }

        // Step 3: Resume an attempt that is still waiting on confirmation
        // instead of opening a second charge for the same submission.
        if let Some(open) = ctx
            .repos
            .payment_attempt
            .find_open_for_submission(cmd.submission_id)
            .await
            .map_err(|e| BeginApprovalError::Storage(format!("{e:?}")))?
        {
            let intent = ctx
                .gateway
                .retrieve_intent(&open.intent_id)
                .await
                .map_err(map_gateway_error)?;
            return Ok(BegunApproval {
                intent_id: open.intent_id.clone(),
                client_secret: intent.client_secret,
                attempt: open,
                resumed: true,
            });
        }

        // Step 4: Create the intent for exactly the assigned amount. The
        // submission id keys provider-side idempotency.
        let reference = cmd.submission_id.0.to_string();
        let intent = ctx
            .gateway
            .create_intent(
                work_request.amount.amount_minor,
                work_request.amount.currency.as_str(),
                &reference,
            )
            .await
            .map_err(map_gateway_error)?;

        // Step 5: Journal the attempt before the client ever sees the
        // intent, so a confirmed charge can always be traced back.
        let attempt = PaymentAttempt::awaiting_confirmation(
            PaymentAttemptId::new(),
            cmd.work_request_id,
            cmd.submission_id,
            cmd.version,
            intent.id.clone(),
            work_request.amount,
        );
        ctx.repos
            .payment_attempt
            .insert(&attempt)
            .await
            .map_err(|e| BeginApprovalError::Storage(format!("{e:?}")))?;

        Ok(BegunApproval {
            attempt,
            intent_id: intent.id,
            client_secret: intent.client_secret,
            resumed: false,
        })
    }
}

fn map_gateway_error(error: PaymentGatewayError) -> BeginApprovalError {
    match error {
        PaymentGatewayError::Declined { code, message } => {
            BeginApprovalError::PaymentDeclined { code, message }
        }
        PaymentGatewayError::IntentNotFound(id) => {
            BeginApprovalError::Provider(format!("intent {id} disappeared at the provider"))
        }
        PaymentGatewayError::Provider(message) => BeginApprovalError::Provider(message),
        PaymentGatewayError::Transport(message) => BeginApprovalError::Provider(message),
    }
}

#[cfg(test)]
mod tests {
    use super::{BeginApprovalCommand, BeginApprovalError, BeginApprovalUseCase};
    use crate::application::context::test_support::test_context;
    use crate::domain::entities::payment::{PaymentAttempt, PaymentAttemptStatus};
    use crate::domain::entities::submission::{Submission, SubmissionKind};
    use crate::domain::entities::work_request::{WorkRequest, WorkRequestStatus};
    use crate::domain::value_objects::ids::{
        ActorId, PaymentAttemptId, ProjectId, SubmissionId, WorkRequestId,
    };
    use crate::domain::value_objects::money::{Currency, Money};
    use crate::infrastructure::db::dto::payment_attempt::PaymentAttemptRow;
    use crate::infrastructure::db::dto::submission::SubmissionRow;
    use crate::infrastructure::db::dto::work_request::WorkRequestRow;
    use crate::infrastructure::db::repositories::payment_attempt_repository::PaymentAttemptRepository;
    use crate::infrastructure::db::repositories::submission_repository::SubmissionRepository;
    use crate::infrastructure::db::repositories::work_request_repository::WorkRequestRepository;
    use crate::infrastructure::db::stores::payment_attempt_store::{
        PaymentAttemptRepositoryError, PaymentAttemptStore,
    };
    use crate::infrastructure::db::stores::submission_store::{
        SubmissionRepositoryError, SubmissionStore,
    };
    use crate::infrastructure::db::stores::work_request_store::{
        WorkRequestRepositoryError, WorkRequestStore,
    };
    use crate::infrastructure::payment::gateway::{
        DeclineCode, IntentStatus, PaymentGateway, PaymentIntent, ProviderTransfer,
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

    struct DummySubmissionStore {
        latest: Mutex<Option<SubmissionRow>>,
    }

    #[async_trait]
    impl SubmissionStore for DummySubmissionStore {
        async fn latest_for_work_request(
            &self,
            _work_request_id: Uuid,
        ) -> Result<Option<SubmissionRow>, SubmissionRepositoryError> {
            Ok(self.latest.lock().unwrap().clone())
        }

        async fn latest_for_work_request_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _work_request_id: Uuid,
        ) -> Result<Option<SubmissionRow>, SubmissionRepositoryError> {
            Err(SubmissionRepositoryError::StorageUnavailable)
        }

        async fn list_for_work_request(
            &self,
            _work_request_id: Uuid,
        ) -> Result<Vec<SubmissionRow>, SubmissionRepositoryError> {
            Ok(Vec::new())
        }

        async fn insert_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _row: SubmissionRow,
        ) -> Result<(), SubmissionRepositoryError> {
            Err(SubmissionRepositoryError::StorageUnavailable)
        }

        async fn update_status_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: Uuid,
            _expected_status: String,
            _next_status: String,
            _review_notes: Option<String>,
            _now: OffsetDateTime,
        ) -> Result<Option<SubmissionRow>, SubmissionRepositoryError> {
            Err(SubmissionRepositoryError::StorageUnavailable)
        }
    }

    struct DummyPaymentAttemptStore {
        open: Mutex<Option<PaymentAttemptRow>>,
        inserted: Mutex<Vec<PaymentAttemptRow>>,
    }

    #[async_trait]
    impl PaymentAttemptStore for DummyPaymentAttemptStore {
        async fn insert(
            &self,
            row: PaymentAttemptRow,
        ) -> Result<(), PaymentAttemptRepositoryError> {
            self.inserted.lock().unwrap().push(row);
            Ok(())
        }

        async fn get_by_intent(
            &self,
            _intent_id: String,
        ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
            Ok(None)
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
            Ok(self.open.lock().unwrap().clone())
        }

        async fn update_status(
            &self,
            _id: Uuid,
            _expected_status: String,
            _next_status: String,
            _last_error: Option<String>,
            _now: OffsetDateTime,
        ) -> Result<Option<PaymentAttemptRow>, PaymentAttemptRepositoryError> {
            Err(PaymentAttemptRepositoryError::StorageUnavailable)
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
        create_result: Result<PaymentIntent, PaymentGatewayError>,
        created: Mutex<Vec<(i64, String, String)>>,
        retrieve_result: Option<PaymentIntent>,
    }

    #[async_trait]
    impl PaymentGateway for DummyGateway {
        async fn create_intent(
            &self,
            amount_minor: i64,
            currency: &str,
            reference: &str,
        ) -> Result<PaymentIntent, PaymentGatewayError> {
            self.created.lock().unwrap().push((
                amount_minor,
                currency.to_string(),
                reference.to_string(),
            ));
            match &self.create_result {
                Ok(intent) => Ok(intent.clone()),
                Err(PaymentGatewayError::Declined { code, message }) => {
                    Err(PaymentGatewayError::Declined {
                        code: *code,
                        message: message.clone(),
                    })
                }
                Err(other) => Err(PaymentGatewayError::Provider(format!("{other}"))),
            }
        }

        async fn retrieve_intent(
            &self,
            intent_id: &str,
        ) -> Result<PaymentIntent, PaymentGatewayError> {
            self.retrieve_result
                .clone()
                .ok_or_else(|| PaymentGatewayError::IntentNotFound(intent_id.to_string()))
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

    fn sample_submission(work_request: &WorkRequest, version: i32) -> Submission {
        Submission::new(
            SubmissionId::new(),
            work_request.id,
            work_request.contractor_id,
            version,
            SubmissionKind::Digital,
            Some("https://cdn.example.com/drop.zip".to_string()),
            Vec::new(),
            None,
            None,
        )
        .expect("submission should be valid")
    }

    fn intent(id: &str) -> PaymentIntent {
        PaymentIntent {
            id: id.to_string(),
            status: IntentStatus::RequiresConfirmation,
            amount_minor: 50_000,
            currency: "usd".to_string(),
            client_secret: Some(format!("{id}_secret")),
            last_decline: None,
        }
    }

    struct Fixture {
        ctx: crate::application::context::AppContext,
        gateway: Arc<DummyGateway>,
        attempts: Arc<DummyPaymentAttemptStore>,
    }

    fn fixture(
        work_request: &WorkRequest,
        latest: &Submission,
        open: Option<PaymentAttemptRow>,
        gateway: DummyGateway,
    ) -> Fixture {
        let mut ctx = test_context();
        ctx.repos.work_request = Arc::new(WorkRequestRepository::new(Arc::new(
            DummyWorkRequestStore {
                row: Mutex::new(Some(WorkRequestRow::from_work_request(work_request))),
            },
        )));
        ctx.repos.submission = Arc::new(SubmissionRepository::new(Arc::new(
            DummySubmissionStore {
                latest: Mutex::new(Some(SubmissionRow::from_submission(latest))),
            },
        )));
        let attempts = Arc::new(DummyPaymentAttemptStore {
            open: Mutex::new(open),
            inserted: Mutex::new(Vec::new()),
        });
        ctx.repos.payment_attempt =
            Arc::new(PaymentAttemptRepository::new(attempts.clone()));
        let gateway = Arc::new(gateway);
        ctx.gateway = gateway.clone();
        Fixture {
            ctx,
            gateway,
            attempts,
        }
    }

    #[tokio::test]
    async fn given_submitted_request_when_beginning_should_charge_exact_amount() {
        let work_request = sample_work_request();
        let submission = sample_submission(&work_request, 1);
        let fx = fixture(
            &work_request,
            &submission,
            None,
            DummyGateway {
                create_result: Ok(intent("pi_1")),
                created: Mutex::new(Vec::new()),
                retrieve_result: None,
            },
        );

        let begun = BeginApprovalUseCase::execute(
            &fx.ctx,
            BeginApprovalCommand {
                work_request_id: work_request.id,
                submission_id: submission.id,
                caller: work_request.business_id,
                version: 1,
            },
        )
        .await
        .expect("begin should succeed");

        assert_eq!(begun.intent_id, "pi_1");
        assert_eq!(begun.client_secret.as_deref(), Some("pi_1_secret"));
        assert!(!begun.resumed);
        assert_eq!(
            begun.attempt.status,
            PaymentAttemptStatus::AwaitingConfirmation
        );

        let created = fx.gateway.created.lock().unwrap();
        assert_eq!(
            created.as_slice(),
            &[(50_000, "usd".to_string(), submission.id.0.to_string())]
        );
        let journaled = fx.attempts.inserted.lock().unwrap();
        assert_eq!(journaled.len(), 1);
        assert_eq!(journaled[0].intent_id, "pi_1");
        assert_eq!(journaled[0].amount_minor, 50_000);
    }

    #[tokio::test]
    async fn given_open_attempt_when_beginning_again_should_resume_it() {
        let work_request = sample_work_request();
        let submission = sample_submission(&work_request, 1);
        let open = PaymentAttempt::awaiting_confirmation(
            PaymentAttemptId::new(),
            work_request.id,
            submission.id,
            1,
            "pi_open".to_string(),
            work_request.amount,
        );
        let fx = fixture(
            &work_request,
            &submission,
            Some(PaymentAttemptRow::from_attempt(&open)),
            DummyGateway {
                create_result: Ok(intent("pi_should_not_be_created")),
                created: Mutex::new(Vec::new()),
                retrieve_result: Some(intent("pi_open")),
            },
        );

        let begun = BeginApprovalUseCase::execute(
            &fx.ctx,
            BeginApprovalCommand {
                work_request_id: work_request.id,
                submission_id: submission.id,
                caller: work_request.business_id,
                version: 1,
            },
        )
        .await
        .expect("resume should succeed");

        assert!(begun.resumed);
        assert_eq!(begun.intent_id, "pi_open");
        assert!(fx.gateway.created.lock().unwrap().is_empty());
        assert!(fx.attempts.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn given_stale_version_when_beginning_should_fail_stale() {
        let work_request = sample_work_request();
        let v2 = sample_submission(&work_request, 2);
        let fx = fixture(
            &work_request,
            &v2,
            None,
            DummyGateway {
                create_result: Ok(intent("pi_1")),
                created: Mutex::new(Vec::new()),
                retrieve_result: None,
            },
        );

        let result = BeginApprovalUseCase::execute(
            &fx.ctx,
            BeginApprovalCommand {
                work_request_id: work_request.id,
                submission_id: SubmissionId::new(),
                caller: work_request.business_id,
                version: 1,
            },
        )
        .await;

        match result {
            Err(BeginApprovalError::StaleSubmission) => {}
            other => panic!("expected stale submission, got {other:?}"),
        }
        assert!(fx.gateway.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn given_declined_create_when_beginning_should_map_code() {
        let work_request = sample_work_request();
        let submission = sample_submission(&work_request, 1);
        let fx = fixture(
            &work_request,
            &submission,
            None,
            DummyGateway {
                create_result: Err(PaymentGatewayError::Declined {
                    code: DeclineCode::CardDeclined,
                    message: "card was declined".to_string(),
                }),
                created: Mutex::new(Vec::new()),
                retrieve_result: None,
            },
        );

        let result = BeginApprovalUseCase::execute(
            &fx.ctx,
            BeginApprovalCommand {
                work_request_id: work_request.id,
                submission_id: submission.id,
                caller: work_request.business_id,
                version: 1,
            },
        )
        .await;

        match result {
            Err(BeginApprovalError::PaymentDeclined { code, .. }) => {
                assert_eq!(code, DeclineCode::CardDeclined);
            }
            other => panic!("expected decline, got {other:?}"),
        }
        assert!(fx.attempts.inserted.lock().unwrap().is_empty());
    }
}
