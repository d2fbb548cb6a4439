use crate::domain::entities::payment::{PaymentAttempt, PaymentAttemptStatus};
use crate::domain::value_objects::ids::{PaymentAttemptId, SubmissionId, WorkRequestId};
use crate::domain::value_objects::money::{Currency, Money};
use crate::domain::value_objects::timestamps::Timestamp;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct PaymentAttemptRow {
    pub id: Uuid,
    pub work_request_id: Uuid,
    pub submission_id: Uuid,
    pub submission_version: i32,
    pub intent_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub last_error: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl PaymentAttemptRow {
    pub fn from_attempt(attempt: &PaymentAttempt) -> Self {
        Self {
            id: attempt.id.0,
            work_request_id: attempt.work_request_id.0,
            submission_id: attempt.submission_id.0,
            submission_version: attempt.submission_version,
            intent_id: attempt.intent_id.clone(),
            amount_minor: attempt.amount.amount_minor,
            currency: attempt.amount.currency.as_str().to_string(),
            status: attempt.status.as_str().to_string(),
            last_error: attempt.last_error.clone(),
            created_at: attempt.created_at.into_inner(),
            updated_at: attempt.updated_at.into_inner(),
        }
    }

    pub fn into_attempt(self) -> PaymentAttempt {
        PaymentAttempt {
            id: PaymentAttemptId(self.id),
            work_request_id: WorkRequestId(self.work_request_id),
            submission_id: SubmissionId(self.submission_id),
            submission_version: self.submission_version,
            intent_id: self.intent_id,
            amount: Money::new(
                self.amount_minor,
                Currency::parse(&self.currency).unwrap_or(Currency::Usd),
            ),
            status: PaymentAttemptStatus::parse(&self.status)
                .unwrap_or(PaymentAttemptStatus::AwaitingConfirmation),
            last_error: self.last_error,
            created_at: Timestamp::from(self.created_at),
            updated_at: Timestamp::from(self.updated_at),
        }
    }
}
