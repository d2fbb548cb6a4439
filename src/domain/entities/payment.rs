use crate::domain::value_objects::ids::{
    MilestoneId, PaymentAttemptId, PaymentId, SubmissionId, WorkRequestId,
};
use crate::domain::value_objects::money::Money;
use crate::domain::value_objects::timestamps::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Captured,
    Transferred,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Captured => "captured",
            PaymentStatus::Transferred => "transferred",
        }
    }

    pub fn parse(value: &str) -> Option<PaymentStatus> {
        match value {
            "captured" => Some(PaymentStatus::Captured),
            "transferred" => Some(PaymentStatus::Transferred),
            _ => None,
        }
    }
}

/// A captured provider payment tied to exactly one work request or one
/// milestone. Created only as a side effect of an approval transition;
/// immutable afterwards except for the transfer step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub id: PaymentId,
    pub amount: Money,
    pub status: PaymentStatus,
    pub intent_id: String,
    pub transfer_id: Option<String>,
    pub work_request_id: Option<WorkRequestId>,
    pub milestone_id: Option<MilestoneId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Payment {
    pub fn captured_for_work_request(
        id: PaymentId,
        amount: Money,
        intent_id: String,
        work_request_id: WorkRequestId,
    ) -> Self {
        let now = Timestamp::now_utc();
        Self {
            id,
            amount,
            status: PaymentStatus::Captured,
            intent_id,
            transfer_id: None,
            work_request_id: Some(work_request_id),
            milestone_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn captured_for_milestone(
        id: PaymentId,
        amount: Money,
        intent_id: String,
        milestone_id: MilestoneId,
    ) -> Self {
        let now = Timestamp::now_utc();
        Self {
            id,
            amount,
            status: PaymentStatus::Captured,
            intent_id,
            transfer_id: None,
            work_request_id: None,
            milestone_id: Some(milestone_id),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentAttemptStatus {
    AwaitingConfirmation,
    ConfirmedPendingFinalize,
    Finalized,
    Abandoned,
}

impl PaymentAttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentAttemptStatus::AwaitingConfirmation => "awaiting_confirmation",
            PaymentAttemptStatus::ConfirmedPendingFinalize => "confirmed_pending_finalize",
            PaymentAttemptStatus::Finalized => "finalized",
            PaymentAttemptStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(value: &str) -> Option<PaymentAttemptStatus> {
        match value {
            "awaiting_confirmation" => Some(PaymentAttemptStatus::AwaitingConfirmation),
            "confirmed_pending_finalize" => Some(PaymentAttemptStatus::ConfirmedPendingFinalize),
            "finalized" => Some(PaymentAttemptStatus::Finalized),
            "abandoned" => Some(PaymentAttemptStatus::Abandoned),
            _ => None,
        }
    }
}

/// Durable journal row for the two-phase approve-then-pay flow. An
/// attempt left in `confirmed_pending_finalize` marks a captured payment
/// whose approval did not land; the reconciliation sweep resumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAttempt {
    pub id: PaymentAttemptId,
    pub work_request_id: WorkRequestId,
    pub submission_id: SubmissionId,
    pub submission_version: i32,
    pub intent_id: String,
    pub amount: Money,
    pub status: PaymentAttemptStatus,
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentAttempt {
    pub fn awaiting_confirmation(
        id: PaymentAttemptId,
        work_request_id: WorkRequestId,
        submission_id: SubmissionId,
        submission_version: i32,
        intent_id: String,
        amount: Money,
    ) -> Self {
        let now = Timestamp::now_utc();
        Self {
            id,
            work_request_id,
            submission_id,
            submission_version,
            intent_id,
            amount,
            status: PaymentAttemptStatus::AwaitingConfirmation,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }
}
