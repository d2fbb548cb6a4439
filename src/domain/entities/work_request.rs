use crate::domain::value_objects::ids::{ActorId, ProjectId, WorkRequestId};
use crate::domain::value_objects::money::Money;
use crate::domain::value_objects::timestamps::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkRequestStatus {
    Pending,
    Accepted,
    Declined,
    Submitted,
    NeedsRevision,
    Approved,
    Rejected,
    Paid,
}

impl WorkRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkRequestStatus::Pending => "pending",
            WorkRequestStatus::Accepted => "accepted",
            WorkRequestStatus::Declined => "declined",
            WorkRequestStatus::Submitted => "submitted",
            WorkRequestStatus::NeedsRevision => "needs_revision",
            WorkRequestStatus::Approved => "approved",
            WorkRequestStatus::Rejected => "rejected",
            WorkRequestStatus::Paid => "paid",
        }
    }

    pub fn parse(value: &str) -> Option<WorkRequestStatus> {
        match value {
            "pending" => Some(WorkRequestStatus::Pending),
            "accepted" => Some(WorkRequestStatus::Accepted),
            "declined" => Some(WorkRequestStatus::Declined),
            "submitted" => Some(WorkRequestStatus::Submitted),
            "needs_revision" => Some(WorkRequestStatus::NeedsRevision),
            "approved" => Some(WorkRequestStatus::Approved),
            "rejected" => Some(WorkRequestStatus::Rejected),
            "paid" => Some(WorkRequestStatus::Paid),
            _ => None,
        }
    }

    /// Terminal statuses accept no further contractor or business action.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkRequestStatus::Declined | WorkRequestStatus::Rejected | WorkRequestStatus::Paid
        )
    }
}

/// A unit of assigned work from a business to a contractor with a fixed
/// payment amount. Never hard-deleted; terminal statuses keep the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRequest {
    pub id: WorkRequestId,
    pub project_id: ProjectId,
    pub business_id: ActorId,
    pub contractor_id: ActorId,
    pub title: String,
    pub description: String,
    pub deliverable_description: String,
    pub amount: Money,
    pub due_date: Option<Timestamp>,
    pub status: WorkRequestStatus,
    pub review_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub accepted_at: Option<Timestamp>,
    pub declined_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkRequestValidationError {
    EmptyTitle,
    EmptyDescription,
    EmptyDeliverableDescription,
    NonPositiveAmount,
    SameBusinessAndContractor,
}

impl WorkRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: WorkRequestId,
        project_id: ProjectId,
        business_id: ActorId,
        contractor_id: ActorId,
        title: String,
        description: String,
        deliverable_description: String,
        amount: Money,
        due_date: Option<Timestamp>,
    ) -> Result<Self, WorkRequestValidationError> {
        if title.trim().is_empty() {
            return Err(WorkRequestValidationError::EmptyTitle);
        }
        if description.trim().is_empty() {
            return Err(WorkRequestValidationError::EmptyDescription);
        }
        if deliverable_description.trim().is_empty() {
            return Err(WorkRequestValidationError::EmptyDeliverableDescription);
        }
        if !amount.is_positive() {
            return Err(WorkRequestValidationError::NonPositiveAmount);
        }
        if business_id == contractor_id {
            return Err(WorkRequestValidationError::SameBusinessAndContractor);
        }

        let now = Timestamp::now_utc();
        Ok(Self {
            id,
            project_id,
            business_id,
            contractor_id,
            title,
            description,
            deliverable_description,
            amount,
            due_date,
            status: WorkRequestStatus::Pending,
            review_notes: None,
            created_at: now,
            updated_at: now,
            accepted_at: None,
            declined_at: None,
        })
    }

    /// Overdue display flag: a due date in the past on a non-terminal request.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        match self.due_date {
            Some(due) => due.is_before(now) && !self.status.is_terminal(),
            None => false,
        }
    }
}
