use crate::domain::entities::actor::ActorRole;
use crate::domain::entities::milestone::MilestoneStatus;
use crate::domain::entities::work_request::WorkRequestStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    Forbidden,
}

pub struct WorkRequestStateMachine;

impl WorkRequestStateMachine {
    pub fn can_transition(from: WorkRequestStatus, to: WorkRequestStatus) -> bool {
        matches!(
            (from, to),
            (WorkRequestStatus::Pending, WorkRequestStatus::Accepted)
                | (WorkRequestStatus::Pending, WorkRequestStatus::Declined)
                | (WorkRequestStatus::Accepted, WorkRequestStatus::Submitted)
                | (WorkRequestStatus::Submitted, WorkRequestStatus::Approved)
                | (WorkRequestStatus::Submitted, WorkRequestStatus::Rejected)
                | (WorkRequestStatus::Submitted, WorkRequestStatus::NeedsRevision)
                | (WorkRequestStatus::NeedsRevision, WorkRequestStatus::Submitted)
                | (WorkRequestStatus::Approved, WorkRequestStatus::Paid)
        )
    }

    pub fn transition(
        from: WorkRequestStatus,
        to: WorkRequestStatus,
    ) -> Result<WorkRequestStatus, TransitionError> {
        if Self::can_transition(from, to) {
            return Ok(to);
        }

        Err(TransitionError::Forbidden)
    }
}

pub struct MilestoneStateMachine;

impl MilestoneStateMachine {
    pub fn can_transition(from: MilestoneStatus, to: MilestoneStatus) -> bool {
        matches!(
            (from, to),
            (MilestoneStatus::Pending, MilestoneStatus::Submitted)
                | (MilestoneStatus::Submitted, MilestoneStatus::Approved)
                | (MilestoneStatus::Submitted, MilestoneStatus::Rejected)
        )
    }

    pub fn transition(
        from: MilestoneStatus,
        to: MilestoneStatus,
    ) -> Result<MilestoneStatus, TransitionError> {
        if Self::can_transition(from, to) {
            return Ok(to);
        }

        Err(TransitionError::Forbidden)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkRequestAction {
    Accept,
    Decline,
    Submit,
    Approve,
    Reject,
    RequestChanges,
    Resubmit,
}

impl WorkRequestAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkRequestAction::Accept => "accept",
            WorkRequestAction::Decline => "decline",
            WorkRequestAction::Submit => "submit",
            WorkRequestAction::Approve => "approve",
            WorkRequestAction::Reject => "reject",
            WorkRequestAction::RequestChanges => "request_changes",
            WorkRequestAction::Resubmit => "resubmit",
        }
    }
}

/// The actions a caller of the given role may take on a work request in
/// the given status. Pure function of (status, role); terminal statuses
/// offer nothing to anyone.
pub fn allowed_actions(status: WorkRequestStatus, role: ActorRole) -> &'static [WorkRequestAction] {
    match (status, role) {
        (WorkRequestStatus::Pending, ActorRole::Contractor) => {
            &[WorkRequestAction::Accept, WorkRequestAction::Decline]
        }
        (WorkRequestStatus::Accepted, ActorRole::Contractor) => &[WorkRequestAction::Submit],
        (WorkRequestStatus::Submitted, ActorRole::Business) => &[
            WorkRequestAction::Approve,
            WorkRequestAction::Reject,
            WorkRequestAction::RequestChanges,
        ],
        (WorkRequestStatus::NeedsRevision, ActorRole::Contractor) => {
            &[WorkRequestAction::Resubmit]
        }
        _ => &[],
    }
}
