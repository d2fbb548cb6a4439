// Use case: review_submission.

use crate::application::context::AppContext;
use crate::domain::entities::submission::{Submission, SubmissionStatus};
use crate::domain::entities::work_request::{WorkRequest, WorkRequestStatus};
use crate::domain::services::work_request_lifecycle::WorkRequestLifecycleError;
use crate::domain::value_objects::ids::{ActorId, SubmissionId, WorkRequestId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::database::DatabaseError;

/// Business answers a submitted deliverable with reject or
/// request-changes. Approval is a separate two-phase flow.
pub struct ReviewSubmissionUseCase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Reject,
    RequestChanges,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Reject => "reject",
            ReviewAction::RequestChanges => "request_changes",
        }
    }

    pub fn parse(value: &str) -> Option<ReviewAction> {
        match value {
            "reject" => Some(ReviewAction::Reject),
            "request_changes" => Some(ReviewAction::RequestChanges),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReviewSubmissionCommand {
    pub work_request_id: WorkRequestId,
    pub submission_id: SubmissionId,
    pub caller: ActorId,
    pub action: ReviewAction,
    pub review_notes: String,
    /// The version the reviewer looked at; must still be the latest.
    pub version: i32,
}

#[derive(Debug)]
pub enum ReviewSubmissionError {
    NotFound,
    Forbidden,
    FeedbackRequired,
    StaleSubmission,
    Conflict,
    Storage(String),
}

impl From<DatabaseError> for ReviewSubmissionError {
    fn from(error: DatabaseError) -> Self {
        ReviewSubmissionError::Storage(error.to_string())
    }
}

#[derive(Debug)]
pub struct ReviewedSubmission {
    pub work_request: WorkRequest,
    pub submission: Submission,
}

impl ReviewSubmissionUseCase {
    pub async fn execute(
        ctx: &AppContext,
        cmd: ReviewSubmissionCommand,
    ) -> Result<ReviewedSubmission, ReviewSubmissionError> {
        // Step 1: Load the work request and authorize the business.
        let work_request = ctx
            .repos
            .work_request
            .get(cmd.work_request_id)
            .await
            .map_err(|e| ReviewSubmissionError::Storage(format!("{e:?}")))?
            .ok_or(ReviewSubmissionError::NotFound)?;
        if cmd.caller != work_request.business_id {
            return Err(ReviewSubmissionError::Forbidden);
        }
        if work_request.status != WorkRequestStatus::Submitted {
            return Err(ReviewSubmissionError::Conflict);
        }

        // Step 2: Both review outcomes carry feedback for the contractor.
        if cmd.review_notes.trim().is_empty() {
            return Err(ReviewSubmissionError::FeedbackRequired);
        }

        // Step 3: The reviewed version must still be the latest; a
        // resubmission in between makes this review stale.
        let latest = ctx
            .repos
            .submission
            .latest_for_work_request(cmd.work_request_id)
            .await
            .map_err(|e| ReviewSubmissionError::Storage(format!("{e:?}")))?
            .ok_or(ReviewSubmissionError::NotFound)?;
        if latest.id != cmd.submission_id || latest.version != cmd.version {
            return Err(ReviewSubmissionError::StaleSubmission);
        }

        let (submission_next, work_request_next) = match cmd.action {
            ReviewAction::Reject => (SubmissionStatus::Rejected, WorkRequestStatus::Rejected),
            ReviewAction::RequestChanges => (
                SubmissionStatus::ChangesRequested,
                WorkRequestStatus::NeedsRevision,
            ),
        };

        // Step 4: Move submission and work request together; either
        // compare-and-set failing rolls the whole review back.
        let submissions = ctx.repos.submission.clone();
        let lifecycle = ctx.lifecycle.clone();
        let notes = cmd.review_notes.clone();
        let submission_id = cmd.submission_id;
        let work_request_id = cmd.work_request_id;
        let now = Timestamp::now_utc();
        let (work_request, submission) = ctx
            .repos
            .with_tx(move |tx| {
                Box::pin(async move {
                    let submission = submissions
                        .update_status_tx(
                            tx,
                            submission_id,
                            SubmissionStatus::Submitted,
                            submission_next,
                            Some(notes.clone()),
                            now,
                        )
                        .await
                        .map_err(|e| ReviewSubmissionError::Storage(format!("{e:?}")))?
                        .ok_or(ReviewSubmissionError::Conflict)?;
                    let work_request = lifecycle
                        .transition_tx(
                            tx,
                            work_request_id,
                            WorkRequestStatus::Submitted,
                            work_request_next,
                            Some(notes),
                            now,
                        )
                        .await
                        .map_err(|error| match error {
                            WorkRequestLifecycleError::NotFound => ReviewSubmissionError::NotFound,
                            WorkRequestLifecycleError::Conflict
                            | WorkRequestLifecycleError::InvalidTransition { .. } => {
                                ReviewSubmissionError::Conflict
                            }
                            other => ReviewSubmissionError::Storage(format!("{other:?}")),
                        })?;
                    Ok::<(WorkRequest, Submission), ReviewSubmissionError>((work_request, submission))
                })
            })
            .await?;

        Ok(ReviewedSubmission {
            work_request,
            submission,
        })
    }
}
