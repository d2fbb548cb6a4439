// Use case: submit_deliverable.

use crate::application::context::AppContext;
use crate::domain::entities::submission::{
    Submission, SubmissionKind, SubmissionValidationError,
};
use crate::domain::entities::work_request::{WorkRequest, WorkRequestStatus};
use crate::domain::services::work_request_lifecycle::WorkRequestLifecycleError;
use crate::domain::value_objects::ids::{ActorId, SubmissionId, WorkRequestId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::stores::submission_store::SubmissionRepositoryError;

/// Contractor submits a deliverable: version 1 from `accepted`, version
/// n+1 after changes were requested.
pub struct SubmitDeliverableUseCase;

#[derive(Debug, Clone)]
pub struct SubmitDeliverableCommand {
    pub work_request_id: WorkRequestId,
    pub caller: ActorId,
    pub kind: SubmissionKind,
    pub artifact_url: Option<String>,
    pub deliverable_files: Vec<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug)]
pub enum SubmitDeliverableError {
    NotFound,
    Forbidden,
    Conflict,
    Validation(SubmissionValidationError),
    Storage(String),
}

impl From<DatabaseError> for SubmitDeliverableError {
    fn from(error: DatabaseError) -> Self {
        SubmitDeliverableError::Storage(error.to_string())
    }
}

#[derive(Debug)]
pub struct SubmittedDeliverable {
    pub work_request: WorkRequest,
    pub submission: Submission,
}

impl SubmitDeliverableUseCase {
    pub async fn execute(
        ctx: &AppContext,
        cmd: SubmitDeliverableCommand,
    ) -> Result<SubmittedDeliverable, SubmitDeliverableError> {
        // Step 1: Load the work request and authorize the contractor.
        let work_request = ctx
            .repos
            .work_request
            .get(cmd.work_request_id)
            .await
            .map_err(|e| SubmitDeliverableError::Storage(format!("{e:?}")))?
            .ok_or(SubmitDeliverableError::NotFound)?;
        if cmd.caller != work_request.contractor_id {
            return Err(SubmitDeliverableError::Forbidden);
        }

        // Step 2: Submitting is legal from accepted and needs_revision only.
        let expected = match work_request.status {
            WorkRequestStatus::Accepted | WorkRequestStatus::NeedsRevision => work_request.status,
            _ => return Err(SubmitDeliverableError::Conflict),
        };

        // Step 3: Next version number from the stored history.
        let latest = ctx
            .repos
            .submission
            .latest_for_work_request(cmd.work_request_id)
            .await
            .map_err(|e| SubmitDeliverableError::Storage(format!("{e:?}")))?;
        let version = latest.map(|s| s.version + 1).unwrap_or(1);

        // Step 4: Build the domain submission (validates the artifact rules).
        let submission = Submission::new(
            SubmissionId::new(),
            cmd.work_request_id,
            cmd.caller,
            version,
            cmd.kind,
            cmd.artifact_url,
            cmd.deliverable_files,
            cmd.description,
            cmd.notes,
        )
        .map_err(SubmitDeliverableError::Validation)?;

        // Step 5: Persist the submission and move the work request to
        // submitted in one transaction. The status compare-and-set makes
        // a concurrent submit lose cleanly.
        let submissions = ctx.repos.submission.clone();
        let lifecycle = ctx.lifecycle.clone();
        let stored = submission.clone();
        let now = Timestamp::now_utc();
        let work_request = ctx
            .repos
            .with_tx(move |tx| {
                Box::pin(async move {
                    submissions
                        .insert_tx(tx, &stored)
                        .await
                        .map_err(|e| match e {
                            SubmissionRepositoryError::Conflict => SubmitDeliverableError::Conflict,
                            other => SubmitDeliverableError::Storage(format!("{other:?}")),
                        })?;
                    lifecycle
                        .transition_tx(
                            tx,
                            stored.work_request_id,
                            expected,
                            WorkRequestStatus::Submitted,
                            None,
                            now,
                        )
                        .await
                        .map_err(|error| match error {
                            WorkRequestLifecycleError::NotFound => SubmitDeliverableError::NotFound,
                            WorkRequestLifecycleError::Conflict
                            | WorkRequestLifecycleError::InvalidTransition { .. } => {
                                SubmitDeliverableError::Conflict
                            }
                            other => SubmitDeliverableError::Storage(format!("{other:?}")),
                        })
                })
            })
            .await?;

        Ok(SubmittedDeliverable {
            work_request,
            submission,
        })
    }
}
