// Use case: get_latest_submission.

use crate::application::context::AppContext;
use crate::domain::entities::submission::Submission;
use crate::domain::value_objects::ids::{ActorId, WorkRequestId};

/// Serves the highest submission version, the only one open to review.
pub struct GetLatestSubmissionUseCase;

#[derive(Debug)]
pub enum GetLatestSubmissionError {
    NotFound,
    Forbidden,
    Storage(String),
}

impl GetLatestSubmissionUseCase {
    pub async fn execute(
        ctx: &AppContext,
        work_request_id: WorkRequestId,
        caller: ActorId,
    ) -> Result<Submission, GetLatestSubmissionError> {
        // Step 1: Load the work request and authorize either party.
        let work_request = ctx
            .repos
            .work_request
            .get(work_request_id)
            .await
            .map_err(|e| GetLatestSubmissionError::Storage(format!("{e:?}")))?
            .ok_or(GetLatestSubmissionError::NotFound)?;
        if caller != work_request.business_id && caller != work_request.contractor_id {
            return Err(GetLatestSubmissionError::Forbidden);
        }

        // Step 2: Serve the highest version only.
        ctx.repos
            .submission
            .latest_for_work_request(work_request_id)
            .await
            .map_err(|e| GetLatestSubmissionError::Storage(format!("{e:?}")))?
            .ok_or(GetLatestSubmissionError::NotFound)
    }
}
