// Use case: accept_work_request.

use crate::application::context::AppContext;
use crate::domain::entities::work_request::{WorkRequest, WorkRequestStatus};
use crate::domain::services::work_request_lifecycle::WorkRequestLifecycleError;
use crate::domain::value_objects::ids::{ActorId, WorkRequestId};

/// Contractor accepts a pending assignment.
pub struct AcceptWorkRequestUseCase;

#[derive(Debug)]
pub enum AcceptWorkRequestError {
    NotFound,
    Forbidden,
    Conflict,
    Storage(String),
}

impl AcceptWorkRequestUseCase {
    pub async fn execute(
        ctx: &AppContext,
        id: WorkRequestId,
        caller: ActorId,
    ) -> Result<WorkRequest, AcceptWorkRequestError> {
        // Step 1: Load the work request.
        let work_request = ctx
            .repos
            .work_request
            .get(id)
            .await
            .map_err(|e| AcceptWorkRequestError::Storage(format!("{e:?}")))?
            .ok_or(AcceptWorkRequestError::NotFound)?;

        // Step 2: Only the assigned contractor may accept.
        if caller != work_request.contractor_id {
            return Err(AcceptWorkRequestError::Forbidden);
        }

        // Step 3: Transition pending -> accepted; a request that already
        // moved fails the compare-and-set as a conflict.
        let accepted = ctx
            .lifecycle
            .transition(
                id,
                WorkRequestStatus::Pending,
                WorkRequestStatus::Accepted,
                None,
            )
            .await
            .map_err(map_lifecycle_error)?;

        Ok(accepted)
    }
}

fn map_lifecycle_error(error: WorkRequestLifecycleError) -> AcceptWorkRequestError {
    match error {
        WorkRequestLifecycleError::NotFound => AcceptWorkRequestError::NotFound,
        WorkRequestLifecycleError::Conflict
        | WorkRequestLifecycleError::InvalidTransition { .. } => AcceptWorkRequestError::Conflict,
        other => AcceptWorkRequestError::Storage(format!("{other:?}")),
    }
}
