// Use case: get_work_request.

use crate::application::context::AppContext;
use crate::domain::entities::actor::ActorRole;
use crate::domain::entities::submission::Submission;
use crate::domain::entities::work_request::WorkRequest;
use crate::domain::value_objects::ids::{ActorId, WorkRequestId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::domain::workflows::state_machine::{allowed_actions, WorkRequestAction};

/// Reads a work request with its latest submission and the action set
/// open to the caller.
pub struct GetWorkRequestUseCase;

#[derive(Debug)]
pub enum GetWorkRequestError {
    NotFound,
    Forbidden,
    Storage(String),
}

#[derive(Debug)]
pub struct WorkRequestView {
    pub work_request: WorkRequest,
    pub latest_submission: Option<Submission>,
    pub allowed_actions: &'static [WorkRequestAction],
    pub overdue: bool,
}

impl GetWorkRequestUseCase {
    pub async fn execute(
        ctx: &AppContext,
        id: WorkRequestId,
        caller: ActorId,
    ) -> Result<WorkRequestView, GetWorkRequestError> {
        // Step 1: Load the work request.
        let work_request = ctx
            .repos
            .work_request
            .get(id)
            .await
            .map_err(|e| GetWorkRequestError::Storage(format!("{e:?}")))?
            .ok_or(GetWorkRequestError::NotFound)?;

        // Step 2: Only the two parties may read it; the matching side
        // fixes the role used for the action set.
        let role = if caller == work_request.business_id {
            ActorRole::Business
        } else if caller == work_request.contractor_id {
            ActorRole::Contractor
        } else {
            return Err(GetWorkRequestError::Forbidden);
        };

        // Step 3: Load the latest submission version, if any.
        let latest_submission = ctx
            .repos
            .submission
            .latest_for_work_request(id)
            .await
            .map_err(|e| GetWorkRequestError::Storage(format!("{e:?}")))?;

        // Step 4: Compute the allowed actions for this status and role.
        let actions = allowed_actions(work_request.status, role);
        let overdue = work_request.is_overdue(Timestamp::now_utc());

        Ok(WorkRequestView {
            work_request,
            latest_submission,
            allowed_actions: actions,
            overdue,
        })
    }
}
