// Use case: list_work_requests.

use crate::application::context::AppContext;
use crate::domain::entities::actor::ActorRole;
use crate::domain::entities::work_request::{WorkRequest, WorkRequestStatus};
use crate::domain::value_objects::ids::ActorId;

/// The caller's side of the marketplace decides which column scopes the
/// list; an optional status narrows it. Newest first, straight from the
/// store, so a list rendered after any transition already shows it.
pub struct ListWorkRequestsUseCase;

#[derive(Debug)]
pub enum ListWorkRequestsError {
    Storage(String),
}

impl ListWorkRequestsUseCase {
    pub async fn execute(
        ctx: &AppContext,
        caller: ActorId,
        role: ActorRole,
        status: Option<WorkRequestStatus>,
    ) -> Result<Vec<WorkRequest>, ListWorkRequestsError> {
        let result = match role {
            ActorRole::Business => ctx.repos.work_request.list_for_business(caller, status).await,
            ActorRole::Contractor => {
                ctx.repos
                    .work_request
                    .list_for_contractor(caller, status)
                    .await
            }
        };
        result.map_err(|e| ListWorkRequestsError::Storage(format!("{e:?}")))
    }
}
