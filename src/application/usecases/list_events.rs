// Use case: list_events.

use crate::application::context::AppContext;
use crate::domain::entities::event::Event;
use crate::domain::value_objects::ids::{ActorId, WorkRequestId};

/// Timeline of everything that happened to one work request, oldest
/// first, visible to either party.
pub struct ListEventsUseCase;

#[derive(Debug)]
pub enum ListEventsError {
    NotFound,
    Forbidden,
    Storage(String),
}

impl ListEventsUseCase {
    pub async fn execute(
        ctx: &AppContext,
        work_request_id: WorkRequestId,
        caller: ActorId,
    ) -> Result<Vec<Event>, ListEventsError> {
        let work_request = ctx
            .repos
            .work_request
            .get(work_request_id)
            .await
            .map_err(|e| ListEventsError::Storage(format!("{e:?}")))?
            .ok_or(ListEventsError::NotFound)?;
        if caller != work_request.business_id && caller != work_request.contractor_id {
            return Err(ListEventsError::Forbidden);
        }

        ctx.repos
            .event
            .list_by_work_request(work_request_id)
            .await
            .map_err(|e| ListEventsError::Storage(format!("{e:?}")))
    }
}
