// Use case: submit_milestone.

use crate::application::context::AppContext;
use crate::domain::entities::event::Event;
use crate::domain::entities::milestone::{Milestone, MilestoneStatus};
use crate::domain::value_objects::ids::{ActorId, MilestoneId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::database::DatabaseError;

/// The contractor marks a milestone delivered, optionally pointing at the
/// deliverable. The status CAS in storage arbitrates concurrent submits.
pub struct SubmitMilestoneUseCase;

#[derive(Debug)]
pub enum SubmitMilestoneError {
    NotFound,
    Forbidden,
    Conflict,
    Storage(String),
}

impl From<DatabaseError> for SubmitMilestoneError {
    fn from(error: DatabaseError) -> Self {
        SubmitMilestoneError::Storage(error.to_string())
    }
}

impl SubmitMilestoneUseCase {
    pub async fn execute(
        ctx: &AppContext,
        id: MilestoneId,
        caller: ActorId,
        deliverable_url: Option<String>,
    ) -> Result<Milestone, SubmitMilestoneError> {
        // Step 1: Load the milestone and authorize the contractor via the
        // owning contract.
        let milestone = ctx
            .repos
            .milestone
            .get(id)
            .await
            .map_err(|e| SubmitMilestoneError::Storage(format!("{e:?}")))?
            .ok_or(SubmitMilestoneError::NotFound)?;
        let contract = ctx
            .repos
            .contract
            .get(milestone.contract_id)
            .await
            .map_err(|e| SubmitMilestoneError::Storage(format!("{e:?}")))?
            .ok_or(SubmitMilestoneError::NotFound)?;
        if caller != contract.contractor_id {
            return Err(SubmitMilestoneError::Forbidden);
        }
        if milestone.status != MilestoneStatus::Pending {
            return Err(SubmitMilestoneError::Conflict);
        }

        let deliverable_url = deliverable_url.filter(|url| !url.trim().is_empty());

        // Step 2: Flip pending -> submitted and record the event together.
        let repos = ctx.repos.clone();
        let lifecycle = ctx.lifecycle.clone();
        let now = Timestamp::now_utc();
        ctx.repos
            .with_tx(move |tx| {
                Box::pin(async move {
                    let updated = repos
                        .milestone
                        .submit_tx(tx, id, deliverable_url, now)
                        .await
                        .map_err(|e| SubmitMilestoneError::Storage(format!("{e:?}")))?
                        .ok_or(SubmitMilestoneError::Conflict)?;

                    lifecycle
                        .record_event_tx(tx, &Event::milestone_submitted(&updated))
                        .await
                        .map_err(|e| SubmitMilestoneError::Storage(format!("{e:?}")))?;

                    Ok(updated)
                })
            })
            .await
    }
}
