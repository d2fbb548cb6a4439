// Use case: get_milestone.

use crate::application::context::AppContext;
use crate::domain::entities::contract::Contract;
use crate::domain::entities::milestone::Milestone;
use crate::domain::value_objects::ids::{ActorId, MilestoneId};

pub struct GetMilestoneUseCase;

#[derive(Debug)]
pub enum GetMilestoneError {
    NotFound,
    Forbidden,
    Storage(String),
}

/// A milestone together with its owning contract, visible to either
/// party of that contract.
#[derive(Debug)]
pub struct MilestoneView {
    pub milestone: Milestone,
    pub contract: Contract,
}

impl GetMilestoneUseCase {
    pub async fn execute(
        ctx: &AppContext,
        id: MilestoneId,
        caller: ActorId,
    ) -> Result<MilestoneView, GetMilestoneError> {
        let milestone = ctx
            .repos
            .milestone
            .get(id)
            .await
            .map_err(|e| GetMilestoneError::Storage(format!("{e:?}")))?
            .ok_or(GetMilestoneError::NotFound)?;

        // Authorization lives on the contract, not the milestone row.
        let contract = ctx
            .repos
            .contract
            .get(milestone.contract_id)
            .await
            .map_err(|e| GetMilestoneError::Storage(format!("{e:?}")))?
            .ok_or(GetMilestoneError::NotFound)?;
        if caller != contract.business_id && caller != contract.contractor_id {
            return Err(GetMilestoneError::Forbidden);
        }

        Ok(MilestoneView {
            milestone,
            contract,
        })
    }
}
