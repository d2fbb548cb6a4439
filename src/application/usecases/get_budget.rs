// Use case: get_budget.

use crate::application::context::AppContext;
use crate::domain::entities::budget::Budget;
use crate::domain::value_objects::ids::ActorId;

pub struct GetBudgetUseCase;

#[derive(Debug)]
pub enum GetBudgetError {
    NotFound,
    Forbidden,
    Storage(String),
}

impl GetBudgetUseCase {
    pub async fn execute(
        ctx: &AppContext,
        business_id: ActorId,
        caller: ActorId,
    ) -> Result<Budget, GetBudgetError> {
        if caller != business_id {
            return Err(GetBudgetError::Forbidden);
        }

        ctx.repos
            .budget
            .get(business_id)
            .await
            .map_err(|e| GetBudgetError::Storage(format!("{e:?}")))?
            .ok_or(GetBudgetError::NotFound)
    }
}
