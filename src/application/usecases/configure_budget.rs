// Use case: configure_budget.

use crate::application::context::AppContext;
use crate::domain::entities::budget::{Budget, BudgetPeriod, BudgetValidationError};
use crate::domain::value_objects::ids::ActorId;
use crate::domain::value_objects::money::Currency;

/// Set or update a business spending cap. Reconfiguring keeps the used
/// counter, so raising the cap widens headroom without forgiving live
/// allocations.
pub struct ConfigureBudgetUseCase;

#[derive(Debug, Clone)]
pub struct ConfigureBudgetCommand {
    pub business_id: ActorId,
    pub caller: ActorId,
    pub cap_minor: i64,
    pub currency: Currency,
    pub period: BudgetPeriod,
    pub reset_enabled: bool,
}

#[derive(Debug)]
pub enum ConfigureBudgetError {
    Validation(BudgetValidationError),
    Forbidden,
    Storage(String),
}

impl ConfigureBudgetUseCase {
    pub async fn execute(
        ctx: &AppContext,
        cmd: ConfigureBudgetCommand,
    ) -> Result<Budget, ConfigureBudgetError> {
        if cmd.caller != cmd.business_id {
            return Err(ConfigureBudgetError::Forbidden);
        }

        let budget = Budget::new(
            cmd.business_id,
            cmd.cap_minor,
            cmd.currency,
            cmd.period,
            cmd.reset_enabled,
        )
        .map_err(ConfigureBudgetError::Validation)?;

        ctx.repos
            .budget
            .upsert(&budget)
            .await
            .map_err(|e| ConfigureBudgetError::Storage(format!("{e:?}")))
    }
}
