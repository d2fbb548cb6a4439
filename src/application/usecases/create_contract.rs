// Use case: create_contract.

use crate::application::context::AppContext;
use crate::domain::entities::contract::{Contract, ContractValidationError};
use crate::domain::entities::event::Event;
use crate::domain::entities::milestone::{Milestone, MilestoneValidationError};
use crate::domain::value_objects::ids::{ActorId, ContractId, MilestoneId};
use crate::domain::value_objects::money::{Currency, Money};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::domain::workflows::budget_guard::{check_budget, BudgetViolation};
use crate::infrastructure::db::database::DatabaseError;

/// A business opens a contract together with all of its milestones in one
/// unit. The budget guard runs once against the milestone total and the
/// whole amount is allocated up front.
pub struct CreateContractUseCase;

#[derive(Debug, Clone)]
pub struct MilestoneDraft {
    pub name: String,
    pub description: String,
    pub amount_minor: i64,
    pub due_date: Option<Timestamp>,
    pub auto_pay: bool,
}

#[derive(Debug, Clone)]
pub struct CreateContractCommand {
    pub caller: ActorId,
    pub contractor_id: ActorId,
    pub title: String,
    pub currency: Currency,
    pub milestones: Vec<MilestoneDraft>,
}

#[derive(Debug)]
pub enum CreateContractError {
    Validation(ContractValidationError),
    MilestoneValidation {
        index: usize,
        error: MilestoneValidationError,
    },
    NoMilestones,
    BudgetNotConfigured,
    BudgetExceeded(BudgetViolation),
    CurrencyMismatch,
    Conflict,
    Storage(String),
}

impl From<DatabaseError> for CreateContractError {
    fn from(error: DatabaseError) -> Self {
        CreateContractError::Storage(error.to_string())
    }
}

#[derive(Debug)]
pub struct CreatedContract {
    pub contract: Contract,
    pub milestones: Vec<Milestone>,
}

impl CreateContractUseCase {
    pub async fn execute(
        ctx: &AppContext,
        cmd: CreateContractCommand,
    ) -> Result<CreatedContract, CreateContractError> {
        // Step 1: A contract without milestones has nothing to pay for.
        if cmd.milestones.is_empty() {
            return Err(CreateContractError::NoMilestones);
        }

        // Step 2: Validate the contract and every milestone before touching
        // storage. Milestones inherit the contract currency.
        let contract = Contract::new(
            ContractId::new(),
            cmd.caller,
            cmd.contractor_id,
            cmd.title,
            cmd.currency,
        )
        .map_err(CreateContractError::Validation)?;

        let mut milestones = Vec::with_capacity(cmd.milestones.len());
        for (index, draft) in cmd.milestones.into_iter().enumerate() {
            let milestone = Milestone::new(
                MilestoneId::new(),
                contract.id,
                draft.name,
                draft.description,
                Money::new(draft.amount_minor, cmd.currency),
                draft.due_date,
                draft.auto_pay,
            )
            .map_err(|error| CreateContractError::MilestoneValidation { index, error })?;
            milestones.push(milestone);
        }

        // A saturated total fails the budget guard closed.
        let total_minor = milestones
            .iter()
            .fold(0i64, |sum, m| sum.saturating_add(m.amount.amount_minor));
        let total = Money::new(total_minor, cmd.currency);

        // Step 3: Guard and allocate the total, then persist contract,
        // milestones and the created event in one transaction.
        let repos = ctx.repos.clone();
        let lifecycle = ctx.lifecycle.clone();
        let business_id = contract.business_id;
        let now = Timestamp::now_utc();
        ctx.repos
            .with_tx(move |tx| {
                Box::pin(async move {
                    let budget = repos
                        .budget
                        .get_tx(tx, business_id)
                        .await
                        .map_err(|e| CreateContractError::Storage(format!("{e:?}")))?
                        .ok_or(CreateContractError::BudgetNotConfigured)?;
                    if budget.currency != total.currency {
                        return Err(CreateContractError::CurrencyMismatch);
                    }
                    check_budget(total.amount_minor, budget.cap_minor, budget.used_minor)
                        .map_err(CreateContractError::BudgetExceeded)?;

                    let allocated = repos
                        .budget
                        .allocate_tx(tx, business_id, total, now)
                        .await
                        .map_err(|e| CreateContractError::Storage(format!("{e:?}")))?;
                    if allocated.is_none() {
                        // The pre-check passed but a concurrent allocation
                        // claimed the headroom first.
                        let budget = repos
                            .budget
                            .get_tx(tx, business_id)
                            .await
                            .map_err(|e| CreateContractError::Storage(format!("{e:?}")))?
                            .ok_or(CreateContractError::BudgetNotConfigured)?;
                        let violation =
                            check_budget(total.amount_minor, budget.cap_minor, budget.used_minor)
                                .err()
                                .ok_or(CreateContractError::Conflict)?;
                        return Err(CreateContractError::BudgetExceeded(violation));
                    }

                    repos
                        .contract
                        .insert_tx(tx, &contract)
                        .await
                        .map_err(|e| CreateContractError::Storage(format!("{e:?}")))?;
                    for milestone in &milestones {
                        repos
                            .milestone
                            .insert_tx(tx, milestone)
                            .await
                            .map_err(|e| CreateContractError::Storage(format!("{e:?}")))?;
                    }

                    lifecycle
                        .record_event_tx(tx, &Event::contract_created(&contract))
                        .await
                        .map_err(|e| CreateContractError::Storage(format!("{e:?}")))?;

                    Ok(CreatedContract {
                        contract,
                        milestones,
                    })
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CreateContractCommand, CreateContractError, CreateContractUseCase, MilestoneDraft,
    };
    use crate::application::context::test_support::test_context;
    use crate::domain::entities::contract::ContractValidationError;
    use crate::domain::entities::milestone::MilestoneValidationError;
    use crate::domain::value_objects::ids::ActorId;
    use crate::domain::value_objects::money::Currency;

    fn draft(name: &str, amount_minor: i64) -> MilestoneDraft {
        MilestoneDraft {
            name: name.to_string(),
            description: format!("{name} delivered and reviewed"),
            amount_minor,
            due_date: None,
            auto_pay: false,
        }
    }

    fn command() -> CreateContractCommand {
        CreateContractCommand {
            caller: ActorId::new(),
            contractor_id: ActorId::new(),
            title: "Site redesign".to_string(),
            currency: Currency::Usd,
            milestones: vec![draft("Wireframes", 20_000), draft("Build", 60_000)],
        }
    }

    #[tokio::test]
    async fn given_no_milestones_when_creating_should_be_rejected() {
        let ctx = test_context();
        let mut cmd = command();
        cmd.milestones.clear();

        let result = CreateContractUseCase::execute(&ctx, cmd).await;

        match result {
            Err(CreateContractError::NoMilestones) => {}
            other => panic!("expected no-milestones error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn given_blank_title_when_creating_should_fail_validation() {
        let ctx = test_context();
        let mut cmd = command();
        cmd.title = "   ".to_string();

        let result = CreateContractUseCase::execute(&ctx, cmd).await;

        match result {
            Err(CreateContractError::Validation(ContractValidationError::EmptyTitle)) => {}
            other => panic!("expected empty-title error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn given_same_parties_when_creating_should_fail_validation() {
        let ctx = test_context();
        let mut cmd = command();
        cmd.contractor_id = cmd.caller;

        let result = CreateContractUseCase::execute(&ctx, cmd).await;

        match result {
            Err(CreateContractError::Validation(
                ContractValidationError::SameBusinessAndContractor,
            )) => {}
            other => panic!("expected same-parties error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn given_invalid_milestone_when_creating_should_name_its_position() {
        let ctx = test_context();
        let mut cmd = command();
        cmd.milestones = vec![draft("Wireframes", 20_000), draft("Build", 0)];

        let result = CreateContractUseCase::execute(&ctx, cmd).await;

        match result {
            Err(CreateContractError::MilestoneValidation { index, error }) => {
                assert_eq!(index, 1);
                assert_eq!(error, MilestoneValidationError::NonPositiveAmount);
            }
            other => panic!("expected milestone validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn given_valid_contract_when_creating_should_reach_the_transaction() {
        let ctx = test_context();

        let result = CreateContractUseCase::execute(&ctx, command()).await;

        match result {
            Err(CreateContractError::Storage(message)) => {
                assert!(message.contains("tx_unavailable"));
            }
            other => panic!("expected storage error, got {other:?}"),
        }
    }
}
