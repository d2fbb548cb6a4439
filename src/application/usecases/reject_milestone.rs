// Use case: reject_milestone.

use crate::application::context::AppContext;
use crate::domain::entities::event::Event;
use crate::domain::entities::milestone::{Milestone, MilestoneStatus};
use crate::domain::value_objects::ids::{ActorId, MilestoneId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::database::DatabaseError;

/// The business turns a submitted milestone down. Feedback is mandatory
/// and the milestone's allocation goes back to the budget.
pub struct RejectMilestoneUseCase;

#[derive(Debug)]
pub enum RejectMilestoneError {
    NotFound,
    Forbidden,
    FeedbackRequired,
    Conflict,
    Storage(String),
}

impl From<DatabaseError> for RejectMilestoneError {
    fn from(error: DatabaseError) -> Self {
        RejectMilestoneError::Storage(error.to_string())
    }
}

impl RejectMilestoneUseCase {
    pub async fn execute(
        ctx: &AppContext,
        id: MilestoneId,
        caller: ActorId,
        feedback: String,
    ) -> Result<Milestone, RejectMilestoneError> {
        if feedback.trim().is_empty() {
            return Err(RejectMilestoneError::FeedbackRequired);
        }

        // Step 1: Load the milestone and authorize the business via the
        // owning contract.
        let milestone = ctx
            .repos
            .milestone
            .get(id)
            .await
            .map_err(|e| RejectMilestoneError::Storage(format!("{e:?}")))?
            .ok_or(RejectMilestoneError::NotFound)?;
        let contract = ctx
            .repos
            .contract
            .get(milestone.contract_id)
            .await
            .map_err(|e| RejectMilestoneError::Storage(format!("{e:?}")))?
            .ok_or(RejectMilestoneError::NotFound)?;
        if caller != contract.business_id {
            return Err(RejectMilestoneError::Forbidden);
        }
        if milestone.status != MilestoneStatus::Submitted {
            return Err(RejectMilestoneError::Conflict);
        }

        // Step 2: Reject, release the allocation and record the event in
        // one transaction.
        let repos = ctx.repos.clone();
        let lifecycle = ctx.lifecycle.clone();
        let business_id = contract.business_id;
        let amount = milestone.amount;
        let now = Timestamp::now_utc();
        ctx.repos
            .with_tx(move |tx| {
                Box::pin(async move {
                    let updated = repos
                        .milestone
                        .reject_tx(tx, id, feedback, now)
                        .await
                        .map_err(|e| RejectMilestoneError::Storage(format!("{e:?}")))?
                        .ok_or(RejectMilestoneError::Conflict)?;

                    repos
                        .budget
                        .release_tx(tx, business_id, amount, now)
                        .await
                        .map_err(|e| RejectMilestoneError::Storage(format!("{e:?}")))?;

                    lifecycle
                        .record_event_tx(tx, &Event::milestone_rejected(&updated))
                        .await
                        .map_err(|e| RejectMilestoneError::Storage(format!("{e:?}")))?;

                    Ok(updated)
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::{RejectMilestoneError, RejectMilestoneUseCase};
    use crate::application::context::test_support::test_context;
    use crate::application::context::AppContext;
    use crate::domain::entities::contract::Contract;
    use crate::domain::entities::milestone::{Milestone, MilestoneStatus};
    use crate::domain::value_objects::ids::{ActorId, ContractId, MilestoneId};
    use crate::domain::value_objects::money::{Currency, Money};
    use crate::infrastructure::db::dto::contract::ContractRow;
    use crate::infrastructure::db::dto::milestone::MilestoneRow;
    use crate::infrastructure::db::repositories::contract_repository::ContractRepository;
    use crate::infrastructure::db::repositories::milestone_repository::MilestoneRepository;
    use crate::infrastructure::db::stores::contract_store::{
        ContractRepositoryError, ContractStore,
    };
    use crate::infrastructure::db::stores::milestone_store::{
        MilestoneRepositoryError, MilestoneStore,
    };
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use time::OffsetDateTime;
    use uuid::Uuid;

    struct DummyContractStore {
        row: Mutex<Option<ContractRow>>,
    }

    #[async_trait]
    impl ContractStore for DummyContractStore {
        async fn get(&self, _id: Uuid) -> Result<Option<ContractRow>, ContractRepositoryError> {
            Ok(self.row.lock().unwrap().clone())
        }

        async fn get_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: Uuid,
        ) -> Result<Option<ContractRow>, ContractRepositoryError> {
            Err(ContractRepositoryError::StorageUnavailable)
        }

        async fn insert_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _row: ContractRow,
        ) -> Result<(), ContractRepositoryError> {
            Err(ContractRepositoryError::StorageUnavailable)
        }
    }

    struct DummyMilestoneStore {
        row: Mutex<Option<MilestoneRow>>,
    }

    #[async_trait]
    impl MilestoneStore for DummyMilestoneStore {
        async fn get(&self, id: Uuid) -> Result<Option<MilestoneRow>, MilestoneRepositoryError> {
            Ok(self
                .row
                .lock()
                .unwrap()
                .clone()
                .filter(|row| row.id == id))
        }

        async fn get_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: Uuid,
        ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError> {
            Err(MilestoneRepositoryError::StorageUnavailable)
        }

        async fn list_by_contract(
            &self,
            _contract_id: Uuid,
        ) -> Result<Vec<MilestoneRow>, MilestoneRepositoryError> {
            Ok(Vec::new())
        }

        async fn insert_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _row: MilestoneRow,
        ) -> Result<(), MilestoneRepositoryError> {
            Err(MilestoneRepositoryError::StorageUnavailable)
        }

        async fn submit_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: Uuid,
            _deliverable_url: Option<String>,
            _now: OffsetDateTime,
        ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError> {
            Err(MilestoneRepositoryError::StorageUnavailable)
        }

        async fn approve_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: Uuid,
            _now: OffsetDateTime,
        ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError> {
            Err(MilestoneRepositoryError::StorageUnavailable)
        }

        async fn reject_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: Uuid,
            _review_notes: String,
            _now: OffsetDateTime,
        ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError> {
            Err(MilestoneRepositoryError::StorageUnavailable)
        }
    }

    fn sample_contract() -> Contract {
        Contract::new(
            ContractId::new(),
            ActorId::new(),
            ActorId::new(),
            "Site redesign".to_string(),
            Currency::Usd,
        )
        .expect("contract should be valid")
    }

    fn sample_milestone(contract: &Contract, status: MilestoneStatus) -> Milestone {
        let mut milestone = Milestone::new(
            MilestoneId::new(),
            contract.id,
            "Wireframes".to_string(),
            "Approved wireframes for all pages".to_string(),
            Money::new(20_000, Currency::Usd),
            None,
            false,
        )
        .expect("milestone should be valid");
        milestone.status = status;
        milestone
    }

    fn context_with(contract: &Contract, milestone: &Milestone) -> AppContext {
        let mut ctx = test_context();
        ctx.repos.contract = Arc::new(ContractRepository::new(Arc::new(DummyContractStore {
            row: Mutex::new(Some(ContractRow::from_contract(contract))),
        })));
        ctx.repos.milestone = Arc::new(MilestoneRepository::new(Arc::new(DummyMilestoneStore {
            row: Mutex::new(Some(MilestoneRow::from_milestone(milestone))),
        })));
        ctx
    }

    #[tokio::test]
    async fn given_blank_feedback_when_rejecting_should_require_it() {
        let contract = sample_contract();
        let milestone = sample_milestone(&contract, MilestoneStatus::Submitted);
        let ctx = context_with(&contract, &milestone);

        let result = RejectMilestoneUseCase::execute(
            &ctx,
            milestone.id,
            contract.business_id,
            "   ".to_string(),
        )
        .await;

        match result {
            Err(RejectMilestoneError::FeedbackRequired) => {}
            other => panic!("expected feedback-required error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn given_contractor_caller_when_rejecting_should_be_forbidden() {
        let contract = sample_contract();
        let milestone = sample_milestone(&contract, MilestoneStatus::Submitted);
        let ctx = context_with(&contract, &milestone);

        let result = RejectMilestoneUseCase::execute(
            &ctx,
            milestone.id,
            contract.contractor_id,
            "Wireframes miss the brief".to_string(),
        )
        .await;

        match result {
            Err(RejectMilestoneError::Forbidden) => {}
            other => panic!("expected forbidden, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn given_pending_milestone_when_rejecting_should_conflict() {
        let contract = sample_contract();
        let milestone = sample_milestone(&contract, MilestoneStatus::Pending);
        let ctx = context_with(&contract, &milestone);

        let result = RejectMilestoneUseCase::execute(
            &ctx,
            milestone.id,
            contract.business_id,
            "Nothing was delivered yet".to_string(),
        )
        .await;

        match result {
            Err(RejectMilestoneError::Conflict) => {}
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn given_submitted_milestone_when_rejecting_should_reach_the_transaction() {
        let contract = sample_contract();
        let milestone = sample_milestone(&contract, MilestoneStatus::Submitted);
        let ctx = context_with(&contract, &milestone);

        let result = RejectMilestoneUseCase::execute(
            &ctx,
            milestone.id,
            contract.business_id,
            "Wireframes miss the brief".to_string(),
        )
        .await;

        match result {
            Err(RejectMilestoneError::Storage(message)) => {
                assert!(message.contains("tx_unavailable"));
            }
            other => panic!("expected storage error, got {other:?}"),
        }
    }
}
