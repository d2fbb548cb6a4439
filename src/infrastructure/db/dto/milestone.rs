use crate::domain::entities::milestone::{Milestone, MilestoneStatus};
use crate::domain::value_objects::ids::{ContractId, MilestoneId};
use crate::domain::value_objects::money::{Currency, Money};
use crate::domain::value_objects::timestamps::Timestamp;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct MilestoneRow {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub name: String,
    pub description: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub due_date: Option<OffsetDateTime>,
    pub auto_pay: bool,
    pub deliverable_url: Option<String>,
    pub review_notes: Option<String>,
    pub submitted_at: Option<OffsetDateTime>,
    pub approved_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl MilestoneRow {
    pub fn from_milestone(milestone: &Milestone) -> Self {
        Self {
            id: milestone.id.0,
            contract_id: milestone.contract_id.0,
            name: milestone.name.clone(),
            description: milestone.description.clone(),
            amount_minor: milestone.amount.amount_minor,
            currency: milestone.amount.currency.as_str().to_string(),
            status: milestone.status.as_str().to_string(),
            due_date: milestone.due_date.map(Timestamp::into_inner),
            auto_pay: milestone.auto_pay,
            deliverable_url: milestone.deliverable_url.clone(),
            review_notes: milestone.review_notes.clone(),
            submitted_at: milestone.submitted_at.map(Timestamp::into_inner),
            approved_at: milestone.approved_at.map(Timestamp::into_inner),
            created_at: milestone.created_at.into_inner(),
            updated_at: milestone.updated_at.into_inner(),
        }
    }

    pub fn into_milestone(self) -> Milestone {
        Milestone {
            id: MilestoneId(self.id),
            contract_id: ContractId(self.contract_id),
            name: self.name,
            description: self.description,
            amount: Money::new(
                self.amount_minor,
                Currency::parse(&self.currency).unwrap_or(Currency::Usd),
            ),
            status: MilestoneStatus::parse(&self.status).unwrap_or(MilestoneStatus::Pending),
            due_date: self.due_date.map(Timestamp::from),
            auto_pay: self.auto_pay,
            deliverable_url: self.deliverable_url,
            review_notes: self.review_notes,
            submitted_at: self.submitted_at.map(Timestamp::from),
            approved_at: self.approved_at.map(Timestamp::from),
            created_at: Timestamp::from(self.created_at),
            updated_at: Timestamp::from(self.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_milestone_when_mapped_should_round_trip() {
        let milestone = Milestone::new(
            MilestoneId::new(),
            ContractId::new(),
            "Discovery".to_string(),
            "Interviews and audit".to_string(),
            Money::new(500_00, Currency::Eur),
            None,
            true,
        )
        .expect("milestone should be valid");

        let result = MilestoneRow::from_milestone(&milestone).into_milestone();

        assert_eq!(result, milestone);
    }
}
