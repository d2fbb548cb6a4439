use crate::domain::value_objects::ids::{ContractId, MilestoneId};
use crate::domain::value_objects::money::Money;
use crate::domain::value_objects::timestamps::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    Submitted,
    Approved,
    Rejected,
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "pending",
            MilestoneStatus::Submitted => "submitted",
            MilestoneStatus::Approved => "approved",
            MilestoneStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<MilestoneStatus> {
        match value {
            "pending" => Some(MilestoneStatus::Pending),
            "submitted" => Some(MilestoneStatus::Submitted),
            "approved" => Some(MilestoneStatus::Approved),
            "rejected" => Some(MilestoneStatus::Rejected),
            _ => None,
        }
    }
}

/// A payable checkpoint within a contract, approved individually to
/// trigger payment. `approved_at` is set exactly once; the payment
/// trigger is idempotent on the milestone id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    pub id: MilestoneId,
    pub contract_id: ContractId,
    pub name: String,
    pub description: String,
    pub amount: Money,
    pub status: MilestoneStatus,
    pub due_date: Option<Timestamp>,
    pub auto_pay: bool,
    pub deliverable_url: Option<String>,
    pub review_notes: Option<String>,
    pub submitted_at: Option<Timestamp>,
    pub approved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneValidationError {
    EmptyName,
    EmptyDescription,
    NonPositiveAmount,
}

impl Milestone {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: MilestoneId,
        contract_id: ContractId,
        name: String,
        description: String,
        amount: Money,
        due_date: Option<Timestamp>,
        auto_pay: bool,
    ) -> Result<Self, MilestoneValidationError> {
        if name.trim().is_empty() {
            return Err(MilestoneValidationError::EmptyName);
        }
        if description.trim().is_empty() {
            return Err(MilestoneValidationError::EmptyDescription);
        }
        if !amount.is_positive() {
            return Err(MilestoneValidationError::NonPositiveAmount);
        }

        let now = Timestamp::now_utc();
        Ok(Self {
            id,
            contract_id,
            name,
            description,
            amount,
            status: MilestoneStatus::Pending,
            due_date,
            auto_pay,
            deliverable_url: None,
            review_notes: None,
            submitted_at: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::money::Currency;

    #[test]
    fn given_valid_input_when_new_should_start_pending() {
        let milestone = Milestone::new(
            MilestoneId::new(),
            ContractId::new(),
            "Wireframes".to_string(),
            "Approved wireframes for all pages".to_string(),
            Money::new(20_000, Currency::Usd),
            None,
            true,
        )
        .expect("milestone should be created");
        assert_eq!(milestone.status, MilestoneStatus::Pending);
        assert!(milestone.approved_at.is_none());
        assert!(milestone.auto_pay);
    }

    #[test]
    fn given_blank_name_when_new_should_return_error() {
        let result = Milestone::new(
            MilestoneId::new(),
            ContractId::new(),
            "  ".to_string(),
            "desc".to_string(),
            Money::new(100, Currency::Usd),
            None,
            false,
        );
        assert_eq!(result, Err(MilestoneValidationError::EmptyName));
    }

    #[test]
    fn given_zero_amount_when_new_should_return_error() {
        let result = Milestone::new(
            MilestoneId::new(),
            ContractId::new(),
            "Wireframes".to_string(),
            "desc".to_string(),
            Money::new(0, Currency::Usd),
            None,
            false,
        );
        assert_eq!(result, Err(MilestoneValidationError::NonPositiveAmount));
    }

    #[test]
    fn given_status_strings_when_parsed_should_round_trip() {
        for status in [
            MilestoneStatus::Pending,
            MilestoneStatus::Submitted,
            MilestoneStatus::Approved,
            MilestoneStatus::Rejected,
        ] {
            assert_eq!(MilestoneStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MilestoneStatus::parse("closed"), None);
    }
}
