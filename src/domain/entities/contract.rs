use crate::domain::value_objects::ids::{ActorId, ContractId};
use crate::domain::value_objects::money::Currency;
use crate::domain::value_objects::timestamps::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    Completed,
    Canceled,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Active => "active",
            ContractStatus::Completed => "completed",
            ContractStatus::Canceled => "canceled",
        }
    }

    pub fn parse(value: &str) -> Option<ContractStatus> {
        match value {
            "active" => Some(ContractStatus::Active),
            "completed" => Some(ContractStatus::Completed),
            "canceled" => Some(ContractStatus::Canceled),
            _ => None,
        }
    }
}

/// Anchor for a set of payable milestones between a business and a
/// contractor. All milestones of a contract share its currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub id: ContractId,
    pub business_id: ActorId,
    pub contractor_id: ActorId,
    pub title: String,
    pub currency: Currency,
    pub status: ContractStatus,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractValidationError {
    EmptyTitle,
    SameBusinessAndContractor,
}

impl Contract {
    pub fn new(
        id: ContractId,
        business_id: ActorId,
        contractor_id: ActorId,
        title: String,
        currency: Currency,
    ) -> Result<Self, ContractValidationError> {
        if title.trim().is_empty() {
            return Err(ContractValidationError::EmptyTitle);
        }
        if business_id == contractor_id {
            return Err(ContractValidationError::SameBusinessAndContractor);
        }
        Ok(Self {
            id,
            business_id,
            contractor_id,
            title,
            currency,
            status: ContractStatus::Active,
            created_at: Timestamp::now_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_valid_input_when_new_should_start_active() {
        let contract = Contract::new(
            ContractId::new(),
            ActorId::new(),
            ActorId::new(),
            "Site redesign".to_string(),
            Currency::Eur,
        )
        .expect("contract should be created");
        assert_eq!(contract.status, ContractStatus::Active);
    }

    #[test]
    fn given_blank_title_when_new_should_return_error() {
        let result = Contract::new(
            ContractId::new(),
            ActorId::new(),
            ActorId::new(),
            "".to_string(),
            Currency::Usd,
        );
        assert_eq!(result, Err(ContractValidationError::EmptyTitle));
    }

    #[test]
    fn given_same_parties_when_new_should_return_error() {
        let actor = ActorId::new();
        let result = Contract::new(
            ContractId::new(),
            actor,
            actor,
            "Self-dealing".to_string(),
            Currency::Usd,
        );
        assert_eq!(result, Err(ContractValidationError::SameBusinessAndContractor));
    }
}
