use serde::{Deserialize, Serialize};

use crate::domain::entities::contract::Contract;

use super::milestone::MilestoneResponse;
use super::rfc3339;

#[derive(Debug, Deserialize)]
pub struct CreateContractRequest {
    pub contractor_id: String,
    pub title: String,
    pub currency: String,
    pub milestones: Vec<MilestoneDraftRequest>,
}

#[derive(Debug, Deserialize)]
pub struct MilestoneDraftRequest {
    pub name: String,
    pub description: String,
    pub amount_minor: i64,
    pub due_date: Option<String>,
    pub auto_pay: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ContractResponse {
    pub contract_id: String,
    pub business_id: String,
    pub contractor_id: String,
    pub title: String,
    pub currency: String,
    pub status: String,
    pub created_at: String,
}

impl ContractResponse {
    pub fn from_entity(contract: &Contract) -> Self {
        Self {
            contract_id: contract.id.0.to_string(),
            business_id: contract.business_id.0.to_string(),
            contractor_id: contract.contractor_id.0.to_string(),
            title: contract.title.clone(),
            currency: contract.currency.as_str().to_string(),
            status: contract.status.as_str().to_string(),
            created_at: rfc3339(contract.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedContractResponse {
    pub contract: ContractResponse,
    pub milestones: Vec<MilestoneResponse>,
}
