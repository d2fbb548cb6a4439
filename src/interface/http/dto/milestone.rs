use serde::{Deserialize, Serialize};

use crate::domain::entities::milestone::Milestone;

use super::contract::ContractResponse;
use super::payment::PaymentResponse;
use super::{rfc3339, rfc3339_opt};

#[derive(Debug, Serialize)]
pub struct MilestoneResponse {
    pub milestone_id: String,
    pub contract_id: String,
    pub name: String,
    pub description: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub auto_pay: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deliverable_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl MilestoneResponse {
    pub fn from_entity(milestone: &Milestone) -> Self {
        Self {
            milestone_id: milestone.id.0.to_string(),
            contract_id: milestone.contract_id.0.to_string(),
            name: milestone.name.clone(),
            description: milestone.description.clone(),
            amount_minor: milestone.amount.amount_minor,
            currency: milestone.amount.currency.as_str().to_string(),
            status: milestone.status.as_str().to_string(),
            due_date: rfc3339_opt(milestone.due_date),
            auto_pay: milestone.auto_pay,
            deliverable_url: milestone.deliverable_url.clone(),
            review_notes: milestone.review_notes.clone(),
            submitted_at: rfc3339_opt(milestone.submitted_at),
            approved_at: rfc3339_opt(milestone.approved_at),
            created_at: rfc3339(milestone.created_at),
            updated_at: rfc3339(milestone.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MilestoneViewResponse {
    pub milestone: MilestoneResponse,
    pub contract: ContractResponse,
}

#[derive(Debug, Deserialize)]
pub struct SubmitMilestoneRequest {
    pub deliverable_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectMilestoneRequest {
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApprovedMilestoneResponse {
    pub milestone: MilestoneResponse,
    pub payment: PaymentResponse,
    /// True when an earlier approval answered this call.
    pub replayed: bool,
}
