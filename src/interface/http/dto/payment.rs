use serde::Serialize;

use crate::domain::entities::payment::Payment;

use super::rfc3339;

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub payment_intent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PaymentResponse {
    pub fn from_entity(payment: &Payment) -> Self {
        Self {
            payment_id: payment.id.0.to_string(),
            amount_minor: payment.amount.amount_minor,
            currency: payment.amount.currency.as_str().to_string(),
            status: payment.status.as_str().to_string(),
            payment_intent_id: payment.intent_id.clone(),
            transfer_id: payment.transfer_id.clone(),
            work_request_id: payment.work_request_id.map(|id| id.0.to_string()),
            milestone_id: payment.milestone_id.map(|id| id.0.to_string()),
            created_at: rfc3339(payment.created_at),
            updated_at: rfc3339(payment.updated_at),
        }
    }
}
