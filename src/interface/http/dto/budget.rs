use serde::{Deserialize, Serialize};

use crate::domain::entities::budget::Budget;

use super::rfc3339;

#[derive(Debug, Deserialize)]
pub struct ConfigureBudgetRequest {
    pub cap_minor: i64,
    pub currency: String,
    /// "weekly" or "monthly".
    pub period: String,
    pub reset_enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct BudgetResponse {
    pub business_id: String,
    pub cap_minor: i64,
    pub used_minor: i64,
    pub remaining_minor: i64,
    pub currency: String,
    pub period: String,
    pub reset_enabled: bool,
    pub updated_at: String,
}

impl BudgetResponse {
    pub fn from_entity(budget: &Budget) -> Self {
        Self {
            business_id: budget.business_id.0.to_string(),
            cap_minor: budget.cap_minor,
            used_minor: budget.used_minor,
            remaining_minor: budget.remaining_minor(),
            currency: budget.currency.as_str().to_string(),
            period: budget.period.as_str().to_string(),
            reset_enabled: budget.reset_enabled,
            updated_at: rfc3339(budget.updated_at),
        }
    }
}
