use crate::domain::entities::budget::{Budget, BudgetPeriod};
use crate::domain::value_objects::ids::ActorId;
use crate::domain::value_objects::money::Currency;
use crate::domain::value_objects::timestamps::Timestamp;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct BudgetRow {
    pub business_id: Uuid,
    pub cap_minor: i64,
    pub used_minor: i64,
    pub currency: String,
    pub period: String,
    pub reset_enabled: bool,
    pub updated_at: OffsetDateTime,
}

impl BudgetRow {
    pub fn from_budget(budget: &Budget) -> Self {
        Self {
            business_id: budget.business_id.0,
            cap_minor: budget.cap_minor,
            used_minor: budget.used_minor,
            currency: budget.currency.as_str().to_string(),
            period: budget.period.as_str().to_string(),
            reset_enabled: budget.reset_enabled,
            updated_at: budget.updated_at.into_inner(),
        }
    }

    pub fn into_budget(self) -> Budget {
        Budget {
            business_id: ActorId(self.business_id),
            cap_minor: self.cap_minor,
            used_minor: self.used_minor,
            currency: Currency::parse(&self.currency).unwrap_or(Currency::Usd),
            period: BudgetPeriod::parse(&self.period).unwrap_or(BudgetPeriod::Monthly),
            reset_enabled: self.reset_enabled,
            updated_at: Timestamp::from(self.updated_at),
        }
    }
}
