use crate::domain::value_objects::ids::ActorId;
use crate::domain::value_objects::money::Currency;
use crate::domain::value_objects::timestamps::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Monthly,
    Quarterly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Quarterly => "quarterly",
            BudgetPeriod::Yearly => "yearly",
        }
    }

    pub fn parse(value: &str) -> Option<BudgetPeriod> {
        match value {
            "monthly" => Some(BudgetPeriod::Monthly),
            "quarterly" => Some(BudgetPeriod::Quarterly),
            "yearly" => Some(BudgetPeriod::Yearly),
            _ => None,
        }
    }
}

/// Spending cap for a business. `used` tracks the value currently
/// allocated to live work requests and funded milestones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    pub business_id: ActorId,
    pub cap_minor: i64,
    pub used_minor: i64,
    pub currency: Currency,
    pub period: BudgetPeriod,
    pub reset_enabled: bool,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetValidationError {
    NegativeCap,
}

impl Budget {
    pub fn new(
        business_id: ActorId,
        cap_minor: i64,
        currency: Currency,
        period: BudgetPeriod,
        reset_enabled: bool,
    ) -> Result<Self, BudgetValidationError> {
        if cap_minor < 0 {
            return Err(BudgetValidationError::NegativeCap);
        }
        Ok(Self {
            business_id,
            cap_minor,
            used_minor: 0,
            currency,
            period,
            reset_enabled,
            updated_at: Timestamp::now_utc(),
        })
    }

    pub fn remaining_minor(&self) -> i64 {
        self.cap_minor - self.used_minor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_valid_cap_when_new_should_start_unused() {
        let budget = Budget::new(
            ActorId::new(),
            100_000,
            Currency::Usd,
            BudgetPeriod::Monthly,
            true,
        )
        .expect("budget should be created");
        assert_eq!(budget.used_minor, 0);
        assert_eq!(budget.remaining_minor(), 100_000);
    }

    #[test]
    fn given_negative_cap_when_new_should_return_error() {
        let result = Budget::new(
            ActorId::new(),
            -1,
            Currency::Usd,
            BudgetPeriod::Yearly,
            false,
        );
        assert_eq!(result, Err(BudgetValidationError::NegativeCap));
    }

    #[test]
    fn given_period_strings_when_parsed_should_round_trip() {
        for period in [
            BudgetPeriod::Monthly,
            BudgetPeriod::Quarterly,
            BudgetPeriod::Yearly,
        ] {
            assert_eq!(BudgetPeriod::parse(period.as_str()), Some(period));
        }
        assert_eq!(BudgetPeriod::parse("weekly"), None);
    }
}
