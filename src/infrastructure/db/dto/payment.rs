use crate::domain::entities::payment::{Payment, PaymentStatus};
use crate::domain::value_objects::ids::{MilestoneId, PaymentId, WorkRequestId};
use crate::domain::value_objects::money::{Currency, Money};
use crate::domain::value_objects::timestamps::Timestamp;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub intent_id: String,
    pub transfer_id: Option<String>,
    pub work_request_id: Option<Uuid>,
    pub milestone_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl PaymentRow {
    pub fn from_payment(payment: &Payment) -> Self {
        Self {
            id: payment.id.0,
            amount_minor: payment.amount.amount_minor,
            currency: payment.amount.currency.as_str().to_string(),
            status: payment.status.as_str().to_string(),
            intent_id: payment.intent_id.clone(),
            transfer_id: payment.transfer_id.clone(),
            work_request_id: payment.work_request_id.map(|id| id.0),
            milestone_id: payment.milestone_id.map(|id| id.0),
            created_at: payment.created_at.into_inner(),
            updated_at: payment.updated_at.into_inner(),
        }
    }

    pub fn into_payment(self) -> Payment {
        Payment {
            id: PaymentId(self.id),
            amount: Money::new(
                self.amount_minor,
                Currency::parse(&self.currency).unwrap_or(Currency::Usd),
            ),
            status: PaymentStatus::parse(&self.status).unwrap_or(PaymentStatus::Captured),
            intent_id: self.intent_id,
            transfer_id: self.transfer_id,
            work_request_id: self.work_request_id.map(WorkRequestId),
            milestone_id: self.milestone_id.map(MilestoneId),
            created_at: Timestamp::from(self.created_at),
            updated_at: Timestamp::from(self.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_milestone_payment_when_mapped_should_round_trip() {
        let payment = Payment::captured_for_milestone(
            PaymentId::new(),
            Money::new(500_00, Currency::Usd),
            "pi_milestone_123".to_string(),
            MilestoneId::new(),
        );

        let result = PaymentRow::from_payment(&payment).into_payment();

        assert_eq!(result, payment);
    }
}
