use crate::domain::entities::event::{Event, EventTopic};
use crate::domain::value_objects::ids::{EventId, MilestoneId, PaymentId, WorkRequestId};
use crate::domain::value_objects::timestamps::Timestamp;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub topic: String,
    pub work_request_id: Option<Uuid>,
    pub milestone_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub payload: serde_json::Value,
    pub occurred_at: OffsetDateTime,
}

impl EventRow {
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: event.id.0,
            topic: event.topic.as_str().to_string(),
            work_request_id: event.work_request_id.map(|id| id.0),
            milestone_id: event.milestone_id.map(|id| id.0),
            payment_id: event.payment_id.map(|id| id.0),
            payload: event.payload.clone(),
            occurred_at: event.occurred_at.into_inner(),
        }
    }

    pub fn into_event(self) -> Event {
        Event {
            id: EventId(self.id),
            topic: EventTopic::parse(&self.topic).unwrap_or(EventTopic::WorkRequestCreated),
            work_request_id: self.work_request_id.map(WorkRequestId),
            milestone_id: self.milestone_id.map(MilestoneId),
            payment_id: self.payment_id.map(PaymentId),
            payload: self.payload,
            occurred_at: Timestamp::from(self.occurred_at),
        }
    }
}
