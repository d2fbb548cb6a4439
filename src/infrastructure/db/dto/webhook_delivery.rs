use crate::domain::entities::event::EventTopic;
use crate::domain::entities::webhook::{DeliveryStatus, WebhookDelivery};
use crate::domain::value_objects::ids::{DeliveryId, EventId, SubscriptionId};
use crate::domain::value_objects::timestamps::Timestamp;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct WebhookDeliveryRow {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub event_id: Uuid,
    pub target_url: String,
    pub topic: String,
    pub payload: serde_json::Value,
    pub occurred_at: OffsetDateTime,
    pub status: String,
    pub attempt: i32,
    pub response_status: Option<i32>,
    pub last_error: Option<String>,
    pub next_attempt_at: Option<OffsetDateTime>,
    pub delivered_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl WebhookDeliveryRow {
    pub fn from_delivery(delivery: &WebhookDelivery) -> Self {
        Self {
            id: delivery.id.0,
            subscription_id: delivery.subscription_id.0,
            event_id: delivery.event_id.0,
            target_url: delivery.target_url.clone(),
            topic: delivery.topic.as_str().to_string(),
            payload: delivery.payload.clone(),
            occurred_at: delivery.occurred_at.into_inner(),
            status: delivery.status.as_str().to_string(),
            attempt: delivery.attempt,
            response_status: delivery.response_status,
            last_error: delivery.last_error.clone(),
            next_attempt_at: delivery.next_attempt_at.map(Timestamp::into_inner),
            delivered_at: delivery.delivered_at.map(Timestamp::into_inner),
            created_at: delivery.created_at.into_inner(),
            updated_at: delivery.updated_at.into_inner(),
        }
    }

    pub fn into_delivery(self) -> WebhookDelivery {
        WebhookDelivery {
            id: DeliveryId(self.id),
            subscription_id: SubscriptionId(self.subscription_id),
            event_id: EventId(self.event_id),
            target_url: self.target_url,
            topic: EventTopic::parse(&self.topic).unwrap_or(EventTopic::WorkRequestCreated),
            payload: self.payload,
            occurred_at: Timestamp::from(self.occurred_at),
            status: DeliveryStatus::parse(&self.status).unwrap_or(DeliveryStatus::Pending),
            attempt: self.attempt,
            response_status: self.response_status,
            last_error: self.last_error,
            next_attempt_at: self.next_attempt_at.map(Timestamp::from),
            delivered_at: self.delivered_at.map(Timestamp::from),
            created_at: Timestamp::from(self.created_at),
            updated_at: Timestamp::from(self.updated_at),
        }
    }
}
