use crate::domain::entities::event::{Event, EventTopic};
use crate::domain::value_objects::ids::{ActorId, DeliveryId, EventId, SubscriptionId};
use crate::domain::value_objects::timestamps::Timestamp;
use serde::{Deserialize, Serialize};

/// A consumer endpoint registered for a set of exact event topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSubscription {
    pub id: SubscriptionId,
    pub actor_id: ActorId,
    pub target_url: String,
    pub topics: Vec<EventTopic>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookValidationError {
    InvalidTargetUrl,
    NoTopics,
}

impl WebhookSubscription {
    pub fn new(
        id: SubscriptionId,
        actor_id: ActorId,
        target_url: String,
        topics: Vec<EventTopic>,
    ) -> Result<Self, WebhookValidationError> {
        if !target_url.starts_with("http://") && !target_url.starts_with("https://") {
            return Err(WebhookValidationError::InvalidTargetUrl);
        }
        if topics.is_empty() {
            return Err(WebhookValidationError::NoTopics);
        }
        Ok(Self {
            id,
            actor_id,
            target_url,
            topics,
            created_at: Timestamp::now_utc(),
        })
    }

    pub fn matches(&self, topic: EventTopic) -> bool {
        self.topics.contains(&topic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<DeliveryStatus> {
        match value {
            "pending" => Some(DeliveryStatus::Pending),
            "delivered" => Some(DeliveryStatus::Delivered),
            "failed" => Some(DeliveryStatus::Failed),
            _ => None,
        }
    }
}

/// One POST owed to one subscription for one event. The topic, payload
/// and event time are copied in at fan-out so the sender never has to
/// join back to the event row.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookDelivery {
    pub id: DeliveryId,
    pub subscription_id: SubscriptionId,
    pub event_id: EventId,
    pub target_url: String,
    pub topic: EventTopic,
    pub payload: serde_json::Value,
    pub occurred_at: Timestamp,
    pub status: DeliveryStatus,
    pub attempt: i32,
    pub response_status: Option<i32>,
    pub last_error: Option<String>,
    pub next_attempt_at: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WebhookDelivery {
    pub fn pending_for(subscription: &WebhookSubscription, event: &Event) -> Self {
        let now = Timestamp::now_utc();
        Self {
            id: DeliveryId::new(),
            subscription_id: subscription.id,
            event_id: event.id,
            target_url: subscription.target_url.clone(),
            topic: event.topic,
            payload: event.payload.clone(),
            occurred_at: event.occurred_at,
            status: DeliveryStatus::Pending,
            attempt: 0,
            response_status: None,
            last_error: None,
            next_attempt_at: None,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
