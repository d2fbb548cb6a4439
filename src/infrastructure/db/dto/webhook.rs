use crate::domain::entities::event::EventTopic;
use crate::domain::entities::webhook::WebhookSubscription;
use crate::domain::value_objects::ids::{ActorId, SubscriptionId};
use crate::domain::value_objects::timestamps::Timestamp;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct WebhookSubscriptionRow {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub target_url: String,
    pub topics: Vec<String>,
    pub created_at: OffsetDateTime,
}

impl WebhookSubscriptionRow {
    pub fn from_subscription(subscription: &WebhookSubscription) -> Self {
        Self {
            id: subscription.id.0,
            actor_id: subscription.actor_id.0,
            target_url: subscription.target_url.clone(),
            topics: subscription
                .topics
                .iter()
                .map(|topic| topic.as_str().to_string())
                .collect(),
            created_at: subscription.created_at.into_inner(),
        }
    }

    /// Unknown topic strings are dropped rather than defaulted; a
    /// subscription never fires for a topic it did not name.
    pub fn into_subscription(self) -> WebhookSubscription {
        WebhookSubscription {
            id: SubscriptionId(self.id),
            actor_id: ActorId(self.actor_id),
            target_url: self.target_url,
            topics: self
                .topics
                .iter()
                .filter_map(|topic| EventTopic::parse(topic))
                .collect(),
            created_at: Timestamp::from(self.created_at),
        }
    }
}
