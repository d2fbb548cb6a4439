use serde::{Deserialize, Serialize};

use crate::domain::entities::webhook::WebhookSubscription;

use super::rfc3339;

#[derive(Debug, Deserialize)]
pub struct RegisterWebhookRequest {
    pub target_url: String,
    /// Exact topic names, e.g. "work_request.approved".
    pub topics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct WebhookSubscriptionResponse {
    pub subscription_id: String,
    pub target_url: String,
    pub topics: Vec<String>,
    pub created_at: String,
}

impl WebhookSubscriptionResponse {
    pub fn from_entity(subscription: &WebhookSubscription) -> Self {
        Self {
            subscription_id: subscription.id.0.to_string(),
            target_url: subscription.target_url.clone(),
            topics: subscription
                .topics
                .iter()
                .map(|topic| topic.as_str().to_string())
                .collect(),
            created_at: rfc3339(subscription.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookListResponse {
    pub subscriptions: Vec<WebhookSubscriptionResponse>,
}

#[derive(Debug, Serialize)]
pub struct UnregisterWebhookResponse {
    pub deleted: bool,
}
