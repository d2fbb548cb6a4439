// Use case: register_webhook.

use crate::application::context::AppContext;
use crate::domain::entities::event::EventTopic;
use crate::domain::entities::webhook::{
    WebhookSubscription, WebhookValidationError,
};
use crate::domain::value_objects::ids::{ActorId, SubscriptionId};

/// Registers a consumer endpoint for a set of exact event topics.
pub struct RegisterWebhookUseCase;

#[derive(Debug)]
pub enum RegisterWebhookError {
    Validation(WebhookValidationError),
    Storage(String),
}

#[derive(Debug, Clone)]
pub struct RegisterWebhookCommand {
    pub actor_id: ActorId,
    pub target_url: String,
    pub topics: Vec<EventTopic>,
}

impl RegisterWebhookUseCase {
    pub async fn execute(
        ctx: &AppContext,
        cmd: RegisterWebhookCommand,
    ) -> Result<WebhookSubscription, RegisterWebhookError> {
        // Step 1: Validate the endpoint and topic list.
        let subscription = WebhookSubscription::new(
            SubscriptionId::new(),
            cmd.actor_id,
            cmd.target_url,
            cmd.topics,
        )
        .map_err(RegisterWebhookError::Validation)?;

        // Step 2: Persist the subscription.
        ctx.repos
            .webhook
            .insert(&subscription)
            .await
            .map_err(|e| RegisterWebhookError::Storage(format!("{e:?}")))?;

        Ok(subscription)
    }
}
