// Use case: list_webhooks.

use crate::application::context::AppContext;
use crate::domain::entities::webhook::WebhookSubscription;
use crate::domain::value_objects::ids::ActorId;

/// Lists the caller's webhook subscriptions.
pub struct ListWebhooksUseCase;

#[derive(Debug)]
pub enum ListWebhooksError {
    Storage(String),
}

impl ListWebhooksUseCase {
    pub async fn execute(
        ctx: &AppContext,
        caller: ActorId,
    ) -> Result<Vec<WebhookSubscription>, ListWebhooksError> {
        ctx.repos
            .webhook
            .list_for_actor(caller)
            .await
            .map_err(|e| ListWebhooksError::Storage(format!("{e:?}")))
    }
}
