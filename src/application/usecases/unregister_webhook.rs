// Use case: unregister_webhook.

use crate::application::context::AppContext;
use crate::domain::value_objects::ids::{ActorId, SubscriptionId};

/// Removes a webhook subscription owned by the caller.
pub struct UnregisterWebhookUseCase;

#[derive(Debug)]
pub enum UnregisterWebhookError {
    NotFound,
    Storage(String),
}

impl UnregisterWebhookUseCase {
    /// Ownership is enforced in the delete predicate, so a subscription
    /// owned by someone else reads as absent.
    pub async fn execute(
        ctx: &AppContext,
        id: SubscriptionId,
        caller: ActorId,
    ) -> Result<(), UnregisterWebhookError> {
        let removed = ctx
            .repos
            .webhook
            .delete(id, caller)
            .await
            .map_err(|e| UnregisterWebhookError::Storage(format!("{e:?}")))?;
        if !removed {
            return Err(UnregisterWebhookError::NotFound);
        }
        Ok(())
    }
}
