// Use case: register_actor.

use crate::application::context::AppContext;
use crate::application::shared::api_key_helpers::generate_api_key;
use crate::domain::entities::actor::{Actor, ActorRole, ActorValidationError};
use crate::domain::entities::api_key::ApiKey;
use crate::domain::value_objects::ids::{ActorId, ApiKeyId};
use crate::infrastructure::db::database::DatabaseError;

/// Registers a business or contractor and issues its API key.
pub struct RegisterActorUseCase;

#[derive(Debug)]
pub enum RegisterActorError {
    Validation(ActorValidationError),
    Storage(String),
}

impl From<DatabaseError> for RegisterActorError {
    fn from(error: DatabaseError) -> Self {
        RegisterActorError::Storage(error.to_string())
    }
}

/// The raw key is returned exactly once; only prefix and hash persist.
#[derive(Debug)]
pub struct RegisteredActor {
    pub actor: Actor,
    pub api_key: String,
    pub key_prefix: String,
}

impl RegisterActorUseCase {
    pub async fn execute(
        ctx: &AppContext,
        display_name: String,
        role: ActorRole,
    ) -> Result<RegisteredActor, RegisterActorError> {
        // Step 1: Build the domain actor (validates the display name).
        let actor = Actor::new(ActorId::new(), display_name, role)
            .map_err(RegisterActorError::Validation)?;

        // Step 2: Generate the credential material.
        let (raw_key, key_prefix, key_hash) = generate_api_key();
        let api_key = ApiKey::new(ApiKeyId::new(), actor.id, key_prefix.clone(), key_hash);

        // Step 3: Persist actor and key in one transaction.
        let actors = ctx.repos.actor.clone();
        let keys = ctx.repos.api_key.clone();
        let stored = actor.clone();
        ctx.repos
            .with_tx(move |tx| {
                Box::pin(async move {
                    actors
                        .insert_tx(tx, &stored)
                        .await
                        .map_err(|e| RegisterActorError::Storage(format!("{e:?}")))?;
                    keys.insert_tx(tx, &api_key)
                        .await
                        .map_err(|e| RegisterActorError::Storage(format!("{e:?}")))?;
                    Ok::<(), RegisterActorError>(())
                })
            })
            .await?;

        // Step 4: Return the actor together with the one-time raw key.
        Ok(RegisteredActor {
            actor,
            api_key: raw_key,
            key_prefix,
        })
    }
}
