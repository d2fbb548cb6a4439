use crate::domain::entities::api_key::ApiKey;
use crate::domain::value_objects::ids::{ActorId, ApiKeyId};
use crate::domain::value_objects::timestamps::Timestamp;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ApiKeyRow {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub key_prefix: String,
    pub key_hash: String,
    pub active: bool,
    pub created_at: OffsetDateTime,
}

impl ApiKeyRow {
    pub fn from_api_key(api_key: &ApiKey) -> Self {
        Self {
            id: api_key.id.0,
            actor_id: api_key.actor_id.0,
            key_prefix: api_key.key_prefix.clone(),
            key_hash: api_key.key_hash.clone(),
            active: api_key.active,
            created_at: api_key.created_at.into_inner(),
        }
    }

    pub fn into_api_key(self) -> ApiKey {
        ApiKey {
            id: ApiKeyId(self.id),
            actor_id: ActorId(self.actor_id),
            key_prefix: self.key_prefix,
            key_hash: self.key_hash,
            active: self.active,
            created_at: Timestamp::from(self.created_at),
        }
    }
}
