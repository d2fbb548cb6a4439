use crate::domain::value_objects::ids::{ActorId, ApiKeyId};
use crate::domain::value_objects::timestamps::Timestamp;

/// A hashed bearer credential for an actor. The plaintext secret is
/// shown once at issue time; only the prefix and SHA-256 hash persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub actor_id: ActorId,
    pub key_prefix: String,
    pub key_hash: String,
    pub active: bool,
    pub created_at: Timestamp,
}

impl ApiKey {
    pub fn new(id: ApiKeyId, actor_id: ActorId, key_prefix: String, key_hash: String) -> Self {
        Self {
            id,
            actor_id,
            key_prefix,
            key_hash,
            active: true,
            created_at: Timestamp::now_utc(),
        }
    }
}
