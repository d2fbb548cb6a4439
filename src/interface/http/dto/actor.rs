use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterActorRequest {
    pub display_name: String,
    /// "business" or "contractor".
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterActorResponse {
    pub actor_id: String,
    pub display_name: String,
    pub role: String,
    /// Returned exactly once; only the prefix and a hash are stored.
    pub api_key: String,
    pub key_prefix: String,
    pub created_at: String,
}
