use sha2::{Digest, Sha256};

/// Returns (raw key, prefix, hash). The raw key is shown to the caller
/// once; storage keeps only the prefix and the SHA-256 hash.
pub fn generate_api_key() -> (String, String, String) {
    let raw = format!("wpk_{}", uuid::Uuid::new_v4());
    (raw.clone(), api_key_prefix(&raw), api_key_hash(&raw))
}

pub fn api_key_prefix(raw: &str) -> String {
    raw.chars().take(8).collect::<String>()
}

pub fn api_key_hash(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
