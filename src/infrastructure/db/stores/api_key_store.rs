use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::api_key::ApiKeyRow;
use async_trait::async_trait;

#[derive(Debug, PartialEq)]
pub enum ApiKeyRepositoryError {
    NotFound,
    StorageUnavailable,
}

impl From<DatabaseError> for ApiKeyRepositoryError {
    fn from(_: DatabaseError) -> Self {
        ApiKeyRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Looks up an active key by prefix and hash. Both must match; the
    /// prefix narrows the scan, the hash decides.
    async fn find_active(
        &self,
        key_prefix: String,
        key_hash: String,
    ) -> Result<Option<ApiKeyRow>, ApiKeyRepositoryError>;

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: ApiKeyRow,
    ) -> Result<(), ApiKeyRepositoryError>;
}
