use crate::domain::entities::api_key::ApiKey;
use crate::infrastructure::db::dto::api_key::ApiKeyRow;
use crate::infrastructure::db::stores::api_key_store::{ApiKeyRepositoryError, ApiKeyStore};
use std::sync::Arc;

pub struct ApiKeyRepository {
    store: Arc<dyn ApiKeyStore>,
}

impl ApiKeyRepository {
    pub fn new(store: Arc<dyn ApiKeyStore>) -> Self {
        Self { store }
    }

    pub async fn find_active(
        &self,
        key_prefix: &str,
        key_hash: &str,
    ) -> Result<Option<ApiKey>, ApiKeyRepositoryError> {
        let row = self
            .store
            .find_active(key_prefix.to_string(), key_hash.to_string())
            .await?;
        Ok(row.map(ApiKeyRow::into_api_key))
    }

    pub async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        api_key: &ApiKey,
    ) -> Result<(), ApiKeyRepositoryError> {
        self.store
            .insert_tx(tx, ApiKeyRow::from_api_key(api_key))
            .await
    }
}
