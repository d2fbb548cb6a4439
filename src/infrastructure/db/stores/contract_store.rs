use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::contract::ContractRow;
use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, PartialEq)]
pub enum ContractRepositoryError {
    NotFound,
    StorageUnavailable,
}

impl From<DatabaseError> for ContractRepositoryError {
    fn from(_: DatabaseError) -> Self {
        ContractRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait ContractStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<ContractRow>, ContractRepositoryError>;

    async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
    ) -> Result<Option<ContractRow>, ContractRepositoryError>;

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: ContractRow,
    ) -> Result<(), ContractRepositoryError>;
}
