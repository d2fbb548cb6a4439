use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::actor::ActorRow;
use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, PartialEq)]
pub enum ActorRepositoryError {
    NotFound,
    Conflict,
    StorageUnavailable,
}

impl From<DatabaseError> for ActorRepositoryError {
    fn from(_: DatabaseError) -> Self {
        ActorRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait ActorStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<ActorRow>, ActorRepositoryError>;

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: ActorRow,
    ) -> Result<(), ActorRepositoryError>;
}
