use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::event::EventRow;
use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, PartialEq)]
pub enum EventRepositoryError {
    StorageUnavailable,
}

impl From<DatabaseError> for EventRepositoryError {
    fn from(_: DatabaseError) -> Self {
        EventRepositoryError::StorageUnavailable
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events are only ever written inside the transaction that commits
    /// the transition they describe.
    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: EventRow,
    ) -> Result<(), EventRepositoryError>;

    /// Timeline for one work request, oldest first.
    async fn list_by_work_request(
        &self,
        work_request_id: Uuid,
    ) -> Result<Vec<EventRow>, EventRepositoryError>;
}
