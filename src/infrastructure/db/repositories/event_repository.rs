use crate::domain::entities::event::Event;
use crate::domain::value_objects::ids::WorkRequestId;
use crate::infrastructure::db::dto::event::EventRow;
use crate::infrastructure::db::stores::event_store::{EventRepositoryError, EventStore};
use std::sync::Arc;

pub struct EventRepository {
    store: Arc<dyn EventStore>,
}

impl EventRepository {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event: &Event,
    ) -> Result<(), EventRepositoryError> {
        self.store.insert_tx(tx, EventRow::from_event(event)).await
    }

    pub async fn list_by_work_request(
        &self,
        work_request_id: WorkRequestId,
    ) -> Result<Vec<Event>, EventRepositoryError> {
        let rows = self.store.list_by_work_request(work_request_id.0).await?;
        Ok(rows.into_iter().map(EventRow::into_event).collect())
    }
}
