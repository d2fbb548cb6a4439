use crate::infrastructure::db::dto::event::EventRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::event_store::{EventRepositoryError, EventStore};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

const COLUMNS: &str = "id, topic, work_request_id, milestone_id, payment_id, payload, occurred_at";

pub struct EventStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl EventStorePostgres {
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn insert_impl_conn(
        conn: &mut sqlx::PgConnection,
        row: EventRow,
    ) -> Result<(), EventRepositoryError> {
        sqlx::query(&format!(
            "INSERT INTO events ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(row.id)
        .bind(row.topic)
        .bind(row.work_request_id)
        .bind(row.milestone_id)
        .bind(row.payment_id)
        .bind(row.payload)
        .bind(row.occurred_at)
        .execute(conn)
        .await
        .map_err(|_| EventRepositoryError::StorageUnavailable)?;
        Ok(())
    }

    async fn list_impl_conn(
        conn: &mut sqlx::PgConnection,
        work_request_id: Uuid,
    ) -> Result<Vec<EventRow>, EventRepositoryError> {
        sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {COLUMNS} FROM events WHERE work_request_id = $1 ORDER BY occurred_at ASC"
        ))
        .bind(work_request_id)
        .fetch_all(conn)
        .await
        .map_err(|_| EventRepositoryError::StorageUnavailable)
    }
}

#[async_trait]
impl EventStore for EventStorePostgres {
    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: EventRow,
    ) -> Result<(), EventRepositoryError> {
        Self::insert_impl_conn(&mut *tx, row).await
    }

    async fn list_by_work_request(
        &self,
        work_request_id: Uuid,
    ) -> Result<Vec<EventRow>, EventRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move { Self::list_impl_conn(conn, work_request_id).await })
            })
            .await
    }
}
