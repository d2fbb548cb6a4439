use crate::infrastructure::db::dto::actor::ActorRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::actor_store::{ActorRepositoryError, ActorStore};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub struct ActorStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl ActorStorePostgres {
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn get_impl_conn(
        conn: &mut sqlx::PgConnection,
        id: Uuid,
    ) -> Result<Option<ActorRow>, ActorRepositoryError> {
        sqlx::query_as::<_, ActorRow>(
            "SELECT id, display_name, role, created_at FROM actors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|_| ActorRepositoryError::StorageUnavailable)
    }

    async fn insert_impl_conn(
        conn: &mut sqlx::PgConnection,
        row: ActorRow,
    ) -> Result<(), ActorRepositoryError> {
        sqlx::query(
            "INSERT INTO actors (id, display_name, role, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(row.id)
        .bind(row.display_name)
        .bind(row.role)
        .bind(row.created_at)
        .execute(conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ActorRepositoryError::Conflict,
            _ => ActorRepositoryError::StorageUnavailable,
        })?;
        Ok(())
    }
}

#[async_trait]
impl ActorStore for ActorStorePostgres {
    async fn get(&self, id: Uuid) -> Result<Option<ActorRow>, ActorRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(async move { Self::get_impl_conn(conn, id).await }))
            .await
    }

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: ActorRow,
    ) -> Result<(), ActorRepositoryError> {
        Self::insert_impl_conn(&mut *tx, row).await
    }
}
