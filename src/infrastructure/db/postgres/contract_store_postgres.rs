use crate::infrastructure::db::dto::contract::ContractRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::contract_store::{ContractRepositoryError, ContractStore};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

const COLUMNS: &str = "id, business_id, contractor_id, title, currency, status, created_at";

pub struct ContractStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl ContractStorePostgres {
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn get_impl_conn(
        conn: &mut sqlx::PgConnection,
        id: Uuid,
    ) -> Result<Option<ContractRow>, ContractRepositoryError> {
        sqlx::query_as::<_, ContractRow>(&format!(
            "SELECT {COLUMNS} FROM contracts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|_| ContractRepositoryError::StorageUnavailable)
    }

    async fn insert_impl_conn(
        conn: &mut sqlx::PgConnection,
        row: ContractRow,
    ) -> Result<(), ContractRepositoryError> {
        sqlx::query(&format!(
            "INSERT INTO contracts ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(row.id)
        .bind(row.business_id)
        .bind(row.contractor_id)
        .bind(row.title)
        .bind(row.currency)
        .bind(row.status)
        .bind(row.created_at)
        .execute(conn)
        .await
        .map_err(|_| ContractRepositoryError::StorageUnavailable)?;
        Ok(())
    }
}

#[async_trait]
impl ContractStore for ContractStorePostgres {
    async fn get(&self, id: Uuid) -> Result<Option<ContractRow>, ContractRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(async move { Self::get_impl_conn(conn, id).await }))
            .await
    }

    async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
    ) -> Result<Option<ContractRow>, ContractRepositoryError> {
        Self::get_impl_conn(&mut *tx, id).await
    }

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: ContractRow,
    ) -> Result<(), ContractRepositoryError> {
        Self::insert_impl_conn(&mut *tx, row).await
    }
}
