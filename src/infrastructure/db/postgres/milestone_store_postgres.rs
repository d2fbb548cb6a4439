use crate::infrastructure::db::dto::milestone::MilestoneRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::milestone_store::{
    MilestoneRepositoryError, MilestoneStore,
};
use async_trait::async_trait;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

const COLUMNS: &str = "id, contract_id, name, description, amount_minor, currency, status, \
    due_date, auto_pay, deliverable_url, review_notes, submitted_at, approved_at, \
    created_at, updated_at";

pub struct MilestoneStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl MilestoneStorePostgres {
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn get_impl_conn(
        conn: &mut sqlx::PgConnection,
        id: Uuid,
    ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError> {
        sqlx::query_as::<_, MilestoneRow>(&format!(
            "SELECT {COLUMNS} FROM milestones WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|_| MilestoneRepositoryError::StorageUnavailable)
    }

    async fn list_impl_conn(
        conn: &mut sqlx::PgConnection,
        contract_id: Uuid,
    ) -> Result<Vec<MilestoneRow>, MilestoneRepositoryError> {
        sqlx::query_as::<_, MilestoneRow>(&format!(
            "SELECT {COLUMNS} FROM milestones WHERE contract_id = $1 ORDER BY created_at ASC"
        ))
        .bind(contract_id)
        .fetch_all(conn)
        .await
        .map_err(|_| MilestoneRepositoryError::StorageUnavailable)
    }

    async fn insert_impl_conn(
        conn: &mut sqlx::PgConnection,
        row: MilestoneRow,
    ) -> Result<(), MilestoneRepositoryError> {
        sqlx::query(&format!(
            "INSERT INTO milestones ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"
        ))
        .bind(row.id)
        .bind(row.contract_id)
        .bind(row.name)
        .bind(row.description)
        .bind(row.amount_minor)
        .bind(row.currency)
        .bind(row.status)
        .bind(row.due_date)
        .bind(row.auto_pay)
        .bind(row.deliverable_url)
        .bind(row.review_notes)
        .bind(row.submitted_at)
        .bind(row.approved_at)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(conn)
        .await
        .map_err(|_| MilestoneRepositoryError::StorageUnavailable)?;
        Ok(())
    }

    async fn submit_impl_conn(
        conn: &mut sqlx::PgConnection,
        id: Uuid,
        deliverable_url: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError> {
        sqlx::query_as::<_, MilestoneRow>(&format!(
            "UPDATE milestones SET \
               status = 'submitted', deliverable_url = $2, submitted_at = $3, updated_at = $3 \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(deliverable_url)
        .bind(now)
        .fetch_optional(conn)
        .await
        .map_err(|_| MilestoneRepositoryError::StorageUnavailable)
    }

    async fn approve_impl_conn(
        conn: &mut sqlx::PgConnection,
        id: Uuid,
        now: OffsetDateTime,
    ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError> {
        sqlx::query_as::<_, MilestoneRow>(&format!(
            "UPDATE milestones SET status = 'approved', approved_at = $2, updated_at = $2 \
             WHERE id = $1 AND status = 'submitted' AND approved_at IS NULL \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(now)
        .fetch_optional(conn)
        .await
        .map_err(|_| MilestoneRepositoryError::StorageUnavailable)
    }

    async fn reject_impl_conn(
        conn: &mut sqlx::PgConnection,
        id: Uuid,
        review_notes: String,
        now: OffsetDateTime,
    ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError> {
        sqlx::query_as::<_, MilestoneRow>(&format!(
            "UPDATE milestones SET status = 'rejected', review_notes = $2, updated_at = $3 \
             WHERE id = $1 AND status = 'submitted' \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(review_notes)
        .bind(now)
        .fetch_optional(conn)
        .await
        .map_err(|_| MilestoneRepositoryError::StorageUnavailable)
    }
}

#[async_trait]
impl MilestoneStore for MilestoneStorePostgres {
    async fn get(&self, id: Uuid) -> Result<Option<MilestoneRow>, MilestoneRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(async move { Self::get_impl_conn(conn, id).await }))
            .await
    }

    async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
    ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError> {
        Self::get_impl_conn(&mut *tx, id).await
    }

    async fn list_by_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Vec<MilestoneRow>, MilestoneRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move { Self::list_impl_conn(conn, contract_id).await })
            })
            .await
    }

    async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: MilestoneRow,
    ) -> Result<(), MilestoneRepositoryError> {
        Self::insert_impl_conn(&mut *tx, row).await
    }

    async fn submit_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        deliverable_url: Option<String>,
        now: OffsetDateTime,
    ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError> {
        Self::submit_impl_conn(&mut *tx, id, deliverable_url, now).await
    }

    async fn approve_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        now: OffsetDateTime,
    ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError> {
        Self::approve_impl_conn(&mut *tx, id, now).await
    }

    async fn reject_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        review_notes: String,
        now: OffsetDateTime,
    ) -> Result<Option<MilestoneRow>, MilestoneRepositoryError> {
        Self::reject_impl_conn(&mut *tx, id, review_notes, now).await
    }
}
