use crate::infrastructure::db::dto::budget::BudgetRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::budget_store::{BudgetRepositoryError, BudgetStore};
use async_trait::async_trait;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

const COLUMNS: &str = "business_id, cap_minor, used_minor, currency, period, reset_enabled, updated_at";

pub struct BudgetStorePostgres {
    db: Arc<PostgresDatabase>,
}

impl BudgetStorePostgres {
    pub fn new(db: Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn get_impl_conn(
        conn: &mut sqlx::PgConnection,
        business_id: Uuid,
    ) -> Result<Option<BudgetRow>, BudgetRepositoryError> {
        sqlx::query_as::<_, BudgetRow>(&format!(
            "SELECT {COLUMNS} FROM budgets WHERE business_id = $1"
        ))
        .bind(business_id)
        .fetch_optional(conn)
        .await
        .map_err(|_| BudgetRepositoryError::StorageUnavailable)
    }

    async fn upsert_impl_conn(
        conn: &mut sqlx::PgConnection,
        row: BudgetRow,
    ) -> Result<BudgetRow, BudgetRepositoryError> {
        sqlx::query_as::<_, BudgetRow>(&format!(
            "INSERT INTO budgets ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (business_id) DO UPDATE SET \
               cap_minor = EXCLUDED.cap_minor, \
               currency = EXCLUDED.currency, \
               period = EXCLUDED.period, \
               reset_enabled = EXCLUDED.reset_enabled, \
               updated_at = EXCLUDED.updated_at \
             RETURNING {COLUMNS}"
        ))
        .bind(row.business_id)
        .bind(row.cap_minor)
        .bind(row.used_minor)
        .bind(row.currency)
        .bind(row.period)
        .bind(row.reset_enabled)
        .bind(row.updated_at)
        .fetch_one(conn)
        .await
        .map_err(|_| BudgetRepositoryError::StorageUnavailable)
    }

    // The row update is the arbiter under concurrency: two competing
    // allocations serialize on the row lock and the second re-evaluates
    // the cap predicate against the committed counter.
    async fn allocate_impl_conn(
        conn: &mut sqlx::PgConnection,
        business_id: Uuid,
        amount_minor: i64,
        currency: String,
        now: OffsetDateTime,
    ) -> Result<Option<BudgetRow>, BudgetRepositoryError> {
        sqlx::query_as::<_, BudgetRow>(&format!(
            "UPDATE budgets SET used_minor = used_minor + $2, updated_at = $4 \
             WHERE business_id = $1 AND currency = $3 AND used_minor + $2 < cap_minor \
             RETURNING {COLUMNS}"
        ))
        .bind(business_id)
        .bind(amount_minor)
        .bind(currency)
        .bind(now)
        .fetch_optional(conn)
        .await
        .map_err(|_| BudgetRepositoryError::StorageUnavailable)
    }

    async fn release_impl_conn(
        conn: &mut sqlx::PgConnection,
        business_id: Uuid,
        amount_minor: i64,
        now: OffsetDateTime,
    ) -> Result<Option<BudgetRow>, BudgetRepositoryError> {
        sqlx::query_as::<_, BudgetRow>(&format!(
            "UPDATE budgets SET used_minor = GREATEST(used_minor - $2, 0), updated_at = $3 \
             WHERE business_id = $1 \
             RETURNING {COLUMNS}"
        ))
        .bind(business_id)
        .bind(amount_minor)
        .bind(now)
        .fetch_optional(conn)
        .await
        .map_err(|_| BudgetRepositoryError::StorageUnavailable)
    }
}

#[async_trait]
impl BudgetStore for BudgetStorePostgres {
    async fn get(&self, business_id: Uuid) -> Result<Option<BudgetRow>, BudgetRepositoryError> {
        self.db
            .with_conn(move |conn| {
                Box::pin(async move { Self::get_impl_conn(conn, business_id).await })
            })
            .await
    }

    async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        business_id: Uuid,
    ) -> Result<Option<BudgetRow>, BudgetRepositoryError> {
        Self::get_impl_conn(&mut *tx, business_id).await
    }

    async fn upsert(&self, row: BudgetRow) -> Result<BudgetRow, BudgetRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(async move { Self::upsert_impl_conn(conn, row).await }))
            .await
    }

    async fn allocate_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        business_id: Uuid,
        amount_minor: i64,
        currency: String,
        now: OffsetDateTime,
    ) -> Result<Option<BudgetRow>, BudgetRepositoryError> {
        Self::allocate_impl_conn(&mut *tx, business_id, amount_minor, currency, now).await
    }

    async fn release_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        business_id: Uuid,
        amount_minor: i64,
        now: OffsetDateTime,
    ) -> Result<Option<BudgetRow>, BudgetRepositoryError> {
        Self::release_impl_conn(&mut *tx, business_id, amount_minor, now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::dto::actor::ActorRow;

    fn test_db_url() -> Option<String> {
        std::env::var("DATABASE_URL").ok()
    }

    async fn connect() -> Option<Arc<PostgresDatabase>> {
        let url = test_db_url()?;
        let db = PostgresDatabase::connect(&url, 5).await.unwrap();
        db.migrate().await.unwrap();
        Some(Arc::new(db))
    }

    async fn seed_business(db: &Arc<PostgresDatabase>) -> Uuid {
        let id = Uuid::new_v4();
        let row = ActorRow {
            id,
            display_name: "Budget test business".to_string(),
            role: "business".to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        db.with_conn(move |conn| {
            Box::pin(async move {
                sqlx::query(
                    "INSERT INTO actors (id, display_name, role, created_at) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(row.id)
                .bind(row.display_name)
                .bind(row.role)
                .bind(row.created_at)
                .execute(conn)
                .await
                .map_err(|_| BudgetRepositoryError::StorageUnavailable)?;
                Ok::<(), BudgetRepositoryError>(())
            })
        })
        .await
        .unwrap();
        id
    }

    fn budget_row(business_id: Uuid, cap_minor: i64, used_minor: i64) -> BudgetRow {
        BudgetRow {
            business_id,
            cap_minor,
            used_minor,
            currency: "usd".to_string(),
            period: "monthly".to_string(),
            reset_enabled: false,
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn given_room_below_cap_when_allocate_should_reserve() {
        let Some(db) = connect().await else {
            return;
        };
        let business_id = seed_business(&db).await;
        let store = BudgetStorePostgres::new(db.clone());
        store.upsert(budget_row(business_id, 100, 40)).await.unwrap();

        let updated = db
            .with_tx(|tx| {
                let store = BudgetStorePostgres::new(db.clone());
                Box::pin(async move {
                    store
                        .allocate_tx(tx, business_id, 50, "usd".to_string(), OffsetDateTime::now_utc())
                        .await
                })
            })
            .await
            .unwrap();

        assert_eq!(updated.map(|row| row.used_minor), Some(90));
    }

    #[tokio::test]
    async fn given_allocation_reaching_cap_when_allocate_should_refuse() {
        let Some(db) = connect().await else {
            return;
        };
        let business_id = seed_business(&db).await;
        let store = BudgetStorePostgres::new(db.clone());
        store.upsert(budget_row(business_id, 100, 40)).await.unwrap();

        let updated = db
            .with_tx(|tx| {
                let store = BudgetStorePostgres::new(db.clone());
                Box::pin(async move {
                    store
                        .allocate_tx(tx, business_id, 60, "usd".to_string(), OffsetDateTime::now_utc())
                        .await
                })
            })
            .await
            .unwrap();

        assert!(updated.is_none());
        let after = store.get(business_id).await.unwrap().unwrap();
        assert_eq!(after.used_minor, 40);
    }

    #[tokio::test]
    async fn given_reconfigure_when_upsert_should_preserve_used_counter() {
        let Some(db) = connect().await else {
            return;
        };
        let business_id = seed_business(&db).await;
        let store = BudgetStorePostgres::new(db.clone());
        store.upsert(budget_row(business_id, 100, 40)).await.unwrap();

        let updated = store.upsert(budget_row(business_id, 500, 0)).await.unwrap();

        assert_eq!(updated.cap_minor, 500);
        assert_eq!(updated.used_minor, 40);
    }
}
