use crate::domain::entities::work_request::{WorkRequest, WorkRequestStatus};
use crate::domain::value_objects::ids::{ActorId, WorkRequestId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::dto::work_request::WorkRequestRow;
use crate::infrastructure::db::stores::work_request_store::{
    WorkRequestRepositoryError, WorkRequestStore,
};
use std::sync::Arc;

pub struct WorkRequestRepository {
    store: Arc<dyn WorkRequestStore>,
}

impl WorkRequestRepository {
    pub fn new(store: Arc<dyn WorkRequestStore>) -> Self {
        Self { store }
    }

    pub async fn get(
        &self,
        id: WorkRequestId,
    ) -> Result<Option<WorkRequest>, WorkRequestRepositoryError> {
        let row = self.store.get(id.0).await?;
        Ok(row.map(WorkRequestRow::into_work_request))
    }

    pub async fn get_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: WorkRequestId,
    ) -> Result<Option<WorkRequest>, WorkRequestRepositoryError> {
        let row = self.store.get_tx(tx, id.0).await?;
        Ok(row.map(WorkRequestRow::into_work_request))
    }

    pub async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        work_request: &WorkRequest,
    ) -> Result<(), WorkRequestRepositoryError> {
        self.store
            .insert_tx(tx, WorkRequestRow::from_work_request(work_request))
            .await
    }

    /// Conditional transition. Returns the updated row only when the stored
    /// status still matched `expected`; `None` means another writer got there
    /// first and the caller should re-read.
    pub async fn transition_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: WorkRequestId,
        expected: WorkRequestStatus,
        next: WorkRequestStatus,
        review_notes: Option<String>,
        now: Timestamp,
    ) -> Result<Option<WorkRequest>, WorkRequestRepositoryError> {
        let row = self
            .store
            .transition_tx(
                tx,
                id.0,
                expected.as_str().to_string(),
                next.as_str().to_string(),
                review_notes,
                now.into_inner(),
            )
            .await?;
        Ok(row.map(WorkRequestRow::into_work_request))
    }

    pub async fn list_for_business(
        &self,
        business_id: ActorId,
        status: Option<WorkRequestStatus>,
    ) -> Result<Vec<WorkRequest>, WorkRequestRepositoryError> {
        let rows = self
            .store
            .list_for_business(business_id.0, status.map(|s| s.as_str().to_string()))
            .await?;
        Ok(rows
            .into_iter()
            .map(WorkRequestRow::into_work_request)
            .collect())
    }

    pub async fn list_for_contractor(
        &self,
        contractor_id: ActorId,
        status: Option<WorkRequestStatus>,
    ) -> Result<Vec<WorkRequest>, WorkRequestRepositoryError> {
        let rows = self
            .store
            .list_for_contractor(contractor_id.0, status.map(|s| s.as_str().to_string()))
            .await?;
        Ok(rows
            .into_iter()
            .map(WorkRequestRow::into_work_request)
            .collect())
    }

    pub async fn status_counts_for_business(
        &self,
        business_id: ActorId,
    ) -> Result<Vec<(WorkRequestStatus, i64)>, WorkRequestRepositoryError> {
        let counts = self.store.status_counts_for_business(business_id.0).await?;
        Ok(counts
            .into_iter()
            .filter_map(|(status, count)| WorkRequestStatus::parse(&status).map(|s| (s, count)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::money::{Currency, Money};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct DummyWorkRequestStore {
        row: Mutex<Option<WorkRequestRow>>,
    }

    impl DummyWorkRequestStore {
        fn holding(row: WorkRequestRow) -> Self {
            Self {
                row: Mutex::new(Some(row)),
            }
        }
    }

    #[async_trait]
    impl WorkRequestStore for DummyWorkRequestStore {
        async fn get(
            &self,
            _id: uuid::Uuid,
        ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError> {
            Ok(self.row.lock().unwrap().clone())
        }

        async fn get_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: uuid::Uuid,
        ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError> {
            Ok(self.row.lock().unwrap().clone())
        }

        async fn insert_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            row: WorkRequestRow,
        ) -> Result<(), WorkRequestRepositoryError> {
            *self.row.lock().unwrap() = Some(row);
            Ok(())
        }

        async fn transition_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: uuid::Uuid,
            expected_status: String,
            next_status: String,
            review_notes: Option<String>,
            now: time::OffsetDateTime,
        ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError> {
            let mut guard = self.row.lock().unwrap();
            match guard.as_mut() {
                Some(row) if row.status == expected_status => {
                    row.status = next_status;
                    if review_notes.is_some() {
                        row.review_notes = review_notes;
                    }
                    row.updated_at = now;
                    Ok(Some(row.clone()))
                }
                _ => Ok(None),
            }
        }

        async fn list_for_business(
            &self,
            _business_id: uuid::Uuid,
            _status: Option<String>,
        ) -> Result<Vec<WorkRequestRow>, WorkRequestRepositoryError> {
            Ok(self.row.lock().unwrap().clone().into_iter().collect())
        }

        async fn list_for_contractor(
            &self,
            _contractor_id: uuid::Uuid,
            _status: Option<String>,
        ) -> Result<Vec<WorkRequestRow>, WorkRequestRepositoryError> {
            Ok(self.row.lock().unwrap().clone().into_iter().collect())
        }

        async fn status_counts_for_business(
            &self,
            _business_id: uuid::Uuid,
        ) -> Result<Vec<(String, i64)>, WorkRequestRepositoryError> {
            Ok(vec![
                ("pending".to_string(), 2),
                ("bogus".to_string(), 1),
                ("paid".to_string(), 4),
            ])
        }
    }

    fn sample_row() -> WorkRequestRow {
        let work_request = WorkRequest::new(
            WorkRequestId::new(),
            crate::domain::value_objects::ids::ProjectId::new(),
            ActorId::new(),
            ActorId::new(),
            "Landing page copy".to_string(),
            "Rewrite the hero and pricing sections".to_string(),
            "Markdown file with final copy".to_string(),
            Money::new(25_000, Currency::Usd),
            None,
        )
        .unwrap();
        WorkRequestRow::from_work_request(&work_request)
    }

    #[tokio::test]
    async fn given_stored_row_when_getting_then_should_map_to_entity() {
        let row = sample_row();
        let id = WorkRequestId(row.id);
        let store = Arc::new(DummyWorkRequestStore::holding(row));
        let repository = WorkRequestRepository::new(store);

        let current = repository.get(id).await.unwrap().unwrap();

        assert_eq!(current.id, id);
        assert_eq!(current.status, WorkRequestStatus::Pending);
        assert_eq!(current.amount, Money::new(25_000, Currency::Usd));
    }

    #[tokio::test]
    async fn given_unknown_status_rows_when_counting_then_should_drop_them() {
        let store = Arc::new(DummyWorkRequestStore::holding(sample_row()));
        let repository = WorkRequestRepository::new(store);

        let counts = repository
            .status_counts_for_business(ActorId::new())
            .await
            .unwrap();

        assert_eq!(
            counts,
            vec![
                (WorkRequestStatus::Pending, 2),
                (WorkRequestStatus::Paid, 4),
            ]
        );
    }
}
