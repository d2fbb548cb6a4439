use crate::domain::entities::submission::{Submission, SubmissionStatus};
use crate::domain::value_objects::ids::{SubmissionId, WorkRequestId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::dto::submission::SubmissionRow;
use crate::infrastructure::db::stores::submission_store::{
    SubmissionRepositoryError, SubmissionStore,
};
use std::sync::Arc;

pub struct SubmissionRepository {
    store: Arc<dyn SubmissionStore>,
}

impl SubmissionRepository {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self { store }
    }

    pub async fn latest_for_work_request(
        &self,
        work_request_id: WorkRequestId,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        let row = self
            .store
            .latest_for_work_request(work_request_id.0)
            .await?;
        Ok(row.map(SubmissionRow::into_submission))
    }

    pub async fn latest_for_work_request_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        work_request_id: WorkRequestId,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        let row = self
            .store
            .latest_for_work_request_tx(tx, work_request_id.0)
            .await?;
        Ok(row.map(SubmissionRow::into_submission))
    }

    pub async fn list_for_work_request(
        &self,
        work_request_id: WorkRequestId,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        let rows = self.store.list_for_work_request(work_request_id.0).await?;
        Ok(rows.into_iter().map(SubmissionRow::into_submission).collect())
    }

    pub async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        submission: &Submission,
    ) -> Result<(), SubmissionRepositoryError> {
        self.store
            .insert_tx(tx, SubmissionRow::from_submission(submission))
            .await
    }

    pub async fn update_status_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: SubmissionId,
        expected: SubmissionStatus,
        next: SubmissionStatus,
        review_notes: Option<String>,
        now: Timestamp,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        let row = self
            .store
            .update_status_tx(
                tx,
                id.0,
                expected.as_str().to_string(),
                next.as_str().to_string(),
                review_notes,
                now.into_inner(),
            )
            .await?;
        Ok(row.map(SubmissionRow::into_submission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::submission::SubmissionKind;
    use crate::domain::value_objects::ids::ActorId;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use time::OffsetDateTime;
    use uuid::Uuid;

    struct DummySubmissionStore {
        latest: Mutex<Option<SubmissionRow>>,
    }

    #[async_trait]
    impl SubmissionStore for DummySubmissionStore {
        async fn latest_for_work_request(
            &self,
            _work_request_id: Uuid,
        ) -> Result<Option<SubmissionRow>, SubmissionRepositoryError> {
            Ok(self.latest.lock().unwrap().clone())
        }

        async fn latest_for_work_request_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _work_request_id: Uuid,
        ) -> Result<Option<SubmissionRow>, SubmissionRepositoryError> {
            Ok(self.latest.lock().unwrap().clone())
        }

        async fn list_for_work_request(
            &self,
            _work_request_id: Uuid,
        ) -> Result<Vec<SubmissionRow>, SubmissionRepositoryError> {
            Ok(self.latest.lock().unwrap().clone().into_iter().collect())
        }

        async fn insert_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            row: SubmissionRow,
        ) -> Result<(), SubmissionRepositoryError> {
            *self.latest.lock().unwrap() = Some(row);
            Ok(())
        }

        async fn update_status_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: Uuid,
            _expected_status: String,
            _next_status: String,
            _review_notes: Option<String>,
            _now: OffsetDateTime,
        ) -> Result<Option<SubmissionRow>, SubmissionRepositoryError> {
            Err(SubmissionRepositoryError::StorageUnavailable)
        }
    }

    #[tokio::test]
    async fn given_stored_row_when_latest_should_map_to_submission() {
        let submission = Submission::new(
            SubmissionId::new(),
            WorkRequestId::new(),
            ActorId::new(),
            1,
            SubmissionKind::Digital,
            Some("https://files.example.com/v1.zip".to_string()),
            vec![],
            None,
            None,
        )
        .expect("submission should be valid");
        let store = DummySubmissionStore {
            latest: Mutex::new(Some(SubmissionRow::from_submission(&submission))),
        };
        let repository = SubmissionRepository::new(Arc::new(store));

        let result = repository
            .latest_for_work_request(submission.work_request_id)
            .await
            .unwrap();

        assert_eq!(result, Some(submission));
    }
}
