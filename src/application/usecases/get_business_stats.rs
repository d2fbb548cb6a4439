// Use case: get_business_stats.

use crate::application::context::AppContext;
use crate::domain::entities::work_request::WorkRequestStatus;
use crate::domain::value_objects::ids::ActorId;

/// Dashboard counters for a business, computed from the store on every
/// call so a fresh read follows any committed transition immediately.
pub struct GetBusinessStatsUseCase;

#[derive(Debug)]
pub enum GetBusinessStatsError {
    Forbidden,
    Storage(String),
}

#[derive(Debug, PartialEq, Eq)]
pub struct BusinessStats {
    pub status_counts: Vec<(WorkRequestStatus, i64)>,
    /// Submitted work awaiting a review decision.
    pub open_review: i64,
    /// Approved work whose payout has not been transferred yet.
    pub awaiting_payment: i64,
    pub total: i64,
}

impl GetBusinessStatsUseCase {
    pub async fn execute(
        ctx: &AppContext,
        business_id: ActorId,
        caller: ActorId,
    ) -> Result<BusinessStats, GetBusinessStatsError> {
        if caller != business_id {
            return Err(GetBusinessStatsError::Forbidden);
        }

        let status_counts = ctx
            .repos
            .work_request
            .status_counts_for_business(business_id)
            .await
            .map_err(|e| GetBusinessStatsError::Storage(format!("{e:?}")))?;

        let count_of = |status: WorkRequestStatus| {
            status_counts
                .iter()
                .find(|(s, _)| *s == status)
                .map(|(_, count)| *count)
                .unwrap_or(0)
        };
        let open_review = count_of(WorkRequestStatus::Submitted);
        let awaiting_payment = count_of(WorkRequestStatus::Approved);
        let total = status_counts.iter().map(|(_, count)| count).sum();

        Ok(BusinessStats {
            status_counts,
            open_review,
            awaiting_payment,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{GetBusinessStatsError, GetBusinessStatsUseCase};
    use crate::application::context::test_support::test_context;
    use crate::application::context::AppContext;
    use crate::domain::entities::work_request::WorkRequestStatus;
    use crate::domain::value_objects::ids::ActorId;
    use crate::infrastructure::db::dto::work_request::WorkRequestRow;
    use crate::infrastructure::db::repositories::work_request_repository::WorkRequestRepository;
    use crate::infrastructure::db::stores::work_request_store::{
        WorkRequestRepositoryError, WorkRequestStore,
    };
    use async_trait::async_trait;
    use std::sync::Arc;
    use time::OffsetDateTime;
    use uuid::Uuid;

    struct DummyWorkRequestStore {
        counts: Vec<(String, i64)>,
    }

    #[async_trait]
    impl WorkRequestStore for DummyWorkRequestStore {
        async fn get(
            &self,
            _id: Uuid,
        ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError> {
            Ok(None)
        }

        async fn get_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: Uuid,
        ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError> {
            Err(WorkRequestRepositoryError::StorageUnavailable)
        }

        async fn insert_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _row: WorkRequestRow,
        ) -> Result<(), WorkRequestRepositoryError> {
            Err(WorkRequestRepositoryError::StorageUnavailable)
        }

        async fn transition_tx(
            &self,
            _tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
            _id: Uuid,
            _expected_status: String,
            _next_status: String,
            _review_notes: Option<String>,
            _now: OffsetDateTime,
        ) -> Result<Option<WorkRequestRow>, WorkRequestRepositoryError> {
            Err(WorkRequestRepositoryError::StorageUnavailable)
        }

        async fn list_for_business(
            &self,
            _business_id: Uuid,
            _status: Option<String>,
        ) -> Result<Vec<WorkRequestRow>, WorkRequestRepositoryError> {
            Ok(Vec::new())
        }

        async fn list_for_contractor(
            &self,
            _contractor_id: Uuid,
            _status: Option<String>,
        ) -> Result<Vec<WorkRequestRow>, WorkRequestRepositoryError> {
            Ok(Vec::new())
        }

        async fn status_counts_for_business(
            &self,
            _business_id: Uuid,
        ) -> Result<Vec<(String, i64)>, WorkRequestRepositoryError> {
            Ok(self.counts.clone())
        }
    }

    fn context_with(counts: Vec<(String, i64)>) -> AppContext {
        let mut ctx = test_context();
        ctx.repos.work_request = Arc::new(WorkRequestRepository::new(Arc::new(
            DummyWorkRequestStore { counts },
        )));
        ctx
    }

    #[tokio::test]
    async fn given_mixed_statuses_when_computing_should_derive_review_and_payment_totals() {
        let ctx = context_with(vec![
            ("pending".to_string(), 3),
            ("submitted".to_string(), 2),
            ("approved".to_string(), 1),
            ("paid".to_string(), 5),
        ]);
        let business_id = ActorId::new();

        let stats = GetBusinessStatsUseCase::execute(&ctx, business_id, business_id)
            .await
            .expect("stats should be computed");

        assert_eq!(stats.open_review, 2);
        assert_eq!(stats.awaiting_payment, 1);
        assert_eq!(stats.total, 11);
        assert!(stats
            .status_counts
            .contains(&(WorkRequestStatus::Paid, 5)));
    }

    #[tokio::test]
    async fn given_no_work_requests_when_computing_should_zero_everything() {
        let ctx = context_with(Vec::new());
        let business_id = ActorId::new();

        let stats = GetBusinessStatsUseCase::execute(&ctx, business_id, business_id)
            .await
            .expect("stats should be computed");

        assert_eq!(stats.open_review, 0);
        assert_eq!(stats.awaiting_payment, 0);
        assert_eq!(stats.total, 0);
        assert!(stats.status_counts.is_empty());
    }

    #[tokio::test]
    async fn given_other_caller_when_computing_should_be_forbidden() {
        let ctx = context_with(Vec::new());

        let result = GetBusinessStatsUseCase::execute(&ctx, ActorId::new(), ActorId::new()).await;

        match result {
            Err(GetBusinessStatsError::Forbidden) => {}
            other => panic!("expected forbidden, got {other:?}"),
        }
    }
}
