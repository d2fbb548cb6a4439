use std::sync::Arc;

use crate::infrastructure::db::database::{Database, DatabaseError};
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::postgres::actor_store_postgres::ActorStorePostgres;
use crate::infrastructure::db::postgres::api_key_store_postgres::ApiKeyStorePostgres;
use crate::infrastructure::db::postgres::budget_store_postgres::BudgetStorePostgres;
use crate::infrastructure::db::postgres::contract_store_postgres::ContractStorePostgres;
use crate::infrastructure::db::postgres::event_store_postgres::EventStorePostgres;
use crate::infrastructure::db::postgres::idempotency_key_store_postgres::IdempotencyKeyStorePostgres;
use crate::infrastructure::db::postgres::milestone_store_postgres::MilestoneStorePostgres;
use crate::infrastructure::db::postgres::payment_attempt_store_postgres::PaymentAttemptStorePostgres;
use crate::infrastructure::db::postgres::payment_store_postgres::PaymentStorePostgres;
use crate::infrastructure::db::postgres::submission_store_postgres::SubmissionStorePostgres;
use crate::infrastructure::db::postgres::webhook_delivery_store_postgres::WebhookDeliveryStorePostgres;
use crate::infrastructure::db::postgres::webhook_store_postgres::WebhookStorePostgres;
use crate::infrastructure::db::postgres::work_request_store_postgres::WorkRequestStorePostgres;
use crate::infrastructure::db::repositories::actor_repository::ActorRepository;
use crate::infrastructure::db::repositories::api_key_repository::ApiKeyRepository;
use crate::infrastructure::db::repositories::budget_repository::BudgetRepository;
use crate::infrastructure::db::repositories::contract_repository::ContractRepository;
use crate::infrastructure::db::repositories::event_repository::EventRepository;
use crate::infrastructure::db::repositories::idempotency_key_repository::IdempotencyKeyRepository;
use crate::infrastructure::db::repositories::milestone_repository::MilestoneRepository;
use crate::infrastructure::db::repositories::payment_attempt_repository::PaymentAttemptRepository;
use crate::infrastructure::db::repositories::payment_repository::PaymentRepository;
use crate::infrastructure::db::repositories::submission_repository::SubmissionRepository;
use crate::infrastructure::db::repositories::webhook_delivery_repository::WebhookDeliveryRepository;
use crate::infrastructure::db::repositories::webhook_repository::WebhookRepository;
use crate::infrastructure::db::repositories::work_request_repository::WorkRequestRepository;
use std::future::Future;
use std::pin::Pin;

#[derive(Clone)]
pub struct Repositories {
    pub tx: Option<Arc<PostgresDatabase>>,
    pub actor: Arc<ActorRepository>,
    pub api_key: Arc<ApiKeyRepository>,
    pub budget: Arc<BudgetRepository>,
    pub work_request: Arc<WorkRequestRepository>,
    pub submission: Arc<SubmissionRepository>,
    pub contract: Arc<ContractRepository>,
    pub milestone: Arc<MilestoneRepository>,
    pub payment: Arc<PaymentRepository>,
    pub payment_attempt: Arc<PaymentAttemptRepository>,
    pub event: Arc<EventRepository>,
    pub webhook: Arc<WebhookRepository>,
    pub webhook_delivery: Arc<WebhookDeliveryRepository>,
    pub idempotency: Arc<IdempotencyKeyRepository>,
}

impl Repositories {
    /// Build all repositories backed by Postgres stores.
    pub fn postgres(db: Arc<PostgresDatabase>) -> Self {
        let actor_store = Arc::new(ActorStorePostgres::new(db.clone()));
        let api_key_store = Arc::new(ApiKeyStorePostgres::new(db.clone()));
        let budget_store = Arc::new(BudgetStorePostgres::new(db.clone()));
        let work_request_store = Arc::new(WorkRequestStorePostgres::new(db.clone()));
        let submission_store = Arc::new(SubmissionStorePostgres::new(db.clone()));
        let contract_store = Arc::new(ContractStorePostgres::new(db.clone()));
        let milestone_store = Arc::new(MilestoneStorePostgres::new(db.clone()));
        let payment_store = Arc::new(PaymentStorePostgres::new(db.clone()));
        let attempt_store = Arc::new(PaymentAttemptStorePostgres::new(db.clone()));
        let event_store = Arc::new(EventStorePostgres::new(db.clone()));
        let webhook_store = Arc::new(WebhookStorePostgres::new(db.clone()));
        let delivery_store = Arc::new(WebhookDeliveryStorePostgres::new(db.clone()));
        let id_store = Arc::new(IdempotencyKeyStorePostgres::new(db.clone()));

        Self {
            tx: Some(db.clone()),
            actor: Arc::new(ActorRepository::new(actor_store)),
            api_key: Arc::new(ApiKeyRepository::new(api_key_store)),
            budget: Arc::new(BudgetRepository::new(budget_store)),
            work_request: Arc::new(WorkRequestRepository::new(work_request_store)),
            submission: Arc::new(SubmissionRepository::new(submission_store)),
            contract: Arc::new(ContractRepository::new(contract_store)),
            milestone: Arc::new(MilestoneRepository::new(milestone_store)),
            payment: Arc::new(PaymentRepository::new(payment_store)),
            payment_attempt: Arc::new(PaymentAttemptRepository::new(attempt_store)),
            event: Arc::new(EventRepository::new(event_store)),
            webhook: Arc::new(WebhookRepository::new(webhook_store)),
            webhook_delivery: Arc::new(WebhookDeliveryRepository::new(delivery_store)),
            idempotency: Arc::new(IdempotencyKeyRepository::new(id_store)),
        }
    }

    /// Run multiple repository operations inside a single transaction.
    pub async fn with_tx<T, E, F>(&self, f: F) -> Result<T, E>
    where
        for<'c> F: FnOnce(
            &'c mut sqlx::Transaction<'_, sqlx::Postgres>,
        ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>,
        E: From<DatabaseError>,
    {
        let Some(db) = self.tx.as_ref() else {
            return Err(DatabaseError::Connection("tx_unavailable".to_string()).into());
        };
        db.with_tx(f).await
    }

    /// Execute a raw SQL statement outside a transaction.
    pub async fn execute(&self, query: &str) -> Result<u64, DatabaseError> {
        let Some(db) = self.tx.as_ref() else {
            return Err(DatabaseError::Connection("db_unavailable".to_string()));
        };
        db.execute(query).await
    }
}
