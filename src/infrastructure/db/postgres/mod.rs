mod database;

pub mod actor_store_postgres;
pub mod api_key_store_postgres;
pub mod budget_store_postgres;
pub mod contract_store_postgres;
pub mod event_store_postgres;
pub mod idempotency_key_store_postgres;
pub mod milestone_store_postgres;
pub mod payment_attempt_store_postgres;
pub mod payment_store_postgres;
pub mod submission_store_postgres;
pub mod webhook_delivery_store_postgres;
pub mod webhook_store_postgres;
pub mod work_request_store_postgres;

pub use database::PostgresDatabase;
