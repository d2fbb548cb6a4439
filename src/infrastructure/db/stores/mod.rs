pub mod actor_store;
pub mod api_key_store;
pub mod budget_store;
pub mod contract_store;
pub mod event_store;
pub mod idempotency_key_store;
pub mod milestone_store;
pub mod payment_attempt_store;
pub mod payment_store;
pub mod submission_store;
pub mod webhook_delivery_store;
pub mod webhook_store;
pub mod work_request_store;
