pub mod actor_repository;
pub mod api_key_repository;
pub mod budget_repository;
pub mod contract_repository;
pub mod event_repository;
pub mod factory;
pub mod idempotency_key_repository;
pub mod milestone_repository;
pub mod payment_attempt_repository;
pub mod payment_repository;
pub mod submission_repository;
pub mod webhook_delivery_repository;
pub mod webhook_repository;
pub mod work_request_repository;

pub use factory::Repositories;
