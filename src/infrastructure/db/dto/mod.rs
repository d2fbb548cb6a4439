pub mod actor;
pub mod api_key;
pub mod budget;
pub mod contract;
pub mod event;
pub mod idempotency_key;
pub mod milestone;
pub mod payment;
pub mod payment_attempt;
pub mod submission;
pub mod webhook;
pub mod webhook_delivery;
pub mod work_request;
