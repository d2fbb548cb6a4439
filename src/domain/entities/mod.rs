pub mod actor;
pub mod api_key;
pub mod budget;
pub mod contract;
pub mod event;
pub mod milestone;
pub mod payment;
pub mod submission;
pub mod webhook;
pub mod work_request;
