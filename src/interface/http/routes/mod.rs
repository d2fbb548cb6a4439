pub mod actor;
pub mod approval;
pub mod budget;
pub mod contract;
pub mod event;
pub mod health;
pub mod metrics;
pub mod milestone;
pub mod ready;
pub mod stats;
pub mod submission;
pub mod webhook;
pub mod work_request;
