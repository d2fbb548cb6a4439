pub mod accept_work_request;
pub mod approve_milestone;
pub mod begin_approval;
pub mod configure_budget;
pub mod create_contract;
pub mod create_work_request;
pub mod decline_work_request;
pub mod deliver_webhooks;
pub mod disburse_payments;
pub mod finalize_approval;
pub mod get_budget;
pub mod get_business_stats;
pub mod get_latest_submission;
pub mod get_milestone;
pub mod get_work_request;
pub mod list_events;
pub mod list_webhooks;
pub mod list_work_requests;
pub mod reconcile_payments;
pub mod register_actor;
pub mod register_webhook;
pub mod reject_milestone;
pub mod review_submission;
pub mod submit_deliverable;
pub mod submit_milestone;
pub mod unregister_webhook;
