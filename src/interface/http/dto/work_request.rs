use serde::{Deserialize, Serialize};

use crate::domain::entities::submission::Submission;
use crate::domain::entities::work_request::WorkRequest;

use super::payment::PaymentResponse;
use super::{rfc3339, rfc3339_opt};

#[derive(Debug, Deserialize)]
pub struct CreateWorkRequestRequest {
    pub project_id: String,
    pub contractor_id: String,
    pub title: String,
    pub description: String,
    pub deliverable_description: String,
    pub amount_minor: i64,
    pub currency: String,
    pub due_date: Option<String>,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkRequestResponse {
    pub work_request_id: String,
    pub project_id: String,
    pub business_id: String,
    pub contractor_id: String,
    pub title: String,
    pub description: String,
    pub deliverable_description: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declined_at: Option<String>,
}

impl WorkRequestResponse {
    pub fn from_entity(work_request: &WorkRequest) -> Self {
        Self {
            work_request_id: work_request.id.0.to_string(),
            project_id: work_request.project_id.0.to_string(),
            business_id: work_request.business_id.0.to_string(),
            contractor_id: work_request.contractor_id.0.to_string(),
            title: work_request.title.clone(),
            description: work_request.description.clone(),
            deliverable_description: work_request.deliverable_description.clone(),
            amount_minor: work_request.amount.amount_minor,
            currency: work_request.amount.currency.as_str().to_string(),
            status: work_request.status.as_str().to_string(),
            review_notes: work_request.review_notes.clone(),
            due_date: rfc3339_opt(work_request.due_date),
            created_at: rfc3339(work_request.created_at),
            updated_at: rfc3339(work_request.updated_at),
            accepted_at: rfc3339_opt(work_request.accepted_at),
            declined_at: rfc3339_opt(work_request.declined_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkRequestViewResponse {
    pub work_request: WorkRequestResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_submission: Option<SubmissionResponse>,
    /// The actions the calling party may take from the current status.
    pub allowed_actions: Vec<String>,
    pub overdue: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListWorkRequestsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkRequestListResponse {
    pub work_requests: Vec<WorkRequestResponse>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitDeliverableRequest {
    /// "digital" or "physical".
    pub kind: String,
    pub artifact_url: Option<String>,
    pub deliverable_files: Option<Vec<String>>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub submission_id: String,
    pub work_request_id: String,
    pub submitted_by: String,
    pub version: i32,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_url: Option<String>,
    pub deliverable_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    pub submitted_at: String,
    pub updated_at: String,
}

impl SubmissionResponse {
    pub fn from_entity(submission: &Submission) -> Self {
        Self {
            submission_id: submission.id.0.to_string(),
            work_request_id: submission.work_request_id.0.to_string(),
            submitted_by: submission.submitted_by.0.to_string(),
            version: submission.version,
            kind: submission.kind.as_str().to_string(),
            artifact_url: submission.artifact_url.clone(),
            deliverable_files: submission.deliverable_files.clone(),
            description: submission.description.clone(),
            notes: submission.notes.clone(),
            status: submission.status.as_str().to_string(),
            review_notes: submission.review_notes.clone(),
            submitted_at: rfc3339(submission.submitted_at),
            updated_at: rfc3339(submission.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmittedDeliverableResponse {
    pub work_request: WorkRequestResponse,
    pub submission: SubmissionResponse,
}

#[derive(Debug, Deserialize)]
pub struct ReviewSubmissionRequest {
    /// "reject" or "request_changes".
    pub action: String,
    pub review_notes: Option<String>,
    /// The version the reviewer looked at; a stale one is refused.
    pub version: i32,
}

#[derive(Debug, Deserialize)]
pub struct BeginApprovalRequest {
    /// The version the reviewer looked at; a stale one is refused.
    pub version: i32,
}

#[derive(Debug, Serialize)]
pub struct BeginApprovalResponse {
    pub attempt_id: String,
    pub payment_intent_id: String,
    /// Handed to the client's payment element to confirm the charge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    /// True when an open attempt was resumed instead of charged anew.
    pub resumed: bool,
}

#[derive(Debug, Deserialize)]
pub struct FinalizeApprovalRequest {
    pub payment_intent_id: String,
    pub review_notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FinalizedApprovalResponse {
    pub work_request: WorkRequestResponse,
    pub payment: PaymentResponse,
    /// True when an earlier finalize already answered this intent.
    pub replayed: bool,
}
