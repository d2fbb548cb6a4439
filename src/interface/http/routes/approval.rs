// HTTP routes: two-phase approval with payment capture.

use crate::application::usecases::begin_approval::{
    BeginApprovalCommand, BeginApprovalError, BeginApprovalUseCase,
};
use crate::application::usecases::finalize_approval::{
    FinalizeApprovalCommand, FinalizeApprovalError, FinalizeApprovalUseCase,
};
use crate::domain::value_objects::ids::{SubmissionId, WorkRequestId};
use crate::interface::http::auth::AuthenticatedActor;
use crate::interface::http::dto::payment::PaymentResponse;
use crate::interface::http::dto::work_request::{
    BeginApprovalRequest, BeginApprovalResponse, FinalizeApprovalRequest,
    FinalizedApprovalResponse, WorkRequestResponse,
};
use crate::interface::http::problem::{
    WPY_AUTH_FORBIDDEN, WPY_INTERNAL, WPY_NOT_FOUND, WPY_PAYMENT_RECONCILIATION,
    WPY_REQUEST_MALFORMED, WPY_STALE_SUBMISSION, WPY_STATE_CONFLICT, WPY_STORAGE_DB_ERROR,
    payment_declined, problem,
};
use crate::interface::http::state::AppState;
use crate::interface::http::trace::TraceId;
use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;

/// Builds approval routes.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/work-requests/:work_request_id/submissions/:submission_id/approve",
            post(begin_approval),
        )
        .route(
            "/work-requests/:work_request_id/submissions/:submission_id/approve-after-payment",
            post(finalize_approval),
        )
}

fn parse_ids(
    work_request_id: &str,
    submission_id: &str,
    trace_id: &Option<String>,
) -> Result<(WorkRequestId, SubmissionId), Response> {
    let work_request_id = uuid::Uuid::parse_str(work_request_id)
        .map(WorkRequestId)
        .map_err(|_| {
            problem(
                StatusCode::BAD_REQUEST,
                WPY_REQUEST_MALFORMED,
                Some("invalid work_request_id".to_string()),
                None,
                trace_id.clone(),
            )
        })?;
    let submission_id = uuid::Uuid::parse_str(submission_id)
        .map(SubmissionId)
        .map_err(|_| {
            problem(
                StatusCode::BAD_REQUEST,
                WPY_REQUEST_MALFORMED,
                Some("invalid submission_id".to_string()),
                None,
                trace_id.clone(),
            )
        })?;
    Ok((work_request_id, submission_id))
}

/// Phase one: create (or resume) the provider intent for the charge.
async fn begin_approval(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Path((work_request_id, submission_id)): Path<(String, String)>,
    Json(payload): Json<BeginApprovalRequest>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse the path ids.
    let (work_request_id, submission_id) =
        match parse_ids(&work_request_id, &submission_id, &trace_id) {
            Ok(ids) => ids,
            Err(response) => return response,
        };

    // Step 2: Execute the begin-approval use case.
    let result = BeginApprovalUseCase::execute(
        &state.ctx,
        BeginApprovalCommand {
            work_request_id,
            submission_id,
            caller: actor.id,
            version: payload.version,
        },
    )
    .await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(out) => {
            let response = BeginApprovalResponse {
                attempt_id: out.attempt.id.0.to_string(),
                payment_intent_id: out.intent_id,
                client_secret: out.client_secret,
                amount_minor: out.attempt.amount.amount_minor,
                currency: out.attempt.amount.currency.as_str().to_string(),
                resumed: out.resumed,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(BeginApprovalError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("work request or submission not found".to_string()),
            None,
            trace_id,
        ),
        Err(BeginApprovalError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the business may approve".to_string()),
            None,
            trace_id,
        ),
        Err(BeginApprovalError::Conflict) => problem(
            StatusCode::CONFLICT,
            WPY_STATE_CONFLICT,
            Some("work request is not submitted".to_string()),
            None,
            trace_id,
        ),
        Err(BeginApprovalError::StaleSubmission) => problem(
            StatusCode::CONFLICT,
            WPY_STALE_SUBMISSION,
            Some("a newer submission version exists".to_string()),
            None,
            trace_id,
        ),
        Err(BeginApprovalError::PaymentDeclined { code, message }) => {
            payment_declined(code.as_str(), &message, None, trace_id)
        }
        Err(BeginApprovalError::Provider(_)) => problem(
            StatusCode::BAD_GATEWAY,
            WPY_INTERNAL,
            Some("payment provider unavailable".to_string()),
            None,
            trace_id,
        ),
        Err(BeginApprovalError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}

/// Phase two: verify capture and atomically finalize the approval.
async fn finalize_approval(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Path((work_request_id, submission_id)): Path<(String, String)>,
    Json(payload): Json<FinalizeApprovalRequest>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse the path ids.
    let (work_request_id, submission_id) =
        match parse_ids(&work_request_id, &submission_id, &trace_id) {
            Ok(ids) => ids,
            Err(response) => return response,
        };
    if payload.payment_intent_id.trim().is_empty() {
        return problem(
            StatusCode::BAD_REQUEST,
            WPY_REQUEST_MALFORMED,
            Some("payment_intent_id is required".to_string()),
            None,
            trace_id,
        );
    }

    // Step 2: Execute the finalize use case.
    let result = FinalizeApprovalUseCase::execute(
        &state.ctx,
        FinalizeApprovalCommand {
            work_request_id,
            submission_id,
            caller: actor.id,
            payment_intent_id: payload.payment_intent_id.clone(),
            review_notes: payload.review_notes.clone(),
        },
    )
    .await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(out) => {
            let response = FinalizedApprovalResponse {
                work_request: WorkRequestResponse::from_entity(&out.work_request),
                payment: PaymentResponse::from_entity(&out.payment),
                replayed: out.replayed,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(FinalizeApprovalError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("work request or payment attempt not found".to_string()),
            None,
            trace_id,
        ),
        Err(FinalizeApprovalError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the business may approve".to_string()),
            None,
            trace_id,
        ),
        Err(FinalizeApprovalError::Conflict) => problem(
            StatusCode::CONFLICT,
            WPY_STATE_CONFLICT,
            Some("approval already moved under this call".to_string()),
            None,
            trace_id,
        ),
        Err(FinalizeApprovalError::NotCaptured) => problem(
            StatusCode::CONFLICT,
            WPY_STATE_CONFLICT,
            Some("the payment has not been captured yet".to_string()),
            None,
            trace_id,
        ),
        Err(FinalizeApprovalError::PaymentDeclined { code, message }) => {
            payment_declined(code.as_str(), &message, None, trace_id)
        }
        Err(FinalizeApprovalError::Reconciliation(detail)) => problem(
            StatusCode::INTERNAL_SERVER_ERROR,
            WPY_PAYMENT_RECONCILIATION,
            Some(detail),
            None,
            trace_id,
        ),
        Err(FinalizeApprovalError::Provider(_)) => problem(
            StatusCode::BAD_GATEWAY,
            WPY_INTERNAL,
            Some("payment provider unavailable".to_string()),
            None,
            trace_id,
        ),
        Err(FinalizeApprovalError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}
