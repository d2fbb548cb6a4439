// HTTP routes: deliverable submissions and their review.

use crate::application::usecases::get_latest_submission::{
    GetLatestSubmissionError, GetLatestSubmissionUseCase,
};
use crate::application::usecases::review_submission::{
    ReviewAction, ReviewSubmissionCommand, ReviewSubmissionError, ReviewSubmissionUseCase,
};
use crate::application::usecases::submit_deliverable::{
    SubmitDeliverableCommand, SubmitDeliverableError, SubmitDeliverableUseCase,
};
use crate::domain::entities::submission::SubmissionKind;
use crate::domain::value_objects::ids::{SubmissionId, WorkRequestId};
use crate::interface::http::auth::AuthenticatedActor;
use crate::interface::http::dto::work_request::{
    ReviewSubmissionRequest, SubmissionResponse, SubmitDeliverableRequest,
    SubmittedDeliverableResponse, WorkRequestResponse,
};
use crate::interface::http::problem::{
    WPY_AUTH_FORBIDDEN, WPY_FEEDBACK_REQUIRED, WPY_NOT_FOUND, WPY_REQUEST_MALFORMED,
    WPY_STALE_SUBMISSION, WPY_STATE_CONFLICT, WPY_STORAGE_DB_ERROR, WPY_VALIDATION_FAILED,
    problem,
};
use crate::interface::http::state::AppState;
use crate::interface::http::trace::TraceId;
use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};

/// Builds submission routes.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/work-requests/:work_request_id/submissions",
            post(submit_deliverable),
        )
        .route(
            "/work-requests/:work_request_id/submissions/latest",
            get(get_latest_submission),
        )
        .route(
            "/work-requests/:work_request_id/submissions/:submission_id/review",
            post(review_submission),
        )
}

/// Contractor submits a deliverable version.
async fn submit_deliverable(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Path(work_request_id): Path<String>,
    Json(payload): Json<SubmitDeliverableRequest>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse the work request id and the submission kind.
    let work_request_id = match uuid::Uuid::parse_str(&work_request_id) {
        Ok(id) => WorkRequestId(id),
        Err(_) => {
            return problem(
                StatusCode::BAD_REQUEST,
                WPY_REQUEST_MALFORMED,
                Some("invalid work_request_id".to_string()),
                None,
                trace_id,
            );
        }
    };
    let Some(kind) = SubmissionKind::parse(&payload.kind) else {
        return problem(
            StatusCode::BAD_REQUEST,
            WPY_REQUEST_MALFORMED,
            Some("kind must be digital or physical".to_string()),
            None,
            trace_id,
        );
    };

    // Step 2: Execute the submit use case.
    let result = SubmitDeliverableUseCase::execute(
        &state.ctx,
        SubmitDeliverableCommand {
            work_request_id,
            caller: actor.id,
            kind,
            artifact_url: payload.artifact_url.clone(),
            deliverable_files: payload.deliverable_files.clone().unwrap_or_default(),
            description: payload.description.clone(),
            notes: payload.notes.clone(),
        },
    )
    .await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(out) => {
            let response = SubmittedDeliverableResponse {
                work_request: WorkRequestResponse::from_entity(&out.work_request),
                submission: SubmissionResponse::from_entity(&out.submission),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(SubmitDeliverableError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("work request not found".to_string()),
            None,
            trace_id,
        ),
        Err(SubmitDeliverableError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the assigned contractor may submit".to_string()),
            None,
            trace_id,
        ),
        Err(SubmitDeliverableError::Conflict) => problem(
            StatusCode::CONFLICT,
            WPY_STATE_CONFLICT,
            Some("submitting is allowed from accepted or needs_revision".to_string()),
            None,
            trace_id,
        ),
        Err(SubmitDeliverableError::Validation(error)) => problem(
            StatusCode::BAD_REQUEST,
            WPY_VALIDATION_FAILED,
            Some(format!("validation failed: {error:?}")),
            None,
            trace_id,
        ),
        Err(SubmitDeliverableError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}

/// Serves the highest submission version.
async fn get_latest_submission(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Path(work_request_id): Path<String>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse the work request id.
    let work_request_id = match uuid::Uuid::parse_str(&work_request_id) {
        Ok(id) => WorkRequestId(id),
        Err(_) => {
            return problem(
                StatusCode::BAD_REQUEST,
                WPY_REQUEST_MALFORMED,
                Some("invalid work_request_id".to_string()),
                None,
                trace_id,
            );
        }
    };

    // Step 2: Execute the read use case.
    let result = GetLatestSubmissionUseCase::execute(&state.ctx, work_request_id, actor.id).await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(submission) => (
            StatusCode::OK,
            Json(SubmissionResponse::from_entity(&submission)),
        )
            .into_response(),
        Err(GetLatestSubmissionError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("no submission found".to_string()),
            None,
            trace_id,
        ),
        Err(GetLatestSubmissionError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the two parties may read submissions".to_string()),
            None,
            trace_id,
        ),
        Err(GetLatestSubmissionError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}

/// Business rejects a submission or requests changes.
async fn review_submission(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Path((work_request_id, submission_id)): Path<(String, String)>,
    Json(payload): Json<ReviewSubmissionRequest>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse ids and the review action.
    let work_request_id = match uuid::Uuid::parse_str(&work_request_id) {
        Ok(id) => WorkRequestId(id),
        Err(_) => {
            return problem(
                StatusCode::BAD_REQUEST,
                WPY_REQUEST_MALFORMED,
                Some("invalid work_request_id".to_string()),
                None,
                trace_id,
            );
        }
    };
    let submission_id = match uuid::Uuid::parse_str(&submission_id) {
        Ok(id) => SubmissionId(id),
        Err(_) => {
            return problem(
                StatusCode::BAD_REQUEST,
                WPY_REQUEST_MALFORMED,
                Some("invalid submission_id".to_string()),
                None,
                trace_id,
            );
        }
    };
    let Some(action) = ReviewAction::parse(&payload.action) else {
        return problem(
            StatusCode::BAD_REQUEST,
            WPY_REQUEST_MALFORMED,
            Some("action must be reject or request_changes".to_string()),
            None,
            trace_id,
        );
    };

    // Step 2: Execute the review use case.
    let result = ReviewSubmissionUseCase::execute(
        &state.ctx,
        ReviewSubmissionCommand {
            work_request_id,
            submission_id,
            caller: actor.id,
            action,
            review_notes: payload.review_notes.clone().unwrap_or_default(),
            version: payload.version,
        },
    )
    .await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(out) => {
            let response = SubmittedDeliverableResponse {
                work_request: WorkRequestResponse::from_entity(&out.work_request),
                submission: SubmissionResponse::from_entity(&out.submission),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(ReviewSubmissionError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("work request or submission not found".to_string()),
            None,
            trace_id,
        ),
        Err(ReviewSubmissionError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the business may review".to_string()),
            None,
            trace_id,
        ),
        Err(ReviewSubmissionError::FeedbackRequired) => problem(
            StatusCode::BAD_REQUEST,
            WPY_FEEDBACK_REQUIRED,
            Some("review_notes must not be empty".to_string()),
            None,
            trace_id,
        ),
        Err(ReviewSubmissionError::StaleSubmission) => problem(
            StatusCode::CONFLICT,
            WPY_STALE_SUBMISSION,
            Some("a newer submission version exists".to_string()),
            None,
            trace_id,
        ),
        Err(ReviewSubmissionError::Conflict) => problem(
            StatusCode::CONFLICT,
            WPY_STATE_CONFLICT,
            Some("work request is not submitted".to_string()),
            None,
            trace_id,
        ),
        Err(ReviewSubmissionError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}
