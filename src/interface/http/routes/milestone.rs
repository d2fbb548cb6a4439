// HTTP routes: milestone delivery and approval.

use crate::application::usecases::approve_milestone::{
    ApproveMilestoneError, ApproveMilestoneUseCase,
};
use crate::application::usecases::get_milestone::{GetMilestoneError, GetMilestoneUseCase};
use crate::application::usecases::reject_milestone::{
    RejectMilestoneError, RejectMilestoneUseCase,
};
use crate::application::usecases::submit_milestone::{
    SubmitMilestoneError, SubmitMilestoneUseCase,
};
use crate::domain::value_objects::ids::MilestoneId;
use crate::interface::http::auth::AuthenticatedActor;
use crate::interface::http::dto::contract::ContractResponse;
use crate::interface::http::dto::milestone::{
    ApprovedMilestoneResponse, MilestoneResponse, MilestoneViewResponse, RejectMilestoneRequest,
    SubmitMilestoneRequest,
};
use crate::interface::http::dto::payment::PaymentResponse;
use crate::interface::http::problem::{
    WPY_AUTH_FORBIDDEN, WPY_FEEDBACK_REQUIRED, WPY_NOT_FOUND, WPY_REQUEST_MALFORMED,
    WPY_STATE_CONFLICT, WPY_STORAGE_DB_ERROR, problem,
};
use crate::interface::http::state::AppState;
use crate::interface::http::trace::TraceId;
use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};

/// Builds milestone routes.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/milestones/:milestone_id", get(get_milestone))
        .route("/milestones/:milestone_id/submit", post(submit_milestone))
        .route("/milestones/:milestone_id/approve", post(approve_milestone))
        .route("/milestones/:milestone_id/reject", post(reject_milestone))
}

fn parse_milestone_id(raw: &str, trace_id: &Option<String>) -> Result<MilestoneId, Response> {
    uuid::Uuid::parse_str(raw).map(MilestoneId).map_err(|_| {
        problem(
            StatusCode::BAD_REQUEST,
            WPY_REQUEST_MALFORMED,
            Some("invalid milestone_id".to_string()),
            None,
            trace_id.clone(),
        )
    })
}

/// Fetches a milestone with its owning contract.
async fn get_milestone(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Path(milestone_id): Path<String>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse the milestone id.
    let milestone_id = match parse_milestone_id(&milestone_id, &trace_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    // Step 2: Execute the read use case.
    let result = GetMilestoneUseCase::execute(&state.ctx, milestone_id, actor.id).await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(view) => {
            let response = MilestoneViewResponse {
                milestone: MilestoneResponse::from_entity(&view.milestone),
                contract: ContractResponse::from_entity(&view.contract),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(GetMilestoneError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("milestone not found".to_string()),
            None,
            trace_id,
        ),
        Err(GetMilestoneError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the contract parties may read a milestone".to_string()),
            None,
            trace_id,
        ),
        Err(GetMilestoneError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}

/// Contractor marks a milestone delivered.
async fn submit_milestone(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Path(milestone_id): Path<String>,
    Json(payload): Json<SubmitMilestoneRequest>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse the milestone id.
    let milestone_id = match parse_milestone_id(&milestone_id, &trace_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    // Step 2: Execute the submit use case.
    let result = SubmitMilestoneUseCase::execute(
        &state.ctx,
        milestone_id,
        actor.id,
        payload.deliverable_url.clone(),
    )
    .await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(milestone) => (
            StatusCode::OK,
            Json(MilestoneResponse::from_entity(&milestone)),
        )
            .into_response(),
        Err(SubmitMilestoneError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("milestone not found".to_string()),
            None,
            trace_id,
        ),
        Err(SubmitMilestoneError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the contract's contractor may submit".to_string()),
            None,
            trace_id,
        ),
        Err(SubmitMilestoneError::Conflict) => problem(
            StatusCode::CONFLICT,
            WPY_STATE_CONFLICT,
            Some("milestone is not pending".to_string()),
            None,
            trace_id,
        ),
        Err(SubmitMilestoneError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}

/// Business approves a submitted milestone; the payout is created once.
async fn approve_milestone(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Path(milestone_id): Path<String>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse the milestone id.
    let milestone_id = match parse_milestone_id(&milestone_id, &trace_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    // Step 2: Execute the approve use case.
    let result = ApproveMilestoneUseCase::execute(&state.ctx, milestone_id, actor.id).await;

    // Step 3: Map output to HTTP response; a replay answers 200 with the
    // recorded approval.
    match result {
        Ok(out) => {
            let response = ApprovedMilestoneResponse {
                milestone: MilestoneResponse::from_entity(&out.milestone),
                payment: PaymentResponse::from_entity(&out.payment),
                replayed: out.replayed,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(ApproveMilestoneError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("milestone not found".to_string()),
            None,
            trace_id,
        ),
        Err(ApproveMilestoneError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the contract's business may approve".to_string()),
            None,
            trace_id,
        ),
        Err(ApproveMilestoneError::Conflict) => problem(
            StatusCode::CONFLICT,
            WPY_STATE_CONFLICT,
            Some("milestone is not submitted".to_string()),
            None,
            trace_id,
        ),
        Err(ApproveMilestoneError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}

/// Business turns a submitted milestone down; feedback is mandatory.
async fn reject_milestone(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Path(milestone_id): Path<String>,
    Json(payload): Json<RejectMilestoneRequest>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse the milestone id.
    let milestone_id = match parse_milestone_id(&milestone_id, &trace_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    // Step 2: Execute the reject use case.
    let result = RejectMilestoneUseCase::execute(
        &state.ctx,
        milestone_id,
        actor.id,
        payload.feedback.clone().unwrap_or_default(),
    )
    .await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(milestone) => (
            StatusCode::OK,
            Json(MilestoneResponse::from_entity(&milestone)),
        )
            .into_response(),
        Err(RejectMilestoneError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("milestone not found".to_string()),
            None,
            trace_id,
        ),
        Err(RejectMilestoneError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the contract's business may reject".to_string()),
            None,
            trace_id,
        ),
        Err(RejectMilestoneError::FeedbackRequired) => problem(
            StatusCode::BAD_REQUEST,
            WPY_FEEDBACK_REQUIRED,
            Some("feedback must not be empty".to_string()),
            None,
            trace_id,
        ),
        Err(RejectMilestoneError::Conflict) => problem(
            StatusCode::CONFLICT,
            WPY_STATE_CONFLICT,
            Some("milestone is not submitted".to_string()),
            None,
            trace_id,
        ),
        Err(RejectMilestoneError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}
