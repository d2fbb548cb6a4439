// HTTP routes: work request lifecycle.

use crate::application::usecases::accept_work_request::{
    AcceptWorkRequestError, AcceptWorkRequestUseCase,
};
use crate::application::usecases::create_work_request::{
    CreateWorkRequestCommand, CreateWorkRequestError, CreateWorkRequestUseCase,
};
use crate::application::usecases::decline_work_request::{
    DeclineWorkRequestError, DeclineWorkRequestUseCase,
};
use crate::application::usecases::get_work_request::{GetWorkRequestError, GetWorkRequestUseCase};
use crate::application::usecases::list_work_requests::{
    ListWorkRequestsError, ListWorkRequestsUseCase,
};
use crate::domain::entities::actor::ActorRole;
use crate::domain::entities::work_request::WorkRequestStatus;
use crate::domain::value_objects::ids::{ActorId, ProjectId, WorkRequestId};
use crate::domain::value_objects::money::{Currency, Money};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::interface::http::auth::AuthenticatedActor;
use crate::interface::http::dto::work_request::{
    CreateWorkRequestRequest, ListWorkRequestsQuery, SubmissionResponse, WorkRequestListResponse,
    WorkRequestResponse, WorkRequestViewResponse,
};
use crate::interface::http::problem::{
    WPY_AUTH_FORBIDDEN, WPY_BUDGET_EXCEEDED, WPY_IDEMPOTENCY_CONFLICT, WPY_NOT_FOUND,
    WPY_REQUEST_MALFORMED, WPY_STATE_CONFLICT, WPY_STORAGE_DB_ERROR, WPY_VALIDATION_FAILED,
    problem,
};
use crate::interface::http::state::AppState;
use crate::interface::http::trace::TraceId;
use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Builds work request routes.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/work-requests",
            post(create_work_request).get(list_work_requests),
        )
        .route("/work-requests/:work_request_id", get(get_work_request))
        .route(
            "/work-requests/:work_request_id/accept",
            post(accept_work_request),
        )
        .route(
            "/work-requests/:work_request_id/decline",
            post(decline_work_request),
        )
}

/// Creates and assigns a work request, reserving budget for its amount.
async fn create_work_request(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    headers: HeaderMap,
    Json(payload): Json<CreateWorkRequestRequest>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Only a business creates work requests.
    if actor.role != ActorRole::Business {
        return problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only a business may create work requests".to_string()),
            None,
            trace_id,
        );
    }

    // Step 2: Parse ids, currency and the optional due date.
    let project_id = match uuid::Uuid::parse_str(&payload.project_id) {
        Ok(id) => ProjectId(id),
        Err(_) => {
            return problem(
                StatusCode::BAD_REQUEST,
                WPY_REQUEST_MALFORMED,
                Some("invalid project_id".to_string()),
                None,
                trace_id,
            );
        }
    };
    let contractor_id = match uuid::Uuid::parse_str(&payload.contractor_id) {
        Ok(id) => ActorId(id),
        Err(_) => {
            return problem(
                StatusCode::BAD_REQUEST,
                WPY_REQUEST_MALFORMED,
                Some("invalid contractor_id".to_string()),
                None,
                trace_id,
            );
        }
    };
    let Some(currency) = Currency::parse(&payload.currency) else {
        return problem(
            StatusCode::BAD_REQUEST,
            WPY_REQUEST_MALFORMED,
            Some("unsupported currency".to_string()),
            None,
            trace_id,
        );
    };
    let due_date = match payload.due_date.as_deref() {
        Some(raw) => match OffsetDateTime::parse(raw, &Rfc3339) {
            Ok(dt) => Some(Timestamp::from(dt)),
            Err(_) => {
                return problem(
                    StatusCode::BAD_REQUEST,
                    WPY_REQUEST_MALFORMED,
                    Some("invalid due_date timestamp".to_string()),
                    None,
                    trace_id,
                );
            }
        },
        None => None,
    };

    // Step 3: Resolve the idempotency key (body takes precedence over header).
    let header_key = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let idempotency_key = match (payload.idempotency_key.clone(), header_key) {
        (Some(body_key), Some(header_key)) if body_key != header_key => {
            return problem(
                StatusCode::CONFLICT,
                WPY_IDEMPOTENCY_CONFLICT,
                Some("idempotency key mismatch".to_string()),
                None,
                trace_id,
            );
        }
        (Some(body_key), _) => Some(body_key),
        (None, header_key) => header_key,
    };

    // Step 4: Execute the create use case.
    let result = CreateWorkRequestUseCase::execute(
        &state.ctx,
        CreateWorkRequestCommand {
            project_id,
            business_id: actor.id,
            contractor_id,
            title: payload.title.clone(),
            description: payload.description.clone(),
            deliverable_description: payload.deliverable_description.clone(),
            amount: Money::new(payload.amount_minor, currency),
            due_date,
            idempotency_key,
        },
    )
    .await;

    // Step 5: Map output to HTTP response; a replay answers 200.
    match result {
        Ok(out) => {
            let status = if out.replayed {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            };
            (
                status,
                Json(WorkRequestResponse::from_entity(&out.work_request)),
            )
                .into_response()
        }
        Err(CreateWorkRequestError::Validation(error)) => problem(
            StatusCode::BAD_REQUEST,
            WPY_VALIDATION_FAILED,
            Some(format!("validation failed: {error:?}")),
            None,
            trace_id,
        ),
        Err(CreateWorkRequestError::BudgetNotConfigured) => problem(
            StatusCode::UNPROCESSABLE_ENTITY,
            WPY_VALIDATION_FAILED,
            Some("no budget configured for this business".to_string()),
            None,
            trace_id,
        ),
        Err(CreateWorkRequestError::BudgetExceeded(violation)) => problem(
            StatusCode::UNPROCESSABLE_ENTITY,
            WPY_BUDGET_EXCEEDED,
            Some(format!(
                "allocation of {} would exceed the budget by {}",
                violation.proposed_minor, violation.shortfall_minor
            )),
            None,
            trace_id,
        ),
        Err(CreateWorkRequestError::CurrencyMismatch) => problem(
            StatusCode::UNPROCESSABLE_ENTITY,
            WPY_VALIDATION_FAILED,
            Some("currency does not match the budget currency".to_string()),
            None,
            trace_id,
        ),
        Err(CreateWorkRequestError::IdempotencyConflict) => problem(
            StatusCode::CONFLICT,
            WPY_IDEMPOTENCY_CONFLICT,
            Some("idempotency key already used for a different request".to_string()),
            None,
            trace_id,
        ),
        Err(CreateWorkRequestError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}

/// Lists the caller's side of the marketplace, newest first.
async fn list_work_requests(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Query(query): Query<ListWorkRequestsQuery>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse the optional status filter.
    let status = match query.status.as_deref() {
        Some(raw) => match WorkRequestStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return problem(
                    StatusCode::BAD_REQUEST,
                    WPY_REQUEST_MALFORMED,
                    Some("unknown status filter".to_string()),
                    None,
                    trace_id,
                );
            }
        },
        None => None,
    };

    // Step 2: Execute the list use case scoped to the caller's role.
    let result = ListWorkRequestsUseCase::execute(&state.ctx, actor.id, actor.role, status).await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(work_requests) => {
            let response = WorkRequestListResponse {
                work_requests: work_requests
                    .iter()
                    .map(WorkRequestResponse::from_entity)
                    .collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(ListWorkRequestsError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}

/// Fetches a work request with its latest submission and allowed actions.
async fn get_work_request(
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
    let result = GetWorkRequestUseCase::execute(&state.ctx, work_request_id, actor.id).await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(view) => {
            let response = WorkRequestViewResponse {
                work_request: WorkRequestResponse::from_entity(&view.work_request),
                latest_submission: view
                    .latest_submission
                    .as_ref()
                    .map(SubmissionResponse::from_entity),
                allowed_actions: view
                    .allowed_actions
                    .iter()
                    .map(|action| action.as_str().to_string())
                    .collect(),
                overdue: view.overdue,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(GetWorkRequestError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("work request not found".to_string()),
            None,
            trace_id,
        ),
        Err(GetWorkRequestError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the two parties may read a work request".to_string()),
            None,
            trace_id,
        ),
        Err(GetWorkRequestError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}

/// Contractor accepts a pending assignment.
async fn accept_work_request(
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

    // Step 2: Execute the accept use case.
    let result = AcceptWorkRequestUseCase::execute(&state.ctx, work_request_id, actor.id).await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(work_request) => (
            StatusCode::OK,
            Json(WorkRequestResponse::from_entity(&work_request)),
        )
            .into_response(),
        Err(AcceptWorkRequestError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("work request not found".to_string()),
            None,
            trace_id,
        ),
        Err(AcceptWorkRequestError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the assigned contractor may accept".to_string()),
            None,
            trace_id,
        ),
        Err(AcceptWorkRequestError::Conflict) => problem(
            StatusCode::CONFLICT,
            WPY_STATE_CONFLICT,
            Some("work request is not pending".to_string()),
            None,
            trace_id,
        ),
        Err(AcceptWorkRequestError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}

/// Contractor declines a pending assignment.
async fn decline_work_request(
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

    // Step 2: Execute the decline use case.
    let result = DeclineWorkRequestUseCase::execute(&state.ctx, work_request_id, actor.id).await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(work_request) => (
            StatusCode::OK,
            Json(WorkRequestResponse::from_entity(&work_request)),
        )
            .into_response(),
        Err(DeclineWorkRequestError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("work request not found".to_string()),
            None,
            trace_id,
        ),
        Err(DeclineWorkRequestError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the assigned contractor may decline".to_string()),
            None,
            trace_id,
        ),
        Err(DeclineWorkRequestError::Conflict) => problem(
            StatusCode::CONFLICT,
            WPY_STATE_CONFLICT,
            Some("work request is not pending".to_string()),
            None,
            trace_id,
        ),
        Err(DeclineWorkRequestError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}
