// HTTP routes: work request event timeline.

use crate::application::usecases::list_events::{ListEventsError, ListEventsUseCase};
use crate::domain::value_objects::ids::WorkRequestId;
use crate::interface::http::auth::AuthenticatedActor;
use crate::interface::http::dto::event::{EventListResponse, EventResponse};
use crate::interface::http::problem::{
    WPY_AUTH_FORBIDDEN, WPY_NOT_FOUND, WPY_REQUEST_MALFORMED, WPY_STORAGE_DB_ERROR, problem,
};
use crate::interface::http::state::AppState;
use crate::interface::http::trace::TraceId;
use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;

/// Builds event routes.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/work-requests/:work_request_id/events", get(list_events))
}

/// Everything that happened to one work request, oldest first.
async fn list_events(
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

    // Step 2: Execute the list use case.
    let result = ListEventsUseCase::execute(&state.ctx, work_request_id, actor.id).await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(events) => {
            let response = EventListResponse {
                events: events.iter().map(EventResponse::from_entity).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(ListEventsError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("work request not found".to_string()),
            None,
            trace_id,
        ),
        Err(ListEventsError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the two parties may read the timeline".to_string()),
            None,
            trace_id,
        ),
        Err(ListEventsError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}
