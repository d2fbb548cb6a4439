// HTTP routes: business dashboard counters.

use crate::application::usecases::get_business_stats::{
    GetBusinessStatsError, GetBusinessStatsUseCase,
};
use crate::domain::value_objects::ids::ActorId;
use crate::interface::http::auth::AuthenticatedActor;
use crate::interface::http::dto::stats::{BusinessStatsResponse, StatusCountResponse};
use crate::interface::http::problem::{
    WPY_AUTH_FORBIDDEN, WPY_REQUEST_MALFORMED, WPY_STORAGE_DB_ERROR, problem,
};
use crate::interface::http::state::AppState;
use crate::interface::http::trace::TraceId;
use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;

/// Builds stats routes.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/businesses/:business_id/stats", get(get_stats))
}

/// Status counts plus review/payout backlogs, computed from the store.
async fn get_stats(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Path(business_id): Path<String>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse the business id.
    let business_id = match uuid::Uuid::parse_str(&business_id) {
        Ok(id) => ActorId(id),
        Err(_) => {
            return problem(
                StatusCode::BAD_REQUEST,
                WPY_REQUEST_MALFORMED,
                Some("invalid business_id".to_string()),
                None,
                trace_id,
            );
        }
    };

    // Step 2: Execute the stats use case.
    let result = GetBusinessStatsUseCase::execute(&state.ctx, business_id, actor.id).await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(stats) => {
            let status_counts = stats
                .status_counts
                .iter()
                .map(|(status, count)| StatusCountResponse {
                    status: status.as_str().to_string(),
                    count: *count,
                })
                .collect();
            let response = BusinessStatsResponse {
                status_counts,
                open_review: stats.open_review,
                awaiting_payment: stats.awaiting_payment,
                total: stats.total,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(GetBusinessStatsError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the business may read its stats".to_string()),
            None,
            trace_id,
        ),
        Err(GetBusinessStatsError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}
