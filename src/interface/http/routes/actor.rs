// HTTP routes: actor registration.

use crate::application::usecases::register_actor::{RegisterActorError, RegisterActorUseCase};
use crate::domain::entities::actor::ActorRole;
use crate::interface::http::dto::actor::{RegisterActorRequest, RegisterActorResponse};
use crate::interface::http::dto::rfc3339;
use crate::interface::http::problem::{
    WPY_REQUEST_MALFORMED, WPY_STORAGE_DB_ERROR, WPY_VALIDATION_FAILED, problem,
};
use crate::interface::http::state::AppState;
use crate::interface::http::trace::TraceId;
use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;

/// Builds actor routes.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/actors", post(register_actor))
}

/// Registers a business or contractor and returns the one-time API key.
async fn register_actor(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    Json(payload): Json<RegisterActorRequest>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse the role.
    let Some(role) = ActorRole::parse(&payload.role) else {
        return problem(
            StatusCode::BAD_REQUEST,
            WPY_REQUEST_MALFORMED,
            Some("role must be business or contractor".to_string()),
            None,
            trace_id,
        );
    };

    // Step 2: Execute the registration use case.
    let result =
        RegisterActorUseCase::execute(&state.ctx, payload.display_name.clone(), role).await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(out) => {
            let response = RegisterActorResponse {
                actor_id: out.actor.id.0.to_string(),
                display_name: out.actor.display_name.clone(),
                role: out.actor.role.as_str().to_string(),
                api_key: out.api_key,
                key_prefix: out.key_prefix,
                created_at: rfc3339(out.actor.created_at),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(RegisterActorError::Validation(error)) => problem(
            StatusCode::BAD_REQUEST,
            WPY_VALIDATION_FAILED,
            Some(format!("validation failed: {error:?}")),
            None,
            trace_id,
        ),
        Err(RegisterActorError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}
