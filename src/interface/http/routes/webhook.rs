// HTTP routes: webhook subscriptions.

use crate::application::usecases::list_webhooks::{ListWebhooksError, ListWebhooksUseCase};
use crate::application::usecases::register_webhook::{
    RegisterWebhookCommand, RegisterWebhookError, RegisterWebhookUseCase,
};
use crate::application::usecases::unregister_webhook::{
    UnregisterWebhookError, UnregisterWebhookUseCase,
};
use crate::domain::entities::event::EventTopic;
use crate::domain::value_objects::ids::SubscriptionId;
use crate::interface::http::auth::AuthenticatedActor;
use crate::interface::http::dto::webhook::{
    RegisterWebhookRequest, UnregisterWebhookResponse, WebhookListResponse,
    WebhookSubscriptionResponse,
};
use crate::interface::http::problem::{
    WPY_NOT_FOUND, WPY_REQUEST_MALFORMED, WPY_STORAGE_DB_ERROR, WPY_VALIDATION_FAILED, problem,
};
use crate::interface::http::state::AppState;
use crate::interface::http::trace::TraceId;
use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, post};

/// Builds webhook routes.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/webhooks", post(register_webhook).get(list_webhooks))
        .route("/webhooks/:subscription_id", delete(unregister_webhook))
}

/// Subscribes a URL to an explicit topic list.
async fn register_webhook(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Json(payload): Json<RegisterWebhookRequest>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse the topic names; an unknown topic is refused.
    let mut topics = Vec::with_capacity(payload.topics.len());
    for raw in &payload.topics {
        let Some(topic) = EventTopic::parse(raw) else {
            return problem(
                StatusCode::BAD_REQUEST,
                WPY_REQUEST_MALFORMED,
                Some(format!("unknown topic: {raw}")),
                None,
                trace_id,
            );
        };
        topics.push(topic);
    }

    // Step 2: Execute the register use case.
    let result = RegisterWebhookUseCase::execute(
        &state.ctx,
        RegisterWebhookCommand {
            actor_id: actor.id,
            target_url: payload.target_url.clone(),
            topics,
        },
    )
    .await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(subscription) => (
            StatusCode::CREATED,
            Json(WebhookSubscriptionResponse::from_entity(&subscription)),
        )
            .into_response(),
        Err(RegisterWebhookError::Validation(error)) => problem(
            StatusCode::BAD_REQUEST,
            WPY_VALIDATION_FAILED,
            Some(format!("validation failed: {error:?}")),
            None,
            trace_id,
        ),
        Err(RegisterWebhookError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}

/// Lists the caller's subscriptions.
async fn list_webhooks(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    match ListWebhooksUseCase::execute(&state.ctx, actor.id).await {
        Ok(subscriptions) => {
            let response = WebhookListResponse {
                subscriptions: subscriptions
                    .iter()
                    .map(WebhookSubscriptionResponse::from_entity)
                    .collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(ListWebhooksError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}

/// Removes one of the caller's subscriptions.
async fn unregister_webhook(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Path(subscription_id): Path<String>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse the subscription id.
    let subscription_id = match uuid::Uuid::parse_str(&subscription_id) {
        Ok(id) => SubscriptionId(id),
        Err(_) => {
            return problem(
                StatusCode::BAD_REQUEST,
                WPY_REQUEST_MALFORMED,
                Some("invalid subscription_id".to_string()),
                None,
                trace_id,
            );
        }
    };

    // Step 2: Execute the unregister use case.
    let result = UnregisterWebhookUseCase::execute(&state.ctx, subscription_id, actor.id).await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(UnregisterWebhookResponse { deleted: true }),
        )
            .into_response(),
        Err(UnregisterWebhookError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("subscription not found".to_string()),
            None,
            trace_id,
        ),
        Err(UnregisterWebhookError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}
