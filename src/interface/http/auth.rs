use crate::application::shared::api_key_helpers::{api_key_hash, api_key_prefix};
use crate::domain::entities::actor::ActorRole;
use crate::domain::value_objects::ids::ActorId;
use crate::interface::http::problem::{WPY_AUTH_INVALID_CREDENTIALS, WPY_INTERNAL, problem};
use crate::interface::http::state::AppState;
use crate::interface::http::trace::TraceId;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;

/// The caller attached to every authenticated request.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedActor {
    pub id: ActorId,
    pub role: ActorRole,
}

/// Validates the API key (Bearer token) and injects the caller into the request.
///
/// Public endpoints are allowed through without a key (health checks and
/// actor signup, which is what issues the first key).
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let trace_id = req.extensions().get::<TraceId>().map(|t| t.0.clone());
    // Step 1: allow unauthenticated public endpoints.
    let path = req.uri().path();
    let method = req.method().as_str();
    if path == "/health" || path == "/ready" || path == "/metrics" {
        return Ok(next.run(req).await);
    }
    if method == "POST" && path == "/actors" {
        return Ok(next.run(req).await);
    }

    // Step 2: extract the Bearer token from the Authorization header.
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let Some(raw) = header_value
        .strip_prefix("Bearer ")
        .or_else(|| header_value.strip_prefix("bearer "))
    else {
        return Err(problem(
            StatusCode::UNAUTHORIZED,
            WPY_AUTH_INVALID_CREDENTIALS,
            Some("missing bearer token".to_string()),
            Some(path.to_string()),
            trace_id.clone(),
        ));
    };
    if raw.is_empty() {
        return Err(problem(
            StatusCode::UNAUTHORIZED,
            WPY_AUTH_INVALID_CREDENTIALS,
            Some("empty bearer token".to_string()),
            Some(path.to_string()),
            trace_id.clone(),
        ));
    }

    // Step 3: compute the stored lookup fields (prefix + hash).
    let prefix = api_key_prefix(raw);
    let hash = api_key_hash(raw);

    // Step 4: look up an active API key that matches this token.
    let key = state
        .ctx
        .repos
        .api_key
        .find_active(&prefix, &hash)
        .await
        .map_err(|_| {
            problem(
                StatusCode::INTERNAL_SERVER_ERROR,
                WPY_INTERNAL,
                Some("failed to verify api key".to_string()),
                Some(path.to_string()),
                trace_id.clone(),
            )
        })?;
    let Some(key) = key else {
        return Err(problem(
            StatusCode::UNAUTHORIZED,
            WPY_AUTH_INVALID_CREDENTIALS,
            Some("invalid api key".to_string()),
            Some(path.to_string()),
            trace_id,
        ));
    };

    // Step 5: resolve the actor behind the key; a dangling key is unauthorized.
    let actor = state
        .ctx
        .repos
        .actor
        .get(key.actor_id)
        .await
        .map_err(|_| {
            problem(
                StatusCode::INTERNAL_SERVER_ERROR,
                WPY_INTERNAL,
                Some("failed to resolve caller".to_string()),
                Some(path.to_string()),
                trace_id.clone(),
            )
        })?;
    let Some(actor) = actor else {
        return Err(problem(
            StatusCode::UNAUTHORIZED,
            WPY_AUTH_INVALID_CREDENTIALS,
            Some("invalid api key".to_string()),
            Some(path.to_string()),
            trace_id,
        ));
    };

    // Step 6: attach the caller for handlers.
    req.extensions_mut().insert(AuthenticatedActor {
        id: actor.id,
        role: actor.role,
    });
    Ok(next.run(req).await)
}
