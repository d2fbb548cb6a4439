pub mod auth;
pub mod dto;
pub mod problem;
pub mod routes;
pub mod state;
pub mod trace;

use axum::Router;
use axum::middleware;

use state::AppState;

/// Assembles the HTTP app: all routes behind API-key auth, with trace id
/// injection and request logging around everything.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::ready::router())
        .merge(routes::metrics::router())
        .merge(routes::actor::router())
        .merge(routes::work_request::router())
        .merge(routes::submission::router())
        .merge(routes::approval::router())
        .merge(routes::contract::router())
        .merge(routes::milestone::router())
        .merge(routes::budget::router())
        .merge(routes::stats::router())
        .merge(routes::webhook::router())
        .merge(routes::event::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(middleware::from_fn(trace::request_log_middleware))
        .layer(middleware::from_fn(trace::trace_id_middleware))
        .with_state(state)
}
