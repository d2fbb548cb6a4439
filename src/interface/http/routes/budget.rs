// HTTP routes: business budget configuration.

use crate::application::usecases::configure_budget::{
    ConfigureBudgetCommand, ConfigureBudgetError, ConfigureBudgetUseCase,
};
use crate::application::usecases::get_budget::{GetBudgetError, GetBudgetUseCase};
use crate::domain::entities::budget::BudgetPeriod;
use crate::domain::value_objects::ids::ActorId;
use crate::domain::value_objects::money::Currency;
use crate::interface::http::auth::AuthenticatedActor;
use crate::interface::http::dto::budget::{BudgetResponse, ConfigureBudgetRequest};
use crate::interface::http::problem::{
    WPY_AUTH_FORBIDDEN, WPY_NOT_FOUND, WPY_REQUEST_MALFORMED, WPY_STORAGE_DB_ERROR,
    WPY_VALIDATION_FAILED, problem,
};
use crate::interface::http::state::AppState;
use crate::interface::http::trace::TraceId;
use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;

/// Builds budget routes.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route(
        "/businesses/:business_id/budget",
        get(get_budget).put(configure_budget),
    )
}

/// Reads the spending cap of a business (owner only).
async fn get_budget(
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

    // Step 2: Execute the read use case.
    let result = GetBudgetUseCase::execute(&state.ctx, business_id, actor.id).await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(budget) => {
            (StatusCode::OK, Json(BudgetResponse::from_entity(&budget))).into_response()
        }
        Err(GetBudgetError::NotFound) => problem(
            StatusCode::NOT_FOUND,
            WPY_NOT_FOUND,
            Some("no budget configured".to_string()),
            None,
            trace_id,
        ),
        Err(GetBudgetError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the business may read its budget".to_string()),
            None,
            trace_id,
        ),
        Err(GetBudgetError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}

/// Sets or updates the spending cap of a business (owner only).
async fn configure_budget(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Path(business_id): Path<String>,
    Json(payload): Json<ConfigureBudgetRequest>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Parse the business id, currency and period.
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
    let Some(currency) = Currency::parse(&payload.currency) else {
        return problem(
            StatusCode::BAD_REQUEST,
            WPY_REQUEST_MALFORMED,
            Some("unsupported currency".to_string()),
            None,
            trace_id,
        );
    };
    let Some(period) = BudgetPeriod::parse(&payload.period) else {
        return problem(
            StatusCode::BAD_REQUEST,
            WPY_REQUEST_MALFORMED,
            Some("period must be weekly or monthly".to_string()),
            None,
            trace_id,
        );
    };

    // Step 2: Execute the configure use case.
    let result = ConfigureBudgetUseCase::execute(
        &state.ctx,
        ConfigureBudgetCommand {
            business_id,
            caller: actor.id,
            cap_minor: payload.cap_minor,
            currency,
            period,
            reset_enabled: payload.reset_enabled.unwrap_or(false),
        },
    )
    .await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(budget) => {
            (StatusCode::OK, Json(BudgetResponse::from_entity(&budget))).into_response()
        }
        Err(ConfigureBudgetError::Validation(error)) => problem(
            StatusCode::BAD_REQUEST,
            WPY_VALIDATION_FAILED,
            Some(format!("validation failed: {error:?}")),
            None,
            trace_id,
        ),
        Err(ConfigureBudgetError::Forbidden) => problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only the business may configure its budget".to_string()),
            None,
            trace_id,
        ),
        Err(ConfigureBudgetError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}
