// HTTP routes: contracts with milestones.

use crate::application::usecases::create_contract::{
    CreateContractCommand, CreateContractError, CreateContractUseCase, MilestoneDraft,
};
use crate::domain::entities::actor::ActorRole;
use crate::domain::value_objects::ids::ActorId;
use crate::domain::value_objects::money::Currency;
use crate::domain::value_objects::timestamps::Timestamp;
use crate::interface::http::auth::AuthenticatedActor;
use crate::interface::http::dto::contract::{
    ContractResponse, CreateContractRequest, CreatedContractResponse,
};
use crate::interface::http::dto::milestone::MilestoneResponse;
use crate::interface::http::problem::{
    WPY_AUTH_FORBIDDEN, WPY_BUDGET_EXCEEDED, WPY_REQUEST_MALFORMED, WPY_STATE_CONFLICT,
    WPY_STORAGE_DB_ERROR, WPY_VALIDATION_FAILED, problem,
};
use crate::interface::http::state::AppState;
use crate::interface::http::trace::TraceId;
use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Builds contract routes.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/contracts", post(create_contract))
}

/// Opens a contract with all of its milestones in one unit.
async fn create_contract(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Extension(trace_id): Extension<TraceId>,
    Json(payload): Json<CreateContractRequest>,
) -> Response {
    let trace_id = Some(trace_id.0.clone());
    // Step 1: Only a business opens contracts.
    if actor.role != ActorRole::Business {
        return problem(
            StatusCode::FORBIDDEN,
            WPY_AUTH_FORBIDDEN,
            Some("only a business may open contracts".to_string()),
            None,
            trace_id,
        );
    }

    // Step 2: Parse the contractor id, currency and milestone drafts.
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
    let mut milestones = Vec::with_capacity(payload.milestones.len());
    for (index, draft) in payload.milestones.iter().enumerate() {
        let due_date = match draft.due_date.as_deref() {
            Some(raw) => match OffsetDateTime::parse(raw, &Rfc3339) {
                Ok(dt) => Some(Timestamp::from(dt)),
                Err(_) => {
                    return problem(
                        StatusCode::BAD_REQUEST,
                        WPY_REQUEST_MALFORMED,
                        Some(format!("invalid due_date in milestone {index}")),
                        None,
                        trace_id,
                    );
                }
            },
            None => None,
        };
        milestones.push(MilestoneDraft {
            name: draft.name.clone(),
            description: draft.description.clone(),
            amount_minor: draft.amount_minor,
            due_date,
            auto_pay: draft.auto_pay.unwrap_or(false),
        });
    }

    // Step 3: Execute the create use case.
    let result = CreateContractUseCase::execute(
        &state.ctx,
        CreateContractCommand {
            caller: actor.id,
            contractor_id,
            title: payload.title.clone(),
            currency,
            milestones,
        },
    )
    .await;

    // Step 4: Map output to HTTP response.
    match result {
        Ok(out) => {
            let response = CreatedContractResponse {
                contract: ContractResponse::from_entity(&out.contract),
                milestones: out
                    .milestones
                    .iter()
                    .map(MilestoneResponse::from_entity)
                    .collect(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(CreateContractError::Validation(error)) => problem(
            StatusCode::BAD_REQUEST,
            WPY_VALIDATION_FAILED,
            Some(format!("validation failed: {error:?}")),
            None,
            trace_id,
        ),
        Err(CreateContractError::MilestoneValidation { index, error }) => problem(
            StatusCode::BAD_REQUEST,
            WPY_VALIDATION_FAILED,
            Some(format!("milestone {index} invalid: {error:?}")),
            None,
            trace_id,
        ),
        Err(CreateContractError::NoMilestones) => problem(
            StatusCode::BAD_REQUEST,
            WPY_VALIDATION_FAILED,
            Some("a contract needs at least one milestone".to_string()),
            None,
            trace_id,
        ),
        Err(CreateContractError::BudgetNotConfigured) => problem(
            StatusCode::UNPROCESSABLE_ENTITY,
            WPY_VALIDATION_FAILED,
            Some("no budget configured for this business".to_string()),
            None,
            trace_id,
        ),
        Err(CreateContractError::BudgetExceeded(violation)) => problem(
            StatusCode::UNPROCESSABLE_ENTITY,
            WPY_BUDGET_EXCEEDED,
            Some(format!(
                "allocation of {} would exceed the budget by {}",
                violation.proposed_minor, violation.shortfall_minor
            )),
            None,
            trace_id,
        ),
        Err(CreateContractError::CurrencyMismatch) => problem(
            StatusCode::UNPROCESSABLE_ENTITY,
            WPY_VALIDATION_FAILED,
            Some("currency does not match the budget currency".to_string()),
            None,
            trace_id,
        ),
        Err(CreateContractError::Conflict) => problem(
            StatusCode::CONFLICT,
            WPY_STATE_CONFLICT,
            Some("contract creation raced a budget change".to_string()),
            None,
            trace_id,
        ),
        Err(CreateContractError::Storage(_)) => problem(
            StatusCode::SERVICE_UNAVAILABLE,
            WPY_STORAGE_DB_ERROR,
            Some("storage unavailable".to_string()),
            None,
            trace_id,
        ),
    }
}
