use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// RFC 7807 Problem Details payload.
#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub r#type: String,
    /// A short, human-readable summary of the problem type.
    pub title: String,
    /// The HTTP status code for this occurrence.
    pub status: u16,
    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// A URI reference that identifies this specific occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// A stable, machine-readable application error code (WPY_...).
    pub code: String,
    /// The provider decline code on a 402, e.g. `insufficient_funds`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decline_code: Option<String>,
    /// The request trace id, when one was assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Build a Problem Details response with the correct content-type.
pub fn problem(
    status: StatusCode,
    code: &str,
    detail: Option<String>,
    instance: Option<String>,
    trace_id: Option<String>,
) -> Response {
    // Step 1: Build the problem payload.
    let payload = ProblemDetails {
        r#type: "about:blank".to_string(),
        title: status.canonical_reason().unwrap_or("Error").to_string(),
        status: status.as_u16(),
        detail,
        instance,
        code: code.to_string(),
        decline_code: None,
        trace_id,
    };

    respond(status, payload)
}

/// A 402 carrying the provider decline code plus the remediation text
/// shown verbatim to the payer.
pub fn payment_declined(
    decline_code: &str,
    message: &str,
    instance: Option<String>,
    trace_id: Option<String>,
) -> Response {
    let status = StatusCode::PAYMENT_REQUIRED;
    let payload = ProblemDetails {
        r#type: "about:blank".to_string(),
        title: status.canonical_reason().unwrap_or("Error").to_string(),
        status: status.as_u16(),
        detail: Some(message.to_string()),
        instance,
        code: WPY_PAYMENT_DECLINED.to_string(),
        decline_code: Some(decline_code.to_string()),
        trace_id,
    };

    respond(status, payload)
}

fn respond(status: StatusCode, payload: ProblemDetails) -> Response {
    // Step 2: Convert to an HTTP response with JSON body.
    let mut response = (status, Json(payload)).into_response();

    // Step 3: Ensure RFC 7807 content type.
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/problem+json"),
    );

    response
}

// Common WPY error codes.
pub const WPY_REQUEST_MALFORMED: &str = "WPY_REQUEST_MALFORMED";
pub const WPY_VALIDATION_FAILED: &str = "WPY_VALIDATION_FAILED";
pub const WPY_FEEDBACK_REQUIRED: &str = "WPY_FEEDBACK_REQUIRED";
pub const WPY_BUDGET_EXCEEDED: &str = "WPY_BUDGET_EXCEEDED";
pub const WPY_AUTH_INVALID_CREDENTIALS: &str = "WPY_AUTH_INVALID_CREDENTIALS";
pub const WPY_AUTH_FORBIDDEN: &str = "WPY_AUTH_FORBIDDEN";
pub const WPY_NOT_FOUND: &str = "WPY_NOT_FOUND";
pub const WPY_STATE_CONFLICT: &str = "WPY_STATE_CONFLICT";
pub const WPY_STALE_SUBMISSION: &str = "WPY_STALE_SUBMISSION";
pub const WPY_IDEMPOTENCY_CONFLICT: &str = "WPY_IDEMPOTENCY_CONFLICT";
pub const WPY_PAYMENT_DECLINED: &str = "WPY_PAYMENT_DECLINED";
pub const WPY_PAYMENT_RECONCILIATION: &str = "WPY_PAYMENT_RECONCILIATION";
pub const WPY_STORAGE_DB_ERROR: &str = "WPY_STORAGE_DB_ERROR";
pub const WPY_INTERNAL: &str = "WPY_INTERNAL";
