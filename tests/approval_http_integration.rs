use axum::body::Body;
use axum::body::to_bytes;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use workpay::application::context::AppContext;
use workpay::config;
use workpay::domain::services::work_request_lifecycle::WorkRequestLifecycle;
use workpay::infrastructure::db::postgres::PostgresDatabase;
use workpay::infrastructure::db::repositories::Repositories;
use workpay::infrastructure::payment::HttpPaymentGateway;
use workpay::interface::http;
use workpay::interface::http::state::AppState;

fn test_db_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

/// Wires the app against a mock payment provider.
async fn setup_state(provider_url: &str) -> Option<AppState> {
    let url = test_db_url()?;
    let db = Arc::new(PostgresDatabase::connect(&url, 5).await.ok()?);
    db.migrate().await.ok()?;
    let repos = Repositories::postgres(db.clone());
    let lifecycle = WorkRequestLifecycle::new(repos.clone());
    let mut settings = config::test_support::test_settings(&url);
    settings.payment.base_url = provider_url.to_string();
    let gateway = HttpPaymentGateway::new(&settings.payment).ok()?;
    let ctx = AppContext::new(repos, Arc::new(lifecycle), Arc::new(gateway), settings);
    Some(AppState::new(Arc::new(ctx), None))
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

fn bearer_request(method: &str, uri: String, api_key: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {api_key}"))
        .body(body)
        .unwrap()
}

async fn register_actor(state: &AppState, role: &str) -> (String, String) {
    let payload = format!(r#"{{"display_name":"{role} approval actor","role":"{role}"}}"#);
    let response = http::app(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/actors")
                .header("content-type", "application/json")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = response_json(response).await;
    let id = json
        .get("actor_id")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let api_key = json
        .get("api_key")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    (id, api_key)
}

struct SubmittedFlow {
    work_request_id: String,
    submission_id: String,
    business_key: String,
}

/// Drives a work request all the way to a reviewable submission.
async fn submitted_flow(state: &AppState, amount_minor: i64) -> SubmittedFlow {
    let (business_id, business_key) = register_actor(state, "business").await;
    let (contractor_id, contractor_key) = register_actor(state, "contractor").await;

    let budget = r#"{"cap_minor":10000000,"currency":"usd","period":"monthly"}"#;
    let response = http::app(state.clone())
        .oneshot(bearer_request(
            "PUT",
            format!("/businesses/{business_id}/budget"),
            &business_key,
            Body::from(budget),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let create = format!(
        r#"{{"project_id":"{}","contractor_id":"{contractor_id}","title":"Landing page","description":"Build the marketing landing page","deliverable_description":"Deployed page plus source archive","amount_minor":{amount_minor},"currency":"usd"}}"#,
        uuid::Uuid::new_v4()
    );
    let response = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            "/work-requests".to_string(),
            &business_key,
            Body::from(create),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response).await;
    let work_request_id = created
        .get("work_request_id")
        .and_then(|v| v.as_str())
        .unwrap()
        .to_string();

    let accept = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            format!("/work-requests/{work_request_id}/accept"),
            &contractor_key,
            Body::empty(),
        ))
        .await
        .unwrap();
    assert_eq!(accept.status(), StatusCode::OK);

    let submit = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            format!("/work-requests/{work_request_id}/submissions"),
            &contractor_key,
            Body::from(
                r#"{"kind":"digital","artifact_url":"https://cdn.example.com/drop.zip"}"#,
            ),
        ))
        .await
        .unwrap();
    assert_eq!(submit.status(), StatusCode::CREATED);
    let submitted = response_json(submit).await;
    let submission_id = submitted
        .get("submission")
        .and_then(|s| s.get("submission_id"))
        .and_then(|v| v.as_str())
        .unwrap()
        .to_string();

    SubmittedFlow {
        work_request_id,
        submission_id,
        business_key,
    }
}

fn intent_body(id: &str, status: &str, amount_minor: i64) -> Value {
    serde_json::json!({
        "id": id,
        "status": status,
        "amount": amount_minor,
        "currency": "usd",
        "client_secret": format!("{id}_secret"),
    })
}

#[tokio::test]
async fn given_captured_intent_when_begin_and_finalize_should_approve_and_record_payment() {
    let provider = MockServer::start().await;
    let Some(state) = setup_state(&provider.uri()).await else {
        return;
    };
    let flow = submitted_flow(&state, 50_000).await;
    let intent_id = format!("pi_{}", uuid::Uuid::new_v4().simple());

    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(intent_body(&intent_id, "requires_confirmation", 50_000)),
        )
        .mount(&provider)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/payment_intents/{intent_id}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(intent_body(&intent_id, "succeeded", 50_000)),
        )
        .mount(&provider)
        .await;

    let begin = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            format!(
                "/work-requests/{}/submissions/{}/approve",
                flow.work_request_id, flow.submission_id
            ),
            &flow.business_key,
            Body::from(r#"{"version":1}"#),
        ))
        .await
        .unwrap();
    assert_eq!(begin.status(), StatusCode::OK);
    let begun = response_json(begin).await;
    assert_eq!(
        begun.get("payment_intent_id").and_then(|v| v.as_str()),
        Some(intent_id.as_str())
    );
    assert_eq!(begun.get("resumed").and_then(|v| v.as_bool()), Some(false));
    assert!(begun.get("client_secret").is_some());

    let finalize_body = format!(r#"{{"payment_intent_id":"{intent_id}"}}"#);
    let finalize = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            format!(
                "/work-requests/{}/submissions/{}/approve-after-payment",
                flow.work_request_id, flow.submission_id
            ),
            &flow.business_key,
            Body::from(finalize_body.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(finalize.status(), StatusCode::OK);
    let finalized = response_json(finalize).await;
    assert_eq!(
        finalized
            .get("work_request")
            .and_then(|w| w.get("status"))
            .and_then(|v| v.as_str()),
        Some("approved")
    );
    assert_eq!(
        finalized
            .get("payment")
            .and_then(|p| p.get("status"))
            .and_then(|v| v.as_str()),
        Some("captured")
    );
    assert_eq!(
        finalized.get("replayed").and_then(|v| v.as_bool()),
        Some(false)
    );

    // A second finalize answers from the recorded payment without moving state.
    let replay = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            format!(
                "/work-requests/{}/submissions/{}/approve-after-payment",
                flow.work_request_id, flow.submission_id
            ),
            &flow.business_key,
            Body::from(finalize_body),
        ))
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::OK);
    let replayed = response_json(replay).await;
    assert_eq!(
        replayed.get("replayed").and_then(|v| v.as_bool()),
        Some(true)
    );
}

#[tokio::test]
async fn given_declined_intent_when_finalizing_should_answer_402_and_keep_submitted() {
    let provider = MockServer::start().await;
    let Some(state) = setup_state(&provider.uri()).await else {
        return;
    };
    let flow = submitted_flow(&state, 60_000).await;
    let intent_id = format!("pi_{}", uuid::Uuid::new_v4().simple());

    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(intent_body(&intent_id, "requires_confirmation", 60_000)),
        )
        .mount(&provider)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/payment_intents/{intent_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": intent_id,
            "status": "requires_confirmation",
            "amount": 60_000,
            "currency": "usd",
            "client_secret": format!("{intent_id}_secret"),
            "last_payment_error": {
                "message": "Your card was declined.",
                "decline_code": "card_declined",
            },
        })))
        .mount(&provider)
        .await;

    let begin = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            format!(
                "/work-requests/{}/submissions/{}/approve",
                flow.work_request_id, flow.submission_id
            ),
            &flow.business_key,
            Body::from(r#"{"version":1}"#),
        ))
        .await
        .unwrap();
    assert_eq!(begin.status(), StatusCode::OK);

    let finalize = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            format!(
                "/work-requests/{}/submissions/{}/approve-after-payment",
                flow.work_request_id, flow.submission_id
            ),
            &flow.business_key,
            Body::from(format!(r#"{{"payment_intent_id":"{intent_id}"}}"#)),
        ))
        .await
        .unwrap();
    assert_eq!(finalize.status(), StatusCode::PAYMENT_REQUIRED);
    let problem = response_json(finalize).await;
    assert_eq!(
        problem.get("code").and_then(|v| v.as_str()),
        Some("WPY_PAYMENT_DECLINED")
    );
    assert_eq!(
        problem.get("decline_code").and_then(|v| v.as_str()),
        Some("card_declined")
    );

    // The decline leaves the work request reviewable.
    let view = http::app(state.clone())
        .oneshot(bearer_request(
            "GET",
            format!("/work-requests/{}", flow.work_request_id),
            &flow.business_key,
            Body::empty(),
        ))
        .await
        .unwrap();
    let view = response_json(view).await;
    assert_eq!(
        view.get("work_request")
            .and_then(|w| w.get("status"))
            .and_then(|v| v.as_str()),
        Some("submitted")
    );
}

#[tokio::test]
async fn given_declined_create_when_beginning_should_answer_402() {
    let provider = MockServer::start().await;
    let Some(state) = setup_state(&provider.uri()).await else {
        return;
    };
    let flow = submitted_flow(&state, 40_000).await;

    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(ResponseTemplate::new(402).set_body_json(serde_json::json!({
            "error": {
                "message": "Your card has insufficient funds.",
                "decline_code": "insufficient_funds",
            },
        })))
        .mount(&provider)
        .await;

    let begin = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            format!(
                "/work-requests/{}/submissions/{}/approve",
                flow.work_request_id, flow.submission_id
            ),
            &flow.business_key,
            Body::from(r#"{"version":1}"#),
        ))
        .await
        .unwrap();
    assert_eq!(begin.status(), StatusCode::PAYMENT_REQUIRED);
    let problem = response_json(begin).await;
    assert_eq!(
        problem.get("decline_code").and_then(|v| v.as_str()),
        Some("insufficient_funds")
    );
}

#[tokio::test]
async fn given_stale_version_when_beginning_should_conflict() {
    let provider = MockServer::start().await;
    let Some(state) = setup_state(&provider.uri()).await else {
        return;
    };
    let flow = submitted_flow(&state, 30_000).await;

    let begin = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            format!(
                "/work-requests/{}/submissions/{}/approve",
                flow.work_request_id, flow.submission_id
            ),
            &flow.business_key,
            Body::from(r#"{"version":7}"#),
        ))
        .await
        .unwrap();
    assert_eq!(begin.status(), StatusCode::CONFLICT);
    let problem = response_json(begin).await;
    assert_eq!(
        problem.get("code").and_then(|v| v.as_str()),
        Some("WPY_STALE_SUBMISSION")
    );
}
