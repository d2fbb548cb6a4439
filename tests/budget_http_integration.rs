use axum::body::Body;
use axum::body::to_bytes;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;
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

async fn setup_state() -> Option<AppState> {
    let url = test_db_url()?;
    let db = Arc::new(PostgresDatabase::connect(&url, 5).await.ok()?);
    db.migrate().await.ok()?;
    let repos = Repositories::postgres(db.clone());
    let lifecycle = WorkRequestLifecycle::new(repos.clone());
    let settings = config::test_support::test_settings(&url);
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
    let payload = format!(r#"{{"display_name":"{role} budget actor","role":"{role}"}}"#);
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

fn create_body(contractor_id: &str, amount_minor: i64, currency: &str) -> String {
    format!(
        r#"{{"project_id":"{}","contractor_id":"{contractor_id}","title":"Landing page","description":"Build the marketing landing page","deliverable_description":"Deployed page plus source archive","amount_minor":{amount_minor},"currency":"{currency}"}}"#,
        uuid::Uuid::new_v4()
    )
}

#[tokio::test]
async fn given_cap_when_configuring_should_return_remaining() {
    let Some(state) = setup_state().await else {
        return;
    };
    let (business_id, business_key) = register_actor(&state, "business").await;

    let configure = http::app(state.clone())
        .oneshot(bearer_request(
            "PUT",
            format!("/businesses/{business_id}/budget"),
            &business_key,
            Body::from(r#"{"cap_minor":500000,"currency":"usd","period":"quarterly"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(configure.status(), StatusCode::OK);
    let budget = response_json(configure).await;
    assert_eq!(budget.get("cap_minor").and_then(|v| v.as_i64()), Some(500_000));
    assert_eq!(budget.get("used_minor").and_then(|v| v.as_i64()), Some(0));
    assert_eq!(
        budget.get("remaining_minor").and_then(|v| v.as_i64()),
        Some(500_000)
    );
    assert_eq!(
        budget.get("period").and_then(|v| v.as_str()),
        Some("quarterly")
    );

    let get = http::app(state.clone())
        .oneshot(bearer_request(
            "GET",
            format!("/businesses/{business_id}/budget"),
            &business_key,
            Body::empty(),
        ))
        .await
        .unwrap();
    assert_eq!(get.status(), StatusCode::OK);
}

#[tokio::test]
async fn given_another_business_when_reading_budget_should_be_forbidden() {
    let Some(state) = setup_state().await else {
        return;
    };
    let (business_id, business_key) = register_actor(&state, "business").await;
    let (_, other_key) = register_actor(&state, "business").await;

    let configure = http::app(state.clone())
        .oneshot(bearer_request(
            "PUT",
            format!("/businesses/{business_id}/budget"),
            &business_key,
            Body::from(r#"{"cap_minor":500000,"currency":"usd","period":"monthly"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(configure.status(), StatusCode::OK);

    let get = http::app(state.clone())
        .oneshot(bearer_request(
            "GET",
            format!("/businesses/{business_id}/budget"),
            &other_key,
            Body::empty(),
        ))
        .await
        .unwrap();
    assert_eq!(get.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn given_no_budget_when_creating_should_answer_unprocessable() {
    let Some(state) = setup_state().await else {
        return;
    };
    let (_, business_key) = register_actor(&state, "business").await;
    let (contractor_id, _) = register_actor(&state, "contractor").await;

    let create = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            "/work-requests".to_string(),
            &business_key,
            Body::from(create_body(&contractor_id, 50_000, "usd")),
        ))
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let problem = response_json(create).await;
    assert_eq!(
        problem.get("code").and_then(|v| v.as_str()),
        Some("WPY_VALIDATION_FAILED")
    );
}

#[tokio::test]
async fn given_cap_reached_when_creating_should_answer_budget_exceeded() {
    let Some(state) = setup_state().await else {
        return;
    };
    let (business_id, business_key) = register_actor(&state, "business").await;
    let (contractor_id, _) = register_actor(&state, "contractor").await;

    let configure = http::app(state.clone())
        .oneshot(bearer_request(
            "PUT",
            format!("/businesses/{business_id}/budget"),
            &business_key,
            Body::from(r#"{"cap_minor":100000,"currency":"usd","period":"monthly"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(configure.status(), StatusCode::OK);

    let first = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            "/work-requests".to_string(),
            &business_key,
            Body::from(create_body(&contractor_id, 60_000, "usd")),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            "/work-requests".to_string(),
            &business_key,
            Body::from(create_body(&contractor_id, 50_000, "usd")),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let problem = response_json(second).await;
    assert_eq!(
        problem.get("code").and_then(|v| v.as_str()),
        Some("WPY_BUDGET_EXCEEDED")
    );
    let detail = problem
        .get("detail")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    assert!(detail.contains("exceed"), "unexpected detail: {detail}");
}

#[tokio::test]
async fn given_currency_mismatch_when_creating_should_answer_unprocessable() {
    let Some(state) = setup_state().await else {
        return;
    };
    let (business_id, business_key) = register_actor(&state, "business").await;
    let (contractor_id, _) = register_actor(&state, "contractor").await;

    let configure = http::app(state.clone())
        .oneshot(bearer_request(
            "PUT",
            format!("/businesses/{business_id}/budget"),
            &business_key,
            Body::from(r#"{"cap_minor":100000,"currency":"usd","period":"monthly"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(configure.status(), StatusCode::OK);

    let create = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            "/work-requests".to_string(),
            &business_key,
            Body::from(create_body(&contractor_id, 50_000, "eur")),
        ))
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let problem = response_json(create).await;
    assert_eq!(
        problem.get("code").and_then(|v| v.as_str()),
        Some("WPY_VALIDATION_FAILED")
    );
    let detail = problem
        .get("detail")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    assert!(detail.contains("currency"), "unexpected detail: {detail}");
}

#[tokio::test]
async fn given_work_requests_when_reading_stats_should_count_by_status() {
    let Some(state) = setup_state().await else {
        return;
    };
    let (business_id, business_key) = register_actor(&state, "business").await;
    let (contractor_id, contractor_key) = register_actor(&state, "contractor").await;

    let configure = http::app(state.clone())
        .oneshot(bearer_request(
            "PUT",
            format!("/businesses/{business_id}/budget"),
            &business_key,
            Body::from(r#"{"cap_minor":10000000,"currency":"usd","period":"monthly"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(configure.status(), StatusCode::OK);

    let mut ids = Vec::new();
    for _ in 0..2 {
        let create = http::app(state.clone())
            .oneshot(bearer_request(
                "POST",
                "/work-requests".to_string(),
                &business_key,
                Body::from(create_body(&contractor_id, 20_000, "usd")),
            ))
            .await
            .unwrap();
        assert_eq!(create.status(), StatusCode::CREATED);
        let created = response_json(create).await;
        ids.push(
            created
                .get("work_request_id")
                .and_then(|v| v.as_str())
                .unwrap()
                .to_string(),
        );
    }

    let accept = http::app(state.clone())
        .oneshot(bearer_request(
            "POST",
            format!("/work-requests/{}/accept", ids[0]),
            &contractor_key,
            Body::empty(),
        ))
        .await
        .unwrap();
    assert_eq!(accept.status(), StatusCode::OK);

    let stats = http::app(state.clone())
        .oneshot(bearer_request(
            "GET",
            format!("/businesses/{business_id}/stats"),
            &business_key,
            Body::empty(),
        ))
        .await
        .unwrap();
    assert_eq!(stats.status(), StatusCode::OK);
    let stats = response_json(stats).await;
    assert_eq!(stats.get("total").and_then(|v| v.as_i64()), Some(2));
    assert_eq!(stats.get("open_review").and_then(|v| v.as_i64()), Some(0));

    let counts: Vec<(String, i64)> = stats
        .get("status_counts")
        .and_then(|v| v.as_array())
        .map(|a| {
            a.iter()
                .filter_map(|entry| {
                    let status = entry.get("status")?.as_str()?.to_string();
                    let count = entry.get("count")?.as_i64()?;
                    Some((status, count))
                })
                .collect()
        })
        .unwrap_or_default();
    assert!(counts.contains(&("pending".to_string(), 1)));
    assert!(counts.contains(&("accepted".to_string(), 1)));
}
