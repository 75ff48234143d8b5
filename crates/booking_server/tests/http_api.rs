use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use booking_core::db::open_db_in_memory;
use booking_server::{build_router, config::ServerConfig, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const PASSWORD: &str = "parola";

fn test_app() -> Router {
    let config = ServerConfig::from_lookup(|key: &str| match key {
        "BASE_PASSWORD" => Some(PASSWORD.to_string()),
        "JWT_SECRET" => Some("test-secret".to_string()),
        "LOG_DIR" => Some("/tmp/booking-test-logs".to_string()),
        _ => None,
    })
    .unwrap();
    let state = AppState::new(open_db_in_memory().unwrap(), &config);
    build_router(state, &config)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

fn booking(id: &str, date: &str, dancers: &[&str]) -> Value {
    json!({
        "id": id,
        "title": "Nunta - Chisinau",
        "start": date,
        "allDay": true,
        "extendedProps": { "type": "Nunta", "dancers": dancers }
    })
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "wrong password");
}

#[tokio::test]
async fn login_trims_the_submitted_password() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "password": format!(" {PASSWORD} ") })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn event_routes_require_a_valid_token() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "no token");

    let (status, body) = send(&app, Method::GET, "/events", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid token");
}

#[tokio::test]
async fn create_list_get_update_delete() {
    let app = test_app();
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/events",
        Some(&token),
        Some(booking("A", "2024-05-01", &["Ana", "Mihai"])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "ok": true, "id": "A" }));

    let (status, body) = send(&app, Method::GET, "/events", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["start"], "2024-05-01");
    assert_eq!(events[0]["allDay"], true);
    assert_eq!(events[0]["backgroundColor"], "black");
    assert_eq!(events[0]["borderColor"], "black");
    assert_eq!(events[0]["extendedProps"]["dancers"], json!(["Ana", "Mihai"]));

    let mut changed = booking("A", "2024-05-03", &["Ana"]);
    changed["title"] = json!("Botez");
    let (status, _) = send(&app, Method::PUT, "/events/A", Some(&token), Some(changed)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/events/A", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Botez");
    assert_eq!(body["start"], "2024-05-03");

    let (status, body) = send(&app, Method::DELETE, "/events/A", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, _) = send(&app, Method::GET, "/events/A", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn double_booking_is_rejected_with_bad_request() {
    let app = test_app();
    let token = login(&app).await;

    send(
        &app,
        Method::POST,
        "/events",
        Some(&token),
        Some(booking("A", "2024-05-01", &["Ana", "Mihai"])),
    )
    .await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/events",
        Some(&token),
        Some(booking("B", "2024-05-01", &["Ion", "Mihai"])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("Mihai"));
    assert!(message.contains("2024-05-01"));

    let (_, body) = send(&app, Method::GET, "/events", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn update_does_not_conflict_with_itself() {
    let app = test_app();
    let token = login(&app).await;

    send(
        &app,
        Method::POST,
        "/events",
        Some(&token),
        Some(booking("A", "2024-05-01", &["Ana"])),
    )
    .await;
    let (status, _) = send(
        &app,
        Method::PUT,
        "/events/A",
        Some(&token),
        Some(booking("A", "2024-05-01", &["Ana", "Ion"])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    send(
        &app,
        Method::POST,
        "/events",
        Some(&token),
        Some(booking("B", "2024-05-01", &["Mihai"])),
    )
    .await;
    let (status, _) = send(
        &app,
        Method::PUT,
        "/events/B",
        Some(&token),
        Some(booking("B", "2024-05-01", &["Ion"])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_events_and_duplicate_ids() {
    let app = test_app();
    let token = login(&app).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/events/ghost",
        Some(&token),
        Some(booking("ghost", "2024-05-01", &[])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/events/ghost", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(
        &app,
        Method::POST,
        "/events",
        Some(&token),
        Some(booking("A", "2024-05-01", &[])),
    )
    .await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/events",
        Some(&token),
        Some(booking("A", "2024-06-01", &[])),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn list_filters_by_participant() {
    let app = test_app();
    let token = login(&app).await;

    for (id, date, dancers) in [
        ("A", "2024-05-02", vec!["Ana"]),
        ("B", "2024-05-01", vec!["Ion"]),
        ("C", "2024-05-03", vec!["Ana", "Ion"]),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/events",
            Some(&token),
            Some(booking(id, date, &dancers)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(
        &app,
        Method::GET,
        "/events?participant=Ana",
        Some(&token),
        None,
    )
    .await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["A", "C"]);
}

#[tokio::test]
async fn conflict_check_endpoint_reports_without_writing() {
    let app = test_app();
    let token = login(&app).await;

    send(
        &app,
        Method::POST,
        "/events",
        Some(&token),
        Some(booking("A", "2024-05-01", &["Ana"])),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/conflicts",
        Some(&token),
        Some(json!({ "date": "2024-05-01", "participants": ["", "Ana"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "conflict": "Ana" }));

    let (_, body) = send(
        &app,
        Method::POST,
        "/conflicts",
        Some(&token),
        Some(json!({
            "date": "2024-05-01",
            "participants": ["Ana"],
            "excludeEventId": "A"
        })),
    )
    .await;
    assert_eq!(body, json!({ "conflict": null }));

    let (_, body) = send(&app, Method::GET, "/events", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

async fn preflight(app: &Router, origin: &str) -> Option<String> {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/events")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .map(|value| value.to_str().unwrap().to_string())
}

#[tokio::test]
async fn cors_allows_only_configured_origins() {
    let app = test_app();

    assert_eq!(
        preflight(&app, "http://localhost:5173").await.as_deref(),
        Some("http://localhost:5173")
    );
    assert_eq!(
        preflight(&app, "https://allforone-preview.vercel.app")
            .await
            .as_deref(),
        Some("https://allforone-preview.vercel.app")
    );
    assert_eq!(preflight(&app, "https://evil.example").await, None);
}

#[tokio::test]
async fn malformed_dancer_list_is_a_bad_request() {
    let app = test_app();
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/events",
        Some(&token),
        Some(json!({
            "id": "A",
            "start": "2024-05-01",
            "extendedProps": { "dancers": ["Ana", 7] }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("participants"));

    let (_, body) = send(&app, Method::GET, "/events", Some(&token), None).await;
    assert_eq!(body, json!([]));
}
