//! Integration tests for the lab issues API.
//!
//! These drive the fully assembled application (CORS, tracing, auth, routes)
//! over the in-memory service through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use lab_issues::api::{create_app, AppState};
use lab_issues::auth::{JwtService, Role};
use lab_issues::config::Config;
use lab_issues::service::InMemoryIssueService;

const SECRET: &str = "integration-secret-0123456789abcdef";

/// Build the app with the default configuration.
fn test_app() -> (Router, JwtService) {
    let config = Config::with_secret(SECRET);
    config.validate().expect("test config should be valid");

    let jwt = JwtService::from_config(&config);
    let state = AppState::new(Arc::new(InMemoryIssueService::new()), jwt.clone());
    let app = create_app(state, &config).expect("app should build");
    (app, jwt)
}

async fn call(app: &Router, method: &str, uri: &str, token: &str, body: Option<Value>) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token));
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Report, discuss and resolve an issue across both roles.
#[tokio::test]
async fn issue_lifecycle() {
    let (app, jwt) = test_app();
    let student = jwt.issue_token(3, "janis", Role::Lietotajs).unwrap();
    let technician = jwt.issue_token(8, "ilze", Role::Laborants).unwrap();

    // Student reports a problem affecting two computers
    let response = call(
        &app,
        "POST",
        "/api/issues",
        &student,
        Some(json!({
            "user_id": 3,
            "title": "Room 204 PCs do not boot",
            "description": "Stuck on BIOS screen",
            "status": "pending",
            "computer_ids": [7, 12],
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let issue_id = json_body(response).await["issue_id"].as_i64().unwrap();

    // Technician sees it in the list
    let response = call(&app, "GET", "/api/issues", &technician, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let issues = json_body(response).await;
    assert_eq!(issues["issues"].as_array().unwrap().len(), 1);
    assert_eq!(issues["issues"][0]["user_id"], 3);

    // Student adds a comment
    let response = call(
        &app,
        "POST",
        &format!("/api/issues/{}/comments", issue_id),
        &student,
        Some(json!({ "user_id": 3, "comment": "fails to boot" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Technician fixes one computer, then closes the issue as unsolved
    let response = call(
        &app,
        "PUT",
        &format!("/api/issues/{}/computer/7", issue_id),
        &technician,
        Some(json!({ "status": "solved" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = call(
        &app,
        "PUT",
        &format!("/api/issues/{}/status", issue_id),
        &technician,
        Some(json!({ "status": "unsolved" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Final state
    let response = call(&app, "GET", &format!("/api/issues/{}", issue_id), &student, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = json_body(response).await;
    assert_eq!(detail["issue"]["status"], "unsolved");
    assert_eq!(
        detail["computers"],
        json!([
            { "issue_id": issue_id, "computer_id": 7, "status": "solved" },
            { "issue_id": issue_id, "computer_id": 12, "status": "pending" },
        ])
    );

    let response = call(
        &app,
        "GET",
        &format!("/api/issues/{}/comments", issue_id),
        &technician,
        None,
    )
    .await;
    let comments = json_body(response).await;
    assert_eq!(comments["comments"][0]["user_id"], 3);
    assert_eq!(comments["comments"][0]["comment"], "fails to boot");
}

/// A solved issue can be reopened.
#[tokio::test]
async fn status_transitions_are_unconstrained() {
    let (app, jwt) = test_app();
    let student = jwt.issue_token(1, "a", Role::Lietotajs).unwrap();
    let technician = jwt.issue_token(2, "b", Role::Laborants).unwrap();

    let response = call(
        &app,
        "POST",
        "/api/issues",
        &student,
        Some(json!({
            "title": "Mouse",
            "description": "Scroll wheel broken",
            "status": "pending",
            "computer_ids": [],
        })),
    )
    .await;
    let issue_id = json_body(response).await["issue_id"].as_i64().unwrap();

    for status in ["solved", "pending", "solved", "unsolved"] {
        let response = call(
            &app,
            "PUT",
            &format!("/api/issues/{}/status", issue_id),
            &technician,
            Some(json!({ "status": status })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = call(&app, "GET", &format!("/api/issues/{}", issue_id), &student, None).await;
        assert_eq!(json_body(response).await["issue"]["status"], status);
    }
}

/// Tokens from another issuer are refused.
#[tokio::test]
async fn foreign_tokens_are_rejected() {
    let (app, _) = test_app();
    let foreign = JwtService::new(SECRET, "someone-else", 60)
        .issue_token(1, "mallory", Role::Laborants)
        .unwrap();

    let response = call(&app, "GET", "/api/issues", &foreign, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await, json!({ "message": "Invalid token" }));
}

/// The frontend dev server origin gets CORS headers.
#[tokio::test]
async fn cors_allows_frontend_origin() {
    let (app, jwt) = test_app();
    let token = jwt.issue_token(1, "a", Role::Lietotajs).unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/issues")
        .header("origin", "http://localhost:5174")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5174")
    );
}
