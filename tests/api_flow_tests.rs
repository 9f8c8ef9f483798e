//! End-to-end API flow tests.
//!
//! Drives the full router the way a client would: signup, login, app
//! creation, plan discovery, subscription activation and supersession,
//! with ownership checks between two accounts.

use std::sync::Arc;

use appdock::config::AppConfig;
use appdock::seeds::seed_plans;
use appdock::server::{AppState, create_app};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn setup_app() -> Router {
    let config = Arc::new(AppConfig {
        profile: "test".to_string(),
        ..Default::default()
    });

    // Single connection so every query sees the same in-memory database
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1);
    let db = Database::connect(opt).await.expect("Failed to init test DB");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    seed_plans(&db).await.expect("Failed to seed plans");

    create_app(AppState { config, db })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    match body {
        Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn register(app: &Router, name: &str, email: &str) -> String {
    let response = send(
        app,
        request(
            "POST",
            "/api/v1/signup",
            None,
            Some(json!({"name": name, "email": email, "password": "correct-horse"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        app,
        request(
            "POST",
            "/api/v1/login",
            None,
            Some(json!({"email": email, "password": "correct-horse"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn root_reports_service_info_without_auth() {
    let app = setup_app().await;

    let response = send(&app, request("GET", "/", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["service"], "appdock");
}

#[tokio::test]
async fn healthz_round_trips_the_database() {
    let app = setup_app().await;

    let response = send(&app, request("GET", "/healthz", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "reachable");
}

#[tokio::test]
async fn protected_routes_reject_anonymous_requests() {
    let app = setup_app().await;

    for uri in ["/api/v1/apps", "/api/v1/plans", "/api/v1/subscriptions"] {
        let response = send(&app, request("GET", uri, None, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri {}", uri);

        let body = body_json(response).await;
        assert_eq!(body["code"], "UNAUTHORIZED");
        assert!(body["trace_id"].is_string());
    }
}

#[tokio::test]
async fn subscription_lifecycle_end_to_end() {
    let app = setup_app().await;
    let token = register(&app, "Ada", "ada@example.com").await;

    // Create an app
    let response = send(
        &app,
        request(
            "POST",
            "/api/v1/apps",
            Some(&token),
            Some(json!({
                "name": "Lovelace Engine",
                "type": "web",
                "framework": "django",
                "description": "Number cruncher"
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created_app = body_json(response).await;
    let app_id = created_app["id"].as_str().unwrap().to_string();
    assert!(created_app["current_subscription_id"].is_null());

    // Discover plans
    let response = send(&app, request("GET", "/api/v1/plans", Some(&token), None)).await;
    let plans = body_json(response).await;
    let free_plan = plans[0]["id"].as_str().unwrap().to_string();
    let paid_plan = plans[2]["id"].as_str().unwrap().to_string();

    // Subscribe to the free plan
    let response = send(
        &app,
        request(
            "POST",
            "/api/v1/subscriptions",
            Some(&token),
            Some(json!({"plan_id": free_plan, "app_id": app_id})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = body_json(response).await;
    assert_eq!(first["active"], true);

    // Upgrade: the new subscription supersedes the old one
    let response = send(
        &app,
        request(
            "POST",
            "/api/v1/subscriptions",
            Some(&token),
            Some(json!({"plan_id": paid_plan, "app_id": app_id})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = body_json(response).await;

    let response = send(
        &app,
        request(
            "GET",
            &format!("/api/v1/subscriptions/{}", first["id"].as_str().unwrap()),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(body_json(response).await["active"], false);

    // The app points at the newest subscription
    let response = send(
        &app,
        request("GET", &format!("/api/v1/apps/{}", app_id), Some(&token), None),
    )
    .await;
    let fetched = body_json(response).await;
    assert_eq!(fetched["current_subscription_id"], second["id"]);

    // Both rows remain listed, exactly one active
    let response = send(
        &app,
        request("GET", "/api/v1/subscriptions", Some(&token), None),
    )
    .await;
    let listed = body_json(response).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(
        listed.iter().filter(|s| s["active"] == true).count(),
        1
    );
}

#[tokio::test]
async fn ownership_is_enforced_between_accounts() {
    let app = setup_app().await;
    let ada = register(&app, "Ada", "ada@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;

    let response = send(
        &app,
        request(
            "POST",
            "/api/v1/apps",
            Some(&ada),
            Some(json!({"name": "Private", "type": "mobile", "framework": "react-native"})),
        ),
    )
    .await;
    let app_id = body_json(response).await["id"].as_str().unwrap().to_string();

    // Bob cannot read, modify, delete, or subscribe Ada's app
    let read = send(
        &app,
        request("GET", &format!("/api/v1/apps/{}", app_id), Some(&bob), None),
    )
    .await;
    assert_eq!(read.status(), StatusCode::FORBIDDEN);
    let denial = body_json(read).await;
    assert_eq!(denial["code"], "FORBIDDEN");
    assert!(denial["message"].as_str().unwrap().contains(&app_id));

    let delete = send(
        &app,
        request(
            "DELETE",
            &format!("/api/v1/apps/{}", app_id),
            Some(&bob),
            None,
        ),
    )
    .await;
    assert_eq!(delete.status(), StatusCode::FORBIDDEN);

    let plans = send(&app, request("GET", "/api/v1/plans", Some(&bob), None)).await;
    let plan_id = body_json(plans).await[0]["id"].as_str().unwrap().to_string();
    let subscribe = send(
        &app,
        request(
            "POST",
            "/api/v1/subscriptions",
            Some(&bob),
            Some(json!({"plan_id": plan_id, "app_id": app_id})),
        ),
    )
    .await;
    assert_eq!(subscribe.status(), StatusCode::FORBIDDEN);

    // And Ada still sees her app untouched
    let response = send(&app, request("GET", "/api/v1/apps", Some(&ada), None)).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}
