//! # Subscriptions API Handlers
//!
//! This module contains handlers for subscription endpoints, scoped to the
//! authenticated caller. Creation and update both route through the
//! activation service so the per-app invariants hold; there is no delete,
//! superseded subscriptions are kept deactivated.

use crate::activation::ActivationService;
use crate::auth::{CurrentUser, UserId, ensure_owned};
use crate::error::{ApiError, not_found};
use crate::models::subscription::Model as SubscriptionModel;
use crate::repositories::{AppRepository, SubscriptionRepository};
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request payload for subscribing an app to a plan
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequestDto {
    /// Plan to subscribe to
    pub plan_id: Uuid,
    /// App the subscription covers; must be owned by the caller
    pub app_id: Uuid,
}

/// Request payload for replacing a subscription with a new plan/app pair
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateSubscriptionRequestDto {
    /// New plan
    pub plan_id: Uuid,
    /// Target app; must be owned by the caller
    pub app_id: Uuid,
}

/// Public representation of a subscription
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionDto {
    /// Unique identifier for the subscription
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Subscribed plan
    pub plan_id: Uuid,
    /// Covered app
    pub app_id: Uuid,
    /// Whether this is the app's current subscription
    pub active: bool,
    /// Timestamp when the subscription was created (ISO 8601)
    pub created_at: String,
    /// Timestamp when the subscription was last updated (ISO 8601)
    pub updated_at: String,
}

impl SubscriptionDto {
    fn from_model(subscription: &SubscriptionModel) -> Self {
        Self {
            id: subscription.id,
            user_id: subscription.user_id,
            plan_id: subscription.plan_id,
            app_id: subscription.app_id,
            active: subscription.active,
            created_at: subscription.created_at.to_rfc3339(),
            updated_at: subscription.updated_at.to_rfc3339(),
        }
    }
}

fn subscription_not_found(subscription_id: Uuid) -> ApiError {
    not_found(&format!(
        "No subscription found against id {}",
        subscription_id
    ))
}

/// Look up the target app and check the caller owns it before any
/// activation write happens.
async fn ensure_owned_app(
    state: &AppState,
    user: &UserId,
    app_id: Uuid,
) -> Result<(), ApiError> {
    let app = AppRepository::new(&state.db)
        .find_by_id(app_id)
        .await?
        .ok_or_else(|| not_found(&format!("No app found against id {}", app_id)))?;
    ensure_owned(&app, user)?;
    Ok(())
}

/// List the caller's subscriptions
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscriptions owned by the caller", body = [SubscriptionDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "subscriptions"
)]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<SubscriptionDto>>, ApiError> {
    let subscriptions = SubscriptionRepository::new(&state.db)
        .list_by_owner(user.0)
        .await?;

    Ok(Json(
        subscriptions.iter().map(SubscriptionDto::from_model).collect(),
    ))
}

/// Get one of the caller's subscriptions by ID
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Subscription UUID")),
    responses(
        (status = 200, description = "The requested subscription", body = SubscriptionDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller does not own the subscription", body = ApiError),
        (status = 404, description = "Subscription not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "subscriptions"
)]
pub async fn get_subscription(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(subscription_id): Path<Uuid>,
) -> Result<Json<SubscriptionDto>, ApiError> {
    let subscription = SubscriptionRepository::new(&state.db)
        .find_by_id(subscription_id)
        .await?
        .ok_or_else(|| subscription_not_found(subscription_id))?;
    ensure_owned(&subscription, &user)?;

    Ok(Json(SubscriptionDto::from_model(&subscription)))
}

/// Subscribe one of the caller's apps to a plan
///
/// Any previously active subscription for the app is superseded in the
/// same transaction.
#[utoipa::path(
    post,
    path = "/api/v1/subscriptions",
    security(("bearer_auth" = [])),
    request_body = CreateSubscriptionRequestDto,
    responses(
        (status = 201, description = "Subscription created and activated", body = SubscriptionDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller does not own the target app", body = ApiError),
        (status = 404, description = "App or plan not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "subscriptions"
)]
pub async fn create_subscription(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateSubscriptionRequestDto>,
) -> Result<(StatusCode, Json<SubscriptionDto>), ApiError> {
    ensure_owned_app(&state, &user, request.app_id).await?;

    let subscription = ActivationService::new(&state.db)
        .activate(user.0, request.plan_id, request.app_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionDto::from_model(&subscription)),
    ))
}

/// Replace one of the caller's subscriptions
///
/// Routes through the activation service like creation does: a fresh
/// subscription supersedes whatever is active on the target app, and the
/// replaced row stays deactivated. Reactivating an old subscription row is
/// not supported.
#[utoipa::path(
    put,
    path = "/api/v1/subscriptions/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Subscription UUID being replaced")),
    request_body = UpdateSubscriptionRequestDto,
    responses(
        (status = 200, description = "Replacement subscription, now active", body = SubscriptionDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller does not own the subscription or target app", body = ApiError),
        (status = 404, description = "Subscription, app or plan not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "subscriptions"
)]
pub async fn update_subscription(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(subscription_id): Path<Uuid>,
    Json(request): Json<UpdateSubscriptionRequestDto>,
) -> Result<Json<SubscriptionDto>, ApiError> {
    let existing = SubscriptionRepository::new(&state.db)
        .find_by_id(subscription_id)
        .await?
        .ok_or_else(|| subscription_not_found(subscription_id))?;
    ensure_owned(&existing, &user)?;

    ensure_owned_app(&state, &user, request.app_id).await?;

    let subscription = ActivationService::new(&state.db)
        .activate(user.0, request.plan_id, request.app_id)
        .await?;

    Ok(Json(SubscriptionDto::from_model(&subscription)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::seeds::seed_plans;
    use crate::server::create_app;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use migration::MigratorTrait;
    use sea_orm::{ConnectOptions, Database};
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn setup_test_app() -> Router {
        let config = Arc::new(AppConfig {
            profile: "test".to_string(),
            ..Default::default()
        });

        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1);
        let db = Database::connect(opt).await.expect("Failed to init test DB");
        migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        seed_plans(&db).await.expect("Failed to seed plans");

        create_app(AppState { config, db })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn authed_json(
        method: &str,
        uri: &str,
        token: &str,
        body: Option<serde_json::Value>,
    ) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json");
        match body {
            Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn signup_and_login(app: &Router, email: &str) -> String {
        let signup = Request::builder()
            .method("POST")
            .uri("/api/v1/signup")
            .header("Content-Type", "application/json")
            .body(Body::from(
                json!({"name": "Test", "email": email, "password": "correct-horse"}).to_string(),
            ))
            .unwrap();
        app.clone().oneshot(signup).await.unwrap();

        let login = Request::builder()
            .method("POST")
            .uri("/api/v1/login")
            .header("Content-Type", "application/json")
            .body(Body::from(
                json!({"email": email, "password": "correct-horse"}).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(login).await.unwrap();
        body_json(response).await["token"].as_str().unwrap().to_string()
    }

    async fn create_owned_app(app: &Router, token: &str) -> String {
        let response = app
            .clone()
            .oneshot(authed_json(
                "POST",
                "/api/v1/apps",
                token,
                Some(json!({"name": "Storefront", "type": "web", "framework": "django"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["id"].as_str().unwrap().to_string()
    }

    async fn first_plan_id(app: &Router, token: &str) -> String {
        let response = app
            .clone()
            .oneshot(authed_json("GET", "/api/v1/plans", token, None))
            .await
            .unwrap();
        body_json(response).await[0]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn create_activates_and_repoints_the_app() {
        let app = setup_test_app().await;
        let token = signup_and_login(&app, "owner@example.com").await;
        let app_id = create_owned_app(&app, &token).await;
        let plan_id = first_plan_id(&app, &token).await;

        let response = app
            .clone()
            .oneshot(authed_json(
                "POST",
                "/api/v1/subscriptions",
                &token,
                Some(json!({"plan_id": plan_id, "app_id": app_id})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let subscription = body_json(response).await;
        assert_eq!(subscription["active"], true);
        assert_eq!(subscription["app_id"].as_str().unwrap(), app_id);

        // The app now points at its subscription
        let response = app
            .oneshot(authed_json(
                "GET",
                &format!("/api/v1/apps/{}", app_id),
                &token,
                None,
            ))
            .await
            .unwrap();
        let fetched = body_json(response).await;
        assert_eq!(
            fetched["current_subscription_id"],
            subscription["id"]
        );
    }

    #[tokio::test]
    async fn second_subscription_supersedes_the_first() {
        let app = setup_test_app().await;
        let token = signup_and_login(&app, "owner@example.com").await;
        let app_id = create_owned_app(&app, &token).await;

        let plans = app
            .clone()
            .oneshot(authed_json("GET", "/api/v1/plans", &token, None))
            .await
            .unwrap();
        let plans = body_json(plans).await;
        let plan_a = plans[0]["id"].as_str().unwrap().to_string();
        let plan_b = plans[1]["id"].as_str().unwrap().to_string();

        let first = app
            .clone()
            .oneshot(authed_json(
                "POST",
                "/api/v1/subscriptions",
                &token,
                Some(json!({"plan_id": plan_a, "app_id": app_id})),
            ))
            .await
            .unwrap();
        let first = body_json(first).await;

        let second = app
            .clone()
            .oneshot(authed_json(
                "POST",
                "/api/v1/subscriptions",
                &token,
                Some(json!({"plan_id": plan_b, "app_id": app_id})),
            ))
            .await
            .unwrap();
        let second = body_json(second).await;

        // Re-reading the first shows it superseded
        let refreshed = app
            .clone()
            .oneshot(authed_json(
                "GET",
                &format!("/api/v1/subscriptions/{}", first["id"].as_str().unwrap()),
                &token,
                None,
            ))
            .await
            .unwrap();
        let refreshed = body_json(refreshed).await;
        assert_eq!(refreshed["active"], false);

        let listed = app
            .oneshot(authed_json("GET", "/api/v1/subscriptions", &token, None))
            .await
            .unwrap();
        let listed = body_json(listed).await;
        let active: Vec<_> = listed
            .as_array()
            .unwrap()
            .iter()
            .filter(|s| s["active"] == true)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0]["id"], second["id"]);
    }

    #[tokio::test]
    async fn subscribing_a_foreign_app_is_forbidden() {
        let app = setup_test_app().await;
        let alice = signup_and_login(&app, "alice@example.com").await;
        let bob = signup_and_login(&app, "bob@example.com").await;
        let alice_app = create_owned_app(&app, &alice).await;
        let plan_id = first_plan_id(&app, &bob).await;

        let response = app
            .oneshot(authed_json(
                "POST",
                "/api/v1/subscriptions",
                &bob,
                Some(json!({"plan_id": plan_id, "app_id": alice_app})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_plan_returns_404_without_creating_anything() {
        let app = setup_test_app().await;
        let token = signup_and_login(&app, "owner@example.com").await;
        let app_id = create_owned_app(&app, &token).await;

        let response = app
            .clone()
            .oneshot(authed_json(
                "POST",
                "/api/v1/subscriptions",
                &token,
                Some(json!({"plan_id": Uuid::new_v4(), "app_id": app_id})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let listed = app
            .oneshot(authed_json("GET", "/api/v1/subscriptions", &token, None))
            .await
            .unwrap();
        assert_eq!(body_json(listed).await.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn update_replaces_through_the_activation_service() {
        let app = setup_test_app().await;
        let token = signup_and_login(&app, "owner@example.com").await;
        let app_id = create_owned_app(&app, &token).await;

        let plans = app
            .clone()
            .oneshot(authed_json("GET", "/api/v1/plans", &token, None))
            .await
            .unwrap();
        let plans = body_json(plans).await;
        let plan_a = plans[0]["id"].as_str().unwrap().to_string();
        let plan_b = plans[1]["id"].as_str().unwrap().to_string();

        let first = app
            .clone()
            .oneshot(authed_json(
                "POST",
                "/api/v1/subscriptions",
                &token,
                Some(json!({"plan_id": plan_a, "app_id": app_id})),
            ))
            .await
            .unwrap();
        let first = body_json(first).await;
        let first_id = first["id"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(authed_json(
                "PUT",
                &format!("/api/v1/subscriptions/{}", first_id),
                &token,
                Some(json!({"plan_id": plan_b, "app_id": app_id})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let replacement = body_json(response).await;
        assert_eq!(replacement["active"], true);
        assert_eq!(replacement["plan_id"].as_str().unwrap(), plan_b);

        let refreshed = app
            .oneshot(authed_json(
                "GET",
                &format!("/api/v1/subscriptions/{}", first_id),
                &token,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(body_json(refreshed).await["active"], false);
    }

    #[tokio::test]
    async fn foreign_subscription_access_is_forbidden() {
        let app = setup_test_app().await;
        let alice = signup_and_login(&app, "alice@example.com").await;
        let bob = signup_and_login(&app, "bob@example.com").await;
        let alice_app = create_owned_app(&app, &alice).await;
        let plan_id = first_plan_id(&app, &alice).await;

        let created = app
            .clone()
            .oneshot(authed_json(
                "POST",
                "/api/v1/subscriptions",
                &alice,
                Some(json!({"plan_id": plan_id, "app_id": alice_app})),
            ))
            .await
            .unwrap();
        let subscription_id = body_json(created).await["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(authed_json(
                "GET",
                &format!("/api/v1/subscriptions/{}", subscription_id),
                &bob,
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
