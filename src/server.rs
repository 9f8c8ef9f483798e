//! # Server Configuration
//!
//! This module contains the server setup and configuration for the
//! Appdock API: shared state, routing, and OpenAPI documentation.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::auth_middleware;
use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/api/v1/signup", post(handlers::auth::signup))
        .route("/api/v1/login", post(handlers::auth::login));

    // Everything else resolves the bearer token to the acting user first
    let protected = Router::new()
        .route(
            "/api/v1/apps",
            get(handlers::apps::list_apps).post(handlers::apps::create_app),
        )
        .route(
            "/api/v1/apps/{id}",
            get(handlers::apps::get_app)
                .put(handlers::apps::update_app)
                .delete(handlers::apps::delete_app),
        )
        .route("/api/v1/plans", get(handlers::plans::list_plans))
        .route("/api/v1/plans/{id}", get(handlers::plans::get_plan))
        .route(
            "/api/v1/subscriptions",
            get(handlers::subscriptions::list_subscriptions)
                .post(handlers::subscriptions::create_subscription),
        )
        .route(
            "/api/v1/subscriptions/{id}",
            get(handlers::subscriptions::get_subscription)
                .put(handlers::subscriptions::update_subscription),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.config),
            auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(middleware::from_fn(telemetry::trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .map_err(|e| anyhow::anyhow!("invalid server address: {}", e))?;
    let profile = config.profile.clone();

    let state = AppState {
        config: Arc::new(config),
        db,
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::auth::signup,
        crate::handlers::auth::login,
        crate::handlers::apps::list_apps,
        crate::handlers::apps::get_app,
        crate::handlers::apps::create_app,
        crate::handlers::apps::update_app,
        crate::handlers::apps::delete_app,
        crate::handlers::plans::list_plans,
        crate::handlers::plans::get_plan,
        crate::handlers::subscriptions::list_subscriptions,
        crate::handlers::subscriptions::get_subscription,
        crate::handlers::subscriptions::create_subscription,
        crate::handlers::subscriptions::update_subscription,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthStatus,
            crate::error::ApiError,
            crate::handlers::auth::SignupRequestDto,
            crate::handlers::auth::UserDto,
            crate::handlers::auth::LoginRequestDto,
            crate::handlers::auth::LoginResponseDto,
            crate::handlers::apps::CreateAppRequestDto,
            crate::handlers::apps::UpdateAppRequestDto,
            crate::handlers::apps::AppDto,
            crate::handlers::apps::DeletedResponseDto,
            crate::handlers::plans::PlanDto,
            crate::handlers::subscriptions::CreateSubscriptionRequestDto,
            crate::handlers::subscriptions::UpdateSubscriptionRequestDto,
            crate::handlers::subscriptions::SubscriptionDto,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Appdock API",
        description = "API for managing apps, plans and subscriptions",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
