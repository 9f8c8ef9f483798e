//! # Apps API Handlers
//!
//! This module contains handlers for app CRUD, scoped to the apps owned by
//! the authenticated caller.

use crate::auth::{CurrentUser, ensure_owned};
use crate::error::{ApiError, not_found};
use crate::models::app::Model as AppModel;
use crate::repositories::{AppRepository, CreateAppRequest, UpdateAppRequest};
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request payload for creating a new app
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAppRequestDto {
    /// Display name for the app
    #[schema(example = "My Shop Front")]
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// App kind; one of "web" or "mobile"
    #[serde(rename = "type")]
    #[schema(example = "web")]
    pub kind: String,
    /// Framework; one of "django" or "react-native"
    #[schema(example = "django")]
    pub framework: String,
    /// Optional custom domain
    pub domain_name: Option<String>,
}

/// Request payload for updating an app; omitted optional fields keep their
/// stored values
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateAppRequestDto {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub framework: String,
    pub description: Option<String>,
    pub domain_name: Option<String>,
}

/// Public representation of an app
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AppDto {
    /// Unique identifier for the app
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Description, if any
    pub description: Option<String>,
    /// App kind
    #[serde(rename = "type")]
    pub kind: String,
    /// Framework the app is built with
    pub framework: String,
    /// Custom domain, if any
    pub domain_name: Option<String>,
    /// Derived screenshot file name
    pub screenshot: Option<String>,
    /// Owning user
    pub user_id: Option<Uuid>,
    /// Currently active subscription, if the app has one
    pub current_subscription_id: Option<Uuid>,
    /// Timestamp when the app was created (ISO 8601)
    pub created_at: String,
    /// Timestamp when the app was last updated (ISO 8601)
    pub updated_at: String,
}

impl AppDto {
    fn from_model(app: &AppModel) -> Self {
        Self {
            id: app.id,
            name: app.name.clone(),
            description: app.description.clone(),
            kind: app.kind.clone(),
            framework: app.framework.clone(),
            domain_name: app.domain_name.clone(),
            screenshot: app.screenshot.clone(),
            user_id: app.user_id,
            current_subscription_id: app.current_subscription_id,
            created_at: app.created_at.to_rfc3339(),
            updated_at: app.updated_at.to_rfc3339(),
        }
    }
}

/// Confirmation payload for deletions
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponseDto {
    /// Human-readable confirmation
    pub message: String,
}

fn app_not_found(app_id: Uuid) -> ApiError {
    not_found(&format!("No app found against id {}", app_id))
}

/// List the caller's apps
#[utoipa::path(
    get,
    path = "/api/v1/apps",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Apps owned by the caller", body = [AppDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "apps"
)]
pub async fn list_apps(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<AppDto>>, ApiError> {
    let apps = AppRepository::new(&state.db).list_by_owner(user.0).await?;

    Ok(Json(apps.iter().map(AppDto::from_model).collect()))
}

/// Get one of the caller's apps by ID
#[utoipa::path(
    get,
    path = "/api/v1/apps/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "App UUID")),
    responses(
        (status = 200, description = "The requested app", body = AppDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller does not own the app", body = ApiError),
        (status = 404, description = "App not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "apps"
)]
pub async fn get_app(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(app_id): Path<Uuid>,
) -> Result<Json<AppDto>, ApiError> {
    let app = AppRepository::new(&state.db)
        .find_by_id(app_id)
        .await?
        .ok_or_else(|| app_not_found(app_id))?;
    ensure_owned(&app, &user)?;

    Ok(Json(AppDto::from_model(&app)))
}

/// Create a new app owned by the caller
#[utoipa::path(
    post,
    path = "/api/v1/apps",
    security(("bearer_auth" = [])),
    request_body = CreateAppRequestDto,
    responses(
        (status = 201, description = "App created", body = AppDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "apps"
)]
pub async fn create_app(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateAppRequestDto>,
) -> Result<(StatusCode, Json<AppDto>), ApiError> {
    // The owner always comes from the token, never the payload
    let app = AppRepository::new(&state.db)
        .create_app(CreateAppRequest {
            name: request.name,
            description: request.description,
            kind: request.kind,
            framework: request.framework,
            domain_name: request.domain_name,
            user_id: Some(user.0),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AppDto::from_model(&app))))
}

/// Update one of the caller's apps
#[utoipa::path(
    put,
    path = "/api/v1/apps/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "App UUID")),
    request_body = UpdateAppRequestDto,
    responses(
        (status = 200, description = "App updated", body = AppDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller does not own the app", body = ApiError),
        (status = 404, description = "App not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "apps"
)]
pub async fn update_app(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(app_id): Path<Uuid>,
    Json(request): Json<UpdateAppRequestDto>,
) -> Result<Json<AppDto>, ApiError> {
    let repo = AppRepository::new(&state.db);

    let app = repo
        .find_by_id(app_id)
        .await?
        .ok_or_else(|| app_not_found(app_id))?;
    ensure_owned(&app, &user)?;

    let updated = repo
        .update_app(
            app,
            UpdateAppRequest {
                name: request.name,
                kind: request.kind,
                framework: request.framework,
                description: request.description,
                domain_name: request.domain_name,
            },
        )
        .await?;

    Ok(Json(AppDto::from_model(&updated)))
}

/// Delete one of the caller's apps
#[utoipa::path(
    delete,
    path = "/api/v1/apps/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "App UUID")),
    responses(
        (status = 200, description = "App deleted", body = DeletedResponseDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller does not own the app", body = ApiError),
        (status = 404, description = "App not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "apps"
)]
pub async fn delete_app(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(app_id): Path<Uuid>,
) -> Result<Json<DeletedResponseDto>, ApiError> {
    let repo = AppRepository::new(&state.db);

    let app = repo
        .find_by_id(app_id)
        .await?
        .ok_or_else(|| app_not_found(app_id))?;
    ensure_owned(&app, &user)?;

    repo.delete_app(app).await?;

    Ok(Json(DeletedResponseDto {
        message: "App deleted successfully".to_string(),
    }))
}
