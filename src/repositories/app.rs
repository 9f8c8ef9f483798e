//! # App Repository
//!
//! This module contains the repository implementation for App entities,
//! providing owner-scoped CRUD with enumerated-field validation.

use crate::error::RepositoryError;
use crate::models::app::{
    APP_FRAMEWORKS, APP_KINDS, ActiveModel as AppActiveModel, Column as AppColumn, Entity as App,
    Model as AppModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

/// Request data for creating a new app
#[derive(Debug, Clone)]
pub struct CreateAppRequest {
    /// Display name for the app
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// App kind, validated against [`APP_KINDS`]
    pub kind: String,
    /// Framework, validated against [`APP_FRAMEWORKS`]
    pub framework: String,
    /// Optional custom domain
    pub domain_name: Option<String>,
    /// Owning user, stamped from the authenticated caller
    pub user_id: Option<Uuid>,
}

/// Request data for updating an app; `description` and `domain_name` are
/// only replaced when present.
#[derive(Debug, Clone)]
pub struct UpdateAppRequest {
    pub name: String,
    pub kind: String,
    pub framework: String,
    pub description: Option<String>,
    pub domain_name: Option<String>,
}

/// Repository for App database operations
pub struct AppRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AppRepository<'a> {
    /// Create a new AppRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new app, deriving its screenshot file name
    pub async fn create_app(
        &self,
        request: CreateAppRequest,
    ) -> Result<AppModel, RepositoryError> {
        validate_name(&request.name)?;
        validate_kind(&request.kind)?;
        validate_framework(&request.framework)?;

        let now = Utc::now();
        let app = AppActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.clone()),
            description: Set(request.description),
            kind: Set(request.kind),
            framework: Set(request.framework),
            domain_name: Set(request.domain_name),
            screenshot: Set(Some(derive_screenshot(&request.name))),
            user_id: Set(request.user_id),
            current_subscription_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = app
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Get app by ID
    pub async fn find_by_id(&self, app_id: Uuid) -> Result<Option<AppModel>, RepositoryError> {
        let app = App::find_by_id(app_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(app)
    }

    /// List all apps owned by the given user
    pub async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<AppModel>, RepositoryError> {
        let apps = App::find()
            .filter(AppColumn::UserId.eq(user_id))
            .order_by_asc(AppColumn::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(apps)
    }

    /// Update an already-fetched app, replacing optional fields only when
    /// the request carries them
    pub async fn update_app(
        &self,
        app: AppModel,
        request: UpdateAppRequest,
    ) -> Result<AppModel, RepositoryError> {
        validate_name(&request.name)?;
        validate_kind(&request.kind)?;
        validate_framework(&request.framework)?;

        let mut active_app = app.into_active_model();
        active_app.name = Set(request.name);
        active_app.kind = Set(request.kind);
        active_app.framework = Set(request.framework);
        if let Some(description) = request.description {
            active_app.description = Set(Some(description));
        }
        if let Some(domain_name) = request.domain_name {
            active_app.domain_name = Set(Some(domain_name));
        }
        active_app.updated_at = Set(Utc::now().into());

        let result = active_app
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Delete an app
    pub async fn delete_app(&self, app: AppModel) -> Result<(), RepositoryError> {
        app.delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), RepositoryError> {
    if name.trim().is_empty() {
        return Err(RepositoryError::validation_error("app name cannot be empty"));
    }
    Ok(())
}

fn validate_kind(kind: &str) -> Result<(), RepositoryError> {
    if !APP_KINDS.contains(&kind) {
        return Err(RepositoryError::validation_error(format!(
            "'{}' is not a valid app type. Valid values are {:?}",
            kind, APP_KINDS
        )));
    }
    Ok(())
}

fn validate_framework(framework: &str) -> Result<(), RepositoryError> {
    if !APP_FRAMEWORKS.contains(&framework) {
        return Err(RepositoryError::validation_error(format!(
            "'{}' is not a valid app framework. Valid values are {:?}",
            framework, APP_FRAMEWORKS
        )));
    }
    Ok(())
}

fn derive_screenshot(name: &str) -> String {
    format!(
        "{}_screenshot.png",
        name.trim().to_lowercase().replace(' ', "_")
    )
}
