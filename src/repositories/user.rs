//! # User Repository
//!
//! This module contains the repository implementation for User entities,
//! backing signup and login.

use crate::error::RepositoryError;
use crate::models::user::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as User, Model as UserModel,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

/// Request data for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    /// Display name for the account
    pub name: String,
    /// Login email, unique across accounts
    pub email: String,
    /// Argon2id PHC string; hashing happens before the repository is called
    pub password_hash: String,
}

/// Repository for User database operations
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new user account
    pub async fn create_user(
        &self,
        request: CreateUserRequest,
    ) -> Result<UserModel, RepositoryError> {
        self.validate_signup(&request)?;

        if self.find_by_email(&request.email).await?.is_some() {
            return Err(RepositoryError::Conflict(
                "a user is already registered with this e-mail address".to_string(),
            ));
        }

        let now = Utc::now();
        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            email: Set(request.email),
            password_hash: Set(request.password_hash),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = user
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Get user by ID
    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserModel>, RepositoryError> {
        let user = User::find_by_id(user_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(user)
    }

    /// Get user by email address
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, RepositoryError> {
        let user = User::find()
            .filter(UserColumn::Email.eq(email))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(user)
    }

    fn validate_signup(&self, request: &CreateUserRequest) -> Result<(), RepositoryError> {
        if request.name.trim().is_empty() {
            return Err(RepositoryError::validation_error("name cannot be empty"));
        }

        let email = request.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(RepositoryError::validation_error(format!(
                "'{}' is not a valid e-mail address",
                request.email
            )));
        }

        Ok(())
    }
}
