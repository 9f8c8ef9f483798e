//! # Signup and Login API Handlers
//!
//! This module contains the public identity endpoints: account creation
//! and the exchange of credentials for a bearer token.

use crate::auth::issue_token;
use crate::error::{ApiError, ErrorType, unauthorized, validation_error};
use crate::models::user::Model as UserModel;
use crate::repositories::{CreateUserRequest, UserRepository};
use crate::server::AppState;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request payload for creating a new account
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupRequestDto {
    /// Display name for the account
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    /// Login email, unique across accounts
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Plaintext password, at least 8 characters
    pub password: String,
}

/// Public representation of a user account
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Login email address
    pub email: String,
    /// Display name
    pub name: String,
}

impl UserDto {
    fn from_model(user: &UserModel) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// Request payload for exchanging credentials for a bearer token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequestDto {
    /// Login email address
    pub email: String,
    /// Account password
    pub password: String,
}

/// Response payload carrying the issued bearer token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    /// Bearer token to present on subsequent requests
    pub token: String,
    /// The authenticated user
    pub user: UserDto,
}

/// Create a new user account
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = SignupRequestDto,
    responses(
        (status = 201, description = "Account created", body = UserDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "E-mail address already registered", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequestDto>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    if request.password.chars().count() < 8 {
        return Err(validation_error(
            "password must be at least 8 characters",
            serde_json::json!({ "password": "Must be at least 8 characters" }),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(request.password.as_bytes(), &salt)
        .map_err(|err| {
            tracing::error!("failed to hash password: {err}");
            ApiError::from(ErrorType::InternalServerError)
        })?
        .to_string();

    let user = UserRepository::new(&state.db)
        .create_user(CreateUserRequest {
            name: request.name,
            email: request.email,
            password_hash,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserDto::from_model(&user))))
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponseDto),
        (status = 401, description = "Unknown e-mail or wrong password", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequestDto>,
) -> Result<Json<LoginResponseDto>, ApiError> {
    // One message for both failure modes so the endpoint cannot be used
    // to probe which addresses have accounts
    let user = UserRepository::new(&state.db)
        .find_by_email(&request.email)
        .await?
        .ok_or_else(|| unauthorized(Some("Invalid email or password")))?;

    let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|err| {
        tracing::error!(user_id = %user.id, "stored password hash is unparseable: {err}");
        ApiError::from(ErrorType::InternalServerError)
    })?;

    if Argon2::default()
        .verify_password(request.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(unauthorized(Some("Invalid email or password")));
    }

    let token = issue_token(&state.config, user.id)?;

    Ok(Json(LoginResponseDto {
        token,
        user: UserDto::from_model(&user),
    }))
}
