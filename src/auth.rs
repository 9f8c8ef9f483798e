//! # Authentication and Authorization
//!
//! This module provides bearer-token authentication for protected API
//! endpoints and the ownership predicate applied uniformly by resource
//! handlers.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{ApiError, ErrorType, forbidden, unauthorized};
use crate::server::AppState;

/// User ID wrapper for type safety
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserId(pub Uuid);

/// Authenticated caller, injected into request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserId);

/// Bearer token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token was issued to
    pub sub: String,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

/// Sign a bearer token for the given user.
pub fn issue_token(config: &AppConfig, user_id: Uuid) -> Result<String, ApiError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + config.token_ttl_seconds as i64,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret().as_bytes()),
    )
    .map_err(|err| {
        tracing::error!("failed to sign bearer token: {err}");
        ErrorType::InternalServerError.into()
    })
}

/// Resolve a bearer token to the user it was issued to.
pub fn verify_token(config: &AppConfig, token: &str) -> Result<UserId, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| unauthorized(Some("Invalid or expired bearer token")))?;

    data.claims
        .sub
        .parse::<Uuid>()
        .map(UserId)
        .map_err(|_| unauthorized(Some("Invalid subject in bearer token")))
}

/// Authentication middleware that resolves bearer tokens to the acting user
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;
    let user = verify_token(&config, token)?;
    tracing::debug!(user_id = %user.0, "Authenticated request");

    let mut request = request;
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))
        .and_then(|value| {
            value
                .to_str()
                .map_err(|_| unauthorized(Some("Invalid Authorization header")))
        })
        .and_then(|header| {
            header
                .strip_prefix("Bearer ")
                .ok_or_else(|| unauthorized(Some("Authorization header must use Bearer scheme")))
        })
}

impl<S> FromRequestParts<S> for CurrentUser
where
    Arc<AppConfig>: FromRef<S>,
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| unauthorized(Some("Authentication required")))
    }
}

/// A resource whose access is gated on its recorded owner.
pub trait Owned {
    /// Resource kind used in authorization error messages
    const KIND: &'static str;

    /// Id of this resource
    fn resource_id(&self) -> Uuid;

    /// Recorded owner, if any
    fn owner_id(&self) -> Option<Uuid>;
}

/// Authorization predicate: the acting user must be the recorded owner of
/// the resource. Applied uniformly by every ownership-gated handler.
pub fn ensure_owned<R: Owned>(resource: &R, user: &UserId) -> Result<(), ApiError> {
    if resource.owner_id() == Some(user.0) {
        Ok(())
    } else {
        Err(forbidden(Some(&format!(
            "User is not authorized to access {} {}",
            R::KIND,
            resource.resource_id()
        ))))
    }
}
