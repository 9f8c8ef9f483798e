//! # Plans API Handlers
//!
//! This module contains the read-only plan catalog endpoints. The catalog
//! is seeded at startup; there are no write endpoints.

use crate::error::{ApiError, not_found};
use crate::models::plan::Model as PlanModel;
use crate::repositories::PlanRepository;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Public representation of a plan
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlanDto {
    /// Unique identifier for the plan
    pub id: Uuid,
    /// Display name
    #[schema(example = "Pro")]
    pub name: String,
    /// What the plan offers
    pub description: String,
    /// Price tier
    #[schema(example = "$25/mo")]
    pub price: String,
    /// Timestamp when the plan was created (ISO 8601)
    pub created_at: String,
    /// Timestamp when the plan was last updated (ISO 8601)
    pub updated_at: String,
}

impl PlanDto {
    fn from_model(plan: &PlanModel) -> Self {
        Self {
            id: plan.id,
            name: plan.name.clone(),
            description: plan.description.clone(),
            price: plan.price.clone(),
            created_at: plan.created_at.to_rfc3339(),
            updated_at: plan.updated_at.to_rfc3339(),
        }
    }
}

/// List the plan catalog
#[utoipa::path(
    get,
    path = "/api/v1/plans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Available plans", body = [PlanDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "plans"
)]
pub async fn list_plans(State(state): State<AppState>) -> Result<Json<Vec<PlanDto>>, ApiError> {
    let plans = PlanRepository::new(&state.db).list_plans().await?;

    Ok(Json(plans.iter().map(PlanDto::from_model).collect()))
}

/// Get a plan by ID
#[utoipa::path(
    get,
    path = "/api/v1/plans/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Plan UUID")),
    responses(
        (status = 200, description = "The requested plan", body = PlanDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Plan not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "plans"
)]
pub async fn get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<PlanDto>, ApiError> {
    let plan = PlanRepository::new(&state.db)
        .find_by_id(plan_id)
        .await?
        .ok_or_else(|| not_found(&format!("No plan found against id {}", plan_id)))?;

    Ok(Json(PlanDto::from_model(&plan)))
}
