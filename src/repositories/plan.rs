//! # Plan Repository
//!
//! This module contains the repository implementation for Plan entities.
//! Plans are a read-only catalog; writes happen only through startup
//! seeding.

use crate::error::RepositoryError;
use crate::models::plan::{
    ActiveModel as PlanActiveModel, Column as PlanColumn, Entity as Plan, Model as PlanModel,
    PRICE_TIERS,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

/// Request data for creating a new plan
#[derive(Debug, Clone)]
pub struct CreatePlanRequest {
    /// Display name for the plan
    pub name: String,
    /// Description of what the plan offers
    pub description: String,
    /// Price tier, one of [`PRICE_TIERS`]
    pub price: String,
}

/// Repository for Plan database operations
pub struct PlanRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PlanRepository<'a> {
    /// Create a new PlanRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new plan
    pub async fn create_plan(
        &self,
        request: CreatePlanRequest,
    ) -> Result<PlanModel, RepositoryError> {
        if request.name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "plan name cannot be empty",
            ));
        }

        if !PRICE_TIERS.contains(&request.price.as_str()) {
            return Err(RepositoryError::validation_error(format!(
                "'{}' is not a valid plan price. Valid values are {:?}",
                request.price, PRICE_TIERS
            )));
        }

        let now = Utc::now();
        let plan = PlanActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            price: Set(request.price),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = plan
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Get plan by ID
    pub async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<PlanModel>, RepositoryError> {
        let plan = Plan::find_by_id(plan_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(plan)
    }

    /// Get plan by name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<PlanModel>, RepositoryError> {
        let plan = Plan::find()
            .filter(PlanColumn::Name.eq(name))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(plan)
    }

    /// List the whole plan catalog
    pub async fn list_plans(&self) -> Result<Vec<PlanModel>, RepositoryError> {
        let plans = Plan::find()
            .order_by_asc(PlanColumn::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(plans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::MigratorTrait;
    use sea_orm::{ConnectOptions, Database};

    async fn setup_test_db() -> DatabaseConnection {
        // Single connection so every query sees the same in-memory database
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1);
        let db = Database::connect(opt).await.expect("Failed to init test DB");
        migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        db
    }

    #[tokio::test]
    async fn create_and_list_plans() {
        let db = setup_test_db().await;
        let repo = PlanRepository::new(&db);

        repo.create_plan(CreatePlanRequest {
            name: "Free".to_string(),
            description: "For trying things out".to_string(),
            price: "free".to_string(),
        })
        .await
        .unwrap();

        repo.create_plan(CreatePlanRequest {
            name: "Pro".to_string(),
            description: "For serious builders".to_string(),
            price: "$25/mo".to_string(),
        })
        .await
        .unwrap();

        let plans = repo.list_plans().await.unwrap();
        assert_eq!(plans.len(), 2);

        let pro = repo.find_by_name("Pro").await.unwrap().unwrap();
        assert_eq!(pro.price, "$25/mo");

        let found = repo.find_by_id(pro.id).await.unwrap();
        assert_eq!(found.unwrap().name, "Pro");
    }

    #[tokio::test]
    async fn unknown_price_tier_is_rejected() {
        let db = setup_test_db().await;
        let repo = PlanRepository::new(&db);

        let result = repo
            .create_plan(CreatePlanRequest {
                name: "Weird".to_string(),
                description: "Unpriceable".to_string(),
                price: "$7/mo".to_string(),
            })
            .await;

        match result {
            Err(RepositoryError::Validation(message)) => {
                assert!(message.contains("$7/mo"));
                assert!(message.contains("free"));
            }
            other => panic!("expected validation error, got {:?}", other.map(|p| p.name)),
        }
    }
}
