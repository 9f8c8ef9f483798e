//! Plan seeding functionality
//!
//! This module seeds the plans table with the fixed plan catalog. Plans
//! have no write endpoints, so seeding is the only way rows get here.

use anyhow::Result;
use sea_orm::DatabaseConnection;

use crate::repositories::{CreatePlanRequest, PlanRepository};

/// Seeds the plans table with the fixed plan catalog
///
/// Checks whether each catalog plan already exists by name and creates it
/// if it doesn't, so running the seed repeatedly is safe.
pub async fn seed_plans(db: &DatabaseConnection) -> Result<()> {
    let repo = PlanRepository::new(db);

    let plans = vec![
        CreatePlanRequest {
            name: "Free".to_string(),
            description: "One app, community support".to_string(),
            price: "free".to_string(),
        },
        CreatePlanRequest {
            name: "Starter".to_string(),
            description: "Custom domain and email support".to_string(),
            price: "$10/mo".to_string(),
        },
        CreatePlanRequest {
            name: "Pro".to_string(),
            description: "Unlimited apps and priority support".to_string(),
            price: "$25/mo".to_string(),
        },
        CreatePlanRequest {
            name: "Business".to_string(),
            description: "Dedicated support and SLA".to_string(),
            price: "$99/mo".to_string(),
        },
    ];

    for plan in plans {
        match repo.find_by_name(&plan.name).await {
            Ok(Some(_)) => {
                log::info!("Plan '{}' already exists, skipping", plan.name);
                continue;
            }
            Ok(None) => {
                log::info!("Creating plan: {}", plan.name);
                let name = plan.name.clone();
                if let Err(e) = repo.create_plan(plan).await {
                    log::error!("Failed to create plan '{}': {}", name, e);
                    return Err(e.into());
                }
            }
            Err(e) => {
                log::error!("Failed to look up plan '{}': {}", plan.name, e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::MigratorTrait;
    use sea_orm::{ConnectOptions, Database};

    async fn setup_test_db() -> DatabaseConnection {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1);
        let db = Database::connect(opt).await.expect("Failed to init test DB");
        migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        db
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let db = setup_test_db().await;

        seed_plans(&db).await.unwrap();
        seed_plans(&db).await.unwrap();

        let plans = PlanRepository::new(&db).list_plans().await.unwrap();
        assert_eq!(plans.len(), 4);

        let free = PlanRepository::new(&db)
            .find_by_name("Free")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(free.price, "free");
    }
}
