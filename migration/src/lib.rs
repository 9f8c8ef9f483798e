//! Database migrations for the Appdock API.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2026_03_01_000001_create_users;
mod m2026_03_01_000002_create_plans;
mod m2026_03_01_000003_create_apps;
mod m2026_03_01_000004_create_subscriptions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2026_03_01_000001_create_users::Migration),
            Box::new(m2026_03_01_000002_create_plans::Migration),
            Box::new(m2026_03_01_000003_create_apps::Migration),
            Box::new(m2026_03_01_000004_create_subscriptions::Migration),
        ]
    }
}
